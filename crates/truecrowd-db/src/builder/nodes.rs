//! Locating document sections and reading typed attributes.

use truecrowd_xml::XmlNode;

use crate::{Error, Result};

/// Root tag written on export.
pub const ROOT_TAG: &str = "TrueCrowdDataBase";
/// Alternative root tag accepted on import.
pub const LEGACY_ROOT_TAG: &str = "Database";

/// The top-level sections of a database document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sections<'a> {
    pub definition: &'a XmlNode,
    pub tags: Option<&'a XmlNode>,
    pub component_entries: &'a XmlNode,
}

impl<'a> Sections<'a> {
    pub fn locate(root: &'a XmlNode) -> Result<Self> {
        if root.tag != ROOT_TAG && root.tag != LEGACY_ROOT_TAG {
            return Err(Error::UnexpectedRoot {
                expected: ROOT_TAG,
                actual: root.tag.clone(),
            });
        }

        let definition = root.first_child("Definition").ok_or(Error::MissingTag {
            tag: "Definition",
            parent: ROOT_TAG,
        })?;
        let component_entries = root.first_child("ComponentEntries").ok_or(Error::MissingTag {
            tag: "ComponentEntries",
            parent: ROOT_TAG,
        })?;

        Ok(Self {
            definition,
            tags: definition.first_child("Tags"),
            component_entries,
        })
    }
}

/// An element together with the names used in error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Element<'a> {
    pub node: &'a XmlNode,
    tag: &'static str,
    owner: Option<&'a str>,
}

impl<'a> Element<'a> {
    pub fn new(node: &'a XmlNode, tag: &'static str, owner: Option<&'a str>) -> Self {
        Self { node, tag, owner }
    }

    /// Children named `tag`, owned by `owner`.
    pub fn children(
        &self,
        tag: &'static str,
        owner: Option<&'a str>,
    ) -> impl Iterator<Item = Element<'a>> + 'a {
        self.node
            .children_named(tag)
            .map(move |node| Element::new(node, tag, owner))
    }

    /// First child named `tag`.
    pub fn first_child(&self, tag: &'static str, owner: Option<&'a str>) -> Option<Element<'a>> {
        self.node
            .first_child(tag)
            .map(|node| Element::new(node, tag, owner))
    }

    pub fn required(&self, attribute: &'static str) -> Result<&'a str> {
        self.node
            .attribute(attribute)
            .ok_or_else(|| Error::MissingAttribute {
                tag: self.tag,
                attribute,
                owner: self.owner.map(str::to_string),
            })
    }

    /// Trimmed, non-empty text body.
    pub fn text(&self) -> Result<&'a str> {
        let text = self.node.text.trim();
        if text.is_empty() {
            return Err(Error::MissingText {
                tag: self.tag,
                owner: self.owner.map(str::to_string),
            });
        }
        Ok(text)
    }

    pub fn u32_or(&self, attribute: &'static str, default: u32) -> Result<u32> {
        self.parse_or(attribute, default, parse_u32)
    }

    pub fn u8_or(&self, attribute: &'static str, default: u8) -> Result<u8> {
        self.parse_or(attribute, default, |v| parse_u32(v).and_then(|n| u8::try_from(n).ok()))
    }

    pub fn i32_or(&self, attribute: &'static str, default: i32) -> Result<i32> {
        self.parse_or(attribute, default, |v| v.parse().ok())
    }

    pub fn bool_or(&self, attribute: &'static str, default: bool) -> Result<bool> {
        self.parse_or(attribute, default, parse_bool)
    }

    /// Parse an optional attribute; `None` if absent.
    pub fn parse<T>(
        &self,
        attribute: &'static str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<T>> {
        let Some(raw) = self.node.attribute(attribute) else {
            return Ok(None);
        };
        parse(raw.trim())
            .map(Some)
            .ok_or_else(|| Error::InvalidAttribute {
                tag: self.tag,
                attribute,
                value: raw.to_string(),
                owner: self.owner.map(str::to_string),
            })
    }

    fn parse_or<T>(
        &self,
        attribute: &'static str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T> {
        Ok(self.parse(attribute, parse)?.unwrap_or(default))
    }
}

/// Decimal or `0x` hexadecimal.
pub(crate) fn parse_u32(value: &str) -> Option<u32> {
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// `true`/`false`/`1`/`0`, case-insensitive.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("42"), Some(42));
        assert_eq!(parse_u32("0x2A"), Some(42));
        assert_eq!(parse_u32("0XFFFFFFFF"), Some(u32::MAX));
        assert_eq!(parse_u32("-1"), None);
        assert_eq!(parse_u32("0x"), None);
        assert_eq!(parse_u32("twelve"), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("False"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_element_errors_name_owner() {
        let node = XmlNode::new("ModelPart").attr("morphType", "x");
        let element = Element::new(&node, "ModelPart", Some("Ped_A"));

        match element.required("name") {
            Err(Error::MissingAttribute {
                tag: "ModelPart",
                attribute: "name",
                owner: Some(owner),
            }) => assert_eq!(owner, "Ped_A"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            element.u32_or("morphType", 0),
            Err(Error::InvalidAttribute { attribute: "morphType", .. })
        ));
        assert!(element.bool_or("isSkinned", true).unwrap());
    }

    #[test]
    fn test_locate_sections() {
        let root = XmlNode::new("Database")
            .child(XmlNode::new("Definition"))
            .child(XmlNode::new("ComponentEntries"));
        let sections = Sections::locate(&root).unwrap();
        assert!(sections.tags.is_none());

        let root = XmlNode::new(ROOT_TAG).child(XmlNode::new("Definition"));
        assert!(matches!(
            Sections::locate(&root),
            Err(Error::MissingTag { tag: "ComponentEntries", .. })
        ));

        let root = XmlNode::new("Other");
        assert!(matches!(Sections::locate(&root), Err(Error::UnexpectedRoot { .. })));
    }
}
