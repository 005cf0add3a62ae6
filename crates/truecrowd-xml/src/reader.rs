//! Parse XML text into an [`XmlNode`] tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{Error, Result, XmlDocument, XmlNode};

/// Parse XML text into a document.
///
/// Declarations and processing instructions are skipped; comments that follow
/// the root element are kept as trailing comments.
pub(crate) fn parse_document(xml: &str) -> Result<XmlDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;
    let mut trailing_comments = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(start_node(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let node = start_node(&e)?;
                attach(&mut stack, &mut root, node);
            }
            Ok(Event::End(_)) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(node) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                    if !text.trim().is_empty() {
                        node.text.push_str(&text);
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(std::str::from_utf8(&e)?);
                }
            }
            Ok(Event::Comment(e)) => {
                if stack.is_empty() && root.is_some() {
                    trailing_comments.push(String::from_utf8_lossy(&e).into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Xml(format!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if !stack.is_empty() {
        return Err(Error::Xml(format!(
            "unclosed element <{}>",
            stack.last().map(|n| n.tag.as_str()).unwrap_or_default()
        )));
    }

    let root = root.ok_or(Error::NoRoot)?;
    Ok(XmlDocument {
        root,
        trailing_comments,
    })
}

fn start_node(e: &BytesStart<'_>) -> Result<XmlNode> {
    let tag = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut node = XmlNode::new(tag);

    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();
        node.attributes.push((key, value));
    }

    Ok(node)
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<A>
    <B attr="1">
        <C/>
        <D attr="2">text &amp; more</D>
    </B>
    <E/>
</A>"#;

        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.root.tag, "A");
        assert_eq!(doc.root.children.len(), 2);

        let b = &doc.root.children[0];
        assert_eq!(b.attribute("attr"), Some("1"));
        assert_eq!(b.children[1].text, "text & more");
        assert_eq!(doc.root.children[1].tag, "E");
    }

    #[test]
    fn test_trailing_comments() {
        let xml = "<Root/><!-- first --><!-- 0x1F -->";
        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.trailing_comments, vec![" first ", " 0x1F "]);
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(parse_document(""), Err(Error::NoRoot)));
    }

    #[test]
    fn test_unclosed_element() {
        assert!(parse_document("<Root><Child>").is_err());
    }
}
