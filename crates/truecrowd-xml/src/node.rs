//! XML element tree.

/// One XML element: tag, text content, ordered attributes and ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Tag name of the element.
    pub tag: String,
    /// Text content (empty for elements that only hold attributes or children).
    pub text: String,
    /// Attributes as key-value pairs, in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements, in document order.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create a new node with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the text content of this node.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add an attribute to this node.
    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    /// Add a child node.
    pub fn child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add multiple children.
    pub fn children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a child in place.
    pub fn push(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// Value of the first attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child with the given tag.
    pub fn first_child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All children with the given tag, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Number of children with the given tag.
    pub fn count_children(&self, tag: &str) -> usize {
        self.children_named(tag).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_queries() {
        let node = XmlNode::new("Resource")
            .attr("name", "Ped_A")
            .attr("type", 0)
            .child(XmlNode::new("LOD"))
            .child(XmlNode::new("Tag").text("Civilian"))
            .child(XmlNode::new("LOD"));

        assert_eq!(node.attribute("name"), Some("Ped_A"));
        assert_eq!(node.attribute("type"), Some("0"));
        assert_eq!(node.attribute("missing"), None);
        assert_eq!(node.count_children("LOD"), 2);
        assert_eq!(node.first_child("Tag").map(|t| t.text.as_str()), Some("Civilian"));
        assert!(node.first_child("TextureSet").is_none());
    }
}
