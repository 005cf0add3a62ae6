//! XML documents and writing them as text.

use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::{Error, Result, XmlNode};

/// A parsed or generated XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// The root element.
    pub root: XmlNode,
    /// Comments written after the root element.
    pub trailing_comments: Vec<String>,
}

impl XmlDocument {
    /// Create a document with the given root and no comments.
    pub fn new(root: XmlNode) -> Self {
        Self {
            root,
            trailing_comments: Vec::new(),
        }
    }

    /// Parse XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        crate::reader::parse_document(xml)
    }

    /// Parse XML bytes.
    pub fn parse_bytes(xml: &[u8]) -> Result<Self> {
        let xml = std::str::from_utf8(xml).map_err(Error::Utf8)?;
        Self::parse(xml)
    }

    /// Read and parse an XML file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse_bytes(&data)
    }

    /// Convert to an XML string.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut output = Vec::new();
        self.write_xml(&mut output, 4)?;
        String::from_utf8(output).map_err(|e| Error::Xml(e.to_string()))
    }

    /// Write the document to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P, indent: usize) -> Result<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_xml(&mut file, indent)?;
        file.flush()?;
        Ok(())
    }

    /// Write XML to a writer, indenting nested elements by `indent` spaces.
    pub fn write_xml<W: Write>(&self, writer: W, indent: usize) -> Result<()> {
        let mut xml_writer = Writer::new_with_indent(writer, b' ', indent);

        xml_writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| Error::Xml(e.to_string()))?;

        write_element(&mut xml_writer, &self.root)?;

        for comment in &self.trailing_comments {
            xml_writer
                .write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))
                .map_err(|e| Error::Xml(e.to_string()))?;
        }

        xml_writer
            .get_mut()
            .write_all(b"\n")
            .map_err(Error::Io)?;

        Ok(())
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<()> {
    let mut elem = BytesStart::new(node.tag.as_str());
    for (key, value) in &node.attributes {
        elem.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() && node.text.is_empty() {
        writer
            .write_event(Event::Empty(elem))
            .map_err(|e| Error::Xml(e.to_string()))?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(elem))
        .map_err(|e| Error::Xml(e.to_string()))?;

    if !node.text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&node.text)))
            .map_err(|e| Error::Xml(e.to_string()))?;
    }

    for child in &node.children {
        write_element(writer, child)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(node.tag.as_str())))
        .map_err(|e| Error::Xml(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_shapes() {
        let doc = XmlDocument::new(
            XmlNode::new("Tags")
                .child(XmlNode::new("Tag").text("Civilian"))
                .child(XmlNode::new("Empty").attr("name", "a<b")),
        );
        let xml = doc.to_xml_string().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<Tag>Civilian</Tag>"));
        assert!(xml.contains("<Empty name=\"a&lt;b\"/>"));
    }

    #[test]
    fn test_round_trip_with_comments() {
        let mut doc = XmlDocument::new(
            XmlNode::new("Root")
                .attr("version", "2")
                .child(XmlNode::new("Setting").attr("key", "option1"))
                .child(XmlNode::new("Value").text("x & y")),
        );
        doc.trailing_comments = vec![" List ".into(), " 0xBEEF ".into()];

        let xml = doc.to_xml_string().unwrap();
        let reparsed = XmlDocument::parse(&xml).unwrap();
        assert_eq!(reparsed, doc);
    }
}
