//! XML document model for TrueCrowd conversions.
//!
//! Databases are edited as plain XML. This crate holds the small tree model the
//! builder walks ([`XmlNode`]) and converts it from and to text with quick-xml.
//!
//! # Example
//!
//! ```
//! use truecrowd_xml::{XmlDocument, XmlNode};
//!
//! let doc = XmlDocument::parse(r#"<Tags><Tag>Civilian</Tag></Tags>"#).unwrap();
//! let tag = doc.root.first_child("Tag").unwrap();
//! assert_eq!(tag.text, "Civilian");
//!
//! let out = XmlDocument::new(XmlNode::new("Tags").child(XmlNode::new("Tag").text("Gang")));
//! assert!(out.to_xml_string().unwrap().contains("<Tag>Gang</Tag>"));
//! ```

mod error;
mod node;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use node::XmlNode;
pub use writer::XmlDocument;
