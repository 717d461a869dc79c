//! Minimal element tree over the xml-rs pull parser
//!
//! Registry documents are small (a few megabytes at most), so a plain DOM
//! is the right trade: the loader walks the same element repeatedly while
//! resolving requirements, which a streaming parser cannot do.

use crate::error::Result;
use std::io::Read;
use xml::reader::{EventReader, XmlEvent};

/// One XML element with its attributes, child elements, and direct text
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    /// Parse a document and return its root element
    pub fn parse<R: Read>(reader: R) -> Result<Element> {
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        for event in EventReader::new(reader) {
            match event? {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => {
                    stack.push(Element {
                        name: name.local_name,
                        attributes: attributes
                            .into_iter()
                            .map(|a| (a.name.local_name, a.value))
                            .collect(),
                        children: Vec::new(),
                        text: String::new(),
                    });
                }
                XmlEvent::EndElement { .. } => {
                    let done = stack.pop().expect("parser balances start/end events");
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(done),
                        None => root = Some(done),
                    }
                }
                XmlEvent::Characters(text) | XmlEvent::CData(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text);
                    }
                }
                _ => {}
            }
        }

        Ok(root.unwrap_or_default())
    }

    /// Look up an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given element name
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given element name
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed direct text content
    pub fn text_trimmed(&self) -> &str {
        self.text.trim()
    }
}
