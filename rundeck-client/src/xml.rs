//! Minimal XML document tree
//!
//! Rundeck responses are small, so they are read fully into an owned tree
//! and then walked with explicit lookups.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ClientError, Result};

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ClientError::InvalidXml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Value of an attribute
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements, in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Follows a path of child names, e.g. `["context", "project"]`
    pub fn path(&self, names: &[&str]) -> Option<&Element> {
        names
            .iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// First element with the given name, this one included, depth first
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.elements().find_map(|element| element.find(name))
    }

    /// Direct text content, unmodified
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Text of a child element, `None` when absent or empty
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(Element::text)
            .filter(|text| !text.is_empty())
    }
}

/// Parses a document and returns its root element
///
/// Whitespace-only text between elements is dropped; all other text is kept
/// as written, trailing spaces included.
pub fn parse_document(payload: &str) -> Result<Element> {
    let mut reader = Reader::from_str(payload);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ClientError::InvalidXml("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if let Some(parent) = stack.last_mut() {
                    if !text.trim().is_empty() {
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ClientError::InvalidXml(format!(
            "unclosed element <{}>",
            stack[stack.len() - 1].name
        )));
    }

    root.ok_or_else(|| ClientError::InvalidXml("document has no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(ClientError::InvalidXml(
                "document has more than one root element".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_walk() {
        let root = parse_document(
            r#"<?xml version="1.0"?>
            <joblist>
              <job>
                <id>1</id>
                <context><project>demo</project></context>
                <flag enabled='true'/>
              </job>
            </joblist>"#,
        )
        .unwrap();

        assert_eq!(root.name, "joblist");
        let job = root.child("job").unwrap();
        assert_eq!(job.child_text("id").as_deref(), Some("1"));
        assert_eq!(job.path(&["context", "project"]).unwrap().text(), "demo");
        assert_eq!(job.child("flag").unwrap().attr("enabled"), Some("true"));
        assert_eq!(root.find("project").unwrap().text(), "demo");
        assert!(job.child("missing").is_none());
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        let root =
            parse_document("<error><message>Option 'dir' is required. </message></error>").unwrap();
        assert_eq!(root.child("message").unwrap().text(), "Option 'dir' is required. ");
    }

    #[test]
    fn test_entities_and_cdata() {
        let root = parse_document("<d>a &amp; b<![CDATA[ <raw> ]]></d>").unwrap();
        assert_eq!(root.text(), "a & b <raw> ");
    }

    #[test]
    fn test_empty_element_has_no_text() {
        let root = parse_document("<job><description></description></job>").unwrap();
        assert_eq!(root.child_text("description"), None);
    }

    #[test]
    fn test_rejects_non_xml() {
        let err = parse_document("<html><body>oops</html>").unwrap_err();
        assert!(err.is_transport());

        let err = parse_document("not xml at all").unwrap_err();
        assert!(err.is_transport());
    }
}
