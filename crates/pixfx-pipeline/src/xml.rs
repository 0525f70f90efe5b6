//! Minimal element tree read with quick-xml.
//!
//! Pipelines are small, so the whole document is loaded into [`Element`]s
//! before it is interpreted. Only elements, attributes and text are kept;
//! comments, processing instructions and the declaration are dropped.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::{PipelineError, PipelineResult};

/// One XML element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Tag name.
    pub name: String,
    /// Attributes in document order.
    pub attrs: Vec<(String, String)>,
    /// Concatenated, trimmed text content.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    fn from_start(e: &BytesStart<'_>) -> Self {
        let attrs = e
            .attributes()
            .flatten()
            .map(|attr| {
                (
                    String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                    String::from_utf8_lossy(&attr.value).to_string(),
                )
            })
            .collect();
        Self {
            name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
            attrs,
            ..Default::default()
        }
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Children with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Reads a document and returns its root element.
pub fn parse<R: BufRead>(reader: R) -> PipelineResult<Element> {
    // Text is trimmed per element once the tree is built.
    let mut xml = Reader::from_reader(reader);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    let mut attach = |el: Element, stack: &mut Vec<Element>| -> PipelineResult<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(el),
            None if root.is_none() => root = Some(el),
            None => return Err(PipelineError::Xml("multiple root elements".into())),
        }
        Ok(())
    };

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(Element::from_start(e)),
            Ok(Event::Empty(ref e)) => attach(Element::from_start(e), &mut stack)?,
            Ok(Event::End(_)) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| PipelineError::Xml("unexpected closing tag".into()))?;
                attach(el, &mut stack)?;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&e.decode().unwrap_or_default());
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if let Some(top) = stack.last_mut() {
                    match e.resolve_char_ref() {
                        Ok(Some(ch)) => top.text.push(ch),
                        _ => {
                            let name = e.decode().unwrap_or_default();
                            let value = quick_xml::escape::resolve_predefined_entity(&name)
                                .ok_or_else(|| PipelineError::Xml(format!("unknown entity '&{};'", name)))?;
                            top.text.push_str(value);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PipelineError::Xml(format!(
                    "at byte {}: {}",
                    xml.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(PipelineError::Xml(format!("unclosed element <{}>", open.name)));
    }
    let mut root = root.ok_or_else(|| PipelineError::Xml("empty document".into()))?;
    trim_text(&mut root);
    Ok(root)
}

fn trim_text(el: &mut Element) {
    let trimmed = el.text.trim();
    if trimmed.len() != el.text.len() {
        el.text = trimmed.to_string();
    }
    el.children.iter_mut().for_each(trim_text);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(s: &str) -> PipelineResult<Element> {
        parse(s.as_bytes())
    }

    #[test]
    fn test_tree() {
        let root = doc(r#"<?xml version="1.0"?>
            <A x="1"><!-- note --><B>hi</B><C/><B y="2">there</B></A>"#)
        .unwrap();
        assert_eq!(root.name, "A");
        assert_eq!(root.attr("x"), Some("1"));
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children_named("B").count(), 2);
        assert_eq!(root.child("B").unwrap().text, "hi");
        assert_eq!(root.children[2].attr("y"), Some("2"));
    }

    #[test]
    fn test_entities() {
        let root = doc("<A>a &amp; b &#65;</A>").unwrap();
        assert_eq!(root.text, "a & b A");
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(doc("<A><B></A>"), Err(PipelineError::Xml(_))));
        assert!(matches!(doc("<A>"), Err(PipelineError::Xml(_))));
        assert!(matches!(doc(""), Err(PipelineError::Xml(_))));
    }
}
