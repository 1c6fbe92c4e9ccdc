//! Minimal XML element tree for award files.
//!
//! Award files are small, so the whole document is read into a tree and
//! queried with slash-separated child paths (`Institution/Name`).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// An element with its concatenated text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Local element name.
    pub name: String,

    /// Direct text content, trimmed.
    pub text: String,

    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    /// First child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a slash-separated path of first-matching children.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Self> {
        path.split('/').filter(|p| !p.is_empty()).try_fold(self, |el, name| el.child(name))
    }

    /// Text at a path, if the element exists.
    #[must_use]
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).map(|el| el.text.as_str())
    }

    /// Text at a path, or `""`.
    #[must_use]
    pub fn text_or_empty(&self, path: &str) -> String {
        self.find_text(path).unwrap_or_default().to_string()
    }
}

/// Parse a document and return its root element.
///
/// Text is decoded using the encoding named in the XML declaration, UTF-8
/// when there is none. Mismatched or unclosed tags and documents without a
/// root element are errors.
pub fn parse(xml: impl AsRef<[u8]>) -> Result<Element, String> {
    let mut reader = Reader::from_reader(xml.as_ref());
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("at position {}: {e}", reader.buffer_position()))?;

        match event {
            Event::Start(start) => stack.push(Element::from_start(&start)),
            Event::Empty(start) => attach(&mut stack, &mut root, Element::from_start(&start)),
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                push_text(&mut stack, &text);
            }
            Event::CData(data) => {
                let text = reader.decoder().decode(&data).map_err(|e| e.to_string())?;
                push_text(&mut stack, &text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.push_str(text);
    }
}
