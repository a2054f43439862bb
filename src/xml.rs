use std::{io, str};

use color_eyre::{
    Result,
    eyre::{bail, eyre},
};
use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

/// Indentation unit of serialized documents
pub const INDENT: &str = "    ";

/// A single node of an element tree.
///
/// Content is modeled the ElementTree way: `text` is the content before the first child and each node carries the
/// `tail` content that follows its own closing tag, up to the next sibling. This keeps mixed content (like a
/// paragraph with inline emphasis) attached to the right position when nodes are moved or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub tail: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Retrieves the value of an attribute, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets the value of an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(attr, _)| *attr == name) {
            Some((_, previous)) => *previous = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Returns the whole textual content of this node: its own text, the flattened content of every descendant and
    /// its trailing tail
    pub fn flattened_text(&self) -> String {
        let mut content = String::new();
        self.collect_text(&mut content);
        content
    }

    fn collect_text(&self, content: &mut String) {
        content.push_str(&self.text);
        for child in &self.children {
            child.collect_text(content);
        }
        content.push_str(&self.tail);
    }

    /// Parses a whole document, returning its root element
    pub fn parse_document(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let Some(element) = stack.pop() else {
                        bail!("unexpected closing tag");
                    };
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    // References are reported separately, so the raw content is already unescaped
                    append_content(&mut stack, str::from_utf8(&text)?);
                }
                Event::GeneralRef(reference) => {
                    let value = if let Some(ch) = reference.resolve_char_ref()? {
                        ch.to_string()
                    } else {
                        let reference: &[u8] = reference.as_ref();
                        match reference {
                            b"amp" => String::from("&"),
                            b"lt" => String::from("<"),
                            b"gt" => String::from(">"),
                            b"apos" => String::from("'"),
                            b"quot" => String::from("\""),
                            other => bail!("unsupported entity reference: &{};", String::from_utf8_lossy(other)),
                        }
                    };
                    append_content(&mut stack, &value);
                }
                Event::CData(data) => append_content(&mut stack, str::from_utf8(&data)?),
                Event::Decl(_) | Event::DocType(_) | Event::PI(_) | Event::Comment(_) => (),
                Event::Eof => break,
            }
        }
        root.ok_or_else(|| eyre!("the document contains no root element"))
    }

    /// Serializes this element as a whole document: declaration, content and a trailing newline
    pub fn to_document_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(Event::Text(BytesText::new("\n")))?;
        self.write_into(&mut writer)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }

    /// Serializes this element alone, without any document envelope
    pub fn to_fragment_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_into<W: io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (name, value) in &self.attrs {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        if self.text.is_empty() && self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        if !self.text.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&self.text)))?;
        }
        for child in &self.children {
            child.write_into(writer)?;
            if !child.tail.is_empty() {
                writer.write_event(Event::Text(BytesText::new(&child.tail)))?;
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.tag.as_str())))?;
        Ok(())
    }

    /// Indents the tree in place for pretty serialization.
    ///
    /// Only whitespace-only text and tails are rewritten, so elements holding actual content keep their children
    /// inline.
    pub fn indent(&mut self, space: &str) {
        self.indent_at(space, 0);
    }

    fn indent_at(&mut self, space: &str, level: usize) {
        if self.children.is_empty() {
            return;
        }
        let child_prefix = format!("\n{}", space.repeat(level + 1));
        if self.text.trim().is_empty() {
            self.text = child_prefix.clone();
        }
        let last = self.children.len() - 1;
        for (idx, child) in self.children.iter_mut().enumerate() {
            child.indent_at(space, level + 1);
            if child.tail.trim().is_empty() {
                child.tail = if idx == last {
                    format!("\n{}", space.repeat(level))
                } else {
                    child_prefix.clone()
                };
            }
        }
    }
}

fn element_from_start(start: &BytesStart) -> Result<Element> {
    let mut element = Element::new(str::from_utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr?;
        element.attrs.push((
            str::from_utf8(attr.key.as_ref())?.to_string(),
            attr.unescape_value()?.into_owned(),
        ));
    }
    Ok(element)
}

/// Attaches a completed element to its parent, or sets it as the document root
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => bail!("unexpected content after the document root"),
    }
    Ok(())
}

/// Appends textual content at the current position: either as the text of the last open element or as the tail of
/// its last child
fn append_content(stack: &mut [Element], content: &str) {
    if let Some(open) = stack.last_mut() {
        match open.children.last_mut() {
            Some(child) => child.tail.push_str(content),
            None => open.text.push_str(content),
        }
    }
}
