use std::io::{BufRead, Write};

use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Generic attributed element tree. Attribute order and child order are
/// preserved; text content is not report data and is not retained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new<T: Into<String>>(tag: T) -> Self {
        Element {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parse one XML document into its root element. Any malformed input is an
/// error; callers treat that as a skippable file.
pub fn parse_document<R: BufRead>(xml: R) -> anyhow::Result<Element> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                stack.push(element_from_start(&e)?);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| anyhow::anyhow!("end tag without start tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Empty(e) => {
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            // Text, CData, comments, decls and processing instructions carry
            // no attributes and are not merged.
            _ => (),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(anyhow::anyhow!("start tag without end tag"));
    }
    root.ok_or_else(|| anyhow::anyhow!("document has no root element"))
}

fn element_from_start(e: &BytesStart) -> anyhow::Result<Element> {
    let tag = String::from_utf8(e.name().as_ref().to_vec())?;
    let mut element = Element::new(tag);
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8(attr.key.as_ref().to_vec())?;
        let value = attr.unescape_value()?.into_owned();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> anyhow::Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(anyhow::anyhow!("document has multiple root elements"));
    }
    Ok(())
}

/// Write a pretty-printed UTF-8 document with an XML declaration.
pub fn write_document<W: Write>(root: &Element, out: W) -> anyhow::Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    let mut out = writer.into_inner();
    out.write_all(b"\n")?;
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> anyhow::Result<()> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            write_element(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    }
    Ok(())
}
