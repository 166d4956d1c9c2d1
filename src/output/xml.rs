use crate::tree::{Document, Element};
use eyre::{Result, WrapErr};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

/// Indentation width of pretty-printed documents
const INDENT: usize = 2;

/// Serialize a document to XML text, with an XML declaration
pub fn render_xml(doc: &Document, pretty: bool) -> Result<String> {
    let mut buffer = Vec::new();
    write_document(doc, pretty, &mut buffer)?;
    String::from_utf8(buffer).wrap_err("XML output is not valid UTF-8")
}

/// Stream a document as XML into any writer
pub fn write_document<W: Write>(doc: &Document, pretty: bool, writer: W) -> Result<()> {
    let mut xml = if pretty {
        Writer::new_with_indent(writer, b' ', INDENT)
    } else {
        Writer::new(writer)
    };

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(&mut xml, &doc.root)?;

    let mut writer = xml.into_inner();
    if pretty {
        writeln!(writer)?;
    }
    Ok(())
}

fn write_element<W: Write>(xml: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.is_empty() {
        xml.write_event(Event::Empty(start))?;
        return Ok(());
    }

    xml.write_event(Event::Start(start))?;
    if let Some(text) = element.text.as_deref().filter(|t| !t.is_empty()) {
        xml.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(xml, child)?;
    }
    xml.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
