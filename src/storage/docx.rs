//! Paragraph text extraction from Word documents.

use std::io::{Read, Seek};

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use zip::ZipArchive;

use super::loader::LoadError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the body paragraphs of a `.docx` archive, one paragraph per line.
///
/// Runs within a paragraph are concatenated as-is; tabs and line breaks
/// inside a paragraph are kept. Paragraphs nested inside tables or text boxes
/// are not part of the body and are skipped.
pub fn read_paragraphs<R: Read + Seek>(reader: R) -> Result<String, LoadError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| LoadError::MissingPart(DOCUMENT_PART))?
        .read_to_string(&mut xml)?;

    parse_document_xml(&xml)
}

fn parse_document_xml(xml: &str) -> Result<String, LoadError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    let mut nested = 0usize;
    let mut runs = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) => match element.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested += 1,
                b"w:p" if nested == 0 => current = Some(String::new()),
                b"w:r" => runs += 1,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(_) if nested > 0 => {}
            Event::Empty(element) => match current.as_mut() {
                // Run content only; `w:tab` also appears as a tab stop in `w:pPr`.
                Some(paragraph) if runs > 0 => match element.name().as_ref() {
                    b"w:tab" => paragraph.push('\t'),
                    b"w:br" if is_line_break(&element)? => paragraph.push('\n'),
                    b"w:cr" => paragraph.push('\n'),
                    _ => {}
                },
                Some(_) => {}
                None if element.name().as_ref() == b"w:p" => paragraphs.push(String::new()),
                None => {}
            },
            Event::Text(text) if in_text && nested == 0 => {
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&text.unescape().map_err(quick_xml::Error::from)?);
                }
            }
            Event::End(element) => match element.name().as_ref() {
                b"w:tbl" | b"w:txbxContent" => nested = nested.saturating_sub(1),
                b"w:p" if nested == 0 => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                b"w:r" => runs = runs.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Page and column breaks carry no text; only text-wrapping breaks (the
/// default) end a line.
fn is_line_break(element: &BytesStart<'_>) -> Result<bool, quick_xml::Error> {
    Ok(element
        .try_get_attribute("w:type")?
        .is_none_or(|kind| kind.value.as_ref() == b"textWrapping"))
}
