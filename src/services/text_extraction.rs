use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use quick_xml::{events::Event, Reader};
use regex::Regex;
use zip::ZipArchive;

use crate::errors::{AppError, AppResult};

/// Upper bound on a single decompressed XML part inside an office archive.
const MAX_XML_PART_BYTES: u64 = 64 * 1024 * 1024;

static SLIDE_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("SLIDE_PART is a valid regex pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    Pptx,
    Pdf,
    PlainText,
}

impl DocumentFormat {
    /// Picks the extractor from the extension of the last path segment.
    pub fn from_document_id(document_id: &str) -> AppResult<Self> {
        let file_name = document_id.rsplit('/').next().unwrap_or(document_id);
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| {
                AppError::UnsupportedDocument(format!("'{}' has no file extension", document_id))
            })?;

        match extension.as_str() {
            "docx" => Ok(DocumentFormat::Docx),
            "pptx" => Ok(DocumentFormat::Pptx),
            "pdf" => Ok(DocumentFormat::Pdf),
            "txt" | "md" => Ok(DocumentFormat::PlainText),
            other => Err(AppError::UnsupportedDocument(format!(
                "'.{}' documents are not supported (expected docx, pptx, pdf, txt or md)",
                other
            ))),
        }
    }
}

pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> AppResult<String> {
    match format {
        DocumentFormat::Docx => extract_docx(bytes),
        DocumentFormat::Pptx => extract_pptx(bytes),
        DocumentFormat::Pdf => extract_pdf(bytes),
        DocumentFormat::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// One line per body paragraph of the main document part. Text boxes are
/// skipped, along with the fallback copy Word stores next to them.
pub fn extract_docx(bytes: &[u8]) -> AppResult<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let xml = read_part(&mut archive, "word/document.xml")?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"txbxContent" | b"Fallback" => {
                    reader.read_to_end(e.name())?;
                }
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"r" => in_run = true,
                b"t" => in_text = in_run,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => current.push_str(&t.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => in_run = false,
                b"p" if in_paragraph => {
                    in_paragraph = false;
                    paragraphs.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Every text run of every slide, slides in numeric order, one run per line.
pub fn extract_pptx(bytes: &[u8]) -> AppResult<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = SLIDE_PART.captures(name)?.get(1)?.as_str().parse().ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);

    if slides.is_empty() {
        return Err(AppError::UnsupportedDocument(
            "presentation contains no slides".to_string(),
        ));
    }

    let mut runs = Vec::new();
    for (_, name) in slides {
        let xml = read_part(&mut archive, &name)?;
        collect_drawing_runs(&xml, &mut runs)?;
    }

    Ok(runs.join("\n"))
}

fn collect_drawing_runs(xml: &str, runs: &mut Vec<String>) -> AppResult<()> {
    let mut reader = Reader::from_str(xml);
    let mut in_run = false;
    let mut in_text = false;
    let mut current = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => {
                    in_run = true;
                    current.clear();
                }
                b"t" => in_text = in_run,
                _ => {}
            },
            Event::Text(t) if in_text => current.push_str(&t.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" if in_run => {
                    in_run = false;
                    runs.push(std::mem::take(&mut current));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

pub fn extract_pdf(bytes: &[u8]) -> AppResult<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::UnsupportedDocument(format!("unreadable PDF: {}", e)))?;

    let cleaned = normalize_whitespace(&text);
    if cleaned.is_empty() {
        log::warn!("Extracted PDF content is empty or contains only whitespace");
    }
    Ok(cleaned)
}

/// Collapses runs of spaces inside lines and runs of blank lines into a
/// single paragraph break.
pub fn normalize_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut pending_break = false;

    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            pending_break = true;
            continue;
        }
        if !normalized.is_empty() {
            normalized.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        pending_break = false;
        normalized.push_str(&line);
    }

    normalized
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> AppResult<String> {
    let mut part = archive.by_name(name)?;
    if part.size() > MAX_XML_PART_BYTES {
        return Err(AppError::UnsupportedDocument(format!(
            "'{}' is too large to extract ({} bytes)",
            name,
            part.size()
        )));
    }

    let mut xml = String::with_capacity(part.size() as usize);
    part.read_to_string(&mut xml)
        .map_err(|e| AppError::UnsupportedDocument(format!("failed to read '{}': {}", name, e)))?;
    Ok(xml)
}
