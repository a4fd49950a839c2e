//! Text extraction for uploaded documents (PDF, DOCX, plain text)
//!
//! Dispatches on the stored file's extension; the supported set is closed
//! and anything else is rejected before the file is opened. Extraction
//! returns plain UTF-8 text or a typed failure carrying the filename.

use std::io::Read;
use std::path::Path;

use crate::domain::DomainError;

/// Maximum decompressed bytes read from a single ZIP entry
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extract plain text from a stored file.
///
/// The declared extension decides the parser; an unsupported extension
/// fails with [`DomainError::UnsupportedType`] without touching the file.
/// Parser and IO failures are wrapped into [`DomainError::Extraction`]
/// with the filename.
pub fn extract_text(path: &Path) -> Result<String, DomainError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => extract_plain_text(path),
        "pdf" => extract_pdf(path),
        "docx" => extract_docx(path),
        _ => Err(DomainError::unsupported_type(format!(".{}", extension))),
    }
}

fn extraction_error(path: &Path, err: impl std::fmt::Display) -> DomainError {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unnamed>");
    DomainError::extraction(format!("Error processing file {}: {}", name, err))
}

fn extract_plain_text(path: &Path) -> Result<String, DomainError> {
    // read_to_string enforces UTF-8; a decode failure is an extraction
    // error, not a panic.
    std::fs::read_to_string(path).map_err(|e| extraction_error(path, e))
}

fn extract_pdf(path: &Path) -> Result<String, DomainError> {
    let bytes = std::fs::read(path).map_err(|e| extraction_error(path, e))?;
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| extraction_error(path, e))
}

fn extract_docx(path: &Path) -> Result<String, DomainError> {
    let bytes = std::fs::read(path).map_err(|e| extraction_error(path, e))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.as_slice()))
        .map_err(|e| extraction_error(path, e))?;

    let mut doc_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|e| extraction_error(path, e))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| extraction_error(path, e))?;
        if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(extraction_error(path, "word/document.xml exceeds size limit"));
        }
    }

    extract_paragraphs(&doc_xml).map_err(|e| extraction_error(path, e))
}

/// Walk `word/document.xml`, collecting the text of each `w:p` paragraph.
/// Empty paragraphs are skipped; the rest are joined with newlines.
fn extract_paragraphs(xml: &[u8]) -> Result<String, String> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                current.push_str(t.unescape().map_err(|e| e.to_string())?.as_ref());
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if !current.is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unsupported_extension_rejected_before_read() {
        // The path does not exist; the extension check must fire first.
        let err = extract_text(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedType { .. }));

        let err = extract_text(Path::new("/nonexistent/noextension")).unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedType { .. }));
    }

    #[test]
    fn test_plain_text_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "line one\nline two").unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "line one\nline two");
    }

    #[test]
    fn test_plain_text_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, DomainError::Extraction { .. }));
        assert!(err.to_string().contains("bad.txt"));
    }

    #[test]
    fn test_invalid_pdf_returns_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, DomainError::Extraction { .. }));
    }

    #[test]
    fn test_invalid_docx_returns_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, DomainError::Extraction { .. }));
    }

    #[test]
    fn test_docx_paragraph_extraction() {
        let document_xml = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
    <w:p></w:p>
    <w:p><w:r><w:t>Second par</w:t></w:r><w:r><w:t>agraph.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_docx_without_document_xml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/other.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        writer.finish().unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, DomainError::Extraction { .. }));
    }
}
