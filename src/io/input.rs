use std::fmt;
use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info};

use crate::error::{GraderError, GraderResult};

/// Body part of a DOCX package holding the document text
const DOCX_BODY: &str = "word/document.xml";

/// Supported assignment document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Determine the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> GraderResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "" => Err(GraderError::UnsupportedFormat(format!(
                "{} has no extension",
                path.display()
            ))),
            other => Err(GraderError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "PDF"),
            Self::Docx => write!(f, "DOCX"),
        }
    }
}

/// Extract text from an assignment file.
///
/// The format is checked before the file is read, so an unsupported file is
/// rejected without touching its contents.
pub fn extract_text(path: &Path) -> GraderResult<String> {
    let kind = DocumentKind::from_path(path)?;
    let bytes = std::fs::read(path)?;
    info!("Extracting text from {} ({}, {} bytes)", path.display(), kind, bytes.len());

    let text = extract_bytes(kind, &bytes)?;
    debug!("Extracted {} chars", text.len());
    Ok(text)
}

/// Extract text from in-memory document bytes of a known format
pub fn extract_bytes(kind: DocumentKind, bytes: &[u8]) -> GraderResult<String> {
    match kind {
        DocumentKind::Pdf => extract_pdf_text(bytes),
        DocumentKind::Docx => extract_docx_text(bytes),
    }
}

/// Extract text from PDF bytes.
///
/// pdf-extract panics on some malformed documents; a panic is reported as an
/// extraction error.
pub fn extract_pdf_text(bytes: &[u8]) -> GraderResult<String> {
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| GraderError::Extraction("PDF: parser panicked on malformed input".to_string()))?
        .map_err(|e| GraderError::Extraction(format!("PDF: {}", e)))
}

/// Extract paragraph text from a DOCX package.
///
/// Paragraphs are separated by newlines. Inside a run, `<w:tab/>` becomes a
/// tab and `<w:br/>` a newline; tab-stop definitions in paragraph properties
/// are ignored.
pub fn extract_docx_text(bytes: &[u8]) -> GraderResult<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| GraderError::Extraction(format!("DOCX is not a valid package: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| GraderError::Extraction(format!("DOCX is missing {}: {}", DOCX_BODY, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| GraderError::Extraction(format!("DOCX body is unreadable: {}", e)))?;

    docx_body_text(&xml)
}

fn docx_body_text(xml: &str) -> GraderResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| GraderError::Extraction(format!("DOCX XML: {}", e)))?;

        match event {
            Event::Start(e) if e.name().as_ref() == b"w:r" => in_run = true,
            Event::End(e) if e.name().as_ref() == b"w:r" => in_run = false,
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::End(e) if e.name().as_ref() == b"w:p" => {
                paragraphs.push(std::mem::take(&mut current));
            }
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_run => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| GraderError::Extraction(format!("DOCX XML: {}", e)))?;
                current.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    fn docx_bytes(xml: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<Types/>").unwrap();
        zip.start_file(DOCX_BODY, options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_document_kind_from_path() {
        assert_eq!(DocumentKind::from_path(Path::new("essay.pdf")).unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("Essay.DOCX")).unwrap(), DocumentKind::Docx);
        assert!(matches!(
            DocumentKind::from_path(Path::new("essay.txt")),
            Err(GraderError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            DocumentKind::from_path(Path::new("essay")),
            Err(GraderError::UnsupportedFormat(_))
        ));
        assert!(DocumentKind::from_path(Path::new("essay.doc")).is_err());
    }

    #[test]
    fn test_unsupported_file_not_read() {
        let err = extract_text(Path::new("/nonexistent/essay.odt")).unwrap_err();
        assert!(matches!(err, GraderError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_docx_paragraphs() {
        let xml = document_xml(
            r#"<w:p><w:r><w:t>The mitochondria</w:t></w:r><w:r><w:t xml:space="preserve"> is the powerhouse</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>of the cell &amp; more.</w:t><w:tab/><w:t>End</w:t></w:r></w:p>"#,
        );

        let text = extract_docx_text(&docx_bytes(&xml)).unwrap();

        assert_eq!(
            text,
            "The mitochondria is the powerhouse\n\nof the cell & more.\tEnd"
        );
    }

    #[test]
    fn test_docx_line_break() {
        let xml = document_xml(r#"<w:p><w:r><w:t>Line one</w:t><w:br/><w:t>Line two</w:t></w:r></w:p>"#);
        let text = extract_docx_text(&docx_bytes(&xml)).unwrap();
        assert_eq!(text, "Line one\nLine two");
    }

    #[test]
    fn test_docx_tab_stops_ignored() {
        let xml = document_xml(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/><w:tab w:val="right" w:pos="9000"/></w:tabs></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>"#,
        );
        let text = extract_docx_text(&docx_bytes(&xml)).unwrap();
        assert_eq!(text, "Intro");
    }

    #[test]
    fn test_docx_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("essay.docx");
        let xml = document_xml(r#"<w:p><w:r><w:t>Photosynthesis converts light.</w:t></w:r></w:p>"#);
        std::fs::write(&path, docx_bytes(&xml)).unwrap();

        assert_eq!(extract_text(&path).unwrap(), "Photosynthesis converts light.");
    }

    #[test]
    fn test_corrupt_docx() {
        let err = extract_docx_text(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, GraderError::Extraction(_)));
    }

    #[test]
    fn test_docx_without_body() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("other.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<x/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = extract_docx_text(&bytes).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    /// Single-page PDF using the built-in Helvetica font
    fn pdf_bytes(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", text);
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>".to_string(),
            format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        ));
        pdf.extend_from_slice(xref.as_bytes());
        pdf
    }

    #[test]
    fn test_pdf_text() {
        let text = extract_pdf_text(&pdf_bytes("Photosynthesis")).unwrap();
        assert!(text.contains("Photosynthesis"), "got {:?}", text);
    }

    #[test]
    fn test_pdf_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Essay.PDF");
        std::fs::write(&path, pdf_bytes("Mitochondria")).unwrap();

        assert!(extract_text(&path).unwrap().contains("Mitochondria"));
    }

    #[test]
    fn test_corrupt_pdf() {
        let err = extract_pdf_text(b"%PDF-garbage").unwrap_err();
        assert!(matches!(err, GraderError::Extraction(_)));
    }
}
