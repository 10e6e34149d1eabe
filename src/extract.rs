//! Text extraction for uploaded documents.
//!
//! Only two declared types are accepted: `text/plain` and `application/pdf`.
//! Uses pdf-extract for reading PDF pages from memory.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use thiserror::Error;

pub const MIME_TEXT: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";
const MIME_UNKNOWN: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported file type: {0}. Please upload a .txt or .pdf file")]
    UnsupportedType(String),
    #[error("text file is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("error reading PDF file: {0}")]
    PdfRead(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The document kinds the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    PlainText,
    Pdf,
}

impl SourceKind {
    /// Resolve a declared MIME type, ignoring case and parameters like `charset`
    pub fn from_mime(mime: &str) -> Result<Self, ExtractError> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(MIME_TEXT) {
            Ok(SourceKind::PlainText)
        } else if essence.eq_ignore_ascii_case(MIME_PDF) {
            Ok(SourceKind::Pdf)
        } else {
            Err(ExtractError::UnsupportedType(mime.to_string()))
        }
    }
}

/// An uploaded file: its name, the MIME type it declares, and its raw bytes.
#[derive(Clone)]
pub struct Upload {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its MIME type from the extension
    /// unless `mime` is given.
    pub fn from_path(path: &Path, mime: Option<&str>) -> Result<Self, ExtractError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime
            .map(str::to_string)
            .unwrap_or_else(|| mime_for_path(path).to_string());
        Ok(Self::new(name, mime, bytes))
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Guess the declared MIME type the way a browser upload would
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("txt") => MIME_TEXT,
        Some("pdf") => MIME_PDF,
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("doc") => "application/msword",
        Some("rtf") => "application/rtf",
        Some("html" | "htm") => "text/html",
        _ => MIME_UNKNOWN,
    }
}

/// Full extracted text of a document. Never modified after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText(String);

impl DocumentText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when there is nothing worth sending to the model
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the text of an upload. The type check happens before any bytes are read.
#[tracing::instrument(skip(upload), fields(name = %upload.name, mime = %upload.mime))]
pub fn extract(upload: &Upload) -> Result<DocumentText, ExtractError> {
    let text = match SourceKind::from_mime(&upload.mime)? {
        SourceKind::PlainText => String::from_utf8(upload.bytes.clone())?,
        SourceKind::Pdf => extract_pdf(&upload.bytes)?,
    };
    tracing::debug!(chars = text.len(), "text extracted");
    Ok(DocumentText(text))
}

/// Extract every page in order and join them without separators.
///
/// pdf-extract can panic on malformed input, so a panic is reported as a read
/// error like any other failure. Partial text is never returned.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| ExtractError::PdfRead("PDF parser panicked".to_string()))?
    .map_err(|e| ExtractError::PdfRead(e.to_string()))?;

    tracing::debug!(page_count = pages.len(), "PDF pages extracted");
    Ok(pages.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_returned_verbatim() {
        let raw = "  Auto policy #123,\r\n premium 500 USD/yr \u{00e9}\n\n";
        let upload = Upload::new("policy.txt", MIME_TEXT, raw.as_bytes().to_vec());
        let text = extract(&upload).unwrap();
        assert_eq!(text.as_str(), raw);
    }

    #[test]
    fn mime_parameters_and_case_are_ignored() {
        assert_eq!(
            SourceKind::from_mime("Text/Plain; charset=utf-8").unwrap(),
            SourceKind::PlainText
        );
        assert_eq!(
            SourceKind::from_mime("APPLICATION/PDF").unwrap(),
            SourceKind::Pdf
        );
    }

    #[test]
    fn unsupported_type_is_rejected_before_reading() {
        // Bytes that would fail both decoders: the type check must win.
        let upload = Upload::new(
            "policy.docx",
            mime_for_path(Path::new("policy.docx")),
            vec![0xff, 0xfe, 0x00],
        );
        match extract(&upload) {
            Err(ExtractError::UnsupportedType(mime)) => {
                assert!(mime.contains("wordprocessingml"));
            }
            other => panic!("expected UnsupportedType, got {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_text_is_an_error() {
        let upload = Upload::new("bad.txt", MIME_TEXT, vec![b'o', b'k', 0xc3, 0x28]);
        assert!(matches!(
            extract(&upload),
            Err(ExtractError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn garbage_pdf_is_a_read_error() {
        let upload = Upload::new("broken.pdf", MIME_PDF, b"definitely not a pdf".to_vec());
        assert!(matches!(extract(&upload), Err(ExtractError::PdfRead(_))));
    }

    #[test]
    fn mime_guess_from_extension() {
        assert_eq!(mime_for_path(Path::new("a/policy.TXT")), MIME_TEXT);
        assert_eq!(mime_for_path(Path::new("policy.pdf")), MIME_PDF);
        assert_eq!(mime_for_path(Path::new("policy")), MIME_UNKNOWN);
    }

    #[test]
    fn blank_documents() {
        assert!(DocumentText::new("").is_blank());
        assert!(DocumentText::new(" \n\t").is_blank());
        assert!(!DocumentText::new(" x ").is_blank());
    }
}
