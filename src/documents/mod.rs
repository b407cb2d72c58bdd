//! Text extraction from downloaded documents
//!
//! Dispatches on the filename suffix and works on the in-memory buffer only,
//! so untrusted filenames never touch the file system.

mod docx;

use std::fmt;

use crate::{Error, Result};

/// Document formats the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.txt`
    PlainText,
    /// `.pdf`
    Pdf,
    /// `.docx`
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a filename suffix (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for any other suffix
    pub fn from_filename(filename: &str) -> Result<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".txt") {
            Ok(Self::PlainText)
        } else if lower.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else if lower.ends_with(".docx") {
            Ok(Self::Docx)
        } else {
            Err(Error::UnsupportedFormat(filename.to_string()))
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PlainText => "txt",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        })
    }
}

/// Extract plain text from `data`, using `filename` to pick the parser
///
/// CPU bound; call from a blocking context.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for unknown suffixes and
/// [`Error::Extraction`] when the parser rejects the content
pub fn extract_text(data: &[u8], filename: &str) -> Result<String> {
    let format = DocumentFormat::from_filename(filename)?;

    let text = match format {
        DocumentFormat::PlainText => String::from_utf8_lossy(data).into_owned(),
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::Extraction(format!("PDF parse failed: {e}")))?,
        DocumentFormat::Docx => docx::extract_text(data)?,
    };

    tracing::debug!(%format, bytes = data.len(), chars = text.chars().count(), "extracted document text");
    Ok(text)
}

/// Extract text on the blocking thread pool
///
/// A panic inside a parser is reported as [`Error::Extraction`].
///
/// # Errors
///
/// Same as [`extract_text`]
pub async fn extract_text_blocking(data: Vec<u8>, filename: String) -> Result<String> {
    tokio::task::spawn_blocking(move || extract_text(&data, &filename))
        .await
        .map_err(|e| Error::Extraction(format!("extraction task failed: {e}")))?
}

/// Keep the first `max_chars` characters of `text`
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}
