//! DOCX text extraction
//!
//! A `.docx` is a zip archive; the body lives in `word/document.xml`.

use std::io::{BufReader, Cursor};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::{Error, Result};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract raw text from a DOCX buffer
///
/// Runs inside a paragraph are concatenated; each paragraph ends with a newline.
pub fn extract_text(data: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::Extraction(format!("DOCX is not a valid archive: {e}")))?;

    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| Error::Extraction(format!("DOCX missing {DOCUMENT_PART}: {e}")))?;

    let mut reader = Reader::from_reader(BufReader::new(part));
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                // Empty paragraph
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_run => {
                let run = e
                    .unescape()
                    .map_err(|e| Error::Extraction(format!("DOCX text decode failed: {e}")))?;
                text.push_str(&run);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Extraction(format!(
                    "DOCX XML error at {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
        buf.clear();
    }

    Ok(text)
}
