//! Document information dictionary of the merged PDF.
//!
//! Every merged document gets a Creator, Producer, CreationDate and ModDate
//! entry. Title, Author, Subject and Keywords are written when configured.
//! Text that is not plain ASCII is stored as UTF-16BE with a byte order mark,
//! the encoding PDF readers expect for text strings.

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::config::Metadata;
use crate::error::{JoinerError, Result};

/// Value of the Creator and Producer entries.
pub const PRODUCER: &str = concat!("pdfjoiner ", env!("CARGO_PKG_VERSION"));

const UTF16_BOM: [u8; 2] = [0xFE, 0xFF];

/// Writes and reads the document information dictionary.
#[derive(Debug, Clone, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Write document information to `doc`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the trailer points at an Info object that is not a
    /// dictionary.
    pub fn apply(&self, doc: &mut Document, metadata: &Metadata) -> Result<()> {
        self.apply_at(doc, metadata, Utc::now())
    }

    /// Write document information to `doc` with a fixed timestamp.
    pub fn apply_at(
        &self,
        doc: &mut Document,
        metadata: &Metadata,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let info = info_dictionary_mut(doc)?;

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }

        info.set("Creator", text_string(PRODUCER));
        info.set("Producer", text_string(PRODUCER));

        let date = format_pdf_date(now);
        info.set("CreationDate", text_string(&date));
        info.set("ModDate", text_string(&date));

        Ok(())
    }

    /// Read Title, Author, Subject and Keywords back from a document.
    pub fn read(&self, doc: &Document) -> Metadata {
        let Some(info) = info_dictionary(doc) else {
            return Metadata::default();
        };

        Metadata::new(
            read_text(info, b"Title"),
            read_text(info, b"Author"),
            read_text(info, b"Subject"),
            read_text(info, b"Keywords"),
        )
    }

    /// Read the Producer entry, if any.
    pub fn producer(&self, doc: &Document) -> Option<String> {
        info_dictionary(doc).and_then(|info| read_text(info, b"Producer"))
    }
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    let info_id = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .ok()?;
    doc.get_dictionary(info_id).ok()
}

fn info_dictionary_mut(doc: &mut Document) -> Result<&mut Dictionary> {
    let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
        Ok(id) => id,
        Err(_) => {
            let id = doc.add_object(Dictionary::new());
            doc.trailer.set("Info", id);
            id
        }
    };

    doc.get_dictionary_mut(info_id)
        .map_err(|e| JoinerError::merge_failed(format!("Info is not a dictionary: {e}")))
}

/// Encode a PDF text string.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = UTF16_BOM.to_vec();
    bytes.extend(value.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn read_text(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let Ok(Object::String(bytes, _)) = dict.get(key) else {
        return None;
    };

    match bytes.strip_prefix(&UTF16_BOM) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        None => String::from_utf8(bytes.clone()).ok(),
    }
}

/// Format a timestamp as a PDF date string, `D:YYYYMMDDHHmmSSZ`.
pub fn format_pdf_date(time: DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%SZ").to_string()
}
