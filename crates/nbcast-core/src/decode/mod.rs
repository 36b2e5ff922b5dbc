//! Multi-version decode engine.
//!
//! A [`Decoder`] knows how to read one nbformat schema revision: it extracts
//! the flat, ordered list of raw cell records from that revision's document
//! shape and populates the canonical model from each record. The dispatcher
//! in [`decode`] holds no version-specific knowledge of its own; it parses
//! the two version fields, picks the best-matching registered decoder, and
//! drives extraction and per-cell decoding.

mod v3;
mod v4;

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use log::debug;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::{NbcastError, Result};
use crate::schema::{Cell, Notebook, Version};

/// A decoder for one nbformat schema revision.
///
/// Implementations are registered against the lowest `(major, minor)` they
/// support and also serve any later minor revision of the same major that did
/// not register its own decoder.
pub trait Decoder: Send + Sync {
    /// Extract the flat, ordered list of raw cell records from the document.
    ///
    /// For schema majors ≤ 3 cells are nested inside worksheets; decoders for
    /// those revisions concatenate the worksheets' cell lists in order.
    ///
    /// # Errors
    /// Returns an error if the document's cell-carrying structure is
    /// malformed.
    fn extract_cells(&self, doc: &str) -> Result<Vec<Box<RawValue>>>;

    /// Decode the notebook-level metadata the cells need, such as the
    /// declared source language.
    ///
    /// # Errors
    /// Returns an error if the metadata section is malformed.
    fn decode_meta(&self, doc: &str) -> Result<NotebookMetadata>;

    /// Produce exactly one canonical cell from a raw cell record.
    ///
    /// # Errors
    /// Returns an error if the record is malformed or carries an
    /// unrecognized type discriminator; the record is never silently
    /// dropped.
    fn decode_cell(&self, record: &RawValue, meta: &NotebookMetadata) -> Result<Cell>;
}

/// Notebook-level metadata shared with every cell decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotebookMetadata {
    /// Declared source language of the notebook's code cells; empty when the
    /// document does not declare one.
    pub language: String,
}

type DecoderMap = BTreeMap<Version, Arc<dyn Decoder>>;

/// Process-wide decoder registry, populated with the built-in decoders on
/// first access. Supporting a new schema revision is purely additive via
/// [`register_decoder`].
static REGISTRY: Lazy<RwLock<DecoderMap>> = Lazy::new(|| {
    let mut decoders = DecoderMap::new();
    v3::register(&mut decoders);
    v4::register(&mut decoders);
    RwLock::new(decoders)
});

/// Register a decoder for a schema revision, replacing any previous
/// registration for the same version.
///
/// Registration must happen before any [`decode`] call that should observe
/// it; there is no unregistration.
pub fn register_decoder(version: Version, decoder: Arc<dyn Decoder>) {
    REGISTRY
        .write()
        .expect("decoder registry lock poisoned")
        .insert(version, decoder);
}

/// The registered decoder with the highest version ≤ `version` within the
/// same major, if any.
fn lookup(version: Version) -> Option<Arc<dyn Decoder>> {
    let registry = REGISTRY.read().expect("decoder registry lock poisoned");
    registry
        .range(Version::new(version.major, 0)..=version)
        .next_back()
        .map(|(_, decoder)| Arc::clone(decoder))
}

/// Decode a notebook document into the canonical model.
///
/// The whole document is decoded before anything is returned: a malformed
/// record or an unrecognized discriminator fails the call with an error
/// locating the offending cell, and no partial notebook is produced.
///
/// # Errors
/// - [`NbcastError::UnsupportedVersion`] when the declared major version has
///   no registered decoder.
/// - [`NbcastError::MalformedCell`] when a cell record fails to decode.
/// - [`NbcastError::Json`] / [`NbcastError::Utf8`] when the document itself
///   is unreadable.
pub fn decode(source: &[u8]) -> Result<Notebook> {
    let doc = std::str::from_utf8(source)?;

    // Cheap partial parse: only the two top-level version fields.
    #[derive(Deserialize)]
    struct Header {
        nbformat: u32,
        #[serde(default)]
        nbformat_minor: u32,
    }
    let header: Header = serde_json::from_str(doc)?;
    let version = Version::new(header.nbformat, header.nbformat_minor);

    let Some(decoder) = lookup(version) else {
        return Err(NbcastError::UnsupportedVersion {
            major: version.major,
            minor: version.minor,
        });
    };
    debug!("decoding nbformat {version} document ({} bytes)", source.len());

    let meta = decoder.decode_meta(doc)?;
    let records = decoder.extract_cells(doc)?;

    let mut cells = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match decoder.decode_cell(record, &meta) {
            Ok(cell) => cells.push(cell),
            Err(err) => return Err(err.at_cell(index)),
        }
    }
    Ok(Notebook::new(version, cells))
}

/// Source text that may be a single string or a list of line fragments.
///
/// Fragments are joined with no added delimiter; a fragment only ends a line
/// if it already ends in one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum MultilineString {
    Single(String),
    Fragments(Vec<String>),
}

impl MultilineString {
    pub(crate) fn into_text(self) -> String {
        match self {
            Self::Single(s) => s,
            Self::Fragments(fragments) => fragments.concat(),
        }
    }
}

impl Default for MultilineString {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

/// Raw-cell metadata that may pin a target conversion mime-type.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawCellMetadata {
    format: Option<String>,
    raw_mimetype: Option<String>,
}

impl RawCellMetadata {
    /// The explicit mime-type override, checked in fixed priority (generic
    /// `format` first, then `raw_mimetype`), falling back to `text/plain`.
    pub(crate) fn into_mime_type(self) -> String {
        self.format
            .or(self.raw_mimetype)
            .unwrap_or_else(|| crate::schema::mime::PLAIN_TEXT.to_string())
    }
}
