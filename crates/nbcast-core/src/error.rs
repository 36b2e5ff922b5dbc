//! Error types for notebook decoding and rendering.

use thiserror::Error;

/// Error type for notebook conversion operations.
///
/// Decode errors are deterministic data-shape failures: a document either
/// decodes completely or fails with one terminal error identifying the
/// offending record. Render errors abort the whole render call; bytes
/// already written to the sink stay written.
#[derive(Error, Debug)]
pub enum NbcastError {
    /// I/O error while writing rendered output.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// The notebook JSON is structurally malformed.
    #[error("malformed notebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The notebook source is not valid UTF-8.
    #[error("notebook is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The document declares a major version with no registered decoder.
    ///
    /// There is no forward-compatible fallback: an unseen *minor* revision of
    /// a known major is accepted via that major's decoder, an unseen major is
    /// rejected outright.
    #[error("unsupported nbformat version {major}.{minor}")]
    UnsupportedVersion {
        /// Declared major version number.
        major: u32,
        /// Declared minor version number.
        minor: u32,
    },

    /// A cell record carries an unrecognized `cell_type` discriminator.
    #[error("unknown cell type {kind:?}")]
    UnknownCellType {
        /// The unrecognized discriminator value.
        kind: String,
    },

    /// An output record carries an unrecognized `output_type` discriminator.
    #[error("unknown output type {kind:?}")]
    UnknownOutputType {
        /// The unrecognized discriminator value.
        kind: String,
    },

    /// A cell record failed to decode; `index` locates it in document order.
    #[error("cell {index}: {source}")]
    MalformedCell {
        /// Zero-based position of the record in the flattened cell list.
        index: usize,
        /// The underlying decode failure.
        source: Box<NbcastError>,
    },

    /// A content-render or wrap function failed for the cell at `index`.
    #[error("render cell {index}: {source}")]
    RenderFailed {
        /// Zero-based position of the cell in the notebook.
        index: usize,
        /// The underlying render failure.
        source: Box<NbcastError>,
    },

    /// Failure reported by an external render collaborator.
    #[error("render error: {0}")]
    RenderError(String),
}

impl NbcastError {
    /// Wrap a decode error with the position of the record it refers to.
    #[must_use]
    pub fn at_cell(self, index: usize) -> Self {
        Self::MalformedCell {
            index,
            source: Box::new(self),
        }
    }

    /// Wrap a render error with the position of the cell being rendered.
    #[must_use]
    pub fn at_render(self, index: usize) -> Self {
        Self::RenderFailed {
            index,
            source: Box::new(self),
        }
    }
}

/// Result type alias for notebook conversion operations.
pub type Result<T> = std::result::Result<T, NbcastError>;
