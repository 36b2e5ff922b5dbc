//! # nbcast-core
//!
//! Core conversion engine for nbcast: decodes Jupyter notebook documents
//! (nbformat 1 through 4) into one canonical cell model and dispatches each
//! cell to the most specific registered render function.
//!
//! The crate is format-agnostic: what gets written to the output sink is
//! decided entirely by the registered collaborators. The `nbcast-html` crate
//! provides the default HTML set.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use nbcast_core::{Converter, Pref, Renderer};
//! use nbcast_core::schema::CellType;
//! use nbcast_core::render::RenderCellRegistry;
//!
//! let mut renderer = Renderer::new();
//! renderer.register(
//!     Pref::for_type(CellType::Markdown),
//!     Arc::new(|w: &mut dyn std::io::Write, cell: &nbcast_core::Cell| {
//!         w.write_all(cell.text().as_bytes())?;
//!         Ok(())
//!     }),
//! );
//!
//! let source = std::fs::read("analysis.ipynb")?;
//! let mut out = Vec::new();
//! Converter::new(renderer).convert(&mut out, &source)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod convert;
/// Multi-version decode engine and decoder registry.
pub mod decode;
/// Error types for decoding and rendering.
pub mod error;
/// Preference-based render dispatch.
pub mod render;
/// The canonical, version-independent notebook model.
pub mod schema;

pub use convert::{Converter, Extension};
pub use decode::{decode, register_decoder, Decoder, NotebookMetadata};
pub use error::{NbcastError, Result};
pub use render::{CellRenderer, CellWrapper, Pref, RenderCellFn, Renderer};
pub use schema::{Cell, CellType, MimeBundle, Notebook, Version};
