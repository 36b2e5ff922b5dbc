//! # nbcast-markdown
//!
//! Markdown-engine extension for nbcast. Registers a render function for
//! markdown cells that converts their source with [pulldown-cmark], taking
//! over from the `<pre>` fallback a base renderer registers for the same
//! cells. Later registrations of equal specificity win, so ordering the
//! extension after the base renderer is all it takes.
//!
//! The [`engine`] adapter accepts any markdown implementation with a
//! "convert these bytes onto this sink" shape, so swapping pulldown-cmark
//! for another engine does not touch the registration plumbing.
//!
//! [pulldown-cmark]: https://github.com/pulldown-cmark/pulldown-cmark
//!
//! ## Example
//!
//! ```no_run
//! use nbcast_core::{Converter, Renderer};
//! use nbcast_html::HtmlRenderer;
//! use nbcast_markdown::MarkdownExtension;
//!
//! let converter = Converter::new(
//!     Renderer::new()
//!         .with_cell_renderer(&HtmlRenderer::new())
//!         .with_cell_renderer(&MarkdownExtension::default()),
//! );
//! # let _ = converter;
//! ```

use std::io::Write;
use std::sync::Arc;

use pulldown_cmark::{html, Options, Parser};

use nbcast_core::render::RenderCellRegistry;
use nbcast_core::{Cell, CellRenderer, CellType, Pref, RenderCellFn, Result};

/// Registers pulldown-cmark as the renderer for markdown cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExtension {
    /// Enable strikethrough, tables, task lists, and footnotes on top of
    /// CommonMark.
    pub extended_syntax: bool,
}

impl MarkdownExtension {
    /// An extension with the extended syntax set enabled.
    #[must_use]
    pub fn extended() -> Self {
        Self {
            extended_syntax: true,
        }
    }

    fn options(self) -> Options {
        let mut options = Options::empty();
        if self.extended_syntax {
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_TASKLISTS);
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        options
    }
}

impl CellRenderer for MarkdownExtension {
    fn register_funcs(&self, registry: &mut dyn RenderCellRegistry) {
        let options = self.options();
        registry.register(
            Pref::for_type(CellType::Markdown),
            engine(move |source, w| {
                let parser = Parser::new_ext(source, options);
                let mut buf = String::new();
                html::push_html(&mut buf, parser);
                w.write_all(buf.as_bytes())?;
                Ok(())
            }),
        );
    }
}

/// Adapt a "convert source onto sink" markdown engine into a render
/// function.
///
/// The engine receives the cell's joined source text and the output sink;
/// any dependency it needs (parse options, configured engine instance) is
/// captured in the closure.
pub fn engine(
    convert: impl Fn(&str, &mut dyn Write) -> Result<()> + Send + Sync + 'static,
) -> RenderCellFn {
    Arc::new(move |w: &mut dyn Write, cell: &Cell| convert(&cell.text(), w))
}
