//! Stylesheet bundling and write-once emission.

use std::io::Write;

/// The bundled default stylesheet for the `jp-*` classes the wrapper emits.
///
/// Callers embedding the output in a page can write it into a `<style>`
/// block via [`crate::HtmlRenderer::with_css_writer`] or ship their own
/// nbconvert-compatible stylesheet instead.
pub const DEFAULT_CSS: &str = include_str!("jupyter.css");

/// Emits a stylesheet to a sink at most once.
///
/// The wrapper asks for emission before every cell it wraps; only the first
/// request writes.
pub(crate) struct CssEmitter {
    sink: Box<dyn Write + Send>,
    emitted: bool,
}

impl CssEmitter {
    pub(crate) fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            emitted: false,
        }
    }

    pub(crate) fn emit(&mut self, css: &str) -> std::io::Result<()> {
        if self.emitted {
            return Ok(());
        }
        self.sink.write_all(css.as_bytes())?;
        self.emitted = true;
        Ok(())
    }
}
