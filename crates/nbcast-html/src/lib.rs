//! # nbcast-html
//!
//! The default HTML collaborator set for nbcast: content renderers for the
//! canonical cell types, the nbconvert-compatible cell wrapper, and a
//! write-once CSS emission helper.
//!
//! The renderer registers broad defaults (markdown and code by cell type,
//! images, raw HTML, and text-like mimes by mime-type) and extensions can
//! narrow any of them afterwards without knowing about these registrations.
//!
//! ## Example
//!
//! ```no_run
//! use nbcast_core::{Converter, Renderer};
//! use nbcast_html::HtmlRenderer;
//!
//! let converter = Converter::new(
//!     Renderer::new().with_cell_renderer(&HtmlRenderer::new()),
//! );
//!
//! let source = std::fs::read("analysis.ipynb")?;
//! let mut out = Vec::new();
//! converter.convert(&mut out, &source)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod css;
mod wrapper;

use std::borrow::Cow;
use std::io::Write;
use std::sync::Arc;

use nbcast_core::render::RenderCellRegistry;
use nbcast_core::schema::mime;
use nbcast_core::{Cell, CellRenderer, CellType, CellWrapper, Pref, RenderCellFn, Result};

pub use css::DEFAULT_CSS;
pub use wrapper::Wrapper;

/// Renders notebooks as HTML fragments.
///
/// Supports markdown, code, and raw cells along with the stream, display,
/// result, and error outputs their mime-types produce. Markdown is emitted
/// verbatim in a `<pre>` block by default; pair this renderer with a
/// markdown-engine extension (such as `nbcast-markdown`) for rendered prose.
#[derive(Default)]
pub struct HtmlRenderer {
    wrapper: Arc<Wrapper>,
}

impl HtmlRenderer {
    /// Create an HTML renderer with no CSS sink configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route the bundled stylesheet to `css_writer` the first time a cell is
    /// wrapped. Later cells write nothing, so the sink receives the
    /// stylesheet at most once over this renderer's lifetime.
    #[must_use]
    pub fn with_css_writer(self, css_writer: impl Write + Send + 'static) -> Self {
        Self {
            wrapper: Arc::new(Wrapper::with_css_writer(css_writer)),
        }
    }
}

impl CellRenderer for HtmlRenderer {
    fn register_funcs(&self, registry: &mut dyn RenderCellRegistry) {
        registry.register(Pref::for_type(CellType::Markdown), func(render_markdown));
        registry.register(Pref::for_type(CellType::Code), func(render_code));
        registry.register(Pref::for_mime_type("image/png"), func(render_image));
        registry.register(Pref::for_mime_type("image/jpeg"), func(render_image));
        registry.register(Pref::for_mime_type("text/html"), func(render_raw_html));
        registry.register(Pref::for_mime_type("application/json"), func(render_plain));
        registry.register(Pref::for_mime_type(mime::STDOUT), func(render_plain));
        registry.register(Pref::for_mime_type(mime::STDERR), func(render_plain));
        registry.register(Pref::for_mime_type(mime::PLAIN_TEXT), func(render_plain));
    }

    fn cell_wrapper(&self) -> Option<Arc<dyn CellWrapper>> {
        Some(Arc::clone(&self.wrapper) as Arc<dyn CellWrapper>)
    }
}

fn func(
    f: impl Fn(&mut dyn Write, &Cell) -> Result<()> + Send + Sync + 'static,
) -> RenderCellFn {
    Arc::new(f)
}

/// Markdown source in a `<pre>` block; a markdown-engine extension is
/// expected to override this registration.
fn render_markdown(w: &mut dyn Write, cell: &Cell) -> Result<()> {
    write!(w, "<pre>{}</pre>", cell.text())?;
    Ok(())
}

/// The code blob in editor-styled containers; outputs are rendered
/// separately through the output wrap point.
fn render_code(w: &mut dyn Write, cell: &Cell) -> Result<()> {
    let language = cell.language().unwrap_or_default();
    writeln!(w, "<div class=\"cm-editor cm-s-jupyter\">")?;
    writeln!(w, "<div class=\"highlight\">")?;
    write!(
        w,
        "<pre><code class=\"language-{language}\">{}</code></pre>",
        escape_html(&cell.text())
    )?;
    writeln!(w, "\n</div>\n</div>")?;
    Ok(())
}

/// Raw HTML content written directly into the document.
fn render_raw_html(w: &mut dyn Write, cell: &Cell) -> Result<()> {
    w.write_all(cell.text().as_bytes())?;
    Ok(())
}

/// Base64 image payloads as data URIs.
fn render_image(w: &mut dyn Write, cell: &Cell) -> Result<()> {
    writeln!(
        w,
        "<img src=\"data:{};base64,{}\" />",
        cell.mime_type(),
        cell.text().trim_end()
    )?;
    Ok(())
}

/// Escaped text content in a `<pre>` block.
fn render_plain(w: &mut dyn Write, cell: &Cell) -> Result<()> {
    write!(w, "<pre>{}</pre>", escape_html(&cell.text()))?;
    Ok(())
}

/// Escape the characters HTML treats specially.
fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
