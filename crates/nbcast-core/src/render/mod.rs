//! Preference-based render dispatch.
//!
//! Extensions register [`Pref`]-to-function bindings against a [`Renderer`];
//! at render time every cell is dispatched to the single most specific
//! matching binding, with structural wrapping composed around the dispatched
//! content by an optional [`CellWrapper`].

mod pref;
mod wildcard;

use std::io::Write;
use std::sync::Arc;

use log::trace;
use once_cell::sync::OnceCell;

use crate::error::Result;
use crate::schema::{Cell, Notebook};

pub use pref::Pref;

/// A content-render function: writes the content of one cell to the sink.
///
/// This signature is the boundary shared by content extensions and the
/// wrapper's continuations.
pub type RenderCellFn = Arc<dyn Fn(&mut dyn Write, &Cell) -> Result<()> + Send + Sync>;

/// Registration interface handed to [`CellRenderer`] implementations.
pub trait RenderCellRegistry {
    /// Bind `render` to every cell captured by `pref`.
    ///
    /// A later registration overrides an equally specific earlier one, so
    /// extensions can narrow a base renderer's defaults without knowing
    /// about them.
    fn register(&mut self, pref: Pref, render: RenderCellFn);
}

/// A bundle of render functions contributed by an extension.
///
/// Reminiscent of the visitor pattern: the base renderer supports nothing
/// out of the box and any number of cell renderers extend it.
pub trait CellRenderer {
    /// Register this renderer's (preference, function) pairs.
    fn register_funcs(&self, registry: &mut dyn RenderCellRegistry);

    /// The structural cell wrapper this renderer contributes, if any.
    ///
    /// Only one wrapper can be active per [`Renderer`]; the last contributor
    /// takes precedence.
    fn cell_wrapper(&self) -> Option<Arc<dyn CellWrapper>> {
        None
    }
}

/// Writes structural markup around a cell's rendered content.
///
/// Wrappers are purely structural: they surround the content render without
/// altering or suppressing it, and each wrap point must invoke its
/// continuation exactly once so content rendering and error propagation
/// stay intact.
pub trait CellWrapper: Send + Sync {
    /// Wrap the entire cell block.
    ///
    /// # Errors
    /// Returns an error if writing markup or the continuation fails.
    fn wrap(
        &self,
        w: &mut dyn Write,
        cell: &Cell,
        render: &dyn Fn(&mut dyn Write, &Cell) -> Result<()>,
    ) -> Result<()>;

    /// Wrap the input portion of the cell.
    ///
    /// # Errors
    /// Returns an error if writing markup or the continuation fails.
    fn wrap_input(
        &self,
        w: &mut dyn Write,
        cell: &Cell,
        render: &dyn Fn(&mut dyn Write, &Cell) -> Result<()>,
    ) -> Result<()>;

    /// Wrap the output portion of the cell. Invoked only for cells exposing
    /// the outputs capability.
    ///
    /// # Errors
    /// Returns an error if writing markup or the continuation fails.
    fn wrap_output(
        &self,
        w: &mut dyn Write,
        cell: &Cell,
        render: &dyn Fn(&mut dyn Write, &Cell) -> Result<()>,
    ) -> Result<()>;
}

/// The base renderer: holds registered preferences and dispatches each cell
/// of a notebook to the most specific matching render function.
///
/// Rendering configuration freezes at the first [`Renderer::render`] call;
/// registrations made after that are ignored. This is the documented
/// contract, which also makes an already-configured renderer safe to use
/// from several threads at once.
#[derive(Default)]
pub struct Renderer {
    wrapper: Option<Arc<dyn CellWrapper>>,
    pending: Vec<(Pref, RenderCellFn)>,
    frozen: OnceCell<Vec<(Pref, RenderCellFn)>>,
}

impl RenderCellRegistry for Renderer {
    fn register(&mut self, pref: Pref, render: RenderCellFn) {
        self.pending.push((pref, render));
    }
}

impl Renderer {
    /// Create a renderer with no registered render functions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a cell renderer's registrations, adopting its wrapper when it
    /// contributes one.
    pub fn add_cell_renderer(&mut self, cell_renderer: &dyn CellRenderer) {
        cell_renderer.register_funcs(self);
        if let Some(wrapper) = cell_renderer.cell_wrapper() {
            self.wrapper = Some(wrapper);
        }
    }

    /// Builder-style [`Renderer::add_cell_renderer`].
    #[must_use]
    pub fn with_cell_renderer(mut self, cell_renderer: &dyn CellRenderer) -> Self {
        self.add_cell_renderer(cell_renderer);
        self
    }

    /// Render the notebook's cells in order.
    ///
    /// Cells with no matching registered function produce no output and no
    /// error; some cell kinds are only meaningful in certain target formats.
    /// The first error from a wrap or content function aborts the whole
    /// render; whatever was already written stays written.
    ///
    /// # Errors
    /// Returns the failing cell's error wrapped with its position.
    pub fn render(&self, w: &mut dyn Write, notebook: &Notebook) -> Result<()> {
        for (index, cell) in notebook.cells().iter().enumerate() {
            let rendered = match &self.wrapper {
                Some(wrapper) => {
                    let content = |w: &mut dyn Write, cell: &Cell| self.render_cell(w, cell);
                    wrapper.wrap(w, cell, &|w: &mut dyn Write, cell: &Cell| {
                        wrapper.wrap_input(w, cell, &content)?;
                        if cell.outputs().is_some() {
                            wrapper.wrap_output(w, cell, &content)?;
                        }
                        Ok(())
                    })
                }
                None => self.render_cell(w, cell),
            };
            rendered.map_err(|err| err.at_render(index))?;
        }
        Ok(())
    }

    /// Render one cell's content through the most specific matching
    /// registration, or do nothing when none matches.
    fn render_cell(&self, w: &mut dyn Write, cell: &Cell) -> Result<()> {
        match self.resolve(cell) {
            Some(render) => render(w, cell),
            None => {
                trace!(
                    "no render function for {} cell ({})",
                    cell.cell_type(),
                    cell.mime_type()
                );
                Ok(())
            }
        }
    }

    /// The most specific registered function matching `cell`. Ties go to the
    /// later registration.
    fn resolve(&self, cell: &Cell) -> Option<&RenderCellFn> {
        let mut best: Option<&(Pref, RenderCellFn)> = None;
        for registration in self.registrations() {
            if !registration.0.matches(cell) {
                continue;
            }
            best = match best {
                Some(current)
                    if pref::compare_specificity(&registration.0, &current.0)
                        == std::cmp::Ordering::Less =>
                {
                    Some(current)
                }
                _ => Some(registration),
            };
        }
        best.map(|(_, render)| render)
    }

    /// Registrations as frozen at the first render call.
    fn registrations(&self) -> &[(Pref, RenderCellFn)] {
        self.frozen.get_or_init(|| self.pending.clone())
    }
}
