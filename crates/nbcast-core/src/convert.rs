//! The top-level conversion facade: decode, then render.

use std::io::Write;

use crate::decode;
use crate::error::Result;
use crate::render::Renderer;

/// Converts raw notebook JSON to the format its configured renderer and
/// extensions produce.
///
/// A converter owns a [`Renderer`]; callers compose one from the collaborator
/// sets they want (the `nbcast-html` crate ships the default HTML set) and
/// then feed it documents. Configuration must be completed before the first
/// conversion; the renderer freezes its registrations at that point.
#[derive(Default)]
pub struct Converter {
    renderer: Renderer,
}

impl Converter {
    /// Create a converter around a configured renderer.
    #[must_use]
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }

    /// Apply extensions to this converter.
    #[must_use]
    pub fn with_extensions(mut self, extensions: &[&dyn Extension]) -> Self {
        for extension in extensions {
            extension.extend(&mut self);
        }
        self
    }

    /// The renderer under configuration, for extensions to register against.
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Decode `source` and render the resulting notebook to `w`.
    ///
    /// # Errors
    /// Propagates decode errors ([`crate::NbcastError::UnsupportedVersion`],
    /// [`crate::NbcastError::MalformedCell`], ...) and render errors; in
    /// either case no recovery is attempted and bytes already written to `w`
    /// stay written.
    pub fn convert(&self, w: &mut dyn Write, source: &[u8]) -> Result<()> {
        let notebook = decode::decode(source)?;
        self.renderer.render(w, &notebook)
    }
}

/// A packaged converter extension: one value bundling cell renderers, a
/// wrapper, or any other configuration a third party contributes.
pub trait Extension {
    /// Apply this extension to a converter under construction.
    fn extend(&self, converter: &mut Converter);
}
