//! Structural cell wrapping in the markup Jupyter's own nbconvert produces.

use std::io::Write;
use std::sync::Mutex;

use nbcast_core::schema::mime;
use nbcast_core::{Cell, CellType, CellWrapper, Result};

use crate::css::{CssEmitter, DEFAULT_CSS};

/// Wraps cells in `jp-*`-classed containers compatible with the HTML that
/// Jupyter's nbconvert emits, so existing notebook stylesheets apply.
///
/// The wrapper is purely structural: every wrap point invokes its
/// continuation exactly once and surrounds whatever it writes.
#[derive(Default)]
pub struct Wrapper {
    css: Option<Mutex<CssEmitter>>,
}

impl Wrapper {
    /// A wrapper that emits the bundled stylesheet to `css_writer` before
    /// the first cell it wraps.
    #[must_use]
    pub fn with_css_writer(css_writer: impl Write + Send + 'static) -> Self {
        Self {
            css: Some(Mutex::new(CssEmitter::new(css_writer))),
        }
    }
}

impl CellWrapper for Wrapper {
    fn wrap(
        &self,
        w: &mut dyn Write,
        cell: &Cell,
        render: &dyn Fn(&mut dyn Write, &Cell) -> Result<()>,
    ) -> Result<()> {
        if let Some(css) = &self.css {
            css.lock()
                .expect("css sink lock poisoned")
                .emit(DEFAULT_CSS)?;
        }

        let cell_class = match cell.cell_type() {
            CellType::Markdown => " jp-MarkdownCell",
            CellType::Code => " jp-CodeCell",
            CellType::Raw => " jp-RawCell",
            _ => "",
        };
        div_open(
            w,
            &[("class", &format!("jp-Cell{cell_class} jp-Notebook-cell"))],
        )?;
        render(w, cell)?;
        div_close(w)?;
        Ok(())
    }

    fn wrap_input(
        &self,
        w: &mut dyn Write,
        cell: &Cell,
        render: &dyn Fn(&mut dyn Write, &Cell) -> Result<()>,
    ) -> Result<()> {
        div_open(w, &[("class", "jp-Cell-inputWrapper"), ("tabindex", "0")])?;

        div_open(
            w,
            &[("class", "jp-Collapser jp-InputCollapser jp-Cell-inputCollapser")],
        )?;
        write!(w, " ")?;
        div_close(w)?;

        div_open(w, &[("class", "jp-InputArea jp-Cell-inputArea")])?;

        // Prompt: In [1]:
        div_open(w, &[("class", "jp-InputPrompt jp-InputArea-prompt")])?;
        if let Some(count) = cell.execution_count() {
            write!(w, "In\u{a0}[{count}]:")?;
        }
        div_close(w)?;

        let editor = match cell.cell_type() {
            CellType::Code => Some([
                ("class", "jp-CodeMirrorEditor jp-Editor jp-InputArea-editor"),
                ("data-type", "inline"),
            ]),
            CellType::Markdown => Some([
                (
                    "class",
                    "jp-RenderedMarkdown jp-MarkdownOutput jp-RenderedHTMLCommon",
                ),
                ("data-mime-type", mime::MARKDOWN_TEXT),
            ]),
            _ => None,
        };
        if let Some(attrs) = &editor {
            div_open(w, attrs)?;
        }

        render(w, cell)?;

        if editor.is_some() {
            div_close(w)?;
        }
        div_close(w)?;
        div_close(w)?;
        Ok(())
    }

    fn wrap_output(
        &self,
        w: &mut dyn Write,
        cell: &Cell,
        render: &dyn Fn(&mut dyn Write, &Cell) -> Result<()>,
    ) -> Result<()> {
        let outputs = cell.outputs().unwrap_or_default();

        div_open(w, &[("class", "jp-Cell-outputWrapper")])?;
        write!(
            w,
            "<div class=\"jp-Collapser jp-OutputCollapser jp-Cell-outputCollapser\">"
        )?;
        div_close(w)?;
        div_open(w, &[("class", "jp-OutputArea jp-Cell-outputArea")])?;

        // The first output decides the area's reported mime-type and the
        // rendered-content classes, as nbconvert's markup does.
        let mut child = false;
        let mut child_class = String::from("jp-OutputArea-child");
        let mut data_mime_type = "";
        let mut output_type_class = "";
        if let Some(first) = outputs.first() {
            data_mime_type = first.mime_type();
            match first.cell_type() {
                CellType::ExecuteResult => {
                    output_type_class = "jp-OutputArea-executeResult";
                    child = true;
                }
                CellType::Error => child = true,
                CellType::Stream => {
                    data_mime_type = mime::PLAIN_TEXT;
                    child = true;
                }
                _ => {}
            }
        }

        let mut rendered_class = "";
        if data_mime_type.starts_with("text/") || data_mime_type == "application/json" {
            child_class.push_str(" jp-OutputArea-executeResult");
            rendered_class = if data_mime_type == "text/html" {
                "jp-RenderedHTMLCommon jp-RenderedHTML"
            } else {
                "jp-RenderedText"
            };
        } else if data_mime_type.starts_with("image/") {
            rendered_class = "jp-RenderedImage";
            child = true;
        } else if data_mime_type == mime::STDERR {
            rendered_class = "jp-RenderedText";
        }

        if child {
            div_open(w, &[("class", &child_class)])?;
        }

        // Prompt: Out [1]:
        div_open(w, &[("class", "jp-OutputPrompt jp-OutputArea-prompt")])?;
        if let Some(count) = outputs.iter().find_map(Cell::execution_count) {
            write!(w, "Out\u{a0}[{count}]:")?;
        }
        div_close(w)?;

        let mut output_class = String::new();
        for class in [rendered_class, "jp-OutputArea-output", output_type_class] {
            if class.is_empty() {
                continue;
            }
            if !output_class.is_empty() {
                output_class.push(' ');
            }
            output_class.push_str(class);
        }
        div_open(
            w,
            &[
                ("class", output_class.as_str()),
                ("data-mime-type", data_mime_type),
            ],
        )?;
        for output in outputs {
            render(w, output)?;
        }
        div_close(w)?;

        if child {
            div_close(w)?;
        }
        div_close(w)?;
        div_close(w)?;
        Ok(())
    }
}

/// Open a `<div>` with the attributes written in the given (sorted) order.
fn div_open(w: &mut dyn Write, attrs: &[(&str, &str)]) -> std::io::Result<()> {
    write!(w, "<div")?;
    for (key, value) in attrs {
        write!(w, " {key}=\"{value}\"")?;
    }
    writeln!(w, ">")
}

fn div_close(w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "</div>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbcast_core::schema::{
        CodeCell, ExecuteResultOutput, MarkdownCell, StreamOutput, Version,
    };
    use nbcast_core::{Notebook, Renderer};

    use crate::HtmlRenderer;

    fn render_html(notebook: &Notebook) -> String {
        let renderer = Renderer::new().with_cell_renderer(&HtmlRenderer::new());
        let mut out = Vec::new();
        renderer.render(&mut out, notebook).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_markdown_cell_wrapping() {
        let notebook = Notebook::new(
            Version::new(4, 4),
            vec![Cell::Markdown(MarkdownCell {
                source: "# Hi".to_string(),
                attachments: None,
            })],
        );
        let html = render_html(&notebook);

        assert!(html.contains("<div class=\"jp-Cell jp-MarkdownCell jp-Notebook-cell\">"));
        assert!(html.contains("<div class=\"jp-Cell-inputWrapper\" tabindex=\"0\">"));
        assert!(html.contains("data-mime-type=\"text/markdown\""));
        assert!(html.contains("<pre># Hi</pre>"));
        // No outputs capability: no output area at all.
        assert!(!html.contains("jp-Cell-outputWrapper"));
    }

    #[test]
    fn test_code_cell_prompts_and_output_area() {
        let notebook = Notebook::new(
            Version::new(4, 4),
            vec![Cell::Code(CodeCell {
                source: "1 + 1".to_string(),
                language: "python".to_string(),
                execution_count: 2,
                outputs: vec![Cell::ExecuteResult(ExecuteResultOutput {
                    data: [("text/plain", "2")].into_iter().collect(),
                    execution_count: 2,
                })],
            })],
        );
        let html = render_html(&notebook);

        assert!(html.contains("jp-CodeCell"));
        assert!(html.contains("In\u{a0}[2]:"));
        assert!(html.contains("Out\u{a0}[2]:"));
        assert!(html.contains("jp-OutputArea-executeResult"));
        assert!(html.contains("data-mime-type=\"text/plain\""));
        assert!(html.contains("<pre>2</pre>"));
    }

    #[test]
    fn test_stream_output_reports_plain_text_area() {
        let notebook = Notebook::new(
            Version::new(4, 4),
            vec![Cell::Code(CodeCell {
                source: String::new(),
                language: String::new(),
                execution_count: 1,
                outputs: vec![Cell::Stream(StreamOutput {
                    target: "stdout".to_string(),
                    source: "hello\n".to_string(),
                })],
            })],
        );
        let html = render_html(&notebook);

        assert!(html.contains("jp-RenderedText"));
        assert!(html.contains("data-mime-type=\"text/plain\""));
        assert!(html.contains("<pre>hello\n</pre>"));
    }

    #[test]
    fn test_css_is_emitted_once_for_many_cells() {
        let notebook = Notebook::new(
            Version::new(4, 4),
            vec![
                Cell::Markdown(MarkdownCell::default()),
                Cell::Markdown(MarkdownCell::default()),
            ],
        );

        let css = std::sync::Arc::new(Mutex::new(Vec::<u8>::new()));
        let sink = SharedSink(std::sync::Arc::clone(&css));
        let renderer =
            Renderer::new().with_cell_renderer(&HtmlRenderer::new().with_css_writer(sink));

        let mut out = Vec::new();
        renderer.render(&mut out, &notebook).unwrap();

        let written = css.lock().unwrap();
        assert_eq!(
            String::from_utf8_lossy(&written),
            DEFAULT_CSS,
            "stylesheet should be written exactly once"
        );
    }

    /// Test sink sharing a buffer with the assertion side.
    struct SharedSink(std::sync::Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
