//! The canonical, version-independent notebook model.
//!
//! Version decoders normalize every supported nbformat revision into this
//! one representation; renderers only ever see it. Cells are polymorphic
//! over a capability set rather than a type hierarchy: every cell reports a
//! type, a mime-type, and text, and the optional capabilities (outputs,
//! execution count, language, attachments) are reached through accessors
//! returning `Option`.

pub mod mime;
mod version;

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Deserialize;

pub use mime::MimeBundle;
pub use version::Version;

/// A decoded notebook: an ordered sequence of cells plus the schema revision
/// the source document declared.
///
/// Notebooks are immutable once decoded; the cell list is only reachable by
/// shared reference, so a decoded value can be rendered from any number of
/// threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notebook {
    version: Version,
    cells: Vec<Cell>,
}

impl Notebook {
    /// Assemble a notebook from decoded cells. Cell order is significant and
    /// preserved.
    #[must_use]
    pub fn new(version: Version, cells: Vec<Cell>) -> Self {
        Self { version, cells }
    }

    /// The schema revision the source document declared.
    #[inline]
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// The cells in document order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// The closed set of canonical cell types.
///
/// Rendering is mime-type-pattern-driven, not enum-driven: the type narrows
/// which preferences can match, the mime-type decides between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Markdown prose.
    Markdown,
    /// Raw passthrough content.
    Raw,
    /// Executable source code.
    Code,
    /// Stream output (stdout/stderr) of a code cell.
    Stream,
    /// Rich display output of a code cell.
    DisplayData,
    /// The returned result of executing a code cell.
    ExecuteResult,
    /// A failed execution's traceback.
    Error,
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Markdown => "markdown",
            Self::Raw => "raw",
            Self::Code => "code",
            Self::Stream => "stream",
            Self::DisplayData => "display_data",
            Self::ExecuteResult => "execute_result",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// One canonical unit of notebook content: a source cell or one execution
/// output of a code cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Markdown prose.
    Markdown(MarkdownCell),
    /// Raw passthrough content with an optional explicit target mime-type.
    Raw(RawCell),
    /// Executable source code with its outputs.
    Code(CodeCell),
    /// Stream output.
    Stream(StreamOutput),
    /// Rich display output.
    DisplayData(DisplayDataOutput),
    /// Execution result output.
    ExecuteResult(ExecuteResultOutput),
    /// Error traceback output.
    Error(ErrorOutput),
}

impl Cell {
    /// The canonical type of this cell.
    #[must_use]
    pub fn cell_type(&self) -> CellType {
        match self {
            Self::Markdown(_) => CellType::Markdown,
            Self::Raw(_) => CellType::Raw,
            Self::Code(_) => CellType::Code,
            Self::Stream(_) => CellType::Stream,
            Self::DisplayData(_) => CellType::DisplayData,
            Self::ExecuteResult(_) => CellType::ExecuteResult,
            Self::Error(_) => CellType::Error,
        }
    }

    /// The concrete mime-type of this cell's content. Never empty; callers
    /// must not assume a closed set of values.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Markdown(_) => mime::MARKDOWN_TEXT,
            Self::Raw(raw) => &raw.mime_type,
            Self::Code(_) => mime::CODE,
            Self::Stream(stream) => match stream.target.as_str() {
                "stdout" => mime::STDOUT,
                "stderr" => mime::STDERR,
                _ => mime::PLAIN_TEXT,
            },
            Self::DisplayData(dd) => dd.data.mime_type(),
            Self::ExecuteResult(ex) => ex.data.mime_type(),
            Self::Error(_) => mime::STDERR,
        }
    }

    /// The decoded content of this cell.
    ///
    /// Multi-line source fields were joined at decode time with no added
    /// delimiter; error outputs join their traceback lines with `\n`.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Markdown(md) => Cow::Borrowed(md.source.as_str()),
            Self::Raw(raw) => Cow::Borrowed(raw.source.as_str()),
            Self::Code(code) => Cow::Borrowed(code.source.as_str()),
            Self::Stream(stream) => Cow::Borrowed(stream.source.as_str()),
            Self::DisplayData(dd) => Cow::Borrowed(dd.data.text()),
            Self::ExecuteResult(ex) => Cow::Borrowed(ex.data.text()),
            Self::Error(err) => Cow::Owned(err.traceback.join("\n")),
        }
    }

    /// Outputs capability: the ordered execution outputs of this cell.
    /// Only code cells carry it.
    #[must_use]
    pub fn outputs(&self) -> Option<&[Cell]> {
        match self {
            Self::Code(code) => Some(&code.outputs),
            _ => None,
        }
    }

    /// Execution-count capability: the execution counter of a code cell or
    /// execute-result output. Zero means "unknown", never an error.
    #[must_use]
    pub fn execution_count(&self) -> Option<i32> {
        match self {
            Self::Code(code) => Some(code.execution_count),
            Self::ExecuteResult(ex) => Some(ex.execution_count),
            _ => None,
        }
    }

    /// Language capability: the source language a code cell was written in,
    /// as declared by the notebook (empty when undeclared).
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Code(code) => Some(&code.language),
            _ => None,
        }
    }

    /// Attachments capability: inline attachments of a markdown or raw cell.
    ///
    /// `None` means the source record carried no attachments field at all;
    /// the capability is then unsupported for this cell instance rather than
    /// an empty set.
    #[must_use]
    pub fn attachments(&self) -> Option<&Attachments> {
        match self {
            Self::Markdown(md) => md.attachments.as_ref(),
            Self::Raw(raw) => raw.attachments.as_ref(),
            _ => None,
        }
    }
}

/// A markdown prose cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkdownCell {
    /// Joined markdown source.
    pub source: String,
    /// Inline attachments, when the source record carried the field.
    pub attachments: Option<Attachments>,
}

/// A raw passthrough cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    /// Joined raw source.
    pub source: String,
    /// Target mime-type: the cell metadata's explicit override when present,
    /// `text/plain` otherwise.
    pub mime_type: String,
    /// Inline attachments, when the source record carried the field.
    pub attachments: Option<Attachments>,
}

/// An executable code cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeCell {
    /// Joined source code.
    pub source: String,
    /// Declared source language, verbatim from notebook metadata.
    pub language: String,
    /// Execution counter; 0 when the document did not record one.
    pub execution_count: i32,
    /// Execution outputs in document order.
    pub outputs: Vec<Cell>,
}

/// Plain text written by the executed code to an output stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamOutput {
    /// Stream target; `stdout` and `stderr` map to the synthetic stream
    /// mime-types, anything else reports `text/plain`.
    pub target: String,
    /// Joined stream text.
    pub source: String,
}

/// A rich display output produced while the parent cell ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayDataOutput {
    /// Alternative encodings of the displayed payload.
    pub data: MimeBundle,
}

/// The returned value of executing the parent cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteResultOutput {
    /// Alternative encodings of the result payload.
    pub data: MimeBundle,
    /// Execution counter; 0 when the document did not record one.
    pub execution_count: i32,
}

/// The traceback of a failed execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorOutput {
    /// Exception name.
    pub ename: String,
    /// Exception value.
    pub evalue: String,
    /// Traceback lines; the cell's text is these joined with `\n`.
    pub traceback: Vec<String>,
}

/// Lookup from attachment filename to the bundle of its encodings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Attachments {
    bundles: BTreeMap<String, MimeBundle>,
}

impl Attachments {
    /// The encodings attached under `filename`, if any.
    #[must_use]
    pub fn mime_bundle(&self, filename: &str) -> Option<&MimeBundle> {
        self.bundles.get(filename)
    }

    /// Iterate over `(filename, bundle)` pairs in filename order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MimeBundle)> {
        self.bundles.iter().map(|(name, mb)| (name.as_str(), mb))
    }
}
