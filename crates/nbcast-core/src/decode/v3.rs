//! Decoder for the legacy worksheet-based schemas (nbformat majors 1–3).
//!
//! These revisions nest their cells inside a list of worksheets, spell code
//! source as `input`, track execution counters as `prompt_number`, declare
//! the language per code cell, and key rich output data by short format
//! names (`png`, `html`, ...) instead of mime-types. They also carry a
//! dedicated `heading` cell type, normalized into markdown here so it never
//! reaches the render stage.
//!
//! Majors 1 and 2 predate the major-3 spelling but share the document layout
//! it reads, so a single decoder registers for all three.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::value::RawValue;

use super::{Decoder, DecoderMap, MultilineString, NotebookMetadata, RawCellMetadata};
use crate::error::{NbcastError, Result};
use crate::schema::{
    Cell, CodeCell, DisplayDataOutput, ErrorOutput, ExecuteResultOutput, MarkdownCell,
    MimeBundle, RawCell, StreamOutput, Version,
};

pub(super) fn register(decoders: &mut DecoderMap) {
    for major in 1..=3 {
        decoders.insert(Version::new(major, 0), Arc::new(LegacyDecoder));
    }
}

struct LegacyDecoder;

impl Decoder for LegacyDecoder {
    fn extract_cells(&self, doc: &str) -> Result<Vec<Box<RawValue>>> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            worksheets: Vec<Worksheet>,
        }
        #[derive(Deserialize)]
        struct Worksheet {
            #[serde(default)]
            cells: Vec<Box<RawValue>>,
        }

        let document: Document = serde_json::from_str(doc)?;
        Ok(document
            .worksheets
            .into_iter()
            .flat_map(|worksheet| worksheet.cells)
            .collect())
    }

    fn decode_meta(&self, _doc: &str) -> Result<NotebookMetadata> {
        // The legacy schemas declare the language on each code cell.
        Ok(NotebookMetadata::default())
    }

    fn decode_cell(&self, record: &RawValue, _meta: &NotebookMetadata) -> Result<Cell> {
        #[derive(Deserialize)]
        struct Tag {
            cell_type: String,
        }
        let tag: Tag = serde_json::from_str(record.get())?;

        match tag.cell_type.as_str() {
            "markdown" => {
                #[derive(Deserialize)]
                struct Markdown {
                    #[serde(default)]
                    source: MultilineString,
                }
                let raw: Markdown = serde_json::from_str(record.get())?;
                Ok(Cell::Markdown(MarkdownCell {
                    source: raw.source.into_text(),
                    attachments: None,
                }))
            }
            "heading" => {
                #[derive(Deserialize)]
                struct Heading {
                    #[serde(default)]
                    source: MultilineString,
                    #[serde(default = "default_heading_level")]
                    level: usize,
                }
                let raw: Heading = serde_json::from_str(record.get())?;
                // Headings behave exactly like markdown cells, with the
                // source decorated by the level's number of heading signs.
                let mut source = "#".repeat(raw.level);
                source.push(' ');
                source.push_str(&raw.source.into_text());
                Ok(Cell::Markdown(MarkdownCell {
                    source,
                    attachments: None,
                }))
            }
            "raw" => {
                #[derive(Deserialize)]
                struct Raw {
                    #[serde(default)]
                    source: MultilineString,
                    #[serde(default)]
                    metadata: RawCellMetadata,
                }
                let raw: Raw = serde_json::from_str(record.get())?;
                Ok(Cell::Raw(RawCell {
                    source: raw.source.into_text(),
                    mime_type: raw.metadata.into_mime_type(),
                    attachments: None,
                }))
            }
            "code" => {
                #[derive(Deserialize)]
                struct Code {
                    #[serde(default)]
                    input: MultilineString,
                    #[serde(default)]
                    language: String,
                    #[serde(default)]
                    prompt_number: Option<i32>,
                    #[serde(default)]
                    outputs: Vec<Box<RawValue>>,
                }
                let raw: Code = serde_json::from_str(record.get())?;
                let outputs = raw
                    .outputs
                    .iter()
                    .map(|output| decode_output(output))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Cell::Code(CodeCell {
                    source: raw.input.into_text(),
                    language: raw.language,
                    execution_count: raw.prompt_number.unwrap_or(0),
                    outputs,
                }))
            }
            other => Err(NbcastError::UnknownCellType {
                kind: other.to_string(),
            }),
        }
    }
}

const fn default_heading_level() -> usize {
    1
}

fn decode_output(record: &RawValue) -> Result<Cell> {
    #[derive(Deserialize)]
    struct Tag {
        output_type: String,
    }
    let tag: Tag = serde_json::from_str(record.get())?;

    match tag.output_type.as_str() {
        "stream" => {
            #[derive(Deserialize)]
            struct Stream {
                #[serde(default)]
                stream: String,
                #[serde(default)]
                text: MultilineString,
            }
            let raw: Stream = serde_json::from_str(record.get())?;
            Ok(Cell::Stream(StreamOutput {
                target: raw.stream,
                source: raw.text.into_text(),
            }))
        }
        "display_data" => {
            let bundle: LegacyMimeBundle = serde_json::from_str(record.get())?;
            Ok(Cell::DisplayData(DisplayDataOutput {
                data: bundle.into_mime_bundle(),
            }))
        }
        "pyout" => {
            #[derive(Deserialize)]
            struct Pyout {
                #[serde(default)]
                prompt_number: Option<i32>,
                #[serde(flatten)]
                bundle: LegacyMimeBundle,
            }
            let raw: Pyout = serde_json::from_str(record.get())?;
            Ok(Cell::ExecuteResult(ExecuteResultOutput {
                data: raw.bundle.into_mime_bundle(),
                execution_count: raw.prompt_number.unwrap_or(0),
            }))
        }
        "pyerr" => {
            #[derive(Deserialize)]
            struct Pyerr {
                #[serde(default)]
                ename: String,
                #[serde(default)]
                evalue: String,
                #[serde(default)]
                traceback: Vec<String>,
            }
            let raw: Pyerr = serde_json::from_str(record.get())?;
            Ok(Cell::Error(ErrorOutput {
                ename: raw.ename,
                evalue: raw.evalue,
                traceback: raw.traceback,
            }))
        }
        other => Err(NbcastError::UnknownOutputType {
            kind: other.to_string(),
        }),
    }
}

/// Rich output data keyed by the legacy short format names.
#[derive(Debug, Default, Deserialize)]
struct LegacyMimeBundle {
    png: Option<MultilineString>,
    jpeg: Option<MultilineString>,
    html: Option<MultilineString>,
    svg: Option<MultilineString>,
    javascript: Option<MultilineString>,
    json: Option<MultilineString>,
    pdf: Option<MultilineString>,
    latex: Option<MultilineString>,
    text: Option<MultilineString>,
}

impl LegacyMimeBundle {
    /// Re-key the short format names to the mime-types the canonical bundle
    /// resolves on.
    fn into_mime_bundle(self) -> MimeBundle {
        let entries = [
            ("image/png", self.png),
            ("image/jpeg", self.jpeg),
            ("text/html", self.html),
            ("image/svg+xml", self.svg),
            ("text/javascript", self.javascript),
            ("application/json", self.json),
            ("application/pdf", self.pdf),
            ("application/x-latex", self.latex),
            ("text/plain", self.text),
        ];
        entries
            .into_iter()
            .filter_map(|(mime, data)| data.map(|d| (mime, d.into_text())))
            .collect()
    }
}
