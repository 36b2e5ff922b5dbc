//! Decoder for nbformat 4 documents.
//!
//! Version 4 keeps its cells in a flat top-level `cells` list and declares
//! the source language once, in `metadata.language_info.name`. Registered at
//! 4.0, it also serves the later 4.x minor revisions (which only add fields
//! this decoder does not read, such as cell ids).

use std::sync::Arc;

use serde::Deserialize;
use serde_json::value::RawValue;

use super::{Decoder, DecoderMap, MultilineString, NotebookMetadata, RawCellMetadata};
use crate::error::{NbcastError, Result};
use crate::schema::{
    Attachments, Cell, CodeCell, DisplayDataOutput, ErrorOutput, ExecuteResultOutput,
    MarkdownCell, MimeBundle, RawCell, StreamOutput, Version,
};

pub(super) fn register(decoders: &mut DecoderMap) {
    decoders.insert(Version::new(4, 0), Arc::new(V4Decoder));
}

struct V4Decoder;

impl Decoder for V4Decoder {
    fn extract_cells(&self, doc: &str) -> Result<Vec<Box<RawValue>>> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(default)]
            cells: Vec<Box<RawValue>>,
        }
        let document: Document = serde_json::from_str(doc)?;
        Ok(document.cells)
    }

    fn decode_meta(&self, doc: &str) -> Result<NotebookMetadata> {
        #[derive(Deserialize, Default)]
        struct Document {
            #[serde(default)]
            metadata: Metadata,
        }
        #[derive(Deserialize, Default)]
        struct Metadata {
            language_info: Option<LanguageInfo>,
        }
        #[derive(Deserialize)]
        struct LanguageInfo {
            #[serde(default)]
            name: String,
        }

        let document: Document = serde_json::from_str(doc)?;
        Ok(NotebookMetadata {
            language: document
                .metadata
                .language_info
                .map(|info| info.name)
                .unwrap_or_default(),
        })
    }

    fn decode_cell(&self, record: &RawValue, meta: &NotebookMetadata) -> Result<Cell> {
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
                    attachments: Option<Attachments>,
                }
                let raw: Markdown = serde_json::from_str(record.get())?;
                Ok(Cell::Markdown(MarkdownCell {
                    source: raw.source.into_text(),
                    attachments: raw.attachments,
                }))
            }
            "raw" => {
                #[derive(Deserialize)]
                struct Raw {
                    #[serde(default)]
                    source: MultilineString,
                    #[serde(default)]
                    metadata: RawCellMetadata,
                    attachments: Option<Attachments>,
                }
                let raw: Raw = serde_json::from_str(record.get())?;
                Ok(Cell::Raw(RawCell {
                    source: raw.source.into_text(),
                    mime_type: raw.metadata.into_mime_type(),
                    attachments: raw.attachments,
                }))
            }
            "code" => {
                #[derive(Deserialize)]
                struct Code {
                    #[serde(default)]
                    source: MultilineString,
                    #[serde(default)]
                    execution_count: Option<i32>,
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
                    source: raw.source.into_text(),
                    language: meta.language.clone(),
                    execution_count: raw.execution_count.unwrap_or(0),
                    outputs,
                }))
            }
            other => Err(NbcastError::UnknownCellType {
                kind: other.to_string(),
            }),
        }
    }
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
                name: String,
                #[serde(default)]
                text: MultilineString,
            }
            let raw: Stream = serde_json::from_str(record.get())?;
            Ok(Cell::Stream(StreamOutput {
                target: raw.name,
                source: raw.text.into_text(),
            }))
        }
        "display_data" => {
            #[derive(Deserialize)]
            struct DisplayData {
                #[serde(default)]
                data: MimeBundle,
            }
            let raw: DisplayData = serde_json::from_str(record.get())?;
            Ok(Cell::DisplayData(DisplayDataOutput { data: raw.data }))
        }
        "execute_result" => {
            #[derive(Deserialize)]
            struct ExecuteResult {
                #[serde(default)]
                data: MimeBundle,
                #[serde(default)]
                execution_count: Option<i32>,
            }
            let raw: ExecuteResult = serde_json::from_str(record.get())?;
            Ok(Cell::ExecuteResult(ExecuteResultOutput {
                data: raw.data,
                execution_count: raw.execution_count.unwrap_or(0),
            }))
        }
        "error" => {
            #[derive(Deserialize)]
            struct Error {
                #[serde(default)]
                ename: String,
                #[serde(default)]
                evalue: String,
                #[serde(default)]
                traceback: Vec<String>,
            }
            let raw: Error = serde_json::from_str(record.get())?;
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
