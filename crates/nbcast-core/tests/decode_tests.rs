//! Integration tests for the multi-version decode engine.
//!
//! Documents for every supported nbformat revision are decoded into the
//! canonical model and checked cell by cell: reported type, mime-type, text,
//! and the optional capabilities.

use nbcast_core::schema::mime;
use nbcast_core::schema::CellType;
use nbcast_core::{decode, Cell, NbcastError};

fn check_cell(cell: &Cell, cell_type: CellType, mime_type: &str, text: &str) {
    assert_eq!(cell.cell_type(), cell_type, "reported cell type");
    assert_eq!(cell.mime_type(), mime_type, "reported mime type");
    assert_eq!(cell.text(), text, "cell text");
}

#[test]
fn test_every_supported_version_decodes_all_cells() {
    let flat = |minor: u32| {
        format!(
            r#"{{
                "nbformat": 4, "nbformat_minor": {minor}, "metadata": {{}}, "cells": [
                    {{"cell_type": "markdown", "metadata": {{}}, "source": []}},
                    {{"cell_type": "markdown", "metadata": {{}}, "source": []}}
                ]
            }}"#
        )
    };
    let worksheets = |major: u32| {
        format!(
            r#"{{
                "nbformat": {major}, "nbformat_minor": 0, "metadata": {{}}, "worksheets": [
                    {{"cells": [
                        {{"cell_type": "markdown", "metadata": {{}}, "source": []}},
                        {{"cell_type": "markdown", "metadata": {{}}, "source": []}}
                    ]}},
                    {{"cells": [
                        {{"cell_type": "markdown", "metadata": {{}}, "source": []}}
                    ]}}
                ]
            }}"#
        )
    };

    let cases: Vec<(String, String, usize)> = (0..=5)
        .map(|minor| (format!("v4.{minor}"), flat(minor), 2))
        .chain((1..=3).map(|major| (format!("v{major}.0"), worksheets(major), 3)))
        .collect();

    for (name, json, n_cells) in cases {
        let notebook = decode(json.as_bytes())
            .unwrap_or_else(|err| panic!("{name}: decode failed: {err}"));
        assert_eq!(notebook.cells().len(), n_cells, "{name}: cell count");
        for cell in notebook.cells() {
            assert_eq!(cell.cell_type(), CellType::Markdown, "{name}");
        }
    }
}

#[test]
fn test_worksheet_order_is_preserved() {
    let json = br#"{
        "nbformat": 3, "nbformat_minor": 0, "metadata": {}, "worksheets": [
            {"cells": [{"cell_type": "markdown", "source": ["first"]}]},
            {"cells": [{"cell_type": "markdown", "source": ["second"]}]}
        ]
    }"#;

    let notebook = decode(json).unwrap();
    assert_eq!(notebook.cells()[0].text(), "first");
    assert_eq!(notebook.cells()[1].text(), "second");
}

#[test]
fn test_markdown_cell_with_attachments() {
    let json = br#"{
        "nbformat": 4, "nbformat_minor": 4, "metadata": {}, "cells": [
            {"cell_type": "markdown", "metadata": {}, "source": [
                "Look", " at ", "me: ![alt](attachment:photo.png)"
            ], "attachments": {
                "photo.png": {
                    "image/png": "base64-encoded-image-data"
                }
            }}
        ]
    }"#;

    let notebook = decode(json).unwrap();
    let cell = &notebook.cells()[0];
    check_cell(
        cell,
        CellType::Markdown,
        mime::MARKDOWN_TEXT,
        "Look at me: ![alt](attachment:photo.png)",
    );

    let attachments = cell.attachments().expect("attachments capability");
    let bundle = attachments
        .mime_bundle("photo.png")
        .expect("photo.png attachment");
    assert_eq!(bundle.mime_type(), "image/png");
    assert_eq!(bundle.text(), "base64-encoded-image-data");
}

#[test]
fn test_markdown_cell_without_attachments_lacks_the_capability() {
    let json = br#"{
        "nbformat": 4, "nbformat_minor": 4, "metadata": {}, "cells": [
            {"cell_type": "markdown", "metadata": {}, "source": ["plain"]}
        ]
    }"#;

    let notebook = decode(json).unwrap();
    assert!(notebook.cells()[0].attachments().is_none());
}

#[test]
fn test_raw_cell_mime_precedence() {
    let cases: &[(&str, &[u8], &str, &str)] = &[
        (
            "no explicit mime-type",
            br#"{
                "nbformat": 4, "nbformat_minor": 4, "metadata": {}, "cells": [
                    {"cell_type": "raw", "source": ["Plain as the nose on your face"]}
                ]
            }"#,
            mime::PLAIN_TEXT,
            "Plain as the nose on your face",
        ),
        (
            "metadata.format has specific mime-type",
            br#"{
                "nbformat": 4, "nbformat_minor": 4, "metadata": {}, "cells": [
                    {"cell_type": "raw", "metadata": {"format": "text/html"}, "source": ["<p>Hi, mom!</p>"]}
                ]
            }"#,
            "text/html",
            "<p>Hi, mom!</p>",
        ),
        (
            "metadata.raw_mimetype has specific mime-type",
            br#"{
                "nbformat": 4, "nbformat_minor": 4, "metadata": {}, "cells": [
                    {"cell_type": "raw", "metadata": {"raw_mimetype": "application/x-latex"}, "source": ["$$"]}
                ]
            }"#,
            "application/x-latex",
            "$$",
        ),
        (
            "format wins over raw_mimetype",
            br#"{
                "nbformat": 4, "nbformat_minor": 4, "metadata": {}, "cells": [
                    {"cell_type": "raw", "metadata": {"format": "text/restructuredtext", "raw_mimetype": "text/html"}, "source": [""]}
                ]
            }"#,
            "text/restructuredtext",
            "",
        ),
        (
            "v3 raw cell without mime-type",
            br#"{
                "nbformat": 3, "nbformat_minor": 0, "metadata": {}, "worksheets": [
                    {"cells": [
                        {"cell_type": "raw", "source": ["just passing through"]}
                    ]}
                ]
            }"#,
            mime::PLAIN_TEXT,
            "just passing through",
        ),
    ];

    for &(name, json, mime_type, text) in cases {
        let notebook = decode(json).unwrap_or_else(|err| panic!("{name}: {err}"));
        assert_eq!(notebook.cells().len(), 1, "{name}");
        check_cell(&notebook.cells()[0], CellType::Raw, mime_type, text);
    }
}

#[test]
fn test_code_cell_v4_reads_notebook_language() {
    let json = br#"{
        "nbformat": 4, "nbformat_minor": 4,
        "metadata": {"language_info": {"name": "javascript"}},
        "cells": [
            {
                "cell_type": "code", "execution_count": 5,
                "source": ["print('Hi, mom!')"], "outputs": [
                    {"output_type": "stream", "name": "stdout"},
                    {"output_type": "stream", "name": "stderr"}
                ]
            }
        ]
    }"#;

    let notebook = decode(json).unwrap();
    let cell = &notebook.cells()[0];
    check_cell(cell, CellType::Code, mime::CODE, "print('Hi, mom!')");
    assert_eq!(cell.language(), Some("javascript"));
    assert_eq!(cell.execution_count(), Some(5));
    assert_eq!(cell.outputs().map(<[Cell]>::len), Some(2));
}

#[test]
fn test_code_cell_v3_reads_cell_language_and_prompt_number() {
    let json = br#"{
        "nbformat": 3, "nbformat_minor": 0, "metadata": {}, "worksheets": [
            {"cells": [
                {
                    "cell_type": "code", "language": "javascript", "prompt_number": 5,
                    "input": ["print('Hi, mom!')"], "outputs": [
                        {"output_type": "stream", "stream": "stdout"},
                        {"output_type": "stream", "stream": "stderr"}
                    ]
                }
            ]}
        ]
    }"#;

    let notebook = decode(json).unwrap();
    let cell = &notebook.cells()[0];
    check_cell(cell, CellType::Code, mime::CODE, "print('Hi, mom!')");
    assert_eq!(cell.language(), Some("javascript"));
    assert_eq!(cell.execution_count(), Some(5));
    assert_eq!(cell.outputs().map(<[Cell]>::len), Some(2));
}

#[test]
fn test_code_cell_without_execution_count_reports_zero() {
    let json = br#"{
        "nbformat": 4, "nbformat_minor": 4, "metadata": {}, "cells": [
            {"cell_type": "code", "source": ["pass"], "outputs": []}
        ]
    }"#;

    let notebook = decode(json).unwrap();
    assert_eq!(notebook.cells()[0].execution_count(), Some(0));
}

fn first_cell_outputs(json: &[u8]) -> Vec<Cell> {
    let notebook = decode(json).unwrap();
    notebook.cells()[0]
        .outputs()
        .expect("code cell outputs")
        .to_vec()
}

#[test]
fn test_stream_output_target_mapping() {
    let cases: &[(&str, &[u8], &str, &str)] = &[
        (
            "v4 stdout",
            br#"{
                "nbformat": 4, "nbformat_minor": 4, "metadata": {},
                "cells": [
                    {"cell_type": "code", "outputs": [
                        {"output_type": "stream", "name": "stdout",
                         "text": ["$> ls\n", ".\n", "..\n", "nb/"]}
                    ]}
                ]
            }"#,
            mime::STDOUT,
            "$> ls\n.\n..\nnb/",
        ),
        (
            "v3 stdout",
            br#"{
                "nbformat": 3, "nbformat_minor": 0, "metadata": {}, "worksheets": [
                    {"cells": [
                        {"cell_type": "code", "outputs": [
                            {"output_type": "stream", "stream": "stdout",
                             "text": ["$> ls\n", ".\n", "..\n", "nb/"]}
                        ]}
                    ]}
                ]
            }"#,
            mime::STDOUT,
            "$> ls\n.\n..\nnb/",
        ),
        (
            "v4 stderr",
            br#"{
                "nbformat": 4, "nbformat_minor": 4, "metadata": {},
                "cells": [
                    {"cell_type": "code", "outputs": [
                        {"output_type": "stream", "name": "stderr",
                         "text": ["KeyError: ", "dict['unknown key']"]}
                    ]}
                ]
            }"#,
            mime::STDERR,
            "KeyError: dict['unknown key']",
        ),
        (
            "v4 unrecognized target",
            br#"{
                "nbformat": 4, "nbformat_minor": 4, "metadata": {},
                "cells": [
                    {"cell_type": "code", "outputs": [
                        {"output_type": "stream", "name": "unknown",
                         "text": ["print me please..."]}
                    ]}
                ]
            }"#,
            mime::PLAIN_TEXT,
            "print me please...",
        ),
    ];

    for &(name, json, mime_type, text) in cases {
        let outputs = first_cell_outputs(json);
        assert_eq!(outputs.len(), 1, "{name}");
        check_cell(&outputs[0], CellType::Stream, mime_type, text);
    }
}

#[test]
fn test_display_data_resolves_richest_mime_v4() {
    let json = br#"{
        "nbformat": 4, "nbformat_minor": 4, "metadata": {},
        "cells": [
            {"cell_type": "code", "outputs": [
                {"output_type": "display_data", "metadata": {},
                    "data": {
                        "image/png": "base64-encoded-png-image",
                        "text/plain": "<Figure size 640x480 with 1 Axes>"
                    }
                },
                {"output_type": "display_data", "metadata": {},
                    "data": {
                        "image/jpeg": "base64-encoded-jpeg-image",
                        "text/plain": "<Figure size 100x500 with 2 Axes>"
                    }
                },
                {"output_type": "display_data", "metadata": {},
                    "data": {
                        "text/plain": "<Image url='https://image.com/?id=123' height=500>"
                    }
                }
            ]}
        ]
    }"#;

    let outputs = first_cell_outputs(json);
    assert_eq!(outputs.len(), 3);
    check_cell(
        &outputs[0],
        CellType::DisplayData,
        "image/png",
        "base64-encoded-png-image",
    );
    check_cell(
        &outputs[1],
        CellType::DisplayData,
        "image/jpeg",
        "base64-encoded-jpeg-image",
    );
    check_cell(
        &outputs[2],
        CellType::DisplayData,
        mime::PLAIN_TEXT,
        "<Image url='https://image.com/?id=123' height=500>",
    );
}

#[test]
fn test_display_data_recognized_formats_v3() {
    let json = br#"{
        "nbformat": 3, "nbformat_minor": 0, "metadata": {}, "worksheets": [
            {"cells": [
                {"cell_type": "code", "outputs": [
                    {"output_type": "display_data", "metadata": {},
                        "png": ["base64-encoded-png-image"],
                        "text": ["<Figure size 640x480 with 1 Axes>"]
                    },
                    {"output_type": "display_data", "metadata": {},
                        "html": ["<img />"]
                    },
                    {"output_type": "display_data", "metadata": {},
                        "svg": ["<svg />"]
                    },
                    {"output_type": "display_data", "metadata": {},
                        "javascript": ["[,,,].length"]
                    },
                    {"output_type": "display_data", "metadata": {},
                        "json": ["{\"foo\": \"bar\"}"]
                    },
                    {"output_type": "display_data", "metadata": {},
                        "pdf": ["some-raw-pdf-data"]
                    },
                    {"output_type": "display_data", "metadata": {},
                        "latex": ["c = \\sqrt{a^2 + b^2}"]
                    },
                    {"output_type": "display_data", "metadata": {},
                        "text": ["<Image url='https://image.com/?id=123' height=500>"]
                    }
                ]}
            ]}
        ]
    }"#;

    let outputs = first_cell_outputs(json);
    let want: &[(&str, &str)] = &[
        ("image/png", "base64-encoded-png-image"),
        ("text/html", "<img />"),
        ("image/svg+xml", "<svg />"),
        ("text/javascript", "[,,,].length"),
        ("application/json", "{\"foo\": \"bar\"}"),
        ("application/pdf", "some-raw-pdf-data"),
        ("application/x-latex", "c = \\sqrt{a^2 + b^2}"),
        (mime::PLAIN_TEXT, "<Image url='https://image.com/?id=123' height=500>"),
    ];

    assert_eq!(outputs.len(), want.len());
    for (output, &(mime_type, text)) in outputs.iter().zip(want) {
        check_cell(output, CellType::DisplayData, mime_type, text);
    }
}

#[test]
fn test_execute_result_carries_execution_count_v4() {
    let json = br#"{
        "nbformat": 4, "nbformat_minor": 4, "metadata": {},
        "cells": [
            {"cell_type": "code", "outputs": [
                {"output_type": "execute_result", "metadata": {},
                    "execution_count": 13,
                    "data": {"text/html": "<p>Base thirteen!</p>"}
                },
                {"output_type": "execute_result", "metadata": {},
                    "execution_count": 42,
                    "data": {"text/plain": "<MeaningOfLife question='???'>"}
                }
            ]}
        ]
    }"#;

    let outputs = first_cell_outputs(json);
    check_cell(
        &outputs[0],
        CellType::ExecuteResult,
        "text/html",
        "<p>Base thirteen!</p>",
    );
    assert_eq!(outputs[0].execution_count(), Some(13));
    check_cell(
        &outputs[1],
        CellType::ExecuteResult,
        mime::PLAIN_TEXT,
        "<MeaningOfLife question='???'>",
    );
    assert_eq!(outputs[1].execution_count(), Some(42));
}

#[test]
fn test_pyout_is_execute_result_v3() {
    let json = br#"{
        "nbformat": 3, "nbformat_minor": 0, "metadata": {}, "worksheets": [
            {"cells": [
                {"cell_type": "code", "outputs": [
                    {"output_type": "pyout", "metadata": {},
                        "prompt_number": 42,
                        "jpeg": ["base64-encoded-jpeg-image"],
                        "text": ["<Figure size 100x500 with 2 Axes>"]
                    },
                    {"output_type": "pyout", "metadata": {},
                        "pdf": ["some-raw-pdf-data"]
                    }
                ]}
            ]}
        ]
    }"#;

    let outputs = first_cell_outputs(json);
    check_cell(
        &outputs[0],
        CellType::ExecuteResult,
        "image/jpeg",
        "base64-encoded-jpeg-image",
    );
    assert_eq!(outputs[0].execution_count(), Some(42));
    // prompt_number missing: zero means "unknown", never an error.
    check_cell(
        &outputs[1],
        CellType::ExecuteResult,
        "application/pdf",
        "some-raw-pdf-data",
    );
    assert_eq!(outputs[1].execution_count(), Some(0));
}

#[test]
fn test_error_output_joins_traceback() {
    let traceback = "Traceback (most recent call last):\n\tFile \"main.py\", line 3, in <module>\n\t\tprint(n/0)\n\tZeroDivisionError: division by zero";

    let v4 = br#"{
        "nbformat": 4, "nbformat_minor": 4, "metadata": {},
        "cells": [
            {"cell_type": "code", "outputs": [
                {
                    "output_type": "error", "ename": "ZeroDivisionError", "evalue": "division by zero",
                    "traceback": [
                        "Traceback (most recent call last):",
                        "\tFile \"main.py\", line 3, in <module>",
                        "\t\tprint(n/0)",
                        "\tZeroDivisionError: division by zero"
                    ]
                }
            ]}
        ]
    }"#;
    let v3 = br#"{
        "nbformat": 3, "nbformat_minor": 0, "metadata": {}, "worksheets": [
            {"cells": [
                {"cell_type": "code", "outputs": [
                    {
                        "output_type": "pyerr", "ename": "ZeroDivisionError", "evalue": "division by zero",
                        "traceback": [
                            "Traceback (most recent call last):",
                            "\tFile \"main.py\", line 3, in <module>",
                            "\t\tprint(n/0)",
                            "\tZeroDivisionError: division by zero"
                        ]
                    }
                ]}
            ]}
        ]
    }"#;

    for json in [v4.as_slice(), v3.as_slice()] {
        let outputs = first_cell_outputs(json);
        assert_eq!(outputs.len(), 1);
        check_cell(&outputs[0], CellType::Error, mime::STDERR, traceback);
    }
}

#[test]
fn test_legacy_heading_normalizes_to_markdown() {
    let json = br#"{
        "nbformat": 3, "nbformat_minor": 0, "metadata": {}, "worksheets": [
            {"cells": [
                {
                    "cell_type": "heading", "level": 2,
                    "source": ["Fun facts about Ronald McDonald"], "metadata": {}
                }
            ]}
        ]
    }"#;

    let notebook = decode(json).unwrap();
    assert_eq!(notebook.cells().len(), 1);
    check_cell(
        &notebook.cells()[0],
        CellType::Markdown,
        mime::MARKDOWN_TEXT,
        "## Fun facts about Ronald McDonald",
    );
}

#[test]
fn test_unsupported_major_version_is_rejected() {
    let json = br#"{"nbformat": 9, "nbformat_minor": 0, "metadata": {}, "cells": []}"#;
    match decode(json) {
        Err(NbcastError::UnsupportedVersion { major: 9, minor: 0 }) => {}
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn test_unseen_minor_revision_uses_same_major_decoder() {
    let json = br#"{
        "nbformat": 4, "nbformat_minor": 9, "metadata": {}, "cells": [
            {"cell_type": "markdown", "metadata": {}, "source": ["still fine"]}
        ]
    }"#;
    let notebook = decode(json).unwrap();
    assert_eq!(notebook.version().to_string(), "4.9");
    assert_eq!(notebook.cells()[0].text(), "still fine");
}

#[test]
fn test_unknown_cell_type_fails_with_position() {
    let json = br#"{
        "nbformat": 4, "nbformat_minor": 4, "metadata": {}, "cells": [
            {"cell_type": "markdown", "metadata": {}, "source": ["fine"]},
            {"cell_type": "hologram", "metadata": {}, "source": ["not fine"]}
        ]
    }"#;

    let err = decode(json).unwrap_err();
    assert_eq!(err.to_string(), "cell 1: unknown cell type \"hologram\"");
}

#[test]
fn test_unknown_output_type_fails_the_decode() {
    let json = br#"{
        "nbformat": 4, "nbformat_minor": 4, "metadata": {}, "cells": [
            {"cell_type": "code", "outputs": [
                {"output_type": "telepathy"}
            ]}
        ]
    }"#;

    let err = decode(json).unwrap_err();
    assert_eq!(err.to_string(), "cell 0: unknown output type \"telepathy\"");
}

#[test]
fn test_malformed_json_fails_the_decode() {
    assert!(matches!(
        decode(b"{not json"),
        Err(NbcastError::Json(_))
    ));
}

#[test]
fn test_decoding_is_deterministic() {
    let json = br##"{
        "nbformat": 4, "nbformat_minor": 5, "metadata": {}, "cells": [
            {"id": "a", "cell_type": "markdown", "metadata": {}, "source": ["# Title"]},
            {"id": "b", "cell_type": "code", "metadata": {}, "execution_count": 1,
             "source": ["1 + 1"], "outputs": [
                {"output_type": "execute_result", "execution_count": 1,
                 "metadata": {}, "data": {"text/plain": "2"}}
            ]}
        ]
    }"##;

    let first = decode(json).unwrap();
    let second = decode(json).unwrap();
    assert_eq!(first, second);
}
