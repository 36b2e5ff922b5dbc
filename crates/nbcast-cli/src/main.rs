//! nbcast CLI - convert Jupyter notebooks to HTML from the command line.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use nbcast_core::{Converter, Renderer};
use nbcast_html::{HtmlRenderer, DEFAULT_CSS};
use nbcast_markdown::MarkdownExtension;

/// Convert a Jupyter notebook (.ipynb) to HTML.
#[derive(Debug, Parser)]
#[command(name = "nbcast", version, about)]
struct Args {
    /// Notebook file to convert
    input: PathBuf,

    /// Output file (defaults to the input path with an .html extension;
    /// use "-" for stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit a complete HTML page with the bundled stylesheet embedded,
    /// instead of a bare fragment
    #[arg(long)]
    standalone: bool,

    /// Stick to CommonMark when rendering markdown cells (tables,
    /// strikethrough, task lists, and footnotes are enabled otherwise)
    #[arg(long)]
    plain_markdown: bool,

    /// Suppress the conversion summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let source = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let markdown = if args.plain_markdown {
        MarkdownExtension::default()
    } else {
        MarkdownExtension::extended()
    };
    let converter = Converter::new(
        Renderer::new()
            .with_cell_renderer(&HtmlRenderer::new())
            .with_cell_renderer(&markdown),
    );

    let mut body = Vec::new();
    converter
        .convert(&mut body, &source)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;

    let rendered = if args.standalone {
        standalone_page(&body)
    } else {
        body
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| smart_output_path(&args.input));
    if output == Path::new("-") {
        std::io::stdout()
            .write_all(&rendered)
            .context("failed to write to stdout")?;
        return Ok(());
    }

    fs::write(&output, &rendered)
        .with_context(|| format!("failed to write {}", output.display()))?;

    if !args.quiet {
        println!(
            "{} {} {} {} ({} bytes)",
            "Converted".green().bold(),
            args.input.display(),
            "->".dimmed(),
            output.display(),
            rendered.len()
        );
    }
    Ok(())
}

/// Derive the output path from the input file: "analysis.ipynb" becomes
/// "analysis.html" next to it.
fn smart_output_path(input: &Path) -> PathBuf {
    input.with_extension("html")
}

/// Wrap a rendered fragment in a complete HTML page with the bundled
/// stylesheet inlined.
fn standalone_page(body: &[u8]) -> Vec<u8> {
    let mut page = Vec::with_capacity(body.len() + DEFAULT_CSS.len() + 256);
    page.extend_from_slice(
        b"<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<style>\n",
    );
    page.extend_from_slice(DEFAULT_CSS.as_bytes());
    page.extend_from_slice(b"</style>\n</head>\n<body class=\"jp-Notebook\">\n");
    page.extend_from_slice(body);
    page.extend_from_slice(b"</body>\n</html>\n");
    page
}
