// src/output.rs
// =============================================================================
// Renders a finished crawl for people and for programs.
//
// Text format, one block per page in extraction order:
//
//   URL: https://example.com/a
//
//   <extracted text>
//
//   ================================ ... (80 '=')
//
// JSON format: the whole CrawlReport (outcome, visited count, pages).
// =============================================================================

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::crawl::{CrawlReport, CrawlResult};

const SEPARATOR_WIDTH: usize = 80;

// Writes every page as a text block
pub fn write_text<W: Write>(result: &CrawlResult, mut writer: W) -> std::io::Result<()> {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    for page in result.iter() {
        write!(writer, "URL: {}\n\n{}\n\n{}\n\n", page.url, page.text, separator)?;
    }
    writer.flush()
}

// Saves the text rendering to `path`, replacing any existing file
pub fn save_text(result: &CrawlResult, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    write_text(result, BufWriter::new(file))
        .with_context(|| format!("failed to write output file {}", path.display()))
}

/// Pretty-printed JSON for the whole report
pub fn to_json(report: &CrawlReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
