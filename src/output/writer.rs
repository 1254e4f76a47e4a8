//! JSON output of run results

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Serializes `value` as JSON followed by a newline
pub fn write_json<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    value: &T,
    pretty: bool,
) -> OutputResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Writes `value` as JSON to a file, replacing any existing content
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> OutputResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_json(&mut out, value, pretty)?;
    tracing::info!("Wrote results to {}", path.display());
    Ok(())
}
