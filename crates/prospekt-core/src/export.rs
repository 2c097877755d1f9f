//! JSON export of collected prospects

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::types::Prospect;

/// Write `prospects` to `path` as one JSON array, replacing any existing file.
///
/// # Errors
/// `ProspektError::Io` if the file cannot be written,
/// `ProspektError::Json` if encoding fails.
pub fn write_json(path: impl AsRef<Path>, prospects: &[Prospect]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, prospects)?;
    writer.flush()?;

    info!(path = %path.display(), count = prospects.len(), "prospects exported");
    Ok(())
}
