//! CSV export of display records.

use crate::error::Result;
use crate::record::DisplayRecord;
use std::path::Path;
use tracing::info;

/// Write records to `path` with a header row. Nothing is written for an empty slice.
pub fn save_csv<'a, I>(path: &Path, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a DisplayRecord>,
{
    let mut records = records.into_iter().peekable();
    if records.peek().is_none() {
        info!(path = %path.display(), "No records to save");
        return Ok(0);
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let mut written = 0;
    for record in records {
        wtr.serialize(record)?;
        written += 1;
    }
    wtr.flush()?;

    info!(path = %path.display(), count = written, "Saved CSV");
    Ok(written)
}
