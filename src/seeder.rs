//! SQL seeder file generation
//!
//! Produces a psql-replayable file with one multi-row INSERT per batch, using
//! the same batching and column order as the database path.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::{AppError, AppResult};
use crate::models::{ItemRecord, COLUMN_COUNT, TABLE_NAME};
use crate::sql::{compute_batch_size, insert_prefix, literal_tuple, partition, TIMESTAMP_FORMAT};

/// Outcome of a seeder run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeederSummary {
    pub path: PathBuf,
    pub batch_size: usize,
    pub batches: usize,
    pub items: usize,
}

/// Writes the seeder file for `items` to `path`, stamped with the local time.
///
/// Unlike the database path, empty input is an error (`AppError::NoItems`).
/// A failed write leaves whatever was already written in place. The output is
/// flushed after the header and after every batch, so a write error names the
/// batch whose bytes failed.
pub fn write_seeder(items: &[ItemRecord], path: &Path, param_limit: usize) -> AppResult<SeederSummary> {
    write_seeder_at(items, path, param_limit, Local::now().naive_local())
}

/// Same as [`write_seeder`] with an explicit generation time.
pub fn write_seeder_at(
    items: &[ItemRecord],
    path: &Path,
    param_limit: usize,
    generated_at: NaiveDateTime,
) -> AppResult<SeederSummary> {
    if items.is_empty() {
        return Err(AppError::NoItems);
    }

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| AppError::seeder_write(format!("creating seeder directory {}", dir.display()), e))?;
    }

    let file = File::create(path)
        .map_err(|e| AppError::seeder_write(format!("creating seeder file {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);

    let batches = write_seeder_to(&mut writer, items, param_limit, generated_at)?;
    writer
        .flush()
        .map_err(|e| AppError::seeder_write("flushing seeder file", e))?;

    let batch_size = compute_batch_size(param_limit, COLUMN_COUNT)?.get();
    tracing::info!("Successfully generated seeder file: {}", path.display());

    Ok(SeederSummary {
        path: path.to_path_buf(),
        batch_size,
        batches,
        items: items.len(),
    })
}

/// Writes the seeder text to any writer and returns the number of batches.
pub fn write_seeder_to<W: Write>(
    writer: &mut W,
    items: &[ItemRecord],
    param_limit: usize,
    generated_at: NaiveDateTime,
) -> AppResult<usize> {
    if items.is_empty() {
        return Err(AppError::NoItems);
    }

    let batch_size = compute_batch_size(param_limit, COLUMN_COUNT)?;
    tracing::info!("Generating SQL seeder with batch size: {}", batch_size);

    write!(
        writer,
        "-- Generated seeder file for {} table\n-- Generated at: {}\n-- Total items: {}\n\n",
        TABLE_NAME,
        generated_at.format(TIMESTAMP_FORMAT),
        items.len()
    )
    .and_then(|()| writer.flush())
    .map_err(|e| AppError::seeder_write("writing seeder header", e))?;

    let prefix = insert_prefix();
    let mut count = 0;
    for batch in partition(items, batch_size) {
        let (first, last) = batch.range();
        write_batch(writer, &prefix, batch.ordinal, batch.records)
            .map_err(|e| AppError::seeder_write(format!("writing batch {}-{}", first, last), e))?;
        count += 1;
    }

    Ok(count)
}

fn write_batch<W: Write>(
    writer: &mut W,
    prefix: &str,
    ordinal: usize,
    items: &[ItemRecord],
) -> std::io::Result<()> {
    writeln!(writer, "-- Batch {} ({} items)", ordinal, items.len())?;
    writer.write_all(prefix.as_bytes())?;

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        write!(writer, "\n\t{}", literal_tuple(item))?;
    }

    writer.write_all(b";\n\n")?;
    writer.flush()
}
