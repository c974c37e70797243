use std::num::NonZeroUsize;

use crate::error::{AppError, AppResult};

/// PostgreSQL accepts at most 65535 bind parameters per statement.
pub const POSTGRES_MAX_PARAMS: usize = 65535;

/// Default ceiling, about half the PostgreSQL limit for safety.
pub const DEFAULT_PARAM_LIMIT: usize = 32767;

/// Number of rows that fit in one statement without exceeding `param_limit`.
///
/// Always at least 1, so a row wider than the ceiling still gets its own batch.
pub fn compute_batch_size(param_limit: usize, columns_per_row: usize) -> AppResult<NonZeroUsize> {
    if columns_per_row == 0 {
        return Err(AppError::InvalidColumnCount(columns_per_row));
    }

    let rows = param_limit / columns_per_row;
    if rows == 0 {
        tracing::warn!(
            "Parameter limit {} is smaller than one row ({} columns), using batch size 1",
            param_limit,
            columns_per_row
        );
    }
    Ok(NonZeroUsize::new(rows).unwrap_or(NonZeroUsize::MIN))
}

/// A contiguous slice of the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch<'a, T> {
    /// 1-based batch number.
    pub ordinal: usize,
    /// Index of the first record in the full input.
    pub offset: usize,
    pub records: &'a [T],
}

impl<T> Batch<'_, T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 1-based inclusive record range, e.g. `(1, 963)`.
    pub fn range(&self) -> (usize, usize) {
        (self.offset + 1, self.offset + self.records.len())
    }
}

/// Splits `records` into consecutive batches of `batch_size` in input order.
pub fn partition<T>(records: &[T], batch_size: NonZeroUsize) -> impl Iterator<Item = Batch<'_, T>> {
    let size = batch_size.get();
    records
        .chunks(size)
        .enumerate()
        .map(move |(index, chunk)| Batch {
            ordinal: index + 1,
            offset: index * size,
            records: chunk,
        })
}
