use std::future::Future;

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

use crate::error::{AppError, AppResult, BatchStage};
use crate::models::{ItemRecord, COLUMN_COUNT};
use crate::sql::{compute_batch_size, partition, InsertStatement, SqlValue};

/// Failure of one batch transaction, tagged with the step that failed.
#[derive(Debug)]
pub struct StageError {
    pub stage: BatchStage,
    pub source: sqlx::Error,
}

impl StageError {
    pub fn new(stage: BatchStage, source: sqlx::Error) -> Self {
        Self { stage, source }
    }
}

/// Runs one INSERT statement inside its own transaction.
pub trait BatchExecutor {
    /// Begin, execute, commit. Rolls back if execution fails.
    fn execute_batch(
        &mut self,
        statement: &InsertStatement<'_>,
    ) -> impl Future<Output = Result<u64, StageError>>;
}

impl BatchExecutor for PgPool {
    async fn execute_batch(&mut self, statement: &InsertStatement<'_>) -> Result<u64, StageError> {
        let mut tx = self
            .begin()
            .await
            .map_err(|e| StageError::new(BatchStage::Begin, e))?;

        let mut query = sqlx::query(&statement.sql);
        for value in &statement.params {
            query = bind_value(query, *value);
        }

        let result = match query.execute(&mut *tx).await {
            Ok(result) => result,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Rollback failed: {}", rollback_err);
                }
                return Err(StageError::new(BatchStage::Execute, e));
            }
        };

        tx.commit()
            .await
            .map_err(|e| StageError::new(BatchStage::Commit, e))?;

        Ok(result.rows_affected())
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: SqlValue<'q>,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Integer(v) => query.bind(v),
        SqlValue::Decimal(v) => query.bind(v),
        SqlValue::Boolean(v) => query.bind(v),
        SqlValue::Timestamp(v) => query.bind(v),
    }
}

/// Outcome of a database load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertSummary {
    pub batch_size: usize,
    pub batches: usize,
    pub rows: u64,
}

/// Inserts every record, one transaction per batch.
///
/// An empty input succeeds without touching the database (the seeder path
/// rejects empty input instead). Batches are committed independently: when a
/// batch fails, earlier batches stay committed and the error names the
/// failing batch's record range.
pub async fn insert_all<E: BatchExecutor>(
    executor: &mut E,
    items: &[ItemRecord],
    param_limit: usize,
) -> AppResult<InsertSummary> {
    let batch_size = compute_batch_size(param_limit, COLUMN_COUNT)?;
    let mut summary = InsertSummary {
        batch_size: batch_size.get(),
        batches: 0,
        rows: 0,
    };

    if items.is_empty() {
        return Ok(summary);
    }

    tracing::info!(
        "Using batch size: {} (calculated from {}/{})",
        batch_size,
        param_limit,
        COLUMN_COUNT
    );

    for batch in partition(items, batch_size) {
        let (first, last) = batch.range();
        let statement = InsertStatement::for_batch(batch.records);

        let rows = executor
            .execute_batch(&statement)
            .await
            .map_err(|e| AppError::BatchInsert {
                first,
                last,
                stage: e.stage,
                source: e.source,
            })?;

        summary.batches += 1;
        summary.rows += rows;
        tracing::info!(
            "Successfully inserted batch {}-{} ({} items)",
            first,
            last,
            batch.len()
        );
    }

    Ok(summary)
}
