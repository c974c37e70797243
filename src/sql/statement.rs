use crate::models::{ItemRecord, COLUMNS, COLUMN_COUNT, TABLE_NAME};

use super::SqlValue;

const COLUMNS_PER_LINE: usize = 7;

/// `INSERT INTO m_item (<columns>) VALUES`, shared by both sinks.
pub fn insert_prefix() -> String {
    let lines: Vec<String> = COLUMNS
        .chunks(COLUMNS_PER_LINE)
        .map(|chunk| {
            let names: Vec<&str> = chunk.iter().map(|c| c.name).collect();
            format!("\t{}", names.join(", "))
        })
        .collect();
    format!("INSERT INTO {} (\n{}\n) VALUES", TABLE_NAME, lines.join(",\n"))
}

/// Placeholder group for row `row` of a batch: `($n, $n+1, ...)`.
///
/// Numbering is global across the batch, row `i` column `j` is `$(i * columns + j + 1)`.
pub fn placeholder_group(row: usize, columns_per_row: usize) -> String {
    let start = row * columns_per_row;
    let placeholders: Vec<String> = (1..=columns_per_row)
        .map(|j| format!("${}", start + j))
        .collect();
    format!("({})", placeholders.join(", "))
}

/// Parenthesized literal tuple for one record, in column order.
pub fn literal_tuple(item: &ItemRecord) -> String {
    let values: Vec<String> = item.values().map(|v| v.to_literal()).collect();
    format!("({})", values.join(", "))
}

/// A multi-row INSERT with positional parameters.
#[derive(Debug, Clone)]
pub struct InsertStatement<'a> {
    pub sql: String,
    pub params: Vec<SqlValue<'a>>,
    pub rows: usize,
}

impl<'a> InsertStatement<'a> {
    /// Builds one statement covering every record in `items`.
    pub fn for_batch(items: &'a [ItemRecord]) -> Self {
        let groups: Vec<String> = (0..items.len())
            .map(|row| placeholder_group(row, COLUMN_COUNT))
            .collect();
        let sql = format!("{} {}", insert_prefix(), groups.join(", "));

        let mut params = Vec::with_capacity(items.len() * COLUMN_COUNT);
        for item in items {
            params.extend(item.values());
        }

        Self {
            sql,
            params,
            rows: items.len(),
        }
    }
}
