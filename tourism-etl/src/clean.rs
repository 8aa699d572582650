//! Clean and join
//!
//! Left-joins raw receipt rows to country metadata on code, then keeps only
//! rows whose metadata has a region. Codes missing from the metadata have no
//! region either, so the metadata acts as the allow-list of real countries.
//!
//! Every column whose header is all digits is a year column. Its cells are
//! coerced to numbers; anything that does not parse becomes missing.

use crate::loader::{MetadataTable, RawTable};
use tracing::debug;

/// One real country with typed year values
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub country_name: String,
    pub country_code: String,
    pub region: String,
    pub income_group: Option<String>,
    pub table_name: Option<String>,
    /// Aligned with [`JoinedTable::years`]
    pub values: Vec<Option<f64>>,
}

/// Joined, filtered and typed wide table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedTable {
    /// Year columns in file order
    pub years: Vec<i32>,
    pub rows: Vec<JoinedRow>,
}

impl JoinedTable {
    /// Position of a year column, if it exists
    pub fn column_of(&self, year: i32) -> Option<usize> {
        self.years.iter().position(|&y| y == year)
    }

    /// Whether any row holds a value for the column at `idx`
    pub fn column_has_data(&self, idx: usize) -> bool {
        self.rows
            .iter()
            .any(|row| row.values.get(idx).copied().flatten().is_some())
    }
}

/// Header of a year column: non-empty and all ASCII digits
pub fn is_year_column(header: &str) -> bool {
    !header.is_empty() && header.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a cell as a number, missing on any failure
pub fn coerce_numeric(cell: Option<&str>) -> Option<f64> {
    let text = cell?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|value| !value.is_nan())
}

/// Join receipts to metadata and drop aggregate regions
pub fn clean_and_join(raw: &RawTable, meta: &MetadataTable) -> JoinedTable {
    let year_columns: Vec<(i32, usize)> = raw
        .columns
        .iter()
        .enumerate()
        .filter(|(_, header)| is_year_column(header))
        .filter_map(|(idx, header)| header.parse::<i32>().ok().map(|year| (year, idx)))
        .collect();

    let mut rows = Vec::with_capacity(raw.rows.len());
    let mut unknown_codes = 0usize;
    let mut aggregates = 0usize;

    for raw_row in &raw.rows {
        let Some(country) = meta.get(&raw_row.country_code) else {
            unknown_codes += 1;
            continue;
        };
        let Some(region) = country.region.clone() else {
            aggregates += 1;
            continue;
        };

        let values = year_columns
            .iter()
            .map(|&(_, idx)| coerce_numeric(raw_row.cells.get(idx).and_then(|c| c.as_deref())))
            .collect();

        rows.push(JoinedRow {
            country_name: raw_row.country_name.clone(),
            country_code: raw_row.country_code.clone(),
            region,
            income_group: country.income_group.clone(),
            table_name: country.table_name.clone(),
            values,
        });
    }

    debug!(
        "Kept {} countries; dropped {} aggregates and {} codes without metadata",
        rows.len(),
        aggregates,
        unknown_codes
    );

    JoinedTable {
        years: year_columns.into_iter().map(|(year, _)| year).collect(),
        rows,
    }
}
