//! Source loading
//!
//! Two inputs, both World Bank exports:
//! - `travel_items.csv`: wide table, one row per country, one column per year,
//!   preceded by 4 lines of release metadata
//! - `metadata_country.csv`: one row per code with region and income group
//!
//! Cells are kept as text here; typing happens in [`crate::clean`].

use crate::{EtlError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Wide receipts file name inside the data directory
pub const RECEIPTS_FILE: &str = "travel_items.csv";

/// Country metadata file name inside the data directory
pub const METADATA_FILE: &str = "metadata_country.csv";

/// Non-data lines before the receipts header
pub const RECEIPTS_PREAMBLE_LINES: usize = 4;

pub const COL_COUNTRY_NAME: &str = "Country Name";
pub const COL_COUNTRY_CODE: &str = "Country Code";
pub const COL_REGION: &str = "Region";
pub const COL_INCOME_GROUP: &str = "IncomeGroup";
pub const COL_TABLE_NAME: &str = "TableName";

/// One raw row of the wide receipts table
#[derive(Debug, Clone, PartialEq)]
pub struct RawReceiptRow {
    pub country_name: String,
    pub country_code: String,
    /// Aligned with [`RawTable::columns`]; `None` for absent or empty cells
    pub cells: Vec<Option<String>>,
}

/// Wide receipts table as read from disk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Headers of every column other than name and code, in file order
    pub columns: Vec<String>,
    pub rows: Vec<RawReceiptRow>,
}

/// Metadata for one country code
#[derive(Debug, Clone, PartialEq)]
pub struct CountryMeta {
    pub code: String,
    /// Absent for aggregates such as "World" or "Euro area"
    pub region: Option<String>,
    pub income_group: Option<String>,
    pub table_name: Option<String>,
}

/// Country metadata keyed by code
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    entries: HashMap<String, CountryMeta>,
}

impl MetadataTable {
    /// Build from rows; the first row for a code wins
    pub fn from_rows(rows: impl IntoIterator<Item = CountryMeta>) -> Self {
        let mut entries = HashMap::new();
        for meta in rows {
            entries.entry(meta.code.clone()).or_insert(meta);
        }
        Self { entries }
    }

    pub fn get(&self, code: &str) -> Option<&CountryMeta> {
        self.entries.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Locations of both source files
#[derive(Debug, Clone)]
pub struct SourcePaths {
    pub receipts: PathBuf,
    pub metadata: PathBuf,
}

impl SourcePaths {
    /// Standard file names inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            receipts: data_dir.join(RECEIPTS_FILE),
            metadata: data_dir.join(METADATA_FILE),
        }
    }

    /// Both files must exist before anything is read
    pub fn ensure_present(&self) -> Result<()> {
        if !self.receipts.exists() || !self.metadata.exists() {
            return Err(EtlError::MissingSource {
                receipts: self.receipts.clone(),
                metadata: self.metadata.clone(),
            });
        }
        Ok(())
    }
}

/// Load both sources from disk
pub fn load_sources(paths: &SourcePaths) -> Result<(RawTable, MetadataTable)> {
    paths.ensure_present()?;

    let raw = read_receipts(File::open(&paths.receipts)?)?;
    let meta = read_metadata(File::open(&paths.metadata)?)?;

    info!(
        "Loaded {} receipt rows ({} columns) and {} metadata codes",
        raw.rows.len(),
        raw.columns.len(),
        meta.len()
    );

    Ok((raw, meta))
}

/// Parse the wide receipts CSV, skipping its metadata preamble
pub fn read_receipts<R: Read>(mut reader: R) -> Result<RawTable> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let body = skip_lines(strip_bom(&text), RECEIPTS_PREAMBLE_LINES);

    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = csv_reader.headers()?.clone();
    let name_idx = find_column(&headers, COL_COUNTRY_NAME, RECEIPTS_FILE)?;
    let code_idx = find_column(&headers, COL_COUNTRY_CODE, RECEIPTS_FILE)?;

    let other: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != name_idx && *idx != code_idx)
        .map(|(idx, name)| (idx, name.to_string()))
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(RawReceiptRow {
            country_name: record.get(name_idx).unwrap_or_default().to_string(),
            country_code: record.get(code_idx).unwrap_or_default().to_string(),
            cells: other
                .iter()
                .map(|(idx, _)| non_empty(record.get(*idx)))
                .collect(),
        });
    }

    debug!("Receipts header has {} columns", headers.len());

    Ok(RawTable {
        columns: other.into_iter().map(|(_, name)| name).collect(),
        rows,
    })
}

/// Parse the country metadata CSV
pub fn read_metadata<R: Read>(mut reader: R) -> Result<MetadataTable> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(strip_bom(&text).as_bytes());

    let headers = csv_reader.headers()?.clone();
    let code_idx = find_column(&headers, COL_COUNTRY_CODE, METADATA_FILE)?;
    let region_idx = find_column(&headers, COL_REGION, METADATA_FILE)?;
    let income_idx = headers.iter().position(|h| h == COL_INCOME_GROUP);
    let table_name_idx = headers.iter().position(|h| h == COL_TABLE_NAME);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let Some(code) = non_empty(record.get(code_idx)) else {
            continue;
        };
        rows.push(CountryMeta {
            code,
            region: non_empty(record.get(region_idx)),
            income_group: income_idx.and_then(|idx| non_empty(record.get(idx))),
            table_name: table_name_idx.and_then(|idx| non_empty(record.get(idx))),
        });
    }

    Ok(MetadataTable::from_rows(rows))
}

fn find_column(headers: &csv::StringRecord, column: &str, file: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| EtlError::MissingColumn {
            column: column.to_string(),
            file,
        })
}

fn non_empty(cell: Option<&str>) -> Option<String> {
    cell.filter(|c| !c.trim().is_empty()).map(str::to_string)
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

fn skip_lines(text: &str, count: usize) -> &str {
    let mut rest = text;
    for _ in 0..count {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}
