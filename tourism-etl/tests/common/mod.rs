//! Shared fixtures for tourism-etl integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Directory holding the bundled World Bank style fixtures
///
/// Real countries: ABW, FRA, ESP, USA, DEU, ITA, JPN. Aggregates WLD and EMU
/// have no region; ATL has no metadata. 2022 is empty everywhere and DEU's
/// 2021 cell is not a number.
pub fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Codes that must never reach any table
pub const EXCLUDED_CODES: [&str; 3] = ["WLD", "EMU", "ATL"];

/// Receipts carried by the fixtures (34 country-year values)
pub const FIXTURE_RECEIPTS: usize = 34;

/// Real countries in the fixtures
pub const FIXTURE_COUNTRIES: usize = 7;

/// Write a data directory with the given file contents
pub fn write_sources(dir: &Path, receipts: &str, metadata: &str) {
    std::fs::write(dir.join("travel_items.csv"), receipts).unwrap();
    std::fs::write(dir.join("metadata_country.csv"), metadata).unwrap();
}

/// Wide receipts text with the 4 preamble lines and the given body
pub fn receipts_csv(header_years: &[i32], rows: &[(&str, &str, Vec<&str>)]) -> String {
    let mut text = String::from("\"Data Source\",\"WDI\",\n\n\"Last Updated Date\",\"2024-06-28\",\n\n");
    text.push_str("\"Country Name\",\"Country Code\"");
    for year in header_years {
        text.push_str(&format!(",\"{}\"", year));
    }
    text.push('\n');
    for (name, code, cells) in rows {
        text.push_str(&format!("\"{}\",\"{}\"", name, code));
        for cell in cells {
            text.push_str(&format!(",\"{}\"", cell));
        }
        text.push('\n');
    }
    text
}
