//! Summary tables for the local report
//!
//! - latest year: most recent year column holding any value
//! - top countries: largest receipts for one year, stable on ties
//! - global totals: the latest year and up to four before it

use crate::clean::JoinedTable;
use crate::{EtlError, Result};
use tourism_common::db::YearTotal;
use tourism_common::units::to_billions;

/// Countries shown in the local report
pub const TOP_COUNTRIES_LIMIT: usize = 5;

/// Years covered by the global totals series, counting the latest
pub const TOTALS_SPAN: i32 = 5;

/// One entry of the top earners table
#[derive(Debug, Clone, PartialEq)]
pub struct TopCountry {
    pub country: String,
    pub code: String,
    pub receipts_usd: f64,
    pub receipts_usd_billions: f64,
}

/// Most recent year column with at least one value
pub fn latest_year(table: &JoinedTable) -> Result<i32> {
    let mut columns: Vec<(usize, i32)> = table.years.iter().copied().enumerate().collect();
    columns.sort_by(|a, b| b.1.cmp(&a.1));

    columns
        .into_iter()
        .find(|&(idx, _)| table.column_has_data(idx))
        .map(|(_, year)| year)
        .ok_or(EtlError::NoYearData)
}

/// Top `limit` countries by receipts for `year`, descending
///
/// Rows without a value for that year are skipped. Equal values keep their
/// input order.
pub fn top_countries(table: &JoinedTable, year: i32, limit: usize) -> Vec<TopCountry> {
    let Some(col) = table.column_of(year) else {
        return Vec::new();
    };

    let mut ranked: Vec<(&str, &str, f64)> = table
        .rows
        .iter()
        .filter_map(|row| {
            row.values
                .get(col)
                .copied()
                .flatten()
                .map(|value| (row.country_name.as_str(), row.country_code.as_str(), value))
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.2.total_cmp(&a.2));

    ranked
        .into_iter()
        .take(limit)
        .map(|(country, code, receipts_usd)| TopCountry {
            country: country.to_string(),
            code: code.to_string(),
            receipts_usd,
            receipts_usd_billions: to_billions(receipts_usd),
        })
        .collect()
}

/// Global totals for `latest` and the preceding years that exist as columns
///
/// Missing values count as nothing; a column with no values totals 0.
/// Ascending by year.
pub fn global_totals(table: &JoinedTable, latest: i32) -> Vec<YearTotal> {
    let mut totals: Vec<YearTotal> = (0..TOTALS_SPAN)
        .map(|offset| latest - offset)
        .filter_map(|year| table.column_of(year).map(|col| (year, col)))
        .map(|(year, col)| {
            let sum: f64 = table
                .rows
                .iter()
                .filter_map(|row| row.values.get(col).copied().flatten())
                .sum();
            YearTotal {
                year,
                total_usd_billions: to_billions(sum),
                region: None,
            }
        })
        .collect();

    totals.sort_by_key(|total| total.year);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::JoinedRow;

    fn row(code: &str, values: Vec<Option<f64>>) -> JoinedRow {
        JoinedRow {
            country_name: format!("Country {}", code),
            country_code: code.to_string(),
            region: "Europe & Central Asia".to_string(),
            income_group: None,
            table_name: None,
            values,
        }
    }

    #[test]
    fn test_latest_year_skips_empty_recent_columns() {
        let table = JoinedTable {
            years: vec![2019, 2020, 2021],
            rows: vec![row("AAA", vec![None, Some(1.0), None]), row("BBB", vec![None, None, None])],
        };
        assert_eq!(latest_year(&table).unwrap(), 2020);
    }

    #[test]
    fn test_latest_year_uses_numeric_order_not_column_order() {
        let table = JoinedTable {
            years: vec![2021, 2019],
            rows: vec![row("AAA", vec![Some(1.0), Some(2.0)])],
        };
        assert_eq!(latest_year(&table).unwrap(), 2021);
    }

    #[test]
    fn test_latest_year_without_data_fails() {
        let table = JoinedTable {
            years: vec![2019, 2020],
            rows: vec![row("AAA", vec![None, None])],
        };
        assert!(matches!(latest_year(&table), Err(EtlError::NoYearData)));

        let no_columns = JoinedTable::default();
        assert!(matches!(latest_year(&no_columns), Err(EtlError::NoYearData)));
    }

    #[test]
    fn test_top_countries_sorted_descending_stable_on_ties() {
        let table = JoinedTable {
            years: vec![2020],
            rows: vec![
                row("AAA", vec![Some(5.0e9)]),
                row("BBB", vec![Some(9.0e9)]),
                row("CCC", vec![None]),
                row("DDD", vec![Some(5.0e9)]),
                row("EEE", vec![Some(1.0e9)]),
                row("FFF", vec![Some(7.25e9)]),
                row("GGG", vec![Some(0.5e9)]),
            ],
        };

        let top = top_countries(&table, 2020, TOP_COUNTRIES_LIMIT);
        let codes: Vec<&str> = top.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["BBB", "FFF", "AAA", "DDD", "EEE"]);
        assert_eq!(top[1].receipts_usd_billions, 7.25);
        assert_eq!(top[0].country, "Country BBB");
    }

    #[test]
    fn test_top_countries_shorter_than_limit() {
        let table = JoinedTable {
            years: vec![2020],
            rows: vec![row("AAA", vec![Some(1.0)]), row("BBB", vec![None])],
        };
        assert_eq!(top_countries(&table, 2020, 5).len(), 1);
        assert!(top_countries(&table, 1999, 5).is_empty());
    }

    #[test]
    fn test_global_totals_span_and_order() {
        let table = JoinedTable {
            // 2017 missing as a column, 2016 outside the span
            years: vec![2015, 2016, 2018, 2019, 2020, 2021],
            rows: vec![
                row("AAA", vec![Some(1e9), Some(1e9), Some(1.5e9), None, Some(2e9), Some(3e9)]),
                row("BBB", vec![Some(1e9), Some(1e9), Some(2.5e9), None, None, Some(0.25e9)]),
            ],
        };

        let totals = global_totals(&table, 2021);
        let years: Vec<i32> = totals.iter().map(|t| t.year).collect();
        assert_eq!(years, vec![2018, 2019, 2020, 2021]);

        let values: Vec<f64> = totals.iter().map(|t| t.total_usd_billions).collect();
        assert_eq!(values, vec![4.0, 0.0, 2.0, 3.25]);
        assert!(totals.iter().all(|t| t.region.is_none()));
    }
}
