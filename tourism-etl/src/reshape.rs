//! Long-format transform
//!
//! The wide table becomes one [`Receipt`] per country-year with a value,
//! ordered year-major like an unpivot of the year columns. The country
//! dimension is derived from the same rows.

use crate::clean::JoinedTable;
use std::collections::HashSet;
use tourism_common::db::{Country, Receipt};
use tourism_common::units::to_billions;

/// Unpivot year columns into receipts, skipping missing values
pub fn to_receipts(table: &JoinedTable) -> Vec<Receipt> {
    let mut receipts = Vec::new();

    for (col, &year) in table.years.iter().enumerate() {
        for row in &table.rows {
            let Some(receipts_usd) = row.values.get(col).copied().flatten() else {
                continue;
            };
            receipts.push(Receipt {
                country: row.country_name.clone(),
                code: row.country_code.clone(),
                region: row.region.clone(),
                year,
                receipts_usd,
                receipts_usd_billions: to_billions(receipts_usd),
            });
        }
    }

    receipts
}

/// Distinct countries in first-seen order
pub fn to_countries(table: &JoinedTable) -> Vec<Country> {
    let mut seen = HashSet::new();
    let mut countries = Vec::new();

    for row in &table.rows {
        let country = Country {
            code: row.country_code.clone(),
            name: row.country_name.clone(),
            region: row.region.clone(),
            income_group: row.income_group.clone(),
            table_name: row.table_name.clone(),
        };
        let key = (
            country.code.clone(),
            country.name.clone(),
            country.region.clone(),
            country.income_group.clone(),
            country.table_name.clone(),
        );
        if seen.insert(key) {
            countries.push(country);
        }
    }

    countries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::JoinedRow;

    fn row(name: &str, code: &str, values: Vec<Option<f64>>) -> JoinedRow {
        JoinedRow {
            country_name: name.to_string(),
            country_code: code.to_string(),
            region: "Europe & Central Asia".to_string(),
            income_group: Some("High income".to_string()),
            table_name: Some(name.to_string()),
            values,
        }
    }

    #[test]
    fn test_receipts_are_year_major_and_skip_missing() {
        let table = JoinedTable {
            years: vec![2019, 2020],
            rows: vec![
                row("France", "FRA", vec![Some(6.345e10), None]),
                row("Spain", "ESP", vec![Some(7.9e10), Some(1.9e10)]),
            ],
        };

        let receipts = to_receipts(&table);
        let keys: Vec<(&str, i32)> = receipts.iter().map(|r| (r.code.as_str(), r.year)).collect();
        assert_eq!(keys, vec![("FRA", 2019), ("ESP", 2019), ("ESP", 2020)]);

        assert_eq!(receipts[0].receipts_usd, 6.345e10);
        assert_eq!(receipts[0].receipts_usd_billions, 63.45);
        assert_eq!(receipts[0].country, "France");
        assert_eq!(receipts[0].region, "Europe & Central Asia");
    }

    #[test]
    fn test_countries_drop_exact_duplicates() {
        let table = JoinedTable {
            years: vec![2019],
            rows: vec![
                row("France", "FRA", vec![Some(1.0)]),
                row("France", "FRA", vec![Some(2.0)]),
                row("Spain", "ESP", vec![None]),
            ],
        };

        let countries = to_countries(&table);
        let codes: Vec<&str> = countries.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["FRA", "ESP"]);
        assert_eq!(countries[0].income_group.as_deref(), Some("High income"));
    }
}
