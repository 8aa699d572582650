//! Static-payload provider
//!
//! The payload is parsed once at startup. Requests filter, sort and limit its
//! embedded rows the same way the store provider does.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tourism_common::db::{Receipt, YearTotal};
use tourism_common::units::to_billions;
use tourism_common::{Error, Result};

use super::{DashboardProvider, RegionFilter, ALL_REGIONS};
use crate::error::ApiResult;

/// Sample payload compiled into the binary
const BUNDLED_PAYLOAD: &str = include_str!("../../mock_data/dashboard_sample.json");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MockPayload {
    latest_year: i32,
    years: Vec<i32>,
    regions: Vec<String>,
    table_rows: Vec<MockRow>,
    totals_by_year: Vec<MockTotal>,
    #[serde(default)]
    region_totals: Vec<MockTotal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MockRow {
    country: String,
    code: String,
    region: String,
    year: i32,
    receipts_usd: f64,
    receipts_usd_billions: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MockTotal {
    year: i32,
    total_usd_billions: f64,
    region: Option<String>,
}

impl From<MockRow> for Receipt {
    fn from(row: MockRow) -> Self {
        let receipts_usd_billions = row
            .receipts_usd_billions
            .unwrap_or_else(|| to_billions(row.receipts_usd));
        Receipt {
            country: row.country,
            code: row.code,
            region: row.region,
            year: row.year,
            receipts_usd: row.receipts_usd,
            receipts_usd_billions,
        }
    }
}

impl From<MockTotal> for YearTotal {
    fn from(total: MockTotal) -> Self {
        YearTotal {
            year: total.year,
            total_usd_billions: total.total_usd_billions,
            region: total.region,
        }
    }
}

/// Serves a pre-built dashboard payload
#[derive(Debug)]
pub struct MockProvider {
    latest_year: i32,
    years: Vec<i32>,
    regions: Vec<String>,
    /// Sorted by receipts descending, code ascending
    rows: Vec<Receipt>,
    totals: Vec<YearTotal>,
    region_totals: Vec<YearTotal>,
}

impl MockProvider {
    /// Load from `path`, or the bundled sample when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                Self::from_json(&text).map_err(|e| match e {
                    Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
                    other => other,
                })
            }
            None => Self::from_json(BUNDLED_PAYLOAD),
        }
    }

    /// Parse a payload
    pub fn from_json(text: &str) -> Result<Self> {
        let payload: MockPayload = serde_json::from_str(text)
            .map_err(|e| Error::Config(format!("Invalid mock payload: {}", e)))?;

        let mut years = payload.years;
        years.sort_unstable();
        years.dedup();

        let mut regions = vec![ALL_REGIONS.to_string()];
        regions.extend(
            payload
                .regions
                .into_iter()
                .filter(|region| region != ALL_REGIONS),
        );

        let mut rows: Vec<Receipt> = payload.table_rows.into_iter().map(Receipt::from).collect();
        rows.sort_by(|a, b| {
            b.receipts_usd
                .total_cmp(&a.receipts_usd)
                .then_with(|| a.code.cmp(&b.code))
        });

        tracing::info!(
            "Mock payload loaded: {} rows, {} years, latest {}",
            rows.len(),
            years.len(),
            payload.latest_year
        );

        Ok(Self {
            latest_year: payload.latest_year,
            years,
            regions,
            rows,
            totals: payload.totals_by_year.into_iter().map(YearTotal::from).collect(),
            region_totals: payload.region_totals.into_iter().map(YearTotal::from).collect(),
        })
    }

    fn matching(&self, year: i32, region: &RegionFilter) -> impl Iterator<Item = &Receipt> + '_ {
        let region = region.clone();
        self.rows
            .iter()
            .filter(move |row| row.year == year && region.matches(&row.region))
    }
}

fn take(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

#[async_trait]
impl DashboardProvider for MockProvider {
    fn source(&self) -> &'static str {
        "mock"
    }

    async fn check(&self) -> ApiResult<()> {
        Ok(())
    }

    fn reports_latest_year(&self) -> bool {
        false
    }

    async fn latest_year(&self) -> ApiResult<Option<i32>> {
        Ok(Some(self.latest_year))
    }

    async fn years(&self) -> ApiResult<Vec<i32>> {
        Ok(self.years.clone())
    }

    async fn regions(&self) -> ApiResult<Vec<String>> {
        Ok(self.regions.clone())
    }

    async fn top_countries(
        &self,
        year: i32,
        region: &RegionFilter,
        limit: i64,
    ) -> ApiResult<Vec<Receipt>> {
        Ok(self.matching(year, region).take(take(limit)).cloned().collect())
    }

    async fn totals_by_year(&self, region: &RegionFilter) -> ApiResult<Vec<YearTotal>> {
        if let RegionFilter::Only(name) = region {
            let regional: Vec<YearTotal> = self
                .region_totals
                .iter()
                .filter(|total| total.region.as_deref() == Some(name.as_str()))
                .cloned()
                .collect();
            if !regional.is_empty() {
                return Ok(regional);
            }
        }
        Ok(self.totals.clone())
    }

    async fn table_rows(
        &self,
        year: i32,
        region: &RegionFilter,
        cap: i64,
    ) -> ApiResult<Vec<Receipt>> {
        Ok(self.matching(year, region).take(take(cap)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "latestYear": 2020,
        "years": [2020, 2019],
        "regions": ["North America", "Europe & Central Asia"],
        "tableRows": [
            {"country": "France", "code": "FRA", "region": "Europe & Central Asia", "year": 2020, "receiptsUsd": 30000000000, "receiptsUsdBillions": 30.0},
            {"country": "United States", "code": "USA", "region": "North America", "year": 2020, "receiptsUsd": 80000000000},
            {"country": "Spain", "code": "ESP", "region": "Europe & Central Asia", "year": 2020, "receiptsUsd": 30000000000, "receiptsUsdBillions": 30.0},
            {"country": "France", "code": "FRA", "region": "Europe & Central Asia", "year": 2019, "receiptsUsd": 70000000000, "receiptsUsdBillions": 70.0}
        ],
        "totalsByYear": [
            {"year": 2019, "totalUsdBillions": 300.0},
            {"year": 2020, "totalUsdBillions": 140.0}
        ],
        "regionTotals": [
            {"year": 2019, "totalUsdBillions": 70.0, "region": "Europe & Central Asia"},
            {"year": 2020, "totalUsdBillions": 60.0, "region": "Europe & Central Asia"}
        ]
    }"#;

    #[test]
    fn test_bundled_payload_parses() {
        let provider = MockProvider::load(None).expect("bundled payload");
        assert_eq!(provider.regions[0], ALL_REGIONS);
        assert!(provider.years.contains(&provider.latest_year));
        assert!(!provider.rows.is_empty());
    }

    #[test]
    fn test_malformed_payload_is_config_error() {
        let err = MockProvider::from_json("{\"years\": []}").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_missing_billions_derived_from_raw() {
        let provider = MockProvider::from_json(PAYLOAD).unwrap();
        let rows = provider
            .top_countries(2020, &RegionFilter::All, 5)
            .await
            .unwrap();
        assert_eq!(rows[0].code, "USA");
        assert_eq!(rows[0].receipts_usd_billions, 80.0);
    }

    #[tokio::test]
    async fn test_rows_filtered_sorted_and_limited() {
        let provider = MockProvider::from_json(PAYLOAD).unwrap();
        let europe = RegionFilter::Only("Europe & Central Asia".to_string());

        let rows = provider.table_rows(2020, &europe, 500).await.unwrap();
        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["ESP", "FRA"]);

        let top = provider.top_countries(2020, &RegionFilter::All, 2).await.unwrap();
        let codes: Vec<&str> = top.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["USA", "ESP"]);
    }

    #[tokio::test]
    async fn test_region_totals_preferred_when_present() {
        let provider = MockProvider::from_json(PAYLOAD).unwrap();

        let europe = RegionFilter::Only("Europe & Central Asia".to_string());
        let totals = provider.totals_by_year(&europe).await.unwrap();
        assert_eq!(totals.len(), 2);
        assert!(totals
            .iter()
            .all(|t| t.region.as_deref() == Some("Europe & Central Asia")));

        let unknown = RegionFilter::Only("North America".to_string());
        let totals = provider.totals_by_year(&unknown).await.unwrap();
        assert_eq!(totals[1].total_usd_billions, 140.0);
        assert!(totals.iter().all(|t| t.region.is_none()));
    }

    #[test]
    fn test_regions_start_with_all() {
        let provider = MockProvider::from_json(PAYLOAD).unwrap();
        assert_eq!(
            provider.regions,
            vec!["All", "North America", "Europe & Central Asia"]
        );
        assert_eq!(provider.years, vec![2019, 2020]);
    }
}
