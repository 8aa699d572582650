//! Local report output: summary CSV files and console tables

use crate::summary::TopCountry;
use crate::Result;
use std::path::{Path, PathBuf};
use tourism_common::db::{Receipt, YearTotal};
use tracing::info;

/// Global totals CSV file name
pub const TOTALS_FILE: &str = "global_receipts_recent_years.csv";

/// Top countries CSV file name for a year
pub fn top_countries_file(year: i32) -> String {
    format!("top_countries_{}.csv", year)
}

/// Write the top countries table for `year`
pub fn write_top_countries(path: &Path, year: i32, rows: &[TopCountry]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(top_headers(year, true))?;
    for row in rows {
        writer.write_record([
            row.country.clone(),
            row.code.clone(),
            format_number(row.receipts_usd),
            format_number(row.receipts_usd_billions),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the global totals series
pub fn write_global_totals(path: &Path, totals: &[YearTotal]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Year", "Receipts_USD_Billions"])?;
    for total in totals {
        writer.write_record([total.year.to_string(), format_number(total.total_usd_billions)])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write both summary files into `output_dir`, creating it if needed
pub fn write_summary_files(
    output_dir: &Path,
    year: i32,
    top: &[TopCountry],
    totals: &[YearTotal],
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(output_dir)?;

    let top_path = output_dir.join(top_countries_file(year));
    let totals_path = output_dir.join(TOTALS_FILE);

    write_top_countries(&top_path, year, top)?;
    write_global_totals(&totals_path, totals)?;

    info!("Tables saved to {}", output_dir.display());
    Ok((top_path, totals_path))
}

/// Console table of the top earners (billions only)
pub fn render_top_table(year: i32, rows: &[TopCountry]) -> String {
    let headers = top_headers(year, false);
    let body = rows
        .iter()
        .map(|row| {
            vec![
                row.country.clone(),
                row.code.clone(),
                format_number(row.receipts_usd_billions),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &body)
}

/// Console table of the global totals series
pub fn render_totals_table(totals: &[YearTotal]) -> String {
    let headers = vec!["Year".to_string(), "Receipts_USD_Billions".to_string()];
    let body = totals
        .iter()
        .map(|total| vec![total.year.to_string(), format_number(total.total_usd_billions)])
        .collect::<Vec<_>>();
    render_table(&headers, &body)
}

/// One line per stored receipt: `- France (FRA): 63.45 USD billions`
pub fn render_earner_lines(receipts: &[Receipt]) -> String {
    receipts
        .iter()
        .map(|r| {
            format!(
                "- {} ({}): {} USD billions",
                r.country,
                r.code,
                format_number(r.receipts_usd_billions)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per year: `2019: 1234.56`
pub fn render_total_lines(totals: &[YearTotal]) -> String {
    totals
        .iter()
        .map(|t| format!("{}: {}", t.year, format_number(t.total_usd_billions)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn top_headers(year: i32, with_raw: bool) -> Vec<String> {
    let mut headers = vec!["Country".to_string(), "Code".to_string()];
    if with_raw {
        headers.push(format!("{}_Receipts_USD", year));
    }
    headers.push(format!("{}_Receipts_USD_Billions", year));
    headers
}

/// Floats always carry a decimal point (`63450000000.0`, `63.45`)
fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

/// Right-aligned plain text table
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut lines = vec![format_line(headers)];
    lines.extend(rows.iter().map(|row| format_line(row)));
    lines.join("\n")
}
