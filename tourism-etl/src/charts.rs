//! PNG charts for the local report
//!
//! Rendered with the plotters bitmap backend. Text (captions, tick labels) is
//! drawn only when plotters is built with a font backend.

use crate::summary::TopCountry;
use crate::{EtlError, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tourism_common::db::YearTotal;
use tracing::info;

/// Global totals chart file name
pub const TOTALS_CHART_FILE: &str = "global_receipts_recent_years.png";

const CHART_SIZE: (u32, u32) = (1000, 600);
const BAR_COLOR: RGBColor = RGBColor(76, 114, 176);
const LINE_COLOR: RGBColor = RGBColor(221, 132, 82);

/// Top countries chart file name for a year
pub fn top_countries_chart_file(year: i32) -> String {
    format!("top_countries_{}.png", year)
}

fn chart_error<E: std::fmt::Display>(err: E) -> EtlError {
    EtlError::Chart(err.to_string())
}

/// Upper bound of the value axis
fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Bar chart of billions by country
pub fn draw_top_countries(path: &Path, year: i32, rows: &[TopCountry]) -> Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let max = rows
        .iter()
        .map(|row| row.receipts_usd_billions)
        .fold(0.0, f64::max);
    let slots = rows.len().max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Top {} tourism earners in {}", rows.len(), year),
            ("sans-serif", 28),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..slots).into_segmented(), 0.0..headroom(max))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&|slot: &SegmentValue<usize>| match slot {
            SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => rows
                .get(*idx)
                .map(|row| row.country.clone())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .y_desc("Receipts (USD billions)")
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(12)
                .data(
                    rows.iter()
                        .enumerate()
                        .map(|(idx, row)| (idx, row.receipts_usd_billions)),
                ),
        )
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

/// Line chart of billions by year
pub fn draw_global_totals(path: &Path, totals: &[YearTotal]) -> Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let first = totals.first().map(|t| t.year).unwrap_or_default();
    let last = totals.last().map(|t| t.year).unwrap_or(first);
    // a single year still needs a non-empty axis
    let (x_start, x_end) = if first < last {
        (first, last)
    } else {
        (first - 1, last + 1)
    };
    let max = totals
        .iter()
        .map(|t| t.total_usd_billions)
        .fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption("Global tourism receipts, recent years", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_start..x_end, 0.0..headroom(max))
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_labels(totals.len().max(2))
        .x_label_formatter(&|year: &i32| year.to_string())
        .y_desc("Receipts (USD billions)")
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(LineSeries::new(
            totals.iter().map(|t| (t.year, t.total_usd_billions)),
            LINE_COLOR.stroke_width(3),
        ))
        .map_err(chart_error)?;
    chart
        .draw_series(
            totals
                .iter()
                .map(|t| Circle::new((t.year, t.total_usd_billions), 5, LINE_COLOR.filled())),
        )
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

/// Render both charts into `output_dir`
///
/// Returns (top countries chart, global totals chart).
pub fn write_charts(
    output_dir: &Path,
    year: i32,
    top: &[TopCountry],
    totals: &[YearTotal],
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(output_dir)?;

    let top_path = output_dir.join(top_countries_chart_file(year));
    let totals_path = output_dir.join(TOTALS_CHART_FILE);

    draw_top_countries(&top_path, year, top)?;
    draw_global_totals(&totals_path, totals)?;

    info!("Charts saved to {}", output_dir.display());
    Ok((top_path, totals_path))
}
