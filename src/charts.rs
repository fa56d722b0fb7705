//! SVG charts for the regional and customer analyses
//!
//! Presentation only: both functions take finished analysis rows and never
//! touch the flat table.

use crate::error::{DashboardError, Result};
use crate::models::{CustomerSegmentRow, RegionalPerformance};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const REGIONAL_CHART: &str = "regional_performance.svg";
pub const CUSTOMER_CHART: &str = "customer_analysis.svg";

fn render_err<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Render(e.to_string())
}

fn padded_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.15
    } else {
        1.0
    }
}

/// Bubble radius scaled by transaction count, 6..=30 px
fn marker_radius(transactions: usize, max_transactions: usize) -> u32 {
    let ratio = transactions as f64 / max_transactions.max(1) as f64;
    6 + (ratio * 24.0).round() as u32
}

/// Two bar panels side by side: revenue and transactions per region
pub fn render_regional_chart(rows: &[RegionalPerformance], dir: &Path) -> Result<PathBuf> {
    if rows.is_empty() {
        return Err(DashboardError::NoData("regional chart"));
    }
    fs::create_dir_all(dir).map_err(|e| DashboardError::io(dir, e))?;

    let path = dir.join(REGIONAL_CHART);
    draw_regional(&path, rows)?;
    info!("Rendered {}", path.display());
    Ok(path)
}

fn draw_regional(path: &Path, rows: &[RegionalPerformance]) -> Result<()> {
    let root = SVGBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let (left, right) = root.split_horizontally(600);

    let labels: Vec<String> = rows.iter().map(|r| r.region.clone()).collect();
    let revenue: Vec<f64> = rows.iter().map(|r| r.total_revenue).collect();
    let transactions: Vec<f64> = rows.iter().map(|r| r.total_transactions as f64).collect();

    draw_bar_panel(&left, "Revenue by Region", "Total Revenue", &labels, &revenue, &BLUE)?;
    draw_bar_panel(
        &right,
        "Transactions by Region",
        "Total Transactions",
        &labels,
        &transactions,
        &GREEN,
    )?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn draw_bar_panel(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
    color: &RGBColor,
) -> Result<()> {
    let y_max = padded_max(values.iter().copied());

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0usize..labels.len()).into_segmented(), 0.0..y_max)
        .map_err(render_err)?;

    let label_for = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&label_for)
        .y_desc(y_desc)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(color.mix(0.7).filled())
                .margin(10)
                .data(values.iter().enumerate().map(|(i, v)| (i, *v))),
        )
        .map_err(render_err)?;

    Ok(())
}

/// Scatter of total revenue vs average sale, one colour per segment,
/// marker size by transaction count
pub fn render_customer_chart(rows: &[CustomerSegmentRow], dir: &Path) -> Result<PathBuf> {
    if rows.is_empty() {
        return Err(DashboardError::NoData("customer segment chart"));
    }
    fs::create_dir_all(dir).map_err(|e| DashboardError::io(dir, e))?;

    let path = dir.join(CUSTOMER_CHART);
    draw_customer(&path, rows)?;
    info!("Rendered {}", path.display());
    Ok(path)
}

fn draw_customer(path: &Path, rows: &[CustomerSegmentRow]) -> Result<()> {
    let root = SVGBackend::new(path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let x_max = padded_max(rows.iter().map(|r| r.total_revenue));
    let y_max = padded_max(rows.iter().map(|r| r.average_sale));
    let max_transactions = rows.iter().map(|r| r.total_transactions).max().unwrap_or(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Customer Segment Performance", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Total Revenue")
        .y_desc("Average Sale")
        .draw()
        .map_err(render_err)?;

    for (idx, row) in rows.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let radius = marker_radius(row.total_transactions, max_transactions);
        chart
            .draw_series(std::iter::once(Circle::new(
                (row.total_revenue, row.average_sale),
                radius,
                color.mix(0.6).filled(),
            )))
            .map_err(render_err)?
            .label(format!(
                "{} ({} txns)",
                row.customer_segment, row.total_transactions
            ))
            .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}
