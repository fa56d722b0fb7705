//! Sales performance dashboard
//!
//! Extract -> KPIs -> regional and customer breakdowns -> CSV export.
//!
//! Run: ./target/release/sales_dashboard [--database PATH] [--output-dir DIR] [--charts]

use anyhow::{Context, Result};
use clap::Parser;
use sales_dashboard::{analysis, charts, db, export, extract, kpi, report};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sales_dashboard")]
#[command(about = "Sales KPIs with regional and customer segment breakdowns")]
struct Args {
    /// SQLite database holding the sales, products, regions, customers and employees tables
    #[arg(long, default_value = "sales_database.db")]
    database: PathBuf,

    /// Directory for the exported *_insights.csv files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Render SVG charts for the regional and customer analyses
    #[arg(long)]
    charts: bool,

    /// Directory for the SVG charts
    #[arg(long, default_value = ".")]
    chart_dir: PathBuf,

    /// Also print the KPI set as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("Connecting to {}", args.database.display());
    let db = db::connect(&args.database)
        .await
        .with_context(|| format!("opening sales database {}", args.database.display()))?;

    let records = extract::extract_sales(&db)
        .await
        .context("extracting sales data")?;
    db.close().await;

    // everything is computed before anything is written
    let kpis = kpi::calculate_kpis(&records).context("calculating KPIs")?;
    let mismatches = kpi::stored_revenue_mismatches(&records);
    let regional = analysis::regional_performance(&records);
    let customer = analysis::customer_analysis(&records);
    let monthly = analysis::monthly_trend(&records);

    report::print_kpis(&kpis, mismatches);
    if args.json {
        println!("\n{}", serde_json::to_string_pretty(&kpis)?);
    }
    report::print_regional(&regional);
    report::print_customer(&customer);
    report::print_monthly(&monthly);

    if args.charts {
        charts::render_regional_chart(&regional, &args.chart_dir)
            .context("rendering regional chart")?;
        charts::render_customer_chart(&customer, &args.chart_dir)
            .context("rendering customer chart")?;
    }

    let written = export::export_insights(&args.output_dir, &regional, &customer)
        .context("exporting insights")?;
    println!();
    for path in &written {
        println!("  Exported {}", path.display());
    }
    println!("Insights exported successfully!");

    Ok(())
}
