//! Synthetic sales database generator
//!
//! Creates the five-table sales schema and fills it with random but
//! reproducible data: a fixed catalogue of regions, products, customers and
//! sales reps plus N randomly drawn sales.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --database <PATH>     Output SQLite file (default: sales_database.db)
//!   --sales <N>           Number of sales to generate (default: 500)
//!   --seed <N>            Random seed for reproducibility (optional)
//!   --start-date <DATE>   First possible sale date (default: 2024-01-01)
//!   --months <N>          Months covered by sale dates (default: 12)
//!   --orphan-rate <F>     Share of sales pointing at a missing customer (default: 0.0)
//!   --overwrite           Replace an existing database file

use anyhow::{bail, Context, Result};
use chrono::{Duration, Months, NaiveDate};
use clap::Parser;
use rand::prelude::*;
use rand::rngs::StdRng;
use sales_dashboard::db;
use std::path::PathBuf;
use tracing::info;

/// Synthetic data generator for the sales dashboard
#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Create and populate a synthetic sales database")]
struct Args {
    /// Output SQLite database path
    #[arg(long, default_value = "sales_database.db")]
    database: PathBuf,

    /// Number of sales rows to generate
    #[arg(long, default_value = "500")]
    sales: u32,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Earliest sale date
    #[arg(long, default_value = "2024-01-01")]
    start_date: NaiveDate,

    /// Number of months the sale dates span
    #[arg(long, default_value = "12")]
    months: u32,

    /// Probability that a sale references a customer that does not exist (0.0 - 1.0)
    #[arg(long, default_value = "0.0")]
    orphan_rate: f64,

    /// Replace the database file if it already exists
    #[arg(long)]
    overwrite: bool,
}

const REGIONS: &[(i64, &str, &str)] = &[
    (1, "North America", "United States"),
    (2, "Europe", "Germany"),
    (3, "Asia Pacific", "Japan"),
    (4, "Latin America", "Brazil"),
    (5, "Middle East", "United Arab Emirates"),
];

const PRODUCTS: &[(i64, &str, &str, f64)] = &[
    (1, "Laptop Pro 14", "Electronics", 1299.00),
    (2, "Wireless Mouse", "Accessories", 24.99),
    (3, "4K Monitor", "Electronics", 449.50),
    (4, "Office Chair", "Furniture", 289.00),
    (5, "Standing Desk", "Furniture", 649.00),
    (6, "Noise Cancelling Headset", "Accessories", 179.95),
    (7, "Cloud Backup (1yr)", "Software", 99.00),
    (8, "Security Suite (1yr)", "Software", 59.90),
];

const SEGMENTS: &[&str] = &["Enterprise", "Mid-Market", "Small Business", "Consumer"];
const CUSTOMER_COUNT: i64 = 40;

const SALES_REPS: &[(i64, &str)] = &[
    (1, "Alice Moreau"),
    (2, "Bilal Haddad"),
    (3, "Chen Wei"),
    (4, "Dana Kowalski"),
    (5, "Eduardo Ramos"),
    (6, "Fatima Okafor"),
    (7, "Gunnar Lind"),
    (8, "Hana Sato"),
];

/// Customer ids at or above this value never exist
const ORPHAN_CUSTOMER_BASE: i64 = 100_000;

#[derive(Debug)]
struct SyntheticSale {
    sale_id: i64,
    product_id: i64,
    region_id: i64,
    customer_id: i64,
    sales_rep_id: i64,
    sale_date: NaiveDate,
    quantity: i64,
    unit_price: f64,
    total_revenue: f64,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn generate_sale(sale_id: i64, args: &Args, span_days: i64, rng: &mut impl Rng) -> SyntheticSale {
    let &(product_id, _, _, list_price) = PRODUCTS.choose(rng).unwrap_or(&PRODUCTS[0]);
    let &(region_id, _, _) = REGIONS.choose(rng).unwrap_or(&REGIONS[0]);
    let &(sales_rep_id, _) = SALES_REPS.choose(rng).unwrap_or(&SALES_REPS[0]);

    let customer_id = if rng.gen::<f64>() < args.orphan_rate {
        ORPHAN_CUSTOMER_BASE + sale_id
    } else {
        rng.gen_range(1..=CUSTOMER_COUNT)
    };

    // occasional promotional pricing
    let unit_price = if rng.gen::<f64>() < 0.2 {
        round_cents(list_price * 0.9)
    } else {
        list_price
    };
    let quantity = rng.gen_range(1..=25);

    // stored revenue sometimes carries an invoice-level discount
    let discount = if rng.gen::<f64>() < 0.15 {
        *[0.05, 0.10, 0.15].choose(rng).unwrap_or(&0.05)
    } else {
        0.0
    };
    let total_revenue = round_cents(quantity as f64 * unit_price * (1.0 - discount));

    SyntheticSale {
        sale_id,
        product_id,
        region_id,
        customer_id,
        sales_rep_id,
        sale_date: args.start_date + Duration::days(rng.gen_range(0..span_days.max(1))),
        quantity,
        unit_price,
        total_revenue,
    }
}

async fn insert_catalogue(db: &db::DbConn) -> Result<()> {
    let mut tx = db.begin().await?;

    for &(region_id, name, country) in REGIONS {
        sqlx::query("INSERT INTO regions (region_id, region_name, country) VALUES (?, ?, ?)")
            .bind(region_id)
            .bind(name)
            .bind(country)
            .execute(&mut *tx)
            .await?;
    }

    for &(product_id, name, category, price) in PRODUCTS {
        sqlx::query(
            "INSERT INTO products (product_id, product_name, category, unit_price) VALUES (?, ?, ?, ?)",
        )
        .bind(product_id)
        .bind(name)
        .bind(category)
        .bind(price)
        .execute(&mut *tx)
        .await?;
    }

    for customer_id in 1..=CUSTOMER_COUNT {
        let segment = SEGMENTS[(customer_id as usize) % SEGMENTS.len()];
        sqlx::query("INSERT INTO customers (customer_id, customer_segment) VALUES (?, ?)")
            .bind(customer_id)
            .bind(segment)
            .execute(&mut *tx)
            .await?;
    }

    for &(employee_id, name) in SALES_REPS {
        sqlx::query("INSERT INTO employees (employee_id, sales_rep_name) VALUES (?, ?)")
            .bind(employee_id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();

    if !(0.0..=1.0).contains(&args.orphan_rate) {
        bail!("--orphan-rate must be between 0.0 and 1.0, got {}", args.orphan_rate);
    }
    let end_date = args
        .start_date
        .checked_add_months(Months::new(args.months))
        .context("--months pushes the end date out of range")?;
    let span_days = (end_date - args.start_date).num_days();

    if args.database.exists() {
        if !args.overwrite {
            bail!(
                "{} already exists (pass --overwrite to replace it)",
                args.database.display()
            );
        }
        std::fs::remove_file(&args.database)
            .with_context(|| format!("removing {}", args.database.display()))?;
    }

    println!("Synthetic Sales Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Database:     {}", args.database.display());
    println!("Sales:        {}", args.sales);
    println!("Date range:   {} .. {}", args.start_date, end_date);
    println!("Orphan rate:  {:.1}%", args.orphan_rate * 100.0);
    if let Some(seed) = args.seed {
        println!("Random seed:  {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let db = db::create(&args.database).await?;
    db::init_schema(&db).await?;
    insert_catalogue(&db).await?;
    info!(
        "Inserted {} regions, {} products, {} customers, {} sales reps",
        REGIONS.len(),
        PRODUCTS.len(),
        CUSTOMER_COUNT,
        SALES_REPS.len()
    );

    let mut tx = db.begin().await?;
    let mut orphans = 0;
    for i in 0..i64::from(args.sales) {
        let sale = generate_sale(i + 1, &args, span_days, &mut rng);
        if sale.customer_id >= ORPHAN_CUSTOMER_BASE {
            orphans += 1;
        }
        sqlx::query(
            r#"
            INSERT INTO sales (
                sale_id, product_id, region_id, customer_id, sales_rep_id,
                sale_date, quantity, unit_price, total_revenue
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(sale.sale_id)
        .bind(sale.product_id)
        .bind(sale.region_id)
        .bind(sale.customer_id)
        .bind(sale.sales_rep_id)
        .bind(sale.sale_date.format("%Y-%m-%d").to_string())
        .bind(sale.quantity)
        .bind(sale.unit_price)
        .bind(sale.total_revenue)
        .execute(&mut *tx)
        .await?;

        if (i + 1) % 10000 == 0 {
            info!("Generated {}/{} sales...", i + 1, args.sales);
        }
    }
    tx.commit().await?;
    db.close().await;

    println!("Generation complete!");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Sales written:        {:>8}", args.sales);
    println!("Orphaned (filtered):  {:>8}", orphans);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args::parse_from(["generate_synthetic", "--seed", "7"])
    }

    #[test]
    fn test_sales_reference_catalogue() {
        let args = args();
        let mut rng = StdRng::seed_from_u64(42);
        for id in 1..=500 {
            let sale = generate_sale(id, &args, 366, &mut rng);
            assert!(REGIONS.iter().any(|r| r.0 == sale.region_id));
            assert!(PRODUCTS.iter().any(|p| p.0 == sale.product_id));
            assert!(SALES_REPS.iter().any(|e| e.0 == sale.sales_rep_id));
            assert!((1..=CUSTOMER_COUNT).contains(&sale.customer_id));
            assert!((1..=25).contains(&sale.quantity));
            assert!(sale.sale_date >= args.start_date);
            assert!(sale.sale_date < args.start_date + Duration::days(366));
            // stored revenue never exceeds the undiscounted value
            assert!(sale.total_revenue <= round_cents(sale.quantity as f64 * sale.unit_price) + 1e-9);
        }
    }

    #[test]
    fn test_orphan_rate_one_orphans_everything() {
        let mut args = args();
        args.orphan_rate = 1.0;
        let mut rng = StdRng::seed_from_u64(1);
        let sale = generate_sale(3, &args, 30, &mut rng);
        assert_eq!(sale.customer_id, ORPHAN_CUSTOMER_BASE + 3);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let args = args();
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for id in 1..=20 {
            let x = generate_sale(id, &args, 100, &mut a);
            let y = generate_sale(id, &args, 100, &mut b);
            assert_eq!(x.sale_date, y.sale_date);
            assert_eq!(x.quantity, y.quantity);
            assert_eq!(x.total_revenue, y.total_revenue);
        }
    }
}
