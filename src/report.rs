//! Terminal report: KPI block, breakdown tables and text bar charts

use crate::models::{CustomerSegmentRow, KpiSet, MonthlyTrendRow, RegionalPerformance};

const BAR_WIDTH: usize = 40;

pub fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

pub fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(70));
}

/// Bar of `value` scaled against `max`, at most `BAR_WIDTH` cells
pub fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(cells.clamp(1, BAR_WIDTH))
}

pub fn print_kpis(kpis: &KpiSet, revenue_mismatches: usize) {
    print_section_header("1. KEY PERFORMANCE INDICATORS");
    println!("  Total Revenue:              {:>14.2}", kpis.total_revenue);
    println!("  Total Sales Volume:         {:>14}", kpis.total_sales_volume);
    println!(
        "  Average Transaction Value:  {:>14.2}",
        kpis.average_transaction_value
    );
    println!("  Distinct Customer Segments: {:>14}", kpis.distinct_segments);
    println!("  Top Performing Region:      {:>14}", kpis.top_performing_region);
    if revenue_mismatches > 0 {
        println!(
            "\n  Note: {} sale(s) carry a stored total_revenue that differs from quantity × unit price",
            revenue_mismatches
        );
    }
}

pub fn print_regional(rows: &[RegionalPerformance]) {
    print_section_header("2. REGIONAL PERFORMANCE");
    println!(
        "  {:20} {:>14} {:>12} {:>10} {:>12}",
        "Region", "Revenue", "Avg Sale", "Units", "Transactions"
    );
    println!("  {}", "─".repeat(72));
    for row in rows {
        println!(
            "  {:20} {:>14.2} {:>12.2} {:>10} {:>12}",
            row.region, row.total_revenue, row.average_sale, row.total_units, row.total_transactions
        );
    }

    let max_revenue = rows.iter().map(|r| r.total_revenue).fold(0.0, f64::max);
    print_subsection("Revenue by Region");
    for row in rows {
        println!(
            "  {:20} {} {:.2}",
            row.region,
            bar(row.total_revenue, max_revenue),
            row.total_revenue
        );
    }

    let max_txns = rows.iter().map(|r| r.total_transactions).max().unwrap_or(0) as f64;
    print_subsection("Transactions by Region");
    for row in rows {
        println!(
            "  {:20} {} {}",
            row.region,
            bar(row.total_transactions as f64, max_txns),
            row.total_transactions
        );
    }
}

pub fn print_customer(rows: &[CustomerSegmentRow]) {
    print_section_header("3. CUSTOMER SEGMENT PERFORMANCE");
    println!(
        "  {:20} {:>14} {:>12} {:>12}",
        "Segment", "Revenue", "Avg Sale", "Transactions"
    );
    println!("  {}", "─".repeat(60));
    for row in rows {
        println!(
            "  {:20} {:>14.2} {:>12.2} {:>12}",
            row.customer_segment, row.total_revenue, row.average_sale, row.total_transactions
        );
    }

    let max_revenue = rows.iter().map(|r| r.total_revenue).fold(0.0, f64::max);
    print_subsection("Revenue by Segment");
    for row in rows {
        println!(
            "  {:20} {} {:.2}",
            row.customer_segment,
            bar(row.total_revenue, max_revenue),
            row.total_revenue
        );
    }
}

pub fn print_monthly(rows: &[MonthlyTrendRow]) {
    print_section_header("4. MONTHLY TREND");
    println!(
        "  {:10} {:>14} {:>12} {:>10} {:>12}",
        "Month", "Revenue", "Avg Sale", "Units", "Transactions"
    );
    println!("  {}", "─".repeat(62));
    let max_revenue = rows.iter().map(|r| r.total_revenue).fold(0.0, f64::max);
    for row in rows {
        println!(
            "  {:10} {:>14.2} {:>12.2} {:>10} {:>12}  {}",
            row.label(),
            row.total_revenue,
            row.average_sale,
            row.total_units,
            row.total_transactions,
            bar(row.total_revenue, max_revenue)
        );
    }
}
