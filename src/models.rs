use crate::error::{DashboardError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Raw row from the five-table join, as stored. Every column except the
/// keys is nullable in the schema, so NULLs are caught in [`SaleRow::into_record`].
#[derive(Debug, Clone, FromRow)]
pub struct SaleRow {
    pub sale_id: i64,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub region_name: Option<String>,
    pub country: Option<String>,
    pub sale_date: Option<String>,
    /// SQLite storage class of `quantity` (`typeof()`)
    pub quantity_type: String,
    pub quantity: Option<f64>,
    pub unit_price_type: String,
    pub unit_price: Option<f64>,
    pub total_revenue_type: String,
    pub total_revenue: Option<f64>,
    pub customer_segment: Option<String>,
    pub employee_id: i64,
    pub sales_rep_name: Option<String>,
}

/// One row of the flat analysis table, with derived fields populated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub sale_id: i64,
    pub product_name: String,
    pub category: String,
    pub region_name: String,
    pub country: String,
    pub sale_date: NaiveDate,
    /// First day of the sale's calendar month
    pub month: NaiveDate,
    pub quantity: u64,
    pub unit_price: f64,
    /// Stored revenue column, kept for inspection only
    pub total_revenue: Option<f64>,
    pub customer_segment: String,
    pub employee_id: i64,
    pub sales_rep_name: String,
    /// Always `quantity * unit_price`
    pub total_sale_value: f64,
}

/// Key performance indicators over the whole flat table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSet {
    pub total_revenue: f64,
    pub total_sales_volume: u64,
    pub average_transaction_value: f64,
    /// Number of distinct customer segments (not distinct customers)
    pub distinct_segments: usize,
    pub top_performing_region: String,
}

/// Sums that stay defined on an empty table
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SaleTotals {
    pub revenue: f64,
    pub units: u64,
    pub transactions: usize,
}

/// Per-region breakdown, one row per region present in the data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalPerformance {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Total Revenue")]
    pub total_revenue: f64,
    #[serde(rename = "Average Sale")]
    pub average_sale: f64,
    #[serde(rename = "Total Units")]
    pub total_units: u64,
    #[serde(rename = "Total Transactions")]
    pub total_transactions: usize,
}

/// Per-segment breakdown, one row per customer segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSegmentRow {
    #[serde(rename = "Customer Segment")]
    pub customer_segment: String,
    #[serde(rename = "Total Revenue")]
    pub total_revenue: f64,
    #[serde(rename = "Average Sale")]
    pub average_sale: f64,
    #[serde(rename = "Total Transactions")]
    pub total_transactions: usize,
}

/// Per-month trend row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrendRow {
    pub month: NaiveDate,
    pub total_revenue: f64,
    pub average_sale: f64,
    pub total_units: u64,
    pub total_transactions: usize,
}

impl MonthlyTrendRow {
    pub fn label(&self) -> String {
        self.month.format("%Y-%m").to_string()
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a stored sale date. Time of day, when present, is dropped.
pub fn parse_sale_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Truncate a date to the first day of its month
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // day 1 exists in every month
    date.with_day(1).unwrap_or(date)
}

impl SaleRow {
    pub fn into_record(self) -> Result<SaleRecord> {
        let sale_id = self.sale_id;
        let malformed = move |reason: String| DashboardError::MalformedRecord { sale_id, reason };
        let required = move |value: Option<String>, column: &str| {
            value.ok_or_else(|| malformed(format!("{} is NULL", column)))
        };

        let numeric = move |value: Option<f64>, storage: &str, column: &str| match storage {
            "integer" | "real" | "null" => Ok(value),
            other => Err(malformed(format!("{} holds a {} value", column, other))),
        };

        let raw_quantity = numeric(self.quantity, &self.quantity_type, "quantity")?
            .ok_or_else(|| malformed("quantity is NULL".to_string()))?;
        if raw_quantity < 0.0 {
            return Err(malformed(format!("negative quantity {}", raw_quantity)));
        }
        if !raw_quantity.is_finite() || raw_quantity.fract() != 0.0 {
            return Err(malformed(format!("fractional quantity {}", raw_quantity)));
        }
        let quantity = raw_quantity as u64;

        let unit_price = numeric(self.unit_price, &self.unit_price_type, "unit_price")?
            .ok_or_else(|| malformed("unit_price is NULL".to_string()))?;
        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(malformed(format!("invalid unit price {}", unit_price)));
        }
        let total_revenue =
            numeric(self.total_revenue, &self.total_revenue_type, "total_revenue")?;

        let raw_date = required(self.sale_date, "sale_date")?;
        let sale_date = parse_sale_date(&raw_date)
            .ok_or_else(|| malformed(format!("unparseable sale date {:?}", raw_date)))?;

        Ok(SaleRecord {
            sale_id,
            product_name: required(self.product_name, "product_name")?,
            category: required(self.category, "category")?,
            region_name: required(self.region_name, "region_name")?,
            country: required(self.country, "country")?,
            sale_date,
            month: month_start(sale_date),
            quantity,
            unit_price,
            total_revenue,
            customer_segment: required(self.customer_segment, "customer_segment")?,
            employee_id: self.employee_id,
            sales_rep_name: required(self.sales_rep_name, "sales_rep_name")?,
            total_sale_value: quantity as f64 * unit_price,
        })
    }
}
