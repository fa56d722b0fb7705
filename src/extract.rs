//! Flat-table extraction
//!
//! A single inner join across sales, products, regions, customers and
//! employees. Sales missing any of the four references are dropped by the
//! join on purpose; they never reach the analysis table.
//!
//! Numeric columns are read as REAL together with their SQLite storage class,
//! so TEXT or BLOB values are rejected instead of being coerced to zero.

use crate::db::DbConn;
use crate::error::Result;
use crate::models::{SaleRecord, SaleRow};
use tracing::{debug, info};

const FLAT_SALES_QUERY: &str = r#"
    SELECT
        s.sale_id,
        p.product_name,
        p.category,
        r.region_name,
        r.country,
        CAST(s.sale_date AS TEXT) AS sale_date,
        typeof(s.quantity) AS quantity_type,
        CAST(s.quantity AS REAL) AS quantity,
        typeof(s.unit_price) AS unit_price_type,
        CAST(s.unit_price AS REAL) AS unit_price,
        typeof(s.total_revenue) AS total_revenue_type,
        CAST(s.total_revenue AS REAL) AS total_revenue,
        c.customer_segment,
        e.employee_id,
        e.sales_rep_name
    FROM
        sales s
    JOIN
        products p ON s.product_id = p.product_id
    JOIN
        regions r ON s.region_id = r.region_id
    JOIN
        customers c ON s.customer_id = c.customer_id
    JOIN
        employees e ON s.sales_rep_id = e.employee_id
    ORDER BY s.sale_id
"#;

/// Materialize the flat sales table with `month` and `total_sale_value` derived
pub async fn extract_sales(db: &DbConn) -> Result<Vec<SaleRecord>> {
    let rows: Vec<SaleRow> = sqlx::query_as(FLAT_SALES_QUERY).fetch_all(db).await?;
    debug!("Join returned {} rows", rows.len());

    let records = rows
        .into_iter()
        .map(SaleRow::into_record)
        .collect::<Result<Vec<_>>>()?;

    info!("Extracted {} sale records", records.len());
    Ok(records)
}
