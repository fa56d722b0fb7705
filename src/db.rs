use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

pub type DbConn = SqlitePool;

/// Five-table sales schema, one statement per entry
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS regions (
        region_id INTEGER PRIMARY KEY,
        region_name TEXT,
        country TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        product_id INTEGER PRIMARY KEY,
        product_name TEXT,
        category TEXT,
        unit_price DECIMAL(10,2)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        customer_id INTEGER PRIMARY KEY,
        customer_segment TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        employee_id INTEGER PRIMARY KEY,
        sales_rep_name TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales (
        sale_id INTEGER PRIMARY KEY,
        product_id INTEGER,
        region_id INTEGER,
        customer_id INTEGER,
        sales_rep_id INTEGER,
        sale_date DATE,
        quantity INTEGER,
        unit_price DECIMAL(10,2),
        total_revenue DECIMAL(10,2),
        FOREIGN KEY(product_id) REFERENCES products(product_id),
        FOREIGN KEY(region_id) REFERENCES regions(region_id),
        FOREIGN KEY(customer_id) REFERENCES customers(customer_id),
        FOREIGN KEY(sales_rep_id) REFERENCES employees(employee_id)
    )
    "#,
];

/// Open an existing sales database read-only.
///
/// The file must already exist; a missing path is reported as a database
/// error instead of silently creating an empty store.
pub async fn connect(path: &Path) -> Result<DbConn> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false)
        .read_only(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Open (creating if needed) a writable sales database
pub async fn create(path: &Path) -> Result<DbConn> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Private in-memory database. The single connection is never recycled, so
/// the data lives as long as the pool.
pub async fn connect_memory() -> Result<DbConn> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create the regions/products/customers/employees/sales tables
pub async fn init_schema(db: &DbConn) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(db).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_schema_creates_five_tables() {
        let db = connect_memory().await.unwrap();
        init_schema(&db).await.unwrap();
        // idempotent
        init_schema(&db).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&db)
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec!["customers", "employees", "products", "regions", "sales"]
        );
    }

    #[tokio::test]
    async fn test_connect_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = connect(&dir.path().join("absent.db")).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::DataAccess);
    }
}
