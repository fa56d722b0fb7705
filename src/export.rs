//! CSV export of the analysis tables
//!
//! Files are named `<analysis>_insights.csv`, comma separated, header row
//! first, no index column. Each file is written next to its target and
//! renamed into place once complete.

use crate::error::{DashboardError, Result};
use crate::models::{CustomerSegmentRow, RegionalPerformance};
use csv::{ReaderBuilder, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const REGIONAL_PERFORMANCE: &str = "regional_performance";
pub const CUSTOMER_ANALYSIS: &str = "customer_analysis";

/// A table that can be exported; `HEADERS` must match the serde field names
pub trait InsightTable: Serialize {
    const HEADERS: &'static [&'static str];
}

impl InsightTable for RegionalPerformance {
    const HEADERS: &'static [&'static str] = &[
        "Region",
        "Total Revenue",
        "Average Sale",
        "Total Units",
        "Total Transactions",
    ];
}

impl InsightTable for CustomerSegmentRow {
    const HEADERS: &'static [&'static str] = &[
        "Customer Segment",
        "Total Revenue",
        "Average Sale",
        "Total Transactions",
    ];
}

pub fn insights_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}_insights.csv", name))
}

/// A fully written table waiting next to its final name
#[derive(Debug)]
struct StagedFile {
    tmp_path: PathBuf,
    path: PathBuf,
    rows: usize,
}

/// Best-effort removal of a leftover file
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

fn stage_table<T: InsightTable>(dir: &Path, name: &str, rows: &[T]) -> Result<StagedFile> {
    let path = insights_path(dir, name);
    let tmp_path = path.with_extension("csv.tmp");

    if let Err(e) = write_csv(&tmp_path, rows) {
        discard(&tmp_path);
        return Err(e);
    }
    Ok(StagedFile {
        tmp_path,
        path,
        rows: rows.len(),
    })
}

/// Rename every staged file into place. If any rename fails, files already
/// published by this call and all remaining tmp files are removed.
fn publish(staged: Vec<StagedFile>) -> Result<Vec<PathBuf>> {
    let mut published: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (idx, file) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(&file.tmp_path, &file.path) {
            for path in &published {
                discard(path);
            }
            for rest in &staged[idx..] {
                discard(&rest.tmp_path);
            }
            return Err(DashboardError::io(&file.path, e));
        }
        info!("Wrote {} rows to {}", file.rows, file.path.display());
        published.push(file.path.clone());
    }
    Ok(published)
}

/// Write `rows` to `<dir>/<name>_insights.csv`, replacing any existing file
pub fn export_table<T: InsightTable>(dir: &Path, name: &str, rows: &[T]) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| DashboardError::io(dir, e))?;
    let staged = stage_table(dir, name, rows)?;
    publish(vec![staged])?;
    Ok(insights_path(dir, name))
}

fn write_csv<T: InsightTable>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| DashboardError::csv(path, e))?;

    writer
        .write_record(T::HEADERS)
        .map_err(|e| DashboardError::csv(path, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| DashboardError::csv(path, e))?;
    }
    writer.flush().map_err(|e| DashboardError::io(path, e))?;
    Ok(())
}

/// Export both analysis tables, regional first.
///
/// Both files are staged before either is renamed into place, so a failure
/// on either table leaves neither published.
pub fn export_insights(
    dir: &Path,
    regional: &[RegionalPerformance],
    customer: &[CustomerSegmentRow],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| DashboardError::io(dir, e))?;

    let regional_file = stage_table(dir, REGIONAL_PERFORMANCE, regional)?;
    let customer_file = match stage_table(dir, CUSTOMER_ANALYSIS, customer) {
        Ok(file) => file,
        Err(e) => {
            discard(&regional_file.tmp_path);
            return Err(e);
        }
    };
    publish(vec![regional_file, customer_file])
}

/// Re-parse an exported insights file
pub fn read_insights<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| DashboardError::csv(path, e))?;

    reader
        .deserialize()
        .collect::<core::result::Result<Vec<T>, csv::Error>>()
        .map_err(|e| DashboardError::csv(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn regional_rows() -> Vec<RegionalPerformance> {
        vec![
            RegionalPerformance {
                region: "East".to_string(),
                total_revenue: 25.0,
                average_sale: 12.5,
                total_units: 3,
                total_transactions: 2,
            },
            RegionalPerformance {
                region: "Pacific, North".to_string(),
                total_revenue: 0.1 + 0.2,
                average_sale: 1.0 / 3.0,
                total_units: 17,
                total_transactions: 5,
            },
        ]
    }

    #[test]
    fn test_regional_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let rows = regional_rows();

        let path = export_table(dir.path(), REGIONAL_PERFORMANCE, &rows).unwrap();
        assert_eq!(path, dir.path().join("regional_performance_insights.csv"));
        assert!(!dir.path().join("regional_performance_insights.csv.tmp").exists());

        let back: Vec<RegionalPerformance> = read_insights(&path).unwrap();
        assert_eq!(back, rows);

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Region,Total Revenue,Average Sale,Total Units,Total Transactions")
        );
        assert_eq!(lines.next(), Some("East,25.0,12.5,3,2"));
        assert!(lines.next().unwrap().starts_with("\"Pacific, North\","));
    }

    #[test]
    fn test_customer_header_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = insights_path(dir.path(), CUSTOMER_ANALYSIS);
        fs::write(&path, "stale contents\n").unwrap();

        let rows = vec![CustomerSegmentRow {
            customer_segment: "SMB".to_string(),
            total_revenue: 80.0,
            average_sale: 40.0,
            total_transactions: 2,
        }];
        export_table(dir.path(), CUSTOMER_ANALYSIS, &rows).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Customer Segment,Total Revenue,Average Sale,Total Transactions\nSMB,80.0,40.0,2\n"
        );
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let rows: Vec<CustomerSegmentRow> = Vec::new();
        let path = export_table(dir.path(), CUSTOMER_ANALYSIS, &rows).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Customer Segment,Total Revenue,Average Sale,Total Transactions\n"
        );
    }

    #[test]
    fn test_export_insights_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("reports");
        let paths = export_insights(&out, &regional_rows(), &[]).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_second_table_failure_publishes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        // a directory squatting on the customer file name makes its rename fail
        fs::create_dir(insights_path(dir.path(), CUSTOMER_ANALYSIS)).unwrap();

        let customer = vec![CustomerSegmentRow {
            customer_segment: "SMB".to_string(),
            total_revenue: 80.0,
            average_sale: 40.0,
            total_transactions: 2,
        }];
        let err = export_insights(dir.path(), &regional_rows(), &customer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileSystem);

        assert_eq!(leftovers(dir.path()), vec!["customer_analysis_insights.csv"]);
        assert!(insights_path(dir.path(), CUSTOMER_ANALYSIS).is_dir());
        assert!(!insights_path(dir.path(), REGIONAL_PERFORMANCE).exists());
    }

    #[test]
    fn test_failed_rename_removes_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(insights_path(dir.path(), REGIONAL_PERFORMANCE)).unwrap();

        let err = export_table(dir.path(), REGIONAL_PERFORMANCE, &regional_rows()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileSystem);
        assert_eq!(leftovers(dir.path()), vec!["regional_performance_insights.csv"]);
    }

    #[test]
    fn test_unwritable_target_is_file_system_error() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the output directory should be
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();

        let err = export_table(&blocker, REGIONAL_PERFORMANCE, &regional_rows()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileSystem);
    }
}
