//! Error taxonomy for the dashboard pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Which pipeline stage an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Store unreachable, schema mismatch, query failure or a malformed row
    DataAccess,
    /// Mean or arg-max requested over zero rows
    NoData,
    /// Export target not writable
    FileSystem,
    /// Chart rendering failed
    Render,
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("malformed sale record {sale_id}: {reason}")]
    MalformedRecord { sale_id: i64, reason: String },

    #[error("no data: cannot compute {0} over an empty sales table")]
    NoData(&'static str),

    #[error("failed to write {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chart rendering failed: {0}")]
    Render(String),
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::Database(_) | DashboardError::MalformedRecord { .. } => {
                ErrorKind::DataAccess
            }
            DashboardError::NoData(_) => ErrorKind::NoData,
            DashboardError::Csv { .. } | DashboardError::Io { .. } => ErrorKind::FileSystem,
            DashboardError::Render(_) => ErrorKind::Render,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        DashboardError::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = core::result::Result<T, DashboardError>;
