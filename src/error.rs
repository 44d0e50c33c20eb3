use thiserror::Error;

/// Errors from the I/O edges of the crate: loading orders, reading configuration.
///
/// The aggregation, scaling and animation core never fails; it falls back to safe
/// defaults instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid color: {0:?} (expected #rrggbb)")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, Error>;
