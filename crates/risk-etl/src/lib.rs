//! Batch loaders for the hazard-risk database
//!
//! Each ingest reads one CSV and upserts into its table inside a single
//! transaction: any error rolls the whole file back. Re-running a load
//! against the same source is idempotent — rows are keyed by their
//! table's natural key and replaced on conflict.

use thiserror::Error;

pub mod acs;
pub mod metrics;
pub mod nri;
pub mod xwalk;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("store error: {0}")]
    Store(#[from] nri_data::StoreError),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("missing required columns: {0}")]
    MissingColumns(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;

/// Zero-pad a county FIPS to 5 characters, dropping the spreadsheet
/// float artifact ("51041.0").
pub fn pad_fips(raw: &str) -> String {
    let cleaned = raw.trim().trim_end_matches(".0");
    format!("{cleaned:0>5}")
}
