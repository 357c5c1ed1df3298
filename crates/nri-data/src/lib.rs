//! County hazard-risk data model and SQLite store
//!
//! Holds the typed records for the three persisted datasets and the
//! write-path used by the batch loaders:
//!
//! - `nri_county` — one row per county from the FEMA National Risk Index,
//!   keyed by 5-digit FIPS (2-digit state + 3-digit county, zero-padded)
//! - `city_county_xwalk` — city name to containing county, keyed by
//!   (city, state), last write wins
//! - `geo_unit` / `metrics` — per-geography raw metrics for the legacy
//!   percentile scoring path
//!
//! All loads are upserts keyed by the table's natural key, so re-running
//! an ingest against the same source replaces matching rows.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use thiserror::Error;

pub mod model;
pub mod schema;
pub mod store;

pub use model::{CityCountyRow, CountyRisk, GeoMetrics, GeoUnit};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle on the SQLite database file.
///
/// Holds only the path; every caller opens its own connection for the
/// duration of its work and releases it by drop. No connection is shared
/// across requests.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection. Dropped on every exit path of the caller.
    pub fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }
}
