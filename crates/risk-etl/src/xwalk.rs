//! City-to-county crosswalk loads

use std::path::Path;

use rusqlite::Connection;
use serde::Deserialize;
use tracing::info;

use nri_data::model::CityCountyRow;
use nri_data::store;

use crate::{pad_fips, Result};

#[derive(Debug, Deserialize)]
struct RawXwalkRow {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    county_fips: Option<String>,
}

/// Upsert a city→county CSV into `city_county_xwalk` in one transaction.
/// Rows missing city, state, or FIPS are skipped and counted.
pub fn ingest_crosswalk(conn: &mut Connection, path: &Path) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut reader = csv::Reader::from_path(path)?;

    let mut ingested = 0usize;
    let mut skipped = 0usize;
    for row in reader.deserialize::<RawXwalkRow>() {
        let raw = row?;
        let city = raw.city.unwrap_or_default().trim().to_string();
        let state = raw.state.unwrap_or_default().trim().to_uppercase();
        let fips_raw = raw.county_fips.unwrap_or_default();
        if city.is_empty() || state.is_empty() || fips_raw.trim().is_empty() {
            skipped += 1;
            continue;
        }

        store::upsert_crosswalk(
            &tx,
            &CityCountyRow {
                city,
                state,
                county: raw.county.unwrap_or_default().trim().to_string(),
                county_fips: pad_fips(&fips_raw),
            },
        )?;
        ingested += 1;
    }
    tx.commit()?;

    info!("ingested {ingested} city-county rows ({skipped} skipped incomplete)");
    Ok(ingested)
}
