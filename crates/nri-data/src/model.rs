//! Typed records for the persisted tables

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// One county from the FEMA National Risk Index.
///
/// `county_fips` is always exactly 5 characters, zero-padded. Lower
/// `risk_score` means safer; the per-hazard and social scores are
/// optional in the source data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CountyRisk {
    pub county_fips: String,
    pub county: String,
    pub state: String,
    pub risk_score: Option<f64>,
    pub flood_score: Option<f64>,
    pub heat_score: Option<f64>,
    pub wildfire_score: Option<f64>,
    pub tornado_score: Option<f64>,
    pub winter_score: Option<f64>,
    pub hurricane_score: Option<f64>,
    pub sovi_score: Option<f64>,
    pub resilience_score: Option<f64>,
}

impl CountyRisk {
    /// Map a row selected with [`crate::store::COUNTY_COLUMNS`] column order.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            county_fips: row.get(0)?,
            county: row.get(1)?,
            state: row.get(2)?,
            risk_score: row.get(3)?,
            flood_score: row.get(4)?,
            heat_score: row.get(5)?,
            wildfire_score: row.get(6)?,
            tornado_score: row.get(7)?,
            winter_score: row.get(8)?,
            hurricane_score: row.get(9)?,
            sovi_score: row.get(10)?,
            resilience_score: row.get(11)?,
        })
    }
}

/// City to containing county, keyed by (city, state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCountyRow {
    pub city: String,
    pub state: String,
    pub county: String,
    pub county_fips: String,
}

/// A geography unit for the legacy metrics path (ZIP or tract).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoUnit {
    pub id: i64,
    pub geo_type: String,
    pub code: String,
    pub name: String,
    pub state: String,
    pub county: String,
}

/// Raw metrics for one geography unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoMetrics {
    pub geo_id: i64,
    pub median_rent: f64,
    pub median_price: f64,
    pub crime_index: f64,
    pub school_index: f64,
    pub flood_risk: f64,
    pub income_median: f64,
}
