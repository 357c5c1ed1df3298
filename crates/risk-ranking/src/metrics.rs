//! Legacy percentile scorer for the per-geography metrics path
//!
//! Normalizes a raw metric onto a 0-100 scale against the p10-p90 band of
//! its column. Not used by the county search path; kept for the geo
//! metrics tables. SQLite has no `percentile_cont`, so the percentiles
//! are computed in-process with linear interpolation.

use rusqlite::Connection;

use crate::rank::round1;
use crate::Result;

/// p10/p90 band for one metric column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricBand {
    pub p10: f64,
    pub p90: f64,
}

/// Percentile bands for every metrics column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricPercentiles {
    pub median_rent: MetricBand,
    pub median_price: MetricBand,
    pub crime_index: MetricBand,
    pub school_index: MetricBand,
    pub flood_risk: MetricBand,
    pub income_median: MetricBand,
}

impl MetricPercentiles {
    pub fn compute(conn: &Connection) -> Result<Self> {
        Ok(Self {
            median_rent: column_band(conn, "median_rent")?,
            median_price: column_band(conn, "median_price")?,
            crime_index: column_band(conn, "crime_index")?,
            school_index: column_band(conn, "school_index")?,
            flood_risk: column_band(conn, "flood_risk")?,
            income_median: column_band(conn, "income_median")?,
        })
    }
}

fn column_band(conn: &Connection, column: &str) -> Result<MetricBand> {
    // Column names come from the fixed list above, never from input.
    let sql = format!("SELECT {column} FROM metrics WHERE {column} IS NOT NULL ORDER BY {column}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| row.get::<_, f64>(0))?;
    let mut values = Vec::new();
    for row in rows {
        values.push(row?);
    }
    Ok(MetricBand {
        p10: percentile_cont(&values, 0.10),
        p90: percentile_cont(&values, 0.90),
    })
}

/// Continuous percentile over an ascending-sorted slice, matching the
/// SQL `percentile_cont` interpolation. Empty input yields 0.0.
pub fn percentile_cont(sorted: &[f64], fraction: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = fraction * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            if lower == upper {
                sorted[lower]
            } else {
                let weight = pos - lower as f64;
                sorted[lower] * (1.0 - weight) + sorted[upper] * weight
            }
        }
    }
}

/// Normalize a value against its column's p10-p90 band onto 0-100,
/// clamped, one decimal. `inverse` flips the scale for metrics where
/// lower raw values are better (crime, flood risk, prices).
pub fn normalize(value: f64, band: MetricBand, inverse: bool) -> f64 {
    if band.p90 <= band.p10 {
        return 50.0;
    }
    let x = ((value - band.p10) / (band.p90 - band.p10)).clamp(0.0, 1.0);
    let score = 100.0 * if inverse { 1.0 - x } else { x };
    round1(score)
}
