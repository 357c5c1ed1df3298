//! Write path: idempotent upserts keyed by each table's natural key

use rusqlite::{params, Connection, OptionalExtension};

use crate::model::{CityCountyRow, CountyRisk, GeoMetrics};
use crate::Result;

/// Column order expected by [`CountyRisk::from_row`].
pub const COUNTY_COLUMNS: &str = "county_fips, county, state, risk_score, flood_score, \
     heat_score, wildfire_score, tornado_score, winter_score, hurricane_score, \
     sovi_score, resilience_score";

/// Insert or replace a county row, keyed by `county_fips`.
pub fn upsert_county(conn: &Connection, row: &CountyRisk) -> Result<()> {
    conn.execute(
        "INSERT INTO nri_county (county_fips, county, state, risk_score, flood_score,
             heat_score, wildfire_score, tornado_score, winter_score, hurricane_score,
             sovi_score, resilience_score)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(county_fips) DO UPDATE SET
             county = excluded.county,
             state = excluded.state,
             risk_score = excluded.risk_score,
             flood_score = excluded.flood_score,
             heat_score = excluded.heat_score,
             wildfire_score = excluded.wildfire_score,
             tornado_score = excluded.tornado_score,
             winter_score = excluded.winter_score,
             hurricane_score = excluded.hurricane_score,
             sovi_score = excluded.sovi_score,
             resilience_score = excluded.resilience_score",
        params![
            row.county_fips,
            row.county,
            row.state,
            row.risk_score,
            row.flood_score,
            row.heat_score,
            row.wildfire_score,
            row.tornado_score,
            row.winter_score,
            row.hurricane_score,
            row.sovi_score,
            row.resilience_score,
        ],
    )?;
    Ok(())
}

/// Insert or replace a crosswalk row, keyed by (city, state). Last write wins.
pub fn upsert_crosswalk(conn: &Connection, row: &CityCountyRow) -> Result<()> {
    conn.execute(
        "INSERT INTO city_county_xwalk (city, state, county, county_fips)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(city, state) DO UPDATE SET
             county = excluded.county,
             county_fips = excluded.county_fips",
        params![row.city, row.state, row.county, row.county_fips],
    )?;
    Ok(())
}

/// Insert or refresh a geography unit, keyed by (geo_type, code).
///
/// Empty incoming fields leave the stored value untouched. Returns the
/// unit's row id for the metrics upsert.
pub fn upsert_geo_unit(
    conn: &Connection,
    geo_type: &str,
    code: &str,
    name: &str,
    state: &str,
    county: &str,
) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM geo_unit WHERE geo_type = ?1 AND code = ?2",
            params![geo_type, code],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(id) => {
            conn.execute(
                "UPDATE geo_unit SET
                     name = CASE WHEN ?2 <> '' THEN ?2 ELSE name END,
                     state = CASE WHEN ?3 <> '' THEN ?3 ELSE state END,
                     county = CASE WHEN ?4 <> '' THEN ?4 ELSE county END
                 WHERE id = ?1",
                params![id, name, state, county],
            )?;
            Ok(id)
        }
        None => {
            conn.execute(
                "INSERT INTO geo_unit (geo_type, code, name, state, county)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![geo_type, code, name, state, county],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }
}

/// Insert or replace the metrics row for a geography unit.
pub fn upsert_metrics(conn: &Connection, row: &GeoMetrics) -> Result<()> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM metrics WHERE geo_id = ?1",
            params![row.geo_id],
            |r| r.get(0),
        )
        .optional()?;

    match existing {
        Some(id) => {
            conn.execute(
                "UPDATE metrics SET median_rent = ?2, median_price = ?3, crime_index = ?4,
                     school_index = ?5, flood_risk = ?6, income_median = ?7
                 WHERE id = ?1",
                params![
                    id,
                    row.median_rent,
                    row.median_price,
                    row.crime_index,
                    row.school_index,
                    row.flood_risk,
                    row.income_median,
                ],
            )?;
        }
        None => {
            conn.execute(
                "INSERT INTO metrics (geo_id, median_rent, median_price, crime_index,
                     school_index, flood_risk, income_median)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.geo_id,
                    row.median_rent,
                    row.median_price,
                    row.crime_index,
                    row.school_index,
                    row.flood_risk,
                    row.income_median,
                ],
            )?;
        }
    }
    Ok(())
}
