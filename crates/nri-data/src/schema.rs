//! Table definitions
//!
//! The schema is created on startup with `IF NOT EXISTS` guards; there is
//! no migration machinery. `county_fips` in the crosswalk is a soft
//! reference to `nri_county`, not an enforced foreign key.

use rusqlite::Connection;

use crate::Result;

const DDL: &str = "
CREATE TABLE IF NOT EXISTS nri_county (
    county_fips      TEXT PRIMARY KEY,
    county           TEXT NOT NULL,
    state            TEXT NOT NULL,
    risk_score       REAL,
    flood_score      REAL,
    heat_score       REAL,
    wildfire_score   REAL,
    tornado_score    REAL,
    winter_score     REAL,
    hurricane_score  REAL,
    sovi_score       REAL,
    resilience_score REAL
);
CREATE INDEX IF NOT EXISTS idx_nri_county_county ON nri_county (county);
CREATE INDEX IF NOT EXISTS idx_nri_county_state  ON nri_county (state);

CREATE TABLE IF NOT EXISTS city_county_xwalk (
    city        TEXT NOT NULL,
    state       TEXT NOT NULL,
    county      TEXT NOT NULL,
    county_fips TEXT NOT NULL,
    PRIMARY KEY (city, state)
);
CREATE INDEX IF NOT EXISTS idx_xwalk_county ON city_county_xwalk (county);
CREATE INDEX IF NOT EXISTS idx_xwalk_fips   ON city_county_xwalk (county_fips);

CREATE TABLE IF NOT EXISTS geo_unit (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    geo_type TEXT NOT NULL,
    code     TEXT NOT NULL,
    name     TEXT NOT NULL,
    state    TEXT NOT NULL,
    county   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_geo_unit_code ON geo_unit (code);

CREATE TABLE IF NOT EXISTS metrics (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    geo_id        INTEGER NOT NULL,
    median_rent   REAL NOT NULL,
    median_price  REAL NOT NULL,
    crime_index   REAL NOT NULL,
    school_index  REAL NOT NULL,
    flood_risk    REAL NOT NULL,
    income_median REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_metrics_geo ON metrics (geo_id);
";

/// Create all tables and indexes if they do not exist yet.
pub fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(DDL)?;
    Ok(())
}
