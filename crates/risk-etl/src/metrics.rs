//! Per-geography metrics loads (legacy scoring path)

use std::path::Path;

use rusqlite::Connection;
use serde::Deserialize;
use tracing::info;

use nri_data::model::GeoMetrics;
use nri_data::store;

use crate::Result;

#[derive(Debug, Deserialize)]
struct RawMetricsRow {
    geo_type: String,
    code: String,
    name: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    county: String,
    median_rent: f64,
    median_price: f64,
    crime_index: f64,
    school_index: f64,
    flood_risk: f64,
    income_median: f64,
}

/// Upsert a geo metrics CSV: one `geo_unit` row keyed by (geo_type, code)
/// plus its `metrics` row, all in one transaction.
pub fn ingest_metrics(conn: &mut Connection, path: &Path) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut reader = csv::Reader::from_path(path)?;

    let mut ingested = 0usize;
    for row in reader.deserialize::<RawMetricsRow>() {
        let raw = row?;
        let geo_id = store::upsert_geo_unit(
            &tx,
            raw.geo_type.trim(),
            raw.code.trim(),
            raw.name.trim(),
            raw.state.trim(),
            raw.county.trim(),
        )?;
        store::upsert_metrics(
            &tx,
            &GeoMetrics {
                geo_id,
                median_rent: raw.median_rent,
                median_price: raw.median_price,
                crime_index: raw.crime_index,
                school_index: raw.school_index,
                flood_risk: raw.flood_risk,
                income_median: raw.income_median,
            },
        )?;
        ingested += 1;
    }
    tx.commit()?;

    info!("ingested {ingested} geo metrics rows");
    Ok(ingested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nri_data::schema;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn ingest_links_metrics_to_geo_units() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"geo_type,code,name,state,county,median_rent,median_price,crime_index,school_index,flood_risk,income_median\n\
              ZIP,20147,Ashburn,VA,Loudoun,2100,640000,18,88,12,152000\n\
              ZIP,20148,Brambleton,VA,Loudoun,2300,700000,15,90,8,160000\n",
        )
        .unwrap();

        let mut conn = Connection::open_in_memory().unwrap();
        schema::init(&conn).unwrap();

        assert_eq!(ingest_metrics(&mut conn, file.path()).unwrap(), 2);
        // Second run updates in place
        assert_eq!(ingest_metrics(&mut conn, file.path()).unwrap(), 2);

        let units: i64 = conn
            .query_row("SELECT COUNT(*) FROM geo_unit", [], |r| r.get(0))
            .unwrap();
        let metrics: i64 = conn
            .query_row("SELECT COUNT(*) FROM metrics", [], |r| r.get(0))
            .unwrap();
        assert_eq!(units, 2);
        assert_eq!(metrics, 2);

        let rent: f64 = conn
            .query_row(
                "SELECT m.median_rent FROM metrics m
                 JOIN geo_unit g ON g.id = m.geo_id WHERE g.code = '20147'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(rent, 2100.0);
    }
}
