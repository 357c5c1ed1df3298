//! FEMA National Risk Index county loads
//!
//! Two stages, as the data arrives: `clean_nri` turns a raw NRI county
//! export (vendor headers, partial FIPS codes) into the canonical CSV
//! layout, and `ingest_nri` upserts a cleaned CSV into `nri_county`.

use std::fs;
use std::path::Path;

use rusqlite::Connection;
use serde::Deserialize;
use tracing::info;

use nri_data::model::CountyRisk;
use nri_data::store;

use crate::{pad_fips, EtlError, Result};

/// Canonical column set, required columns first.
pub const FIELDS: [&str; 12] = [
    "county_fips",
    "county",
    "state",
    "risk_score",
    "flood_score",
    "heat_score",
    "wildfire_score",
    "tornado_score",
    "winter_score",
    "hurricane_score",
    "sovi_score",
    "resilience_score",
];

/// Known vendor header spellings for each canonical column.
const HEADER_CANDIDATES: &[(&str, &[&str])] = &[
    (
        "county_fips",
        &["COUNTYFIPS", "CountyFIPS", "FIPS", "GEOID", "County FIPS", "CountyFips"],
    ),
    ("county", &["COUNTY", "County", "County Name", "COUNTY_NAME"]),
    ("state", &["STATE", "State", "STATEABBR", "State Abbr", "STATE_ABBR"]),
    ("risk_score", &["RISK_SCORE", "RiskScore", "Risk Score", "RISK SCORE"]),
    (
        "flood_score",
        &["RFLD_RISK_SCORE", "CFLD_RISK_SCORE", "FLD_RISK_SCORE", "RFLD_RISKSCORE"],
    ),
    ("heat_score", &["HWAV_RISK_SCORE", "HEAT_RISK_SCORE", "HWAV_RISKSCORE"]),
    ("wildfire_score", &["WFIR_RISK_SCORE", "WFIR_RISKSCORE"]),
    (
        "tornado_score",
        &["TRND_RISK_SCORE", "TORN_RISK_SCORE", "TRND_RISKSCORE"],
    ),
    (
        "winter_score",
        &["WNTR_RISK_SCORE", "WINTER_RISK_SCORE", "WNTR_RISKSCORE"],
    ),
    (
        "hurricane_score",
        &["HRCN_RISK_SCORE", "HURR_RISK_SCORE", "HRCN_RISKSCORE"],
    ),
    ("sovi_score", &["SOVI_SCORE", "SOVI Score", "SOVI"]),
    (
        "resilience_score",
        &["RESL_SCORE", "RESILIENCE_SCORE", "RESL Score", "RESL"],
    ),
];

const REQUIRED: [&str; 4] = ["county_fips", "county", "state", "risk_score"];

fn state_fips(state: &str) -> Option<&'static str> {
    match state.trim().to_uppercase().as_str() {
        "VA" | "VIRGINIA" => Some("51"),
        _ => None,
    }
}

/// First exact header match, then case-insensitive.
fn pick(headers: &csv::StringRecord, options: &[&str]) -> Option<usize> {
    options
        .iter()
        .find_map(|opt| headers.iter().position(|h| h == *opt))
        .or_else(|| {
            options
                .iter()
                .find_map(|opt| headers.iter().position(|h| h.eq_ignore_ascii_case(opt)))
        })
}

/// Rebuild the 5-digit FIPS: state prefix from the lookup plus the last
/// three county digits, zero-padded. Unknown state falls back to padding
/// the raw value.
fn full_fips(raw: &str, state: &str) -> String {
    let cleaned = raw.trim().trim_end_matches(".0");
    match state_fips(state) {
        Some(prefix) => {
            let tail: String = cleaned
                .chars()
                .rev()
                .take(3)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("{prefix}{tail:0>3}")
        }
        None => format!("{cleaned:0>5}"),
    }
}

/// Clean a raw NRI county export into the canonical CSV layout.
///
/// Picks each canonical column from its candidate header list, rebuilds
/// the full FIPS, trims names, and coerces numerics (unparseable values
/// become empty fields). Returns the number of rows written.
pub fn clean_nri(input: &Path, output: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(input)?;
    let headers = reader.headers()?.clone();

    let mapping: Vec<(&str, usize)> = HEADER_CANDIDATES
        .iter()
        .filter_map(|(canonical, options)| pick(&headers, options).map(|idx| (*canonical, idx)))
        .collect();

    let missing: Vec<&str> = REQUIRED
        .iter()
        .filter(|required| !mapping.iter().any(|(canonical, _)| canonical == *required))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(EtlError::MissingColumns(missing.join(", ")));
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(mapping.iter().map(|(canonical, _)| *canonical))?;

    let mut rows = 0usize;
    for record in reader.records() {
        let record = record?;
        let state = mapping
            .iter()
            .find(|(canonical, _)| *canonical == "state")
            .and_then(|(_, idx)| record.get(*idx))
            .unwrap_or("")
            .trim()
            .to_string();

        let out: Vec<String> = mapping
            .iter()
            .map(|(canonical, idx)| {
                let value = record.get(*idx).unwrap_or("").trim();
                match *canonical {
                    "county" | "state" => value.to_string(),
                    "county_fips" => full_fips(value, &state),
                    _ => value
                        .parse::<f64>()
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                }
            })
            .collect();
        writer.write_record(&out)?;
        rows += 1;
    }
    writer.flush()?;

    info!("cleaned {rows} NRI rows from {:?} into {:?}", input, output);
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct RawCountyRow {
    #[serde(default)]
    county_fips: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    risk_score: Option<f64>,
    #[serde(default)]
    flood_score: Option<f64>,
    #[serde(default)]
    heat_score: Option<f64>,
    #[serde(default)]
    wildfire_score: Option<f64>,
    #[serde(default)]
    tornado_score: Option<f64>,
    #[serde(default)]
    winter_score: Option<f64>,
    #[serde(default)]
    hurricane_score: Option<f64>,
    #[serde(default)]
    sovi_score: Option<f64>,
    #[serde(default)]
    resilience_score: Option<f64>,
}

/// Normalize a stored state value to a 2-letter abbreviation.
fn state_abbr(raw: &str) -> String {
    let s = raw.trim();
    if s.chars().count() == 2 {
        return s.to_uppercase();
    }
    match s.to_uppercase().as_str() {
        "VIRGINIA" => "VA".to_string(),
        other => other.chars().take(2).collect(),
    }
}

/// Upsert a cleaned NRI CSV into `nri_county` in one transaction.
/// Rows without a FIPS are skipped and counted.
pub fn ingest_nri(conn: &mut Connection, path: &Path) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut reader = csv::Reader::from_path(path)?;

    let mut ingested = 0usize;
    let mut skipped = 0usize;
    for row in reader.deserialize::<RawCountyRow>() {
        let raw = row?;
        let fips_raw = raw.county_fips.unwrap_or_default();
        if fips_raw.trim().is_empty() {
            skipped += 1;
            continue;
        }

        let record = CountyRisk {
            county_fips: pad_fips(&fips_raw),
            county: raw.county.unwrap_or_default().trim().to_string(),
            state: state_abbr(raw.state.as_deref().unwrap_or("")),
            risk_score: raw.risk_score,
            flood_score: raw.flood_score,
            heat_score: raw.heat_score,
            wildfire_score: raw.wildfire_score,
            tornado_score: raw.tornado_score,
            winter_score: raw.winter_score,
            hurricane_score: raw.hurricane_score,
            sovi_score: raw.sovi_score,
            resilience_score: raw.resilience_score,
        };
        store::upsert_county(&tx, &record)?;
        ingested += 1;
    }
    tx.commit()?;

    info!("ingested {ingested} NRI county rows ({skipped} skipped without FIPS)");
    Ok(ingested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nri_data::schema;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn clean_maps_vendor_headers_and_rebuilds_fips() {
        let raw = write_csv(
            "COUNTYFIPS,COUNTY,STATE,RISK_SCORE,RFLD_RISK_SCORE,SOVI_SCORE\n\
             41,Chesterfield,Virginia,37.5,12.0,not-a-number\n",
        );
        let out = NamedTempFile::new().unwrap();

        let rows = clean_nri(raw.path(), out.path()).unwrap();
        assert_eq!(rows, 1);

        let cleaned = std::fs::read_to_string(out.path()).unwrap();
        let mut lines = cleaned.lines();
        assert_eq!(
            lines.next().unwrap(),
            "county_fips,county,state,risk_score,flood_score,sovi_score"
        );
        // 51 prefix from Virginia + last 3 digits padded; junk numeric coerced to empty
        assert_eq!(lines.next().unwrap(), "51041,Chesterfield,Virginia,37.5,12,");
    }

    #[test]
    fn clean_rejects_missing_required_columns() {
        let raw = write_csv("COUNTY,STATE\nChesterfield,VA\n");
        let out = NamedTempFile::new().unwrap();

        let err = clean_nri(raw.path(), out.path()).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumns(_)));
    }

    #[test]
    fn ingest_upserts_and_skips_rows_without_fips() {
        let csv = write_csv(
            "county_fips,county,state,risk_score,flood_score\n\
             51041,Chesterfield,Virginia,37.5,12.0\n\
             ,Ghost,VA,1.0,\n\
             1041,Amelia,VA,,\n",
        );

        let mut conn = Connection::open_in_memory().unwrap();
        schema::init(&conn).unwrap();

        let ingested = ingest_nri(&mut conn, csv.path()).unwrap();
        assert_eq!(ingested, 2);

        let (state, risk): (String, Option<f64>) = conn
            .query_row(
                "SELECT state, risk_score FROM nri_county WHERE county_fips = '51041'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(state, "VA");
        assert_eq!(risk, Some(37.5));

        // Short FIPS zero-padded, empty risk stored as NULL
        let amelia: Option<f64> = conn
            .query_row(
                "SELECT risk_score FROM nri_county WHERE county_fips = '01041'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(amelia, None);

        // Re-ingest replaces rather than duplicates
        ingest_nri(&mut conn, csv.path()).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM nri_county", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
