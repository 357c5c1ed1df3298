//! ACS demographic merges into `nri_county`
//!
//! The CDC SVI / ACS5 county extract carries identifier columns plus a
//! block of demographic measures starting at `AREA_SQMI`. `ingest_acs`
//! stages that block keyed by county FIPS, widens `nri_county` with one
//! `acs_*` column per measure, and updates counties by FIPS join.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::info;

use crate::{pad_fips, EtlError, Result};

/// Staging table rewritten on every load.
pub const STAGE_TABLE: &str = "acs_county_stage";

/// Known vendor spellings for the identifier columns.
const IDENT_RENAMES: &[(&str, &str)] = &[
    ("FIPS", "county_fips"),
    ("GEOID", "county_fips"),
    ("ST", "state"),
    ("STATE", "state"),
    ("COUNTY", "county"),
    ("COUNTYNAME", "county"),
    ("NAME", "county"),
];

const REQUIRED: [&str; 3] = ["county_fips", "state", "county"];

/// Measure columns are sliced from this header to the end of the file.
const SLICE_START: &str = "area_sqmi";

fn canonical_header(raw: &str) -> String {
    IDENT_RENAMES
        .iter()
        .find(|(vendor, _)| *vendor == raw)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| raw.trim().to_lowercase())
}

/// Prefixed, lowercased measure name usable as a SQL identifier.
fn acs_column(canonical: &str) -> String {
    let mut name = String::with_capacity(canonical.len() + 4);
    name.push_str("acs_");
    for ch in canonical.chars() {
        name.push(if ch.is_ascii_alphanumeric() { ch } else { '_' });
    }
    name
}

/// Stage an ACS county CSV and merge its measures into `nri_county`.
///
/// Measures run from `AREA_SQMI` (any case) to the last column; each is
/// coerced to a number (junk becomes NULL), staged under its `acs_*`
/// name keyed by 5-digit FIPS, then copied onto the matching
/// `nri_county` row. Columns are added to `nri_county` the first time a
/// measure appears; later loads overwrite values in place. Rows without
/// a FIPS are skipped and counted. Returns the number of staged rows.
pub fn ingest_acs(conn: &mut Connection, path: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(canonical_header).collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let missing: Vec<&str> = REQUIRED
        .iter()
        .filter(|required| position(required).is_none())
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(EtlError::MissingColumns(missing.join(", ")));
    }
    let fips_idx = position("county_fips").unwrap_or_default();

    let start_idx = position(SLICE_START)
        .ok_or_else(|| EtlError::MissingColumns(SLICE_START.to_string()))?;

    // Measure block: everything from AREA_SQMI on, minus identifiers,
    // keeping the first of any duplicated header.
    let mut seen = HashSet::new();
    let measures: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .skip(start_idx)
        .filter(|(_, name)| !REQUIRED.contains(&name.as_str()))
        .map(|(idx, name)| (idx, acs_column(name)))
        .filter(|(_, column)| seen.insert(column.clone()))
        .collect();

    let tx = conn.transaction()?;

    let stage_columns: Vec<String> = measures
        .iter()
        .map(|(_, column)| format!("\"{column}\" REAL"))
        .collect();
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {STAGE_TABLE};\n\
         CREATE TABLE {STAGE_TABLE} (county_fips TEXT PRIMARY KEY, {});\n\
         CREATE INDEX idx_{STAGE_TABLE}_fips ON {STAGE_TABLE}(county_fips);",
        stage_columns.join(", ")
    ))?;

    let placeholders: Vec<&str> = (0..=measures.len()).map(|_| "?").collect();
    let insert = format!(
        "INSERT OR REPLACE INTO {STAGE_TABLE} VALUES ({})",
        placeholders.join(", ")
    );

    let mut staged = 0usize;
    let mut skipped = 0usize;
    {
        let mut stmt = tx.prepare(&insert)?;
        for record in reader.records() {
            let record = record?;
            let fips_raw = record.get(fips_idx).unwrap_or("").trim();
            if fips_raw.is_empty() {
                skipped += 1;
                continue;
            }

            let mut row: Vec<Value> = Vec::with_capacity(measures.len() + 1);
            row.push(Value::Text(pad_fips(fips_raw)));
            for (idx, _) in &measures {
                let value = record.get(*idx).unwrap_or("").trim();
                row.push(match value.parse::<f64>() {
                    Ok(number) => Value::Real(number),
                    Err(_) => Value::Null,
                });
            }
            stmt.execute(params_from_iter(row))?;
            staged += 1;
        }
    }

    let existing: HashSet<String> = tx
        .prepare("SELECT name FROM pragma_table_info('nri_county')")?
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    for (_, column) in &measures {
        if !existing.contains(column) {
            tx.execute_batch(&format!(
                "ALTER TABLE nri_county ADD COLUMN \"{column}\" REAL"
            ))?;
        }
    }

    let set_clause: Vec<String> = measures
        .iter()
        .map(|(_, column)| format!("\"{column}\" = s.\"{column}\""))
        .collect();
    tx.execute(
        &format!(
            "UPDATE nri_county AS n SET {} FROM {STAGE_TABLE} AS s \
             WHERE s.county_fips = n.county_fips",
            set_clause.join(", ")
        ),
        [],
    )?;

    tx.commit()?;

    info!(
        "staged {staged} ACS rows ({skipped} skipped without FIPS), merged {} acs_* columns",
        measures.len()
    );
    Ok(staged)
}
