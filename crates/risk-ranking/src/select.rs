//! Candidate selection SQL
//!
//! Scope rules: a resolved FIPS prefix wins; otherwise a known state code
//! falls back to a case-insensitive substring match against the stored
//! state column (the source data stores both "VA" and "Virginia");
//! otherwise no state restriction. A non-empty normalized query joins the
//! city crosswalk so city names can match as well as county names.

use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use nri_data::model::CountyRisk;
use nri_data::store::COUNTY_COLUMNS;

use crate::normalize::StateFilter;
use crate::Result;

/// Minimal row for rank computation over the state-scope population.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeRow {
    pub county_fips: String,
    pub risk_score: Option<f64>,
}

fn scope_clause(filter: &StateFilter, clauses: &mut Vec<&'static str>, args: &mut Vec<String>) {
    if let Some(prefix) = &filter.fips_prefix {
        clauses.push("c.county_fips LIKE ?");
        args.push(format!("{prefix}%"));
    } else if let Some(code) = &filter.code {
        clauses.push("lower(c.state) LIKE ?");
        args.push(format!("%{}%", code.to_lowercase()));
    }
}

/// Select candidate counties for a normalized (state, query) pair.
///
/// Counties are de-duplicated by `county_fips`: the crosswalk join can
/// otherwise yield one row per matching city of the same county.
pub fn candidate_counties(
    conn: &Connection,
    filter: &StateFilter,
    q_norm: &str,
) -> Result<Vec<CountyRisk>> {
    let columns = COUNTY_COLUMNS
        .split(", ")
        .map(|col| format!("c.{}", col.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("SELECT DISTINCT {columns} FROM nri_county c");
    let mut clauses: Vec<&str> = Vec::new();
    let mut args: Vec<String> = Vec::new();

    if !q_norm.is_empty() {
        sql.push_str(" LEFT JOIN city_county_xwalk x ON x.county_fips = c.county_fips");
    }

    scope_clause(filter, &mut clauses, &mut args);

    if !q_norm.is_empty() {
        // Match "starts with first token" or "contains whole query",
        // against both county and crosswalked city names.
        let first = q_norm.split_whitespace().next().unwrap_or(q_norm);
        let prefix = format!("{first}%");
        let contains = format!("%{q_norm}%");
        clauses.push(
            "(lower(c.county) LIKE ? OR lower(c.county) LIKE ? \
             OR lower(x.city) LIKE ? OR lower(x.city) LIKE ?)",
        );
        args.push(prefix.clone());
        args.push(contains.clone());
        args.push(prefix);
        args.push(contains);
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY c.risk_score ASC");

    debug!(%sql, "candidate query");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), CountyRisk::from_row)?;
    let mut counties = Vec::new();
    for row in rows {
        counties.push(row?);
    }
    Ok(counties)
}

/// Every county in the state scope, unfiltered by name. Input for the
/// dense-rank computation, recomputed per request.
pub fn scope_population(conn: &Connection, filter: &StateFilter) -> Result<Vec<ScopeRow>> {
    let mut sql = "SELECT c.county_fips, c.risk_score FROM nri_county c".to_string();
    let mut clauses: Vec<&str> = Vec::new();
    let mut args: Vec<String> = Vec::new();

    scope_clause(filter, &mut clauses, &mut args);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
        Ok(ScopeRow {
            county_fips: row.get(0)?,
            risk_score: row.get(1)?,
        })
    })?;
    let mut population = Vec::new();
    for row in rows {
        population.push(row?);
    }
    Ok(population)
}

/// Distinct county names containing `q`, for typeahead suggestions.
pub fn suggest_counties(conn: &Connection, q: &str, limit: usize) -> Result<Vec<String>> {
    let pattern = format!("%{}%", q.to_lowercase());
    let mut stmt = conn.prepare(
        "SELECT DISTINCT county FROM city_county_xwalk
         WHERE lower(county) LIKE ?1 ORDER BY county LIMIT ?2",
    )?;
    let rows = stmt.query_map(rusqlite::params![pattern, limit as i64], |row| row.get(0))?;
    let mut names = Vec::new();
    for row in rows {
        names.push(row?);
    }
    Ok(names)
}
