//! County Ranking Query Service
//!
//! Given a free-text query and an optional state, selects matching
//! counties, inverts the stored FEMA risk score onto a 0-100 overall
//! score, attaches each county's dense rank within its state, and returns
//! the candidates sorted by overall score.
//!
//! The within-state rank is computed over the full state-scope population
//! (not just the name-filtered candidates) and is recomputed on every
//! request; nothing is cached across requests.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod metrics;
pub mod normalize;
pub mod rank;
pub mod select;

pub use normalize::{StateFilter, StateLookup};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("store error: {0}")]
    Store(#[from] nri_data::StoreError),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Search request body. Absent fields widen the search; `limit`/`page`
/// cap the response after ranking when supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub state: Option<String>,
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub page: Option<usize>,
}

/// One ranked county. `fema_risk_rating` duplicates `fema_risk_score`;
/// the shipped front end reads the rating key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub geo_id: String,
    pub name: String,
    pub fema_risk_score: Option<f64>,
    pub fema_risk_rating: Option<f64>,
    pub state_rank: Option<u32>,
    pub overall_score: Option<f64>,
    pub rank: usize,
}

/// Run the full search pipeline: normalize, select, score, rank, sort.
pub fn search(
    conn: &Connection,
    lookup: &StateLookup,
    request: &SearchRequest,
) -> Result<Vec<SearchResult>> {
    let filter = lookup.normalize_state(request.state.as_deref().unwrap_or(""));
    let q_norm = lookup.normalize_query(request.q.as_deref().unwrap_or(""));

    let candidates = select::candidate_counties(conn, &filter, &q_norm)?;
    let population = select::scope_population(conn, &filter)?;
    let (state_ranks, _state_total) = rank::dense_rank_map(&population);

    let mut results: Vec<SearchResult> = candidates
        .into_iter()
        .map(|county| SearchResult {
            state_rank: state_ranks.get(&county.county_fips).copied(),
            overall_score: rank::overall_score(county.risk_score),
            name: format!("{}, {}", county.county, county.state),
            geo_id: county.county_fips,
            fema_risk_score: county.risk_score,
            fema_risk_rating: county.risk_score,
            rank: 0,
        })
        .collect();

    results.sort_by(|a, b| rank::overall_order(a.overall_score, b.overall_score));
    for (position, result) in results.iter_mut().enumerate() {
        result.rank = position + 1;
    }

    Ok(paginate(results, request.limit, request.page))
}

/// Slice after rank assignment so `rank` stays the position in the
/// overall ordering. No limit means no cap.
fn paginate(
    results: Vec<SearchResult>,
    limit: Option<usize>,
    page: Option<usize>,
) -> Vec<SearchResult> {
    let Some(limit) = limit else {
        return results;
    };
    let page = page.unwrap_or(1).max(1);
    results
        .into_iter()
        .skip(page.saturating_sub(1).saturating_mul(limit))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nri_data::model::{CityCountyRow, CountyRisk};
    use nri_data::{schema, store};

    fn seeded_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init(&conn).unwrap();
        conn
    }

    fn seed_county(conn: &Connection, fips: &str, county: &str, state: &str, risk: Option<f64>) {
        store::upsert_county(
            conn,
            &CountyRisk {
                county_fips: fips.to_string(),
                county: county.to_string(),
                state: state.to_string(),
                risk_score: risk,
                ..CountyRisk::default()
            },
        )
        .unwrap();
    }

    fn seed_city(conn: &Connection, city: &str, state: &str, county: &str, fips: &str) {
        store::upsert_crosswalk(
            conn,
            &CityCountyRow {
                city: city.to_string(),
                state: state.to_string(),
                county: county.to_string(),
                county_fips: fips.to_string(),
            },
        )
        .unwrap();
    }

    fn request(state: &str, q: &str) -> SearchRequest {
        SearchRequest {
            state: Some(state.to_string()),
            q: Some(q.to_string()),
            ..SearchRequest::default()
        }
    }

    #[test]
    fn tie_scenario_ranks_and_scores() {
        let conn = seeded_conn();
        seed_county(&conn, "51001", "Accomack", "VA", Some(5.0));
        seed_county(&conn, "51003", "Albemarle", "VA", Some(5.0));
        seed_county(&conn, "51005", "Alleghany", "VA", Some(15.0));

        let results = search(&conn, &StateLookup::default(), &request("VA", "")).unwrap();
        assert_eq!(results.len(), 3);

        // A and B tie on risk 5.0 (order between them unspecified), C follows.
        assert_eq!(results[2].geo_id, "51005");
        assert_eq!(results[2].overall_score, Some(85.0));
        assert_eq!(results[2].state_rank, Some(2));
        assert_eq!(results[2].rank, 3);
        for result in &results[..2] {
            assert_eq!(result.overall_score, Some(95.0));
            assert_eq!(result.state_rank, Some(1));
        }
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
    }

    #[test]
    fn empty_query_returns_whole_state_scope() {
        let conn = seeded_conn();
        seed_county(&conn, "51040", "Charlotte", "VA", Some(30.0));
        seed_county(&conn, "51059", "Fairfax", "VA", Some(60.0));
        seed_county(&conn, "24031", "Montgomery", "MD", Some(10.0));

        let results = search(&conn, &StateLookup::default(), &request("VA", "")).unwrap();
        let fips: Vec<&str> = results.iter().map(|r| r.geo_id.as_str()).collect();
        assert_eq!(fips, vec!["51040", "51059"]);
        assert_eq!(results[0].overall_score, Some(70.0));
        assert_eq!(results[0].rank, 1);
    }

    #[test]
    fn query_matches_county_name_with_state_suffix() {
        let conn = seeded_conn();
        seed_county(&conn, "51037", "Charlotte", "VA", Some(25.0));
        seed_county(&conn, "51059", "Fairfax", "VA", Some(60.0));

        for raw in ["Charlotte, Virginia", "Charlotte County, VA", "charlotte"] {
            let results = search(&conn, &StateLookup::default(), &request("VA", raw)).unwrap();
            assert_eq!(results.len(), 1, "query {raw:?}");
            assert_eq!(results[0].geo_id, "51037");
            assert_eq!(results[0].name, "Charlotte, VA");
        }
    }

    #[test]
    fn query_matches_through_city_crosswalk() {
        let conn = seeded_conn();
        seed_county(&conn, "51107", "Loudoun", "VA", Some(40.0));
        seed_county(&conn, "51059", "Fairfax", "VA", Some(60.0));
        seed_city(&conn, "Ashburn", "VA", "Loudoun", "51107");

        let results = search(&conn, &StateLookup::default(), &request("VA", "Ashburn")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].geo_id, "51107");
    }

    #[test]
    fn county_with_multiple_matching_cities_appears_once() {
        let conn = seeded_conn();
        seed_county(&conn, "51059", "Fairfax", "VA", Some(60.0));
        seed_city(&conn, "Herndon", "VA", "Fairfax", "51059");
        seed_city(&conn, "Heronwood", "VA", "Fairfax", "51059");

        let results = search(&conn, &StateLookup::default(), &request("VA", "Her")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].geo_id, "51059");
    }

    #[test]
    fn state_text_fallback_when_no_fips_mapping() {
        let conn = seeded_conn();
        // Dataset stores the full state name for this row
        seed_county(&conn, "24031", "Montgomery", "MD", Some(10.0));
        seed_county(&conn, "51059", "Fairfax", "VA", Some(60.0));

        let results = search(&conn, &StateLookup::default(), &request("md", "")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].geo_id, "24031");
    }

    #[test]
    fn no_match_returns_empty() {
        let conn = seeded_conn();
        seed_county(&conn, "51059", "Fairfax", "VA", Some(60.0));

        let results = search(&conn, &StateLookup::default(), &request("ZZ", "")).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn null_risk_sorts_last_with_null_scores() {
        let conn = seeded_conn();
        seed_county(&conn, "51001", "Accomack", "VA", Some(20.0));
        seed_county(&conn, "51003", "Albemarle", "VA", None);
        seed_county(&conn, "51005", "Alleghany", "VA", Some(10.0));

        let results = search(&conn, &StateLookup::default(), &request("VA", "")).unwrap();
        assert_eq!(results[0].geo_id, "51005");
        assert_eq!(results[1].geo_id, "51001");
        assert_eq!(results[2].geo_id, "51003");
        assert_eq!(results[2].overall_score, None);
        assert_eq!(results[2].fema_risk_score, None);
        // Nulls rank after every non-null distinct value
        assert_eq!(results[2].state_rank, Some(3));
        assert_eq!(results[2].rank, 3);
    }

    #[test]
    fn limit_and_page_slice_after_ranking() {
        let conn = seeded_conn();
        for (i, risk) in [10.0, 20.0, 30.0, 40.0, 50.0].iter().enumerate() {
            seed_county(&conn, &format!("5100{i}"), &format!("County{i}"), "VA", Some(*risk));
        }

        let page2 = SearchRequest {
            state: Some("VA".to_string()),
            limit: Some(2),
            page: Some(2),
            ..SearchRequest::default()
        };
        let results = search(&conn, &StateLookup::default(), &page2).unwrap();
        assert_eq!(results.len(), 2);
        // Rank reflects the overall ordering, not the page
        assert_eq!(results[0].rank, 3);
        assert_eq!(results[1].rank, 4);
        assert_eq!(results[0].overall_score, Some(70.0));
    }

    #[test]
    fn page_far_past_the_end_returns_empty() {
        let conn = seeded_conn();
        seed_county(&conn, "51001", "Accomack", "VA", Some(10.0));

        let huge = SearchRequest {
            state: Some("VA".to_string()),
            limit: Some(100),
            page: Some(usize::MAX),
            ..SearchRequest::default()
        };
        let results = search(&conn, &StateLookup::default(), &huge).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn state_rank_uses_full_population_not_candidates() {
        let conn = seeded_conn();
        seed_county(&conn, "51001", "Accomack", "VA", Some(5.0));
        seed_county(&conn, "51037", "Charlotte", "VA", Some(25.0));
        seed_county(&conn, "51059", "Fairfax", "VA", Some(15.0));

        let results =
            search(&conn, &StateLookup::default(), &request("VA", "Charlotte")).unwrap();
        assert_eq!(results.len(), 1);
        // Charlotte is third of three in the state even though it is the
        // only candidate returned
        assert_eq!(results[0].state_rank, Some(3));
        assert_eq!(results[0].rank, 1);
    }
}
