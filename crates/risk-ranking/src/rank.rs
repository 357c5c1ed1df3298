//! Dense rank and score inversion
//!
//! Rank 1 is the lowest (safest) risk score in the state scope. Tied
//! scores share a rank and the next distinct score increments by exactly
//! one. Counties with no risk score sort last and share a single rank.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::select::ScopeRow;

/// Ascending risk order with nulls last; null compares equal to null so
/// tied (and missing) scores land adjacent for dense ranking.
fn risk_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Dense rank of every county in the scope population, keyed by FIPS.
/// Returns the rank map and the population size.
pub fn dense_rank_map(population: &[ScopeRow]) -> (HashMap<String, u32>, usize) {
    let mut sorted: Vec<&ScopeRow> = population.iter().collect();
    sorted.sort_by(|a, b| risk_order(a.risk_score, b.risk_score));

    let mut ranks = HashMap::with_capacity(sorted.len());
    let mut rank = 0u32;
    let mut prev: Option<Option<f64>> = None;
    for row in &sorted {
        if prev != Some(row.risk_score) {
            rank += 1;
            prev = Some(row.risk_score);
        }
        ranks.insert(row.county_fips.clone(), rank);
    }
    (ranks, population.len())
}

/// Invert the FEMA risk score onto a 0-100 scale: lower risk means a
/// higher overall score. One decimal of precision; null propagates.
pub fn overall_score(risk_score: Option<f64>) -> Option<f64> {
    risk_score.map(|risk| round1(100.0 - risk))
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Descending overall score, nulls after all numeric scores. Used with a
/// stable sort so nulls keep their relative order.
pub fn overall_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
