//! Championship standings computed from the race ledger.
//!
//! Nothing is cached: every call recomputes from the races passed in.

use indexmap::IndexMap;

use crate::catalog::{Catalog, Driver, Team};
use crate::ledger::Race;

/// A ranked leaderboard entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing<T> {
    /// 1-based position
    pub rank: usize,
    pub subject: T,
    /// Summed as `i128`; race scores are `i64`
    pub score: i128,
}

/// Sum points per driver across all races.
///
/// Drivers are ordered by their first appearance in the races, which is the
/// tie-break order for [`rank`].
pub fn driver_totals(races: &[Race]) -> IndexMap<u32, i128> {
    let mut totals = IndexMap::new();
    for (&driver_id, &points) in races.iter().flat_map(|race| race.drivers.iter()) {
        *totals.entry(driver_id).or_insert(0) += i128::from(points);
    }
    totals
}

/// Rank entries by score, highest first.
///
/// Equal scores keep their input order.
pub fn rank<T>(entries: Vec<(T, i128)>) -> Vec<Standing<T>> {
    let mut entries = entries;
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (subject, score))| Standing {
            rank: idx + 1,
            subject,
            score,
        })
        .collect()
}

/// Driver leaderboard. Drivers who never scored in a race are absent.
pub fn driver_standings<'a>(catalog: &'a Catalog, races: &[Race]) -> Vec<Standing<&'a Driver>> {
    let entries = driver_totals(races)
        .into_iter()
        .filter_map(|(id, total)| catalog.driver(id as usize).ok().map(|d| (d, total)))
        .collect();
    rank(entries)
}

/// Constructor leaderboard: each team scores the sum of its drivers' totals.
///
/// Teams with no driver in any race are left out rather than listed at zero.
/// Ties keep catalog order.
pub fn team_standings<'a>(catalog: &'a Catalog, races: &[Race]) -> Vec<Standing<&'a Team>> {
    let totals = driver_totals(races);

    let entries = catalog
        .teams()
        .iter()
        .filter_map(|team| {
            let scores: Vec<i128> = catalog
                .drivers_of(team.id)
                .filter_map(|d| totals.get(&d.id).copied())
                .collect();
            if scores.is_empty() {
                None
            } else {
                Some((team, scores.iter().sum::<i128>()))
            }
        })
        .collect();

    rank(entries)
}
