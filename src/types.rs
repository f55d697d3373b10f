//! Response types for the standings API.
//!
//! Stored records are augmented with absolute resource links here; the core
//! modules only deal in ids.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::catalog::{Driver, Team};
use crate::ledger::Race;
use crate::standings::Standing;

pub fn team_url(base_url: &str, id: u32) -> String {
    format!("{}/teams/{}/", base_url, id)
}

pub fn driver_url(base_url: &str, id: u32) -> String {
    format!("{}/drivers/{}/", base_url, id)
}

pub fn race_url(base_url: &str, id: usize) -> String {
    format!("{}/races/{}/", base_url, id)
}

/// Team representation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamResponse {
    pub id: u32,
    pub url: String,
    pub team: String,
    pub car: String,
}

impl TeamResponse {
    pub fn new(team: &Team, base_url: &str) -> Self {
        Self {
            id: team.id,
            url: team_url(base_url, team.id),
            team: team.team.clone(),
            car: team.car.clone(),
        }
    }
}

/// Driver representation, linking to the driver's team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverResponse {
    pub id: u32,
    pub url: String,
    pub driver: String,
    pub country: String,
    pub team: u32,
    pub team_url: String,
}

impl DriverResponse {
    pub fn new(driver: &Driver, base_url: &str) -> Self {
        Self {
            id: driver.id,
            url: driver_url(base_url, driver.id),
            driver: driver.driver.clone(),
            country: driver.country.clone(),
            team: driver.team,
            team_url: team_url(base_url, driver.team),
        }
    }
}

/// Race representation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceResponse {
    pub id: usize,
    pub url: String,
    pub race: String,
    pub date: NaiveDate,
    pub drivers: IndexMap<u32, i64>,
}

impl RaceResponse {
    pub fn new(race: Race, base_url: &str) -> Self {
        Self {
            id: race.id,
            url: race_url(base_url, race.id),
            race: race.race,
            date: race.date,
            drivers: race.drivers,
        }
    }
}

/// A leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingResponse<T> {
    pub info: T,
    pub score: i128,
}

/// Leaderboard keyed by 1-based rank
pub type StandingsResponse<T> = BTreeMap<usize, StandingResponse<T>>;

/// Build a rank-keyed leaderboard, rendering each subject with `render`.
pub fn standings_response<S, T>(
    standings: Vec<Standing<S>>,
    render: impl Fn(S) -> T,
) -> StandingsResponse<T> {
    standings
        .into_iter()
        .map(|s| {
            (
                s.rank,
                StandingResponse {
                    info: render(s.subject),
                    score: s.score,
                },
            )
        })
        .collect()
}

/// API entry point listing the top-level resources
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub teams: String,
    pub drivers: String,
    pub races: String,
    pub driver_standings: String,
    pub team_standings: String,
}

impl IndexResponse {
    pub fn new(base_url: &str) -> Self {
        Self {
            teams: format!("{}/teams/", base_url),
            drivers: format!("{}/drivers/", base_url),
            races: format!("{}/races/", base_url),
            driver_standings: format!("{}/driver_standings/", base_url),
            team_standings: format!("{}/team_standings/", base_url),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
