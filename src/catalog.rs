//! Preloaded team and driver catalog.
//!
//! Records are identified by their 1-based position in the source documents;
//! the catalog is immutable once built.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CatalogError, NotFoundError};

/// A constructor entry: `{id, team, car}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub team: String,
    pub car: String,
}

/// A driver entry: `{id, driver, country, team}`
///
/// `team` is the id of the driver's [`Team`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: u32,
    pub driver: String,
    pub country: String,
    pub team: u32,
}

/// Immutable team and driver lists.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    teams: Vec<Team>,
    drivers: Vec<Driver>,
}

impl Catalog {
    /// Build a catalog, checking ids are contiguous from 1 and that every
    /// driver belongs to a known team.
    pub fn new(teams: Vec<Team>, drivers: Vec<Driver>) -> Result<Self, CatalogError> {
        check_positions("team", teams.iter().map(|t| t.id))?;
        check_positions("driver", drivers.iter().map(|d| d.id))?;

        let team_count = teams.len();
        if let Some(d) = drivers
            .iter()
            .find(|d| d.team == 0 || d.team as usize > team_count)
        {
            return Err(CatalogError::UnknownTeam {
                driver: d.id,
                team: d.team,
            });
        }

        Ok(Self { teams, drivers })
    }

    /// Load the catalog from the two JSON documents.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(teams_path: P, drivers_path: Q) -> Result<Self> {
        let teams: Vec<Team> = read_json(teams_path.as_ref())?;
        let drivers: Vec<Driver> = read_json(drivers_path.as_ref())?;

        let catalog = Self::new(teams, drivers).context("Invalid catalog data")?;
        tracing::info!(
            teams = catalog.teams.len(),
            drivers = catalog.drivers.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    /// Look up a team by its 1-based id.
    pub fn team(&self, id: usize) -> Result<&Team, NotFoundError> {
        lookup(&self.teams, id).ok_or(NotFoundError::new("team", id))
    }

    /// Look up a driver by its 1-based id.
    pub fn driver(&self, id: usize) -> Result<&Driver, NotFoundError> {
        lookup(&self.drivers, id).ok_or(NotFoundError::new("driver", id))
    }

    pub fn contains_driver(&self, id: u32) -> bool {
        id >= 1 && id as usize <= self.drivers.len()
    }

    /// Drivers racing for the given team, in catalog order.
    pub fn drivers_of(&self, team_id: u32) -> impl Iterator<Item = &Driver> {
        self.drivers.iter().filter(move |d| d.team == team_id)
    }
}

fn lookup<T>(items: &[T], id: usize) -> Option<&T> {
    id.checked_sub(1).and_then(|idx| items.get(idx))
}

fn check_positions(
    kind: &'static str,
    ids: impl Iterator<Item = u32>,
) -> Result<(), CatalogError> {
    for (idx, id) in ids.enumerate() {
        let position = idx + 1;
        if id as usize != position {
            return Err(CatalogError::NonContiguousId { kind, position, id });
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
