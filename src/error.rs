//! Error types shared by the catalog, ledger and web layer.

use thiserror::Error;

/// Reasons a submitted race is rejected.
///
/// The display strings are returned verbatim to API clients.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid data")]
    InvalidData,

    #[error("incorrect date format")]
    DateFormat,

    #[error("at least one driver required")]
    NoDrivers,

    #[error("unknown driver id or non-integer score")]
    UnknownDriverOrScore,
}

/// An identifier outside the valid `[1, count]` range of a collection.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} {id} not found")]
pub struct NotFoundError {
    pub kind: &'static str,
    pub id: usize,
}

impl NotFoundError {
    pub fn new(kind: &'static str, id: usize) -> Self {
        Self { kind, id }
    }
}

/// Inconsistencies detected while building the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{kind} at position {position} has id {id}, expected {position}")]
    NonContiguousId {
        kind: &'static str,
        position: usize,
        id: u32,
    },

    #[error("driver {driver} references unknown team {team}")]
    UnknownTeam { driver: u32, team: u32 },
}
