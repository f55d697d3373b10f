//! Append-only, in-memory list of race results.
//!
//! The ledger lives for the lifetime of the process and is never persisted.
//! A race's id is its 1-based position, assigned under the write lock at
//! append time.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::catalog::Catalog;
use crate::error::{NotFoundError, ValidationError};
use crate::filter::{self, DATE_FORMAT};

/// A validated race result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: usize,
    pub race: String,
    pub date: NaiveDate,
    /// Driver id -> points, in submission order
    pub drivers: IndexMap<u32, i64>,
}

impl Race {
    /// Total points awarded in this race.
    #[allow(dead_code)]
    pub fn total_points(&self) -> i128 {
        self.drivers.values().map(|&p| i128::from(p)).sum()
    }
}

/// An unvalidated race submission `{race, date, drivers}`.
///
/// Fields are kept as raw JSON so that type errors surface as
/// [`ValidationError::InvalidData`] rather than as deserialization failures.
#[derive(Debug, Clone, Default)]
pub struct RaceDraft {
    pub race: Value,
    pub date: Value,
    pub drivers: Value,
}

impl RaceDraft {
    /// Extract the known fields from an arbitrary JSON body.
    pub fn from_value(body: Value) -> Self {
        match body {
            Value::Object(mut map) => Self {
                race: map.remove("race").unwrap_or_default(),
                date: map.remove("date").unwrap_or_default(),
                drivers: map.remove("drivers").unwrap_or_default(),
            },
            _ => Self::default(),
        }
    }
}

/// A draft that passed validation, waiting for its id.
#[derive(Debug)]
struct ValidRace {
    race: String,
    date: NaiveDate,
    drivers: IndexMap<u32, i64>,
}

fn validate(catalog: &Catalog, draft: &RaceDraft) -> Result<ValidRace, ValidationError> {
    let (name, date, drivers) = match (&draft.race, &draft.date, &draft.drivers) {
        (Value::String(name), Value::String(date), Value::Object(drivers))
            if !name.is_empty() && !date.is_empty() =>
        {
            (name, date, drivers)
        }
        _ => return Err(ValidationError::InvalidData),
    };

    let date =
        NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| ValidationError::DateFormat)?;

    if drivers.is_empty() {
        return Err(ValidationError::NoDrivers);
    }

    let mut points = IndexMap::with_capacity(drivers.len());
    for (key, value) in drivers {
        let driver_id = key
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|id| catalog.contains_driver(*id))
            .ok_or(ValidationError::UnknownDriverOrScore)?;
        let score = value.as_i64().ok_or(ValidationError::UnknownDriverOrScore)?;
        // "1" and "01" name the same driver; an ambiguous entry is rejected
        if points.insert(driver_id, score).is_some() {
            return Err(ValidationError::UnknownDriverOrScore);
        }
    }

    Ok(ValidRace {
        race: name.clone(),
        date,
        drivers: points,
    })
}

/// Shared race storage.
#[derive(Debug, Default)]
pub struct RaceLedger {
    races: RwLock<Vec<Race>>,
}

impl RaceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // Only fully built races are ever pushed, so a poisoned lock still
    // guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Race>> {
        self.races.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Race>> {
        self.races.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// A consistent copy of every stored race, in creation order.
    pub fn snapshot(&self) -> Vec<Race> {
        self.read().clone()
    }

    /// Races matching the query, most recent date first.
    ///
    /// Races on the same date keep their creation order.
    pub fn list(&self, query: &HashMap<String, String>) -> Vec<Race> {
        let races = self.read();
        let mut matched: Vec<Race> = filter::apply(races.iter(), query)
            .into_iter()
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date));
        matched
    }

    /// Look up a race by its 1-based id.
    pub fn get(&self, id: usize) -> Result<Race, NotFoundError> {
        id.checked_sub(1)
            .and_then(|idx| self.read().get(idx).cloned())
            .ok_or(NotFoundError::new("race", id))
    }

    /// Validate a submission and append it.
    ///
    /// Nothing is stored unless every check passes.
    pub fn create(&self, catalog: &Catalog, draft: &RaceDraft) -> Result<Race, ValidationError> {
        let valid = validate(catalog, draft)?;

        let mut races = self.write();
        let race = Race {
            id: races.len() + 1,
            race: valid.race,
            date: valid.date,
            drivers: valid.drivers,
        };
        races.push(race.clone());

        Ok(race)
    }
}
