//! Query-string filtering shared by every list endpoint.
//!
//! Each query value is classified by its shape before matching:
//! `YYYY-MM-DD` compares as a date, all-digit values as integers and
//! all-alphabetic values as a case-sensitive substring. Anything else
//! cannot be matched and is ignored.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::catalog::{Driver, Team};
use crate::ledger::Race;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single classified query value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Date(NaiveDate),
    Int(i64),
    Substring(String),
    Unrecognized,
}

impl Constraint {
    /// Classify a raw query value by its shape.
    pub fn classify(raw: &str) -> Self {
        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return Constraint::Date(date);
        }

        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            // Too large for i64 cannot equal any stored id
            return match raw.parse() {
                Ok(n) => Constraint::Int(n),
                Err(_) => Constraint::Unrecognized,
            };
        }

        if !raw.is_empty() && raw.chars().all(char::is_alphabetic) {
            return Constraint::Substring(raw.to_string());
        }

        Constraint::Unrecognized
    }

    /// Match a field value.
    ///
    /// Returns `None` when the constraint and the field are of incompatible
    /// types; the caller treats that as a non-match.
    fn matches(&self, value: &FieldValue<'_>) -> Option<bool> {
        match (self, value) {
            (Constraint::Unrecognized, _) => Some(true),
            (Constraint::Date(want), FieldValue::Date(have)) => Some(want == have),
            (Constraint::Int(want), FieldValue::Int(have)) => Some(want == have),
            (Constraint::Substring(want), FieldValue::Text(have)) => {
                Some(have.contains(want.as_str()))
            }
            _ => None,
        }
    }
}

/// A borrowed view of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Int(i64),
    Text(&'a str),
    Date(NaiveDate),
}

/// Records that can be filtered by query parameters.
pub trait Filterable {
    /// Field names accepted as query keys.
    const FIELDS: &'static [&'static str];

    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl Filterable for Team {
    const FIELDS: &'static [&'static str] = &["id", "team", "car"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Int(self.id.into())),
            "team" => Some(FieldValue::Text(&self.team)),
            "car" => Some(FieldValue::Text(&self.car)),
            _ => None,
        }
    }
}

impl Filterable for Driver {
    const FIELDS: &'static [&'static str] = &["id", "driver", "country", "team"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Int(self.id.into())),
            "driver" => Some(FieldValue::Text(&self.driver)),
            "country" => Some(FieldValue::Text(&self.country)),
            "team" => Some(FieldValue::Int(self.team.into())),
            _ => None,
        }
    }
}

impl Filterable for Race {
    const FIELDS: &'static [&'static str] = &["race", "date"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "race" => Some(FieldValue::Text(&self.race)),
            "date" => Some(FieldValue::Date(self.date)),
            _ => None,
        }
    }
}

/// Classify the allow-listed entries of a query; unknown keys are dropped.
pub fn constraints_for<T: Filterable>(
    query: &HashMap<String, String>,
) -> Vec<(&'static str, Constraint)> {
    T::FIELDS
        .iter()
        .filter_map(|&field| query.get(field).map(|raw| (field, Constraint::classify(raw))))
        .collect()
}

/// Whether a record satisfies every constraint.
pub fn matches_all<T: Filterable>(
    record: &T,
    constraints: &[(&'static str, Constraint)],
) -> bool {
    constraints.iter().all(|(field, constraint)| {
        record
            .field(field)
            .and_then(|value| constraint.matches(&value))
            .unwrap_or(false)
    })
}

/// Keep the records matching the query, in input order.
pub fn apply<'a, T, I>(records: I, query: &HashMap<String, String>) -> Vec<&'a T>
where
    T: Filterable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let constraints = constraints_for::<T>(query);
    records
        .into_iter()
        .filter(|record| matches_all(*record, &constraints))
        .collect()
}
