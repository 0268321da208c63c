//! Core domain types for success-rate artifacts.
//!
//! A success rate is the historical fraction of commercially successful movies
//! a person took part in. Four independent tables exist, one per role on the
//! request (director and the three lead actors). They overlap in value domain
//! but are never merged.

use crate::error::DataLoadError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Roles
// =============================================================================

/// The request field a success-rate table belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonRole {
    Director,
    Actor1,
    Actor2,
    Actor3,
}

impl PersonRole {
    /// All roles, in feature order
    pub const ALL: [PersonRole; 4] = [
        PersonRole::Director,
        PersonRole::Actor1,
        PersonRole::Actor2,
        PersonRole::Actor3,
    ];

    /// Name of the request field holding the person's name
    pub fn field(&self) -> &'static str {
        match self {
            PersonRole::Director => "director",
            PersonRole::Actor1 => "actor1",
            PersonRole::Actor2 => "actor2",
            PersonRole::Actor3 => "actor3",
        }
    }

    /// File name of the table artifact inside the artifacts directory
    pub fn artifact_file(&self) -> &'static str {
        match self {
            PersonRole::Director => "director_success.dat",
            PersonRole::Actor1 => "actor1_success.dat",
            PersonRole::Actor2 => "actor2_success.dat",
            PersonRole::Actor3 => "actor3_success.dat",
        }
    }
}

impl fmt::Display for PersonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

impl FromStr for PersonRole {
    type Err = DataLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "director" => Ok(PersonRole::Director),
            "actor1" => Ok(PersonRole::Actor1),
            "actor2" => Ok(PersonRole::Actor2),
            "actor3" => Ok(PersonRole::Actor3),
            _ => Err(DataLoadError::InvalidValue {
                field: "role".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// SuccessRateTable
// =============================================================================

/// Normalized form used for case-insensitive lookups: trimmed and lowercased.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Mapping from person name to success rate.
///
/// Keys are stored exactly as they appear in the artifact. A second index maps
/// the folded form of every key to its rate. When several keys fold to the same
/// form, the one inserted first wins, so the case-insensitive fallback does not
/// depend on hash iteration order.
#[derive(Debug, Clone, Default)]
pub struct SuccessRateTable {
    rates: HashMap<String, f64>,
    folded: HashMap<String, f64>,
}

impl SuccessRateTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from entries in insertion order.
    ///
    /// A repeated name overwrites the earlier rate but keeps the earlier
    /// insertion position.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut rates = HashMap::new();
        let mut order = Vec::new();
        for (name, rate) in entries {
            let name = name.into();
            if rates.insert(name.clone(), rate).is_none() {
                order.push(name);
            }
        }

        let mut folded = HashMap::with_capacity(order.len());
        for name in &order {
            folded.entry(fold_name(name)).or_insert(rates[name]);
        }

        Self { rates, folded }
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, name: &str) -> Option<f64> {
        self.rates.get(name).copied()
    }

    /// Case-insensitive, whitespace-trimmed lookup
    pub fn get_folded(&self, name: &str) -> Option<f64> {
        self.folded.get(&fold_name(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

// =============================================================================
// SuccessRateTables
// =============================================================================

/// The four tables used to derive success-rate features.
///
/// Immutable once built; shared read-only (usually behind an `Arc`) for the
/// lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct SuccessRateTables {
    pub director: SuccessRateTable,
    pub actor1: SuccessRateTable,
    pub actor2: SuccessRateTable,
    pub actor3: SuccessRateTable,
    /// Roles whose artifact was absent at load time
    pub(crate) missing: Vec<PersonRole>,
}

impl SuccessRateTables {
    pub fn new(
        director: SuccessRateTable,
        actor1: SuccessRateTable,
        actor2: SuccessRateTable,
        actor3: SuccessRateTable,
    ) -> Self {
        Self {
            director,
            actor1,
            actor2,
            actor3,
            missing: Vec::new(),
        }
    }

    /// Get the table for a role
    pub fn get(&self, role: PersonRole) -> &SuccessRateTable {
        match role {
            PersonRole::Director => &self.director,
            PersonRole::Actor1 => &self.actor1,
            PersonRole::Actor2 => &self.actor2,
            PersonRole::Actor3 => &self.actor3,
        }
    }

    /// Roles that fell back to an empty table because no artifact was found
    pub fn missing_roles(&self) -> &[PersonRole] {
        &self.missing
    }

    /// Whether the director artifact was found
    pub fn director_loaded(&self) -> bool {
        !self.missing.contains(&PersonRole::Director)
    }

    /// Whether all three actor tables hold at least one entry
    pub fn actors_loaded(&self) -> bool {
        !self.actor1.is_empty() && !self.actor2.is_empty() && !self.actor3.is_empty()
    }

    /// Entry counts as (director, actor1, actor2, actor3)
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.director.len(),
            self.actor1.len(),
            self.actor2.len(),
            self.actor3.len(),
        )
    }
}
