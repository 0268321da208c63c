//! Success-rate resolution for directors and lead actors.
//!
//! ## Algorithm
//! 1. Missing, empty or all-whitespace name → default rate
//! 2. Exact, case-sensitive match → stored rate
//! 3. Case-insensitive, trimmed match → stored rate (first inserted key wins)
//! 4. Otherwise → default rate
//!
//! Resolution is total: it never fails, and a missing table behaves like an
//! empty one.

use data_loader::SuccessRateTable;
use serde::Serialize;

/// Rate used whenever a person cannot be resolved
pub const DEFAULT_SUCCESS_RATE: f64 = 0.5;

/// How a rate was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    CaseInsensitive,
    Default,
}

/// A resolved rate together with how it was found
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolution {
    pub rate: f64,
    pub kind: MatchKind,
}

impl Resolution {
    fn default_rate() -> Self {
        Self {
            rate: DEFAULT_SUCCESS_RATE,
            kind: MatchKind::Default,
        }
    }
}

/// Resolve a person's success rate, reporting which rule matched.
pub fn resolve(name: Option<&str>, table: Option<&SuccessRateTable>) -> Resolution {
    let name = match name {
        Some(n) if !n.trim().is_empty() => n,
        _ => return Resolution::default_rate(),
    };

    let Some(table) = table else {
        return Resolution::default_rate();
    };

    if let Some(rate) = table.get(name) {
        return Resolution {
            rate,
            kind: MatchKind::Exact,
        };
    }

    if let Some(rate) = table.get_folded(name) {
        return Resolution {
            rate,
            kind: MatchKind::CaseInsensitive,
        };
    }

    Resolution::default_rate()
}

/// Resolve a person's success rate.
pub fn resolve_success_rate(name: Option<&str>, table: Option<&SuccessRateTable>) -> f64 {
    resolve(name, table).rate
}
