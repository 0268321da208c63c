//! Feature assembly for the success classifier.
//!
//! Turns a raw movie request into the fixed 13-column record the classifier
//! was fit on: six pass-through attributes, four derived success rates and
//! three categorical attributes.

use crate::coerce::{float_field, int_field, person_field, text_field};
use crate::error::{FeatureError, Result};
use crate::resolver::resolve_success_rate;
use data_loader::{PersonRole, SuccessRateTables};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Untyped request payload as received from the caller
pub type MovieRequest = serde_json::Map<String, serde_json::Value>;

/// Column order the classifier was fit on.
///
/// `FeatureRecord` serializes its fields in exactly this order.
pub const FEATURE_COLUMNS: [&str; 13] = [
    "budget",
    "runtime",
    "release_year",
    "release_month",
    "avg_rating",
    "ratings_count",
    "director_success_rate",
    "actor1_success_rate",
    "actor2_success_rate",
    "actor3_success_rate",
    "genres",
    "original_language",
    "production_companies",
];

/// Values used when a request omits a field
pub mod defaults {
    pub const BUDGET: f64 = 0.0;
    pub const RUNTIME: f64 = 0.0;
    pub const RELEASE_YEAR: i64 = 2024;
    pub const RELEASE_MONTH: i64 = 6;
    pub const AVG_RATING: f64 = 7.0;
    pub const RATINGS_COUNT: i64 = 1000;
    pub const GENRES: &str = "Drama";
    pub const ORIGINAL_LANGUAGE: &str = "en";
    pub const PRODUCTION_COMPANIES: &str = "Independent";
}

/// Fixed-shape input for the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    // Pass-through attributes
    pub budget: f64,
    pub runtime: f64,
    pub release_year: i64,
    pub release_month: i64,
    pub avg_rating: f64,
    pub ratings_count: i64,

    // Derived success rates
    pub director_success_rate: f64,
    pub actor1_success_rate: f64,
    pub actor2_success_rate: f64,
    pub actor3_success_rate: f64,

    // Categorical attributes
    pub genres: String,
    pub original_language: String,
    pub production_companies: String,
}

impl FeatureRecord {
    /// Value of a numeric column by name.
    ///
    /// Integer columns are widened to `f64`. Returns `None` for categorical
    /// or unknown columns.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        let value = match column {
            "budget" => self.budget,
            "runtime" => self.runtime,
            "release_year" => self.release_year as f64,
            "release_month" => self.release_month as f64,
            "avg_rating" => self.avg_rating,
            "ratings_count" => self.ratings_count as f64,
            "director_success_rate" => self.director_success_rate,
            "actor1_success_rate" => self.actor1_success_rate,
            "actor2_success_rate" => self.actor2_success_rate,
            "actor3_success_rate" => self.actor3_success_rate,
            _ => return None,
        };
        Some(value)
    }

    /// Value of a categorical column by name
    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            "genres" => Some(&self.genres),
            "original_language" => Some(&self.original_language),
            "production_companies" => Some(&self.production_companies),
            _ => None,
        }
    }

    /// Success rate for a role
    pub fn success_rate(&self, role: PersonRole) -> f64 {
        match role {
            PersonRole::Director => self.director_success_rate,
            PersonRole::Actor1 => self.actor1_success_rate,
            PersonRole::Actor2 => self.actor2_success_rate,
            PersonRole::Actor3 => self.actor3_success_rate,
        }
    }
}

/// Verify that a classifier's declared columns match `FEATURE_COLUMNS`.
///
/// Name and order both matter.
pub fn check_schema<S: AsRef<str>>(expected: &[S]) -> Result<()> {
    let matches = expected.len() == FEATURE_COLUMNS.len()
        && expected
            .iter()
            .zip(FEATURE_COLUMNS.iter())
            .all(|(e, a)| e.as_ref() == *a);

    if matches {
        Ok(())
    } else {
        Err(FeatureError::ShapeMismatch {
            expected: expected.iter().map(|s| s.as_ref().to_string()).collect(),
            actual: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Build the feature record for one request.
///
/// Pure: neither the request nor the tables are modified. The first field
/// that fails coercion aborts assembly.
pub fn assemble_features(request: &MovieRequest, tables: &SuccessRateTables) -> Result<FeatureRecord> {
    let rate = |role: PersonRole| -> Result<f64> {
        let name = person_field(request, role.field())?;
        Ok(resolve_success_rate(name, Some(tables.get(role))))
    };

    Ok(FeatureRecord {
        budget: float_field(request, "budget", defaults::BUDGET)?,
        runtime: float_field(request, "runtime", defaults::RUNTIME)?,
        release_year: int_field(request, "release_year", defaults::RELEASE_YEAR)?,
        release_month: int_field(request, "release_month", defaults::RELEASE_MONTH)?,
        avg_rating: float_field(request, "avg_rating", defaults::AVG_RATING)?,
        ratings_count: int_field(request, "ratings_count", defaults::RATINGS_COUNT)?,
        director_success_rate: rate(PersonRole::Director)?,
        actor1_success_rate: rate(PersonRole::Actor1)?,
        actor2_success_rate: rate(PersonRole::Actor2)?,
        actor3_success_rate: rate(PersonRole::Actor3)?,
        genres: text_field(request, "genres", defaults::GENRES)?,
        original_language: text_field(request, "original_language", defaults::ORIGINAL_LANGUAGE)?,
        production_companies: text_field(
            request,
            "production_companies",
            defaults::PRODUCTION_COMPANIES,
        )?,
    })
}

/// Assembles feature records against a shared set of success-rate tables.
#[derive(Clone)]
pub struct FeatureAssembler {
    tables: Arc<SuccessRateTables>,
}

impl FeatureAssembler {
    pub fn new(tables: Arc<SuccessRateTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &SuccessRateTables {
        &self.tables
    }

    /// Assemble features for a single request
    pub fn assemble(&self, request: &MovieRequest) -> Result<FeatureRecord> {
        assemble_features(request, &self.tables)
    }

    /// Assemble features for many requests in parallel.
    ///
    /// Returns one result per request, in the same order.
    pub fn assemble_batch(&self, requests: &[MovieRequest]) -> Vec<Result<FeatureRecord>> {
        let results: Vec<_> = requests
            .par_iter()
            .map(|request| self.assemble(request))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::debug!("{} of {} requests failed feature assembly", failed, requests.len());
        }
        results
    }
}
