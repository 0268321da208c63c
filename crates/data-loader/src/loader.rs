//! Loading the four success-rate tables from an artifacts directory.
//!
//! Missing artifacts are not fatal: the table is replaced with an empty one,
//! every lookup against it resolves to the default rate, and the role is
//! recorded so health checks can report it.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{info, warn};

impl SuccessRateTables {
    /// Load all four tables from a directory
    ///
    /// Expects `director_success.dat`, `actor1_success.dat`,
    /// `actor2_success.dat` and `actor3_success.dat`. The files are parsed in
    /// parallel; a malformed file fails the whole load.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        info!("Loading success-rate tables from {:?}", dir);

        // Nested joins give four-way parallelism
        let ((director, actor1), (actor2, actor3)) = rayon::join(
            || {
                rayon::join(
                    || load_table(dir, PersonRole::Director),
                    || load_table(dir, PersonRole::Actor1),
                )
            },
            || {
                rayon::join(
                    || load_table(dir, PersonRole::Actor2),
                    || load_table(dir, PersonRole::Actor3),
                )
            },
        );

        let mut missing = Vec::new();
        let mut take = |role: PersonRole, loaded: Option<SuccessRateTable>| {
            loaded.unwrap_or_else(|| {
                missing.push(role);
                SuccessRateTable::new()
            })
        };

        let director = take(PersonRole::Director, director?);
        let actor1 = take(PersonRole::Actor1, actor1?);
        let actor2 = take(PersonRole::Actor2, actor2?);
        let actor3 = take(PersonRole::Actor3, actor3?);

        let mut tables = SuccessRateTables::new(director, actor1, actor2, actor3);
        tables.missing = missing;

        let (d, a1, a2, a3) = tables.counts();
        info!(
            "Loaded success rates: {} directors, {} actor1, {} actor2, {} actor3",
            d, a1, a2, a3
        );
        Ok(tables)
    }
}

/// Load one role's table, returning `None` when the artifact does not exist
fn load_table(dir: &Path, role: PersonRole) -> Result<Option<SuccessRateTable>> {
    let path = dir.join(role.artifact_file());

    match parser::parse_success_rates(&path) {
        Ok(table) => {
            info!("{} success rates loaded: {} entries", role, table.len());
            Ok(Some(table))
        }
        Err(DataLoadError::FileNotFound { path }) => {
            warn!("{}", DataLoadError::MissingTable { role, path });
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
