//! Gatekeeping checks that must pass before a query is resolved.
use tracing::debug;

use super::resolve::{ParameterKind, ParameterQuery};
use super::table::AhvTable;
use crate::error::{Error, OutOfRange, Result};

/// Minimum row count for a usable curve is `MIN_ROWS + 1`.
const MIN_ROWS: usize = 2;

/// A query that passed both the point-count and the range check against
/// `table`. Holding one is the only way to reach the resolver.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedQuery<'t> {
    table: &'t AhvTable,
    query: ParameterQuery,
}

impl<'t> ValidatedQuery<'t> {
    pub fn table(&self) -> &'t AhvTable {
        self.table
    }

    pub fn query(&self) -> ParameterQuery {
        self.query
    }
}

/// Reject tables with 2 or fewer rows.
pub fn check_point_count(table: &AhvTable) -> Result<()> {
    if table.len() <= MIN_ROWS {
        return Err(Error::InsufficientPoints { rows: table.len() });
    }
    Ok(())
}

/// Inclusive `(min, max)` bounds for `kind` on `table`.
pub fn bounds(table: &AhvTable, kind: ParameterKind, vertical_spacing: f64) -> (f64, f64) {
    let last = table.len() - 1;
    match kind {
        ParameterKind::Height => {
            let e = table.elevations();
            (vertical_spacing, e[last] - e[0] + vertical_spacing)
        }
        ParameterKind::Elevation => (table.elevations()[0], table.elevations()[last]),
        ParameterKind::Area => (table.areas()[0], table.areas()[last]),
        ParameterKind::Volume => (table.volumes()[0], table.volumes()[last]),
    }
}

/// Reject a value strictly outside the bounds of its kind.
pub fn check_range(table: &AhvTable, query: &ParameterQuery) -> Result<()> {
    let (min, max) = bounds(table, query.kind(), query.vertical_spacing());
    let value = query.value();
    // NaN fails this comparison and is reported against the lower bound.
    if !(value >= min) {
        return Err(OutOfRange::Below { bound: min }.into());
    }
    if value > max {
        return Err(OutOfRange::Above { bound: max }.into());
    }
    Ok(())
}

/// Run both checks and hand back a [`ValidatedQuery`].
pub fn validate(table: &AhvTable, query: ParameterQuery) -> Result<ValidatedQuery<'_>> {
    check_point_count(table)?;
    check_range(table, &query)?;
    debug!(kind = %query.kind(), value = query.value(), "query validated");
    Ok(ValidatedQuery { table, query })
}
