//! Area-Height-Volume curve engine: histogram → AHV table → validated
//! query → resolved state → threshold export.
pub mod export;
mod interp;
pub mod resolve;
pub mod table;
pub mod validate;

pub use export::{
    read_curve_csv, read_histogram_csv, write_curve_csv, FloodAttributes, ThresholdExport,
};
pub use resolve::{resolve, resolve_many, ParameterKind, ParameterQuery, ResolvedState};
pub use table::{AhvRow, AhvTable, HistogramPoint};
pub use validate::{check_point_count, validate, ValidatedQuery};

use crate::error::Result;

/// Build, validate and resolve in one call.
pub fn resolve_query(points: &[HistogramPoint], query: ParameterQuery) -> Result<(AhvTable, ResolvedState)> {
    let table = AhvTable::build(points)?;
    let state = resolve(validate(&table, query)?)?;
    Ok((table, state))
}
