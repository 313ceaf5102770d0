//! Resolve one known quantity into the full (elevation, height, area,
//! volume) state by interpolating along the AHV table.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::interp::interpolate;
use super::table::AhvTable;
use super::validate::{validate, ValidatedQuery};
use crate::config::check_spacing;
use crate::error::Result;

/// Which of the four linked quantities a query supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Height,
    Elevation,
    Area,
    Volume,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 4] =
        [ParameterKind::Height, ParameterKind::Elevation, ParameterKind::Area, ParameterKind::Volume];

    /// Label with unit, as shown to users and used for attribute fields.
    pub fn label(self) -> &'static str {
        match self {
            ParameterKind::Height => "HEIGHT (m)",
            ParameterKind::Elevation => "ELEVATION (m)",
            ParameterKind::Area => "AREA (m2)",
            ParameterKind::Volume => "VOLUME (m3)",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ParameterKind {
    type Err = String;

    /// Accepts the bare name (`volume`) or the unit label (`VOLUME (m3)`),
    /// case-insensitively.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.split_whitespace().next().unwrap_or("").to_ascii_lowercase();
        match name.as_str() {
            "height" => Ok(ParameterKind::Height),
            "elevation" => Ok(ParameterKind::Elevation),
            "area" => Ok(ParameterKind::Area),
            "volume" => Ok(ParameterKind::Volume),
            _ => Err(format!("unknown parameter '{s}' (expected height, elevation, area or volume)")),
        }
    }
}

/// A single resolution request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterQuery {
    kind: ParameterKind,
    value: f64,
    vertical_spacing: f64,
}

impl ParameterQuery {
    /// Fails with [`Error::InvalidSpacing`](crate::Error::InvalidSpacing) unless `vertical_spacing` is a
    /// finite positive number.
    pub fn new(kind: ParameterKind, value: f64, vertical_spacing: f64) -> Result<Self> {
        check_spacing(vertical_spacing)?;
        Ok(Self { kind, value, vertical_spacing })
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn vertical_spacing(&self) -> f64 {
        self.vertical_spacing
    }
}

/// Mutually consistent water state derived from one AHV table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedState {
    pub elevation: f64,
    pub height: f64,
    pub area: f64,
    pub volume: f64,
}

/// Resolve a validated query.
///
/// Height queries map to elevation `h + e0 − 1`, independent of the
/// vertical spacing, while every other kind reports height as
/// `elevation − e0 + spacing`. The two only invert each other when the
/// spacing is 1; for other spacings a height near a bound can land outside
/// the table and fails with [`Error::Extrapolation`](crate::Error::Extrapolation).
pub fn resolve(validated: ValidatedQuery<'_>) -> Result<ResolvedState> {
    let table = validated.table();
    let query = validated.query();
    let e0 = table.base_elevation();
    let spacing = query.vertical_spacing();
    let value = query.value();

    let (elevations, areas, volumes) = (table.elevations(), table.areas(), table.volumes());

    let state = match query.kind() {
        ParameterKind::Height => {
            let elevation = value + e0 - 1.0;
            ResolvedState {
                elevation,
                height: value,
                area: interpolate(elevations, areas, elevation)?,
                volume: interpolate(elevations, volumes, elevation)?,
            }
        }
        ParameterKind::Elevation => ResolvedState {
            elevation: value,
            height: value - e0 + spacing,
            area: interpolate(elevations, areas, value)?,
            volume: interpolate(elevations, volumes, value)?,
        },
        ParameterKind::Area => {
            let elevation = interpolate(areas, elevations, value)?;
            ResolvedState {
                elevation,
                height: elevation - e0 + spacing,
                area: value,
                volume: interpolate(areas, volumes, value)?,
            }
        }
        ParameterKind::Volume => {
            let elevation = interpolate(volumes, elevations, value)?;
            ResolvedState {
                elevation,
                height: elevation - e0 + spacing,
                area: interpolate(volumes, areas, value)?,
                volume: value,
            }
        }
    };
    debug!(?state, "resolved {}", query.kind());
    Ok(state)
}

/// Validate and resolve a batch of independent queries against one table.
///
/// With the `threading` feature the batch is resolved on the rayon pool.
pub fn resolve_many(table: &AhvTable, queries: &[ParameterQuery]) -> Vec<Result<ResolvedState>> {
    let one = |q: &ParameterQuery| validate(table, *q).and_then(resolve);

    #[cfg(feature = "threading")]
    {
        use rayon::prelude::*;
        queries.par_iter().map(one).collect()
    }
    #[cfg(not(feature = "threading"))]
    {
        queries.iter().map(one).collect()
    }
}
