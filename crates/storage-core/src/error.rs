//! Error taxonomy for curve building, validation, resolution and the
//! inundation pipeline. Every variant is terminal for the current request.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Canonical error type for the storage engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The histogram cannot be integrated into an AHV table.
    #[error("cannot build curve: {0}")]
    Build(#[from] BuildError),

    #[error("Insufficient number of points for the Area-Volume-Elevation curve! ({rows} rows)")]
    InsufficientPoints { rows: usize },

    /// The query value lies outside the bound for its kind.
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),

    #[error("Vertical spacing must be greater than 0 (got {0})")]
    InvalidSpacing(f64),

    /// Caller-side boundary/raster precondition failure.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Interpolation was asked for a value outside the table's abscissa range.
    #[error("value {value} is outside the interpolation range [{min}, {max}]")]
    Extrapolation { value: f64, min: f64, max: f64 },

    /// A DEM grid whose shape or cell size cannot be indexed.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a histogram (or a persisted row set) is rejected as an AHV source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("at least 2 histogram points are required, got {0}")]
    TooFewPoints(usize),

    #[error("elevation must be strictly increasing: row {row} has {current} after {previous}")]
    ElevationNotIncreasing { row: usize, previous: f64, current: f64 },

    #[error("area must be non-decreasing: row {row} has {current} after {previous}")]
    AreaDecreasing { row: usize, previous: f64, current: f64 },

    #[error("volume must be non-decreasing: row {row} has {current} after {previous}")]
    VolumeDecreasing { row: usize, previous: f64, current: f64 },

    #[error("area must be non-negative: row {row} has {area}")]
    NegativeArea { row: usize, area: f64 },

    #[error("row {row} contains a non-finite value")]
    NonFinite { row: usize },
}

/// A query value strictly outside the inclusive bounds of its kind.
/// Carries the violated bound so it can be reported verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OutOfRange {
    #[error("This value is below the minimum value of the curve: {bound}")]
    Below { bound: f64 },

    #[error("This value is above the maximum value of the curve: {bound}")]
    Above { bound: f64 },
}

impl OutOfRange {
    pub fn bound(&self) -> f64 {
        match *self {
            OutOfRange::Below { bound } | OutOfRange::Above { bound } => bound,
        }
    }
}

/// Boundary-versus-raster checks run before the curve engine is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("The layer has no feature!")]
    NoFeature,

    #[error("The layer has more than one feature! ({0} features)")]
    MultipleFeatures(usize),

    #[error("The feature doesn't intersect the DEM extent")]
    NoIntersection,

    #[error("The feature is only in NODATA values")]
    OnlyNoData,

    #[error("The feature is smaller than raster pixel size")]
    SmallerThanCell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_messages_carry_bound() {
        let below = Error::from(OutOfRange::Below { bound: 12.5 });
        assert_eq!(below.to_string(), "This value is below the minimum value of the curve: 12.5");

        let above = Error::from(OutOfRange::Above { bound: 40.0 });
        assert_eq!(above.to_string(), "This value is above the maximum value of the curve: 40");
    }

    #[test]
    fn precondition_errors_are_surfaced_verbatim() {
        let e = Error::from(PreconditionError::OnlyNoData);
        assert_eq!(e.to_string(), "The feature is only in NODATA values");
    }
}
