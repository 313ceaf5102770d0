//! Area–height–volume curves for reservoirs and flood-prone basins.
//!
//! A DEM inside a boundary polygon is reduced to a hypsometric histogram,
//! integrated into an AHV table, and queried by any one of elevation,
//! height, area or volume. The resolved elevation drives a raster threshold
//! whose flooded cells are vectorized into a single dissolved feature.

pub mod backend;
pub mod config;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod heightfield;
pub mod pipeline;

pub use backend::{GeoBackend, RasterBackend};
pub use config::{CurveRequest, InundationRequest, DEFAULT_VERTICAL_SPACING};
pub use curve::{AhvTable, HistogramPoint, ParameterKind, ParameterQuery, ResolvedState, ThresholdExport};
pub use error::{BuildError, Error, OutOfRange, PreconditionError, Result};
pub use geometry::{Extent, Point, Polygon};
pub use heightfield::HeightField;
pub use pipeline::{check_preconditions, resolve_histogram, run_curve, run_inundation, InundationFeature, InundationOutcome};
