//! Geospatial capabilities the inundation pipeline delegates to.
//!
//! The curve engine only produces a scalar threshold and metadata; turning
//! that into a flood extent is the backend's job. [`RasterBackend`] is the
//! in-crate implementation over [`HeightField`] grids.
mod outline;
pub mod raster;

pub use raster::RasterBackend;

use serde::{Deserialize, Serialize};

use crate::curve::HistogramPoint;
use crate::error::Result;
use crate::geometry::Polygon;
use crate::heightfield::HeightField;

/// Class value for cells at or below the threshold.
pub const FLOODED: u8 = 1;
/// Class value for cells above the threshold.
pub const DRY: u8 = 0;

/// Multi-part geometry, one entry per disjoint part.
pub type MultiPolygon = Vec<Polygon>;

/// Binary class raster produced by thresholding. `None` is nodata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRaster {
    pub classes: Vec<Option<u8>>,
    pub width: usize,
    pub height: usize,
    pub origin_x: f64,
    pub origin_y: f64,
    pub cell_x: f64,
    pub cell_y: f64,
}

impl ClassRaster {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.classes[row * self.width + col]
    }

    /// Number of cells carrying `class`.
    pub fn count(&self, class: u8) -> usize {
        self.classes.iter().filter(|&&c| c == Some(class)).count()
    }
}

/// A vectorized region of constant class value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub dn: u8,
    pub geometry: MultiPolygon,
}

impl Feature {
    pub fn area(&self) -> f64 {
        self.geometry.iter().map(Polygon::area).sum()
    }
}

/// Raster and vector operations needed to turn a threshold into geometry,
/// plus the hypsometric histogram the curve is built from.
pub trait GeoBackend {
    /// Mask `raster` to `region`: cells whose centre falls outside become nodata.
    fn clip(&self, raster: &HeightField, region: &Polygon) -> Result<HeightField>;

    /// 1 where elevation ≤ `elevation`, 0 above it, nodata preserved.
    fn threshold(&self, raster: &HeightField, elevation: f64) -> Result<ClassRaster>;

    /// One feature per 4-connected region of equal class.
    fn vectorize(&self, raster: &ClassRaster) -> Result<Vec<Feature>>;

    /// Merge every feature accepted by `predicate` into one geometry.
    fn dissolve(&self, features: Vec<Feature>, predicate: &dyn Fn(&Feature) -> bool) -> Result<MultiPolygon>;

    /// Cumulative area at or below each elevation bin inside `region`.
    fn histogram(&self, raster: &HeightField, region: &Polygon, step: f64) -> Result<Vec<HistogramPoint>>;
}
