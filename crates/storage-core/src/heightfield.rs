use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Extent, Point};

/// A projected DEM grid storing elevation as f32 in metres, row-major,
/// north-up. Row 0 is the top edge at `origin_y`; NaN marks nodata.
/// Coordinate math uses f64; elevation values use f32.
///
/// Deserialization runs [`HeightField::validate`], so a grid read from JSON
/// is always safe to index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawHeightField")]
pub struct HeightField {
    /// Row-major elevation values in metres. Nodata is serialized as `null`.
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    /// Top-left corner of the grid.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Cell size in metres along x and y (both positive).
    pub cell_x: f64,
    pub cell_y: f64,
}

#[derive(Deserialize)]
struct RawHeightField {
    #[serde(deserialize_with = "null_as_nan_vec")]
    data: Vec<f32>,
    width: usize,
    height: usize,
    origin_x: f64,
    origin_y: f64,
    cell_x: f64,
    cell_y: f64,
}

impl TryFrom<RawHeightField> for HeightField {
    type Error = Error;

    fn try_from(raw: RawHeightField) -> Result<Self> {
        let hf = HeightField {
            data: raw.data,
            width: raw.width,
            height: raw.height,
            origin_x: raw.origin_x,
            origin_y: raw.origin_y,
            cell_x: raw.cell_x,
            cell_y: raw.cell_y,
        };
        hf.validate()?;
        Ok(hf)
    }
}

fn null_as_nan_vec<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<f32>, D::Error> {
    let v: Vec<Option<f32>> = Vec::deserialize(d)?;
    Ok(v.into_iter().map(|x| x.unwrap_or(f32::NAN)).collect())
}

impl HeightField {
    /// Create a new HeightField filled with the given value.
    pub fn new(width: usize, height: usize, origin_x: f64, origin_y: f64, cell_x: f64, cell_y: f64, fill: f32) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
            origin_x,
            origin_y,
            cell_x,
            cell_y,
        }
    }

    /// Check that the grid is non-empty, `data` holds `width × height` cells
    /// and the georeferencing is finite with positive cell sizes.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidRaster(format!("empty grid {}×{}", self.width, self.height)));
        }
        match self.width.checked_mul(self.height) {
            Some(n) if n == self.data.len() => {}
            _ => {
                return Err(Error::InvalidRaster(format!(
                    "grid is {}×{} but holds {} values",
                    self.width,
                    self.height,
                    self.data.len()
                )))
            }
        }
        if !(self.cell_x.is_finite() && self.cell_x > 0.0 && self.cell_y.is_finite() && self.cell_y > 0.0) {
            return Err(Error::InvalidRaster(format!(
                "cell size must be finite and positive, got {}×{}",
                self.cell_x, self.cell_y
            )));
        }
        if !(self.origin_x.is_finite() && self.origin_y.is_finite()) {
            return Err(Error::InvalidRaster("origin must be finite".into()));
        }
        Ok(())
    }

    /// Same grid geometry as `self`, every cell set to `fill`.
    pub fn like(&self, fill: f32) -> Self {
        Self::new(self.width, self.height, self.origin_x, self.origin_y, self.cell_x, self.cell_y, fill)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f32) {
        self.data[row * self.width + col] = val;
    }

    #[inline]
    pub fn is_nodata(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_nan()
    }

    /// Centre of cell `(row, col)` in projected coordinates.
    pub fn cell_centre(&self, row: usize, col: usize) -> Point {
        Point::new(
            self.origin_x + (col as f64 + 0.5) * self.cell_x,
            self.origin_y - (row as f64 + 0.5) * self.cell_y,
        )
    }

    pub fn cell_area(&self) -> f64 {
        (self.cell_x * self.cell_y).abs()
    }

    pub fn extent(&self) -> Extent {
        Extent {
            min_x: self.origin_x,
            min_y: self.origin_y - self.height as f64 * self.cell_y,
            max_x: self.origin_x + self.width as f64 * self.cell_x,
            max_y: self.origin_y,
        }
    }

    /// Inclusive `(row_min, row_max, col_min, col_max)` of the cells whose
    /// footprint overlaps `window`, or `None` when there is no overlap.
    pub fn cell_window(&self, window: &Extent) -> Option<(usize, usize, usize, usize)> {
        if !self.extent().intersects(window) || self.width == 0 || self.height == 0 {
            return None;
        }
        let clamp_col = |x: f64| (((x - self.origin_x) / self.cell_x).floor().max(0.0) as usize).min(self.width - 1);
        let clamp_row = |y: f64| (((self.origin_y - y) / self.cell_y).floor().max(0.0) as usize).min(self.height - 1);
        Some((clamp_row(window.max_y), clamp_row(window.min_y), clamp_col(window.min_x), clamp_col(window.max_x)))
    }

    /// Minimum over valid cells; `None` if every cell is nodata.
    pub fn min_elevation(&self) -> Option<f32> {
        self.data.iter().copied().filter(|v| !v.is_nan()).reduce(f32::min)
    }

    /// Maximum over valid cells; `None` if every cell is nodata.
    pub fn max_elevation(&self) -> Option<f32> {
        self.data.iter().copied().filter(|v| !v.is_nan()).reduce(f32::max)
    }
}
