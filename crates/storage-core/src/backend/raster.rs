//! In-memory [`GeoBackend`] over [`HeightField`] grids.
use std::collections::VecDeque;

use tracing::{debug, warn};

use super::outline::{trace, GridFrame};
use super::{ClassRaster, Feature, GeoBackend, MultiPolygon, DRY, FLOODED};
use crate::curve::HistogramPoint;
use crate::error::{Error, Result};
use crate::geometry::Polygon;
use crate::heightfield::HeightField;

/// Upper limit on histogram bins for one boundary.
pub const MAX_HISTOGRAM_BINS: usize = 1_000_000;

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterBackend;

impl RasterBackend {
    pub fn new() -> Self {
        Self
    }
}

impl GeoBackend for RasterBackend {
    fn clip(&self, raster: &HeightField, region: &Polygon) -> Result<HeightField> {
        let mut out = raster.like(f32::NAN);
        let Some(window) = region.extent().and_then(|e| raster.cell_window(&e)) else {
            return Ok(out);
        };
        let (r0, r1, c0, c1) = window;
        for r in r0..=r1 {
            for c in c0..=c1 {
                if region.contains(raster.cell_centre(r, c)) {
                    out.set(r, c, raster.get(r, c));
                }
            }
        }
        Ok(out)
    }

    fn threshold(&self, raster: &HeightField, elevation: f64) -> Result<ClassRaster> {
        if !elevation.is_finite() {
            return Err(Error::Backend(format!("threshold elevation must be finite, got {elevation}")));
        }
        let classes = raster
            .data
            .iter()
            .map(|&z| {
                if z.is_nan() {
                    None
                } else if (z as f64) <= elevation {
                    Some(FLOODED)
                } else {
                    Some(DRY)
                }
            })
            .collect();
        Ok(ClassRaster {
            classes,
            width: raster.width,
            height: raster.height,
            origin_x: raster.origin_x,
            origin_y: raster.origin_y,
            cell_x: raster.cell_x,
            cell_y: raster.cell_y,
        })
    }

    fn vectorize(&self, raster: &ClassRaster) -> Result<Vec<Feature>> {
        let (w, h) = (raster.width, raster.height);
        if raster.classes.len() != w * h {
            return Err(Error::Backend(format!(
                "class raster holds {} cells, expected {}×{}",
                raster.classes.len(),
                w,
                h
            )));
        }

        let mut label = vec![usize::MAX; w * h];
        let mut features = Vec::new();
        let mut queue = VecDeque::new();

        for start in 0..w * h {
            let Some(dn) = raster.classes[start] else { continue };
            if label[start] != usize::MAX {
                continue;
            }
            let id = features.len();

            // Flood-fill one 4-connected component, tracking its bounding box.
            let mut cells = Vec::new();
            let (mut r_min, mut r_max, mut c_min, mut c_max) = (usize::MAX, 0, usize::MAX, 0);
            label[start] = id;
            queue.push_back(start);
            while let Some(idx) = queue.pop_front() {
                let (r, c) = (idx / w, idx % w);
                cells.push(idx);
                r_min = r_min.min(r);
                r_max = r_max.max(r);
                c_min = c_min.min(c);
                c_max = c_max.max(c);

                let mut visit = |n: usize| {
                    if label[n] == usize::MAX && raster.classes[n] == Some(dn) {
                        label[n] = id;
                        queue.push_back(n);
                    }
                };
                if r > 0 {
                    visit(idx - w);
                }
                if r + 1 < h {
                    visit(idx + w);
                }
                if c > 0 {
                    visit(idx - 1);
                }
                if c + 1 < w {
                    visit(idx + 1);
                }
            }

            // Trace within the component's bounding box only.
            let (bw, bh) = (c_max - c_min + 1, r_max - r_min + 1);
            let mut mask = vec![false; bw * bh];
            for idx in cells {
                let (r, c) = (idx / w, idx % w);
                mask[(r - r_min) * bw + (c - c_min)] = true;
            }
            let frame = GridFrame {
                width: bw,
                height: bh,
                origin_x: raster.origin_x + c_min as f64 * raster.cell_x,
                origin_y: raster.origin_y - r_min as f64 * raster.cell_y,
                cell_x: raster.cell_x,
                cell_y: raster.cell_y,
            };
            features.push(Feature { dn, geometry: trace(&mask, &frame) });
        }

        debug!(features = features.len(), "vectorized class raster");
        Ok(features)
    }

    fn dissolve(&self, features: Vec<Feature>, predicate: &dyn Fn(&Feature) -> bool) -> Result<MultiPolygon> {
        // 4-connected components of one class never share an edge, so the
        // union of the accepted features is the concatenation of their parts.
        let merged: MultiPolygon = features
            .into_iter()
            .filter(|f| predicate(f))
            .flat_map(|f| f.geometry)
            .collect();
        if merged.is_empty() {
            warn!("dissolve matched no features; flood extent is empty");
        }
        Ok(merged)
    }

    fn histogram(&self, raster: &HeightField, region: &Polygon, step: f64) -> Result<Vec<HistogramPoint>> {
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::InvalidSpacing(step));
        }
        let clipped = self.clip(raster, region)?;
        let mut values: Vec<f64> = clipped.data.iter().filter(|v| !v.is_nan()).map(|&v| v as f64).collect();
        if values.is_empty() {
            return Err(Error::Backend("no valid elevation cells inside the boundary".into()));
        }
        values.sort_by(f64::total_cmp);

        let min = values[0];
        let max = values[values.len() - 1];
        let span = ((max - min) / step).ceil();
        if span > MAX_HISTOGRAM_BINS as f64 {
            return Err(Error::Backend(format!(
                "vertical spacing {step} over {} m of relief needs {span} bins (limit {MAX_HISTOGRAM_BINS})",
                max - min
            )));
        }
        let bins = (span as usize).max(1);
        let cell_area = raster.cell_area();

        let points: Vec<HistogramPoint> = (0..bins)
            .map(|k| {
                let upper = min + (k + 1) as f64 * step;
                let count = if k + 1 == bins {
                    values.len()
                } else {
                    values.partition_point(|&v| v <= upper)
                };
                HistogramPoint::new(upper, count as f64 * cell_area)
            })
            .collect();
        debug!(bins, cells = values.len(), min, max, "hypsometric histogram");
        Ok(points)
    }
}
