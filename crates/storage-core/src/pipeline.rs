//! End-to-end flows: boundary preconditions, curve export and flood extent.
//!
//! Both modes share the same front half:
//!   spacing check → boundary checks → hypsometric histogram → AHV table
//! The flood-extent mode then validates and resolves the query and hands the
//! threshold to the backend for clip → threshold → vectorize → dissolve.
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::backend::{GeoBackend, MultiPolygon, FLOODED};
use crate::config::{check_spacing, CurveRequest, InundationRequest};
use crate::curve::{
    check_point_count, resolve, resolve_query, validate, AhvTable, FloodAttributes, HistogramPoint, ThresholdExport,
};
use crate::error::{PreconditionError, Result};
use crate::geometry::Polygon;
use crate::heightfield::HeightField;

/// The single dissolved flood feature with its attribute record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InundationFeature {
    pub geometry: MultiPolygon,
    pub attributes: FloodAttributes,
}

impl InundationFeature {
    /// GeoJSON `Feature` with a `MultiPolygon` geometry.
    pub fn to_geojson(&self) -> Value {
        let coordinates: Vec<Value> = self
            .geometry
            .iter()
            .map(|p| {
                let mut rings = vec![json!(p.exterior)];
                rings.extend(p.holes.iter().map(|h| json!(h)));
                Value::Array(rings)
            })
            .collect();
        let properties: serde_json::Map<String, Value> =
            self.attributes.fields().iter().map(|&(k, v)| (k.to_string(), json!(v))).collect();
        json!({
            "type": "Feature",
            "geometry": { "type": "MultiPolygon", "coordinates": coordinates },
            "properties": properties,
        })
    }

    pub fn area(&self) -> f64 {
        self.geometry.iter().map(Polygon::area).sum()
    }
}

/// Everything produced by one flood-extent run.
#[derive(Debug, Clone)]
pub struct InundationOutcome {
    pub table: AhvTable,
    pub export: ThresholdExport,
    pub feature: InundationFeature,
}

/// Check the boundary against the DEM and return the single region.
///
/// Order: spacing, raster shape, feature count, extent intersection,
/// data coverage, minimum size.
pub fn check_preconditions<'b>(dem: &HeightField, boundary: &'b [Polygon], spacing: f64) -> Result<&'b Polygon> {
    check_spacing(spacing)?;
    dem.validate()?;

    let region = match boundary {
        [] => return Err(PreconditionError::NoFeature.into()),
        [one] => one,
        many => return Err(PreconditionError::MultipleFeatures(many.len()).into()),
    };

    let bbox = region.extent().ok_or(PreconditionError::NoIntersection)?;
    if !region.intersects_extent(&dem.extent()) {
        return Err(PreconditionError::NoIntersection.into());
    }

    let (r0, r1, c0, c1) = dem.cell_window(&bbox).ok_or(PreconditionError::NoIntersection)?;
    let has_data = (r0..=r1).any(|r| (c0..=c1).any(|c| !dem.is_nodata(r, c)));
    if !has_data {
        return Err(PreconditionError::OnlyNoData.into());
    }

    if bbox.width() < dem.cell_x && bbox.height() < dem.cell_y {
        return Err(PreconditionError::SmallerThanCell.into());
    }
    Ok(region)
}

fn build_table<B: GeoBackend + ?Sized>(
    backend: &B,
    dem: &HeightField,
    region: &Polygon,
    spacing: f64,
) -> Result<AhvTable> {
    let points = backend.histogram(dem, region, spacing)?;
    info!(points = points.len(), spacing, "hypsometric curve generated");
    let table = AhvTable::build(&points)?;
    check_point_count(&table)?;
    Ok(table)
}

/// Curve-export mode: the AHV table for the boundary.
pub fn run_curve<B: GeoBackend + ?Sized>(
    backend: &B,
    dem: &HeightField,
    boundary: &[Polygon],
    request: &CurveRequest,
) -> Result<AhvTable> {
    let region = check_preconditions(dem, boundary, request.vertical_spacing)?;
    let table = build_table(backend, dem, region, request.vertical_spacing)?;
    info!(rows = table.len(), "area-height-volume curve ready");
    Ok(table)
}

/// Flood-extent mode: resolve the request and render the flooded area.
pub fn run_inundation<B: GeoBackend + ?Sized>(
    backend: &B,
    dem: &HeightField,
    boundary: &[Polygon],
    request: &InundationRequest,
) -> Result<InundationOutcome> {
    let query = request.query()?;
    let region = check_preconditions(dem, boundary, request.vertical_spacing)?;
    let table = build_table(backend, dem, region, request.vertical_spacing)?;

    let state = resolve(validate(&table, query)?)?;
    let export = ThresholdExport::from(state);
    info!(
        elevation = state.elevation,
        height = state.height,
        area = state.area,
        volume = state.volume,
        "resolved {}",
        request.parameter
    );

    let clipped = backend.clip(dem, region)?;
    let classes = backend.threshold(&clipped, export.threshold)?;
    let features = backend.vectorize(&classes)?;
    let geometry = backend.dissolve(features, &|f| f.dn == FLOODED)?;
    info!(parts = geometry.len(), "flood extent dissolved");

    let feature = InundationFeature { geometry, attributes: export.attributes };
    Ok(InundationOutcome { table, export, feature })
}

/// Geometry-free path: build, validate and resolve straight from a histogram.
pub fn resolve_histogram(points: &[HistogramPoint], request: &InundationRequest) -> Result<ThresholdExport> {
    let (_, state) = resolve_query(points, request.query()?)?;
    Ok(ThresholdExport::from(state))
}
