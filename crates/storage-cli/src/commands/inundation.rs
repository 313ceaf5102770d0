use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use storage_core::{resolve_histogram, run_inundation, InundationRequest, ParameterKind, RasterBackend};
use tracing::info;

use super::{write_json, Source, SourceArgs};

#[derive(Args, Debug, Clone, Default)]
pub struct InundationArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Request JSON ({"parameter", "value", "vertical_spacing"}); flags override it.
    #[arg(long)]
    pub request: Option<PathBuf>,
    /// Known quantity: height, elevation, area or volume.
    #[arg(long)]
    pub parameter: Option<ParameterKind>,
    /// Value of the known quantity, in metres, m2 or m3.
    #[arg(long)]
    pub value: Option<f64>,
    /// Vertical spacing of the elevation bins in metres.
    #[arg(long)]
    pub spacing: Option<f64>,
    /// Output file (GeoJSON for a DEM source, threshold JSON for a histogram).
    /// Defaults to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InundationArgs {
    /// Merge the request file with the command-line overrides.
    pub fn request(&self) -> Result<InundationRequest> {
        let base = match &self.request {
            Some(path) => Some(
                InundationRequest::from_json_file(path)
                    .with_context(|| format!("loading request {}", path.display()))?,
            ),
            None => None,
        };
        let parameter = match (self.parameter, base) {
            (Some(p), _) => p,
            (None, Some(b)) => b.parameter,
            (None, None) => bail!("--parameter is required without --request"),
        };
        let value = match (self.value, base) {
            (Some(v), _) => v,
            (None, Some(b)) => b.value,
            (None, None) => bail!("--value is required without --request"),
        };
        let spacing = self
            .spacing
            .or(base.map(|b| b.vertical_spacing))
            .unwrap_or(storage_core::DEFAULT_VERTICAL_SPACING);
        Ok(InundationRequest::new(parameter, value, spacing))
    }
}

pub fn execute(args: &InundationArgs) -> Result<()> {
    let request = args.request()?;
    info!(parameter = %request.parameter, value = request.value, spacing = request.vertical_spacing, "inundation request");

    match args.source.load()? {
        Source::Surface { dem, boundary } => {
            let outcome = run_inundation(&RasterBackend, &dem, &boundary, &request)?;
            info!(threshold = outcome.export.threshold, "writing flood extent");
            write_json(args.output.as_deref(), &outcome.feature.to_geojson())
        }
        Source::Histogram(points) => {
            let export = resolve_histogram(&points, &request)?;
            info!(threshold = export.threshold, "writing threshold");
            write_json(args.output.as_deref(), &serde_json::to_value(export)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use approx::assert_relative_eq;
    use std::fs;

    #[test]
    fn flags_override_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        fs::write(&path, r#"{"parameter": "area", "value": 10, "vertical_spacing": 0.5}"#).unwrap();

        let args = InundationArgs { request: Some(path), value: Some(25.0), ..Default::default() };
        let req = args.request().unwrap();
        assert_eq!(req.parameter, ParameterKind::Area);
        assert_eq!(req.value, 25.0);
        assert_eq!(req.vertical_spacing, 0.5);
    }

    #[test]
    fn missing_parameter_is_reported() {
        let args = InundationArgs { value: Some(1.0), ..Default::default() };
        assert!(args.request().unwrap_err().to_string().contains("--parameter"));
    }

    #[test]
    fn histogram_source_writes_threshold_json() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("threshold.json");
        let args = InundationArgs {
            source: SourceArgs { histogram: Some(fixtures::write_histogram(dir.path())), ..Default::default() },
            parameter: Some(ParameterKind::Elevation),
            value: Some(1.5),
            output: Some(out.clone()),
            ..Default::default()
        };
        execute(&args).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(json["threshold"].as_f64(), Some(1.5));
        assert_relative_eq!(json["attributes"]["Area (m2)"].as_f64().unwrap(), 20.0);
        assert_relative_eq!(json["attributes"]["Volume (m3)"].as_f64().unwrap(), 45.0);
    }

    #[test]
    fn dem_source_writes_geojson_feature() {
        let dir = tempfile::tempdir().unwrap();
        let (dem, boundary) = fixtures::write_surface(dir.path());
        let out = dir.path().join("flood.geojson");
        let args = InundationArgs {
            source: SourceArgs { dem: Some(dem), boundary: Some(boundary), histogram: None },
            parameter: Some(ParameterKind::Elevation),
            value: Some(104.0),
            output: Some(out.clone()),
            ..Default::default()
        };
        execute(&args).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "MultiPolygon");
        assert_eq!(json["geometry"]["coordinates"].as_array().unwrap().len(), 1);
        assert_relative_eq!(json["properties"]["Area (m2)"].as_f64().unwrap(), 5000.0);
    }

    #[test]
    fn out_of_range_value_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = InundationArgs {
            source: SourceArgs { histogram: Some(fixtures::write_histogram(dir.path())), ..Default::default() },
            parameter: Some(ParameterKind::Area),
            value: Some(1000.0),
            output: Some(dir.path().join("never.json")),
            ..Default::default()
        };
        let err = execute(&args).unwrap_err();
        assert!(err.to_string().contains("above the maximum value"), "{err}");
    }
}
