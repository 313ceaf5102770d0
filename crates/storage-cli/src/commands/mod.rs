//! Subcommands and the input/output plumbing they share.
pub mod curve;
pub mod inundation;

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use storage_core::curve::read_histogram_csv;
use storage_core::{HeightField, HistogramPoint, Polygon};
use tracing::debug;

/// Where the elevation data comes from: a DEM plus boundary, or a
/// precomputed hypsometric histogram.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// DEM grid as HeightField JSON.
    #[arg(long, requires = "boundary")]
    pub dem: Option<PathBuf>,
    /// Boundary polygons as JSON (an array holding exactly one polygon).
    #[arg(long, requires = "dem")]
    pub boundary: Option<PathBuf>,
    /// Hypsometric histogram CSV (area,elevation) used instead of a DEM.
    #[arg(long, conflicts_with_all = ["dem", "boundary"])]
    pub histogram: Option<PathBuf>,
}

pub enum Source {
    Surface { dem: HeightField, boundary: Vec<Polygon> },
    Histogram(Vec<HistogramPoint>),
}

impl SourceArgs {
    pub fn load(&self) -> Result<Source> {
        match (&self.dem, &self.boundary, &self.histogram) {
            (_, _, Some(path)) => {
                let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
                let points = read_histogram_csv(BufReader::new(file))
                    .with_context(|| format!("reading histogram {}", path.display()))?;
                debug!(points = points.len(), "loaded histogram");
                Ok(Source::Histogram(points))
            }
            (Some(dem), Some(boundary), None) => {
                let dem: HeightField = read_json(dem)?;
                let boundary: Vec<Polygon> = read_json(boundary)?;
                debug!(
                    width = dem.width,
                    height = dem.height,
                    min = ?dem.min_elevation(),
                    max = ?dem.max_elevation(),
                    polygons = boundary.len(),
                    "loaded DEM and boundary"
                );
                Ok(Source::Surface { dem, boundary })
            }
            _ => bail!("either --dem with --boundary, or --histogram, is required"),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Open `path` for writing, or stdout when absent.
pub fn output_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(File::create(p).with_context(|| format!("creating {}", p.display()))?),
        None => Box::new(io::stdout().lock()),
    })
}

pub fn write_json(path: Option<&Path>, value: &serde_json::Value) -> Result<()> {
    let mut out = output_writer(path)?;
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::{Path, PathBuf};

    use storage_core::{HeightField, Polygon};

    /// 10×10 tilted plane, 10 m cells, rising one metre per column from 100 m.
    pub fn ramp() -> HeightField {
        let mut hf = HeightField::new(10, 10, 0.0, 100.0, 10.0, 10.0, 0.0);
        for r in 0..10 {
            for c in 0..10 {
                hf.set(r, c, 100.0 + c as f32);
            }
        }
        hf
    }

    pub fn write_surface(dir: &Path) -> (PathBuf, PathBuf) {
        let dem = dir.join("dem.json");
        let boundary = dir.join("boundary.json");
        std::fs::write(&dem, serde_json::to_string(&ramp()).unwrap()).unwrap();
        let region = vec![Polygon::rectangle(0.0, 0.0, 100.0, 100.0)];
        std::fs::write(&boundary, serde_json::to_string(&region).unwrap()).unwrap();
        (dem, boundary)
    }

    pub fn write_histogram(dir: &Path) -> PathBuf {
        let path = dir.join("hist.csv");
        std::fs::write(&path, "area,elevation\n0,0\n10,1\n30,2\n50,3\n").unwrap();
        path
    }
}
