use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use storage_core::curve::{check_point_count, write_curve_csv};
use storage_core::{run_curve, AhvTable, CurveRequest, RasterBackend};
use tracing::info;

use super::{output_writer, Source, SourceArgs};

#[derive(Args, Debug, Clone, Default)]
pub struct CurveArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Request JSON ({"vertical_spacing"}); --spacing overrides it.
    #[arg(long)]
    pub request: Option<PathBuf>,
    /// Vertical spacing of the elevation bins in metres.
    #[arg(long)]
    pub spacing: Option<f64>,
    /// Output CSV. Defaults to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CurveArgs {
    pub fn request(&self) -> Result<CurveRequest> {
        let mut request = match &self.request {
            Some(path) => {
                CurveRequest::from_json_file(path).with_context(|| format!("loading request {}", path.display()))?
            }
            None => CurveRequest::default(),
        };
        if let Some(spacing) = self.spacing {
            request.vertical_spacing = spacing;
        }
        request.validate()?;
        Ok(request)
    }
}

pub fn execute(args: &CurveArgs) -> Result<()> {
    let request = args.request()?;

    let table = match args.source.load()? {
        Source::Surface { dem, boundary } => run_curve(&RasterBackend, &dem, &boundary, &request)?,
        Source::Histogram(points) => {
            let table = AhvTable::build(&points)?;
            check_point_count(&table)?;
            table
        }
    };

    info!(rows = table.len(), "writing area-height-volume curve");
    write_curve_csv(&table, output_writer(args.output.as_deref())?)?;
    Ok(())
}
