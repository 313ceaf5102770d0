//! Diagnostic plot of an area–height–volume curve CSV.
//! Elevation runs up the y axis; area (blue) and volume (red) are each
//! normalised to the full plot width.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use image::{Rgb, RgbImage};
use storage_core::curve::read_curve_csv;

const MARGIN: u32 = 20;

const AREA: Rgb<u8> = Rgb([40, 90, 220]);
const VOLUME: Rgb<u8> = Rgb([220, 50, 50]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);

#[derive(Parser, Debug)]
#[command(name = "visualize", about = "Render an AHV curve CSV to PNG")]
struct Args {
    /// Curve CSV written by `storage curve`.
    #[arg(short, long)]
    input: PathBuf,
    /// PNG output path.
    #[arg(short, long, default_value = "curve.png")]
    output: PathBuf,
    #[arg(long, default_value_t = 640)]
    width: u32,
    #[arg(long, default_value_t = 480)]
    height: u32,
}

// ── Drawing helpers ───────────────────────────────────────────────────────────

/// Map `v` in `[lo, hi]` to `[0, 1]`; a flat range maps to 0.
fn unit(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Straight segment between two pixel positions, sampled densely enough
/// that consecutive pixels touch.
fn segment(img: &mut RgbImage, (x0, y0): (f64, f64), (x1, y1): (f64, f64), colour: Rgb<u8>) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = (x0 + t * (x1 - x0)).round() as u32;
        let y = (y0 + t * (y1 - y0)).round() as u32;
        if x < img.width() && y < img.height() {
            img.put_pixel(x, y, colour);
        }
    }
}

/// Pixel position of a normalised `(x, y)` inside the plot margins; y grows upward.
fn to_pixel(img: &RgbImage, x: f64, y: f64) -> (f64, f64) {
    let w = (img.width() - 2 * MARGIN) as f64;
    let h = (img.height() - 2 * MARGIN) as f64;
    (MARGIN as f64 + x * w, (img.height() - MARGIN) as f64 - y * h)
}

fn polyline(img: &mut RgbImage, points: &[(f64, f64)], colour: Rgb<u8>) {
    for pair in points.windows(2) {
        let a = to_pixel(img, pair[0].0, pair[0].1);
        let b = to_pixel(img, pair[1].0, pair[1].1);
        segment(img, a, b, colour);
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    anyhow::ensure!(
        args.width > 2 * MARGIN && args.height > 2 * MARGIN,
        "image must be larger than {}×{} pixels",
        2 * MARGIN,
        2 * MARGIN
    );

    let file = File::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?;
    let table = read_curve_csv(BufReader::new(file)).with_context(|| format!("reading {}", args.input.display()))?;
    println!("Loaded {} curve rows from {}", table.len(), args.input.display());

    let (elevations, areas, volumes) = (table.elevations(), table.areas(), table.volumes());
    let (e_lo, e_hi) = (elevations[0], elevations[elevations.len() - 1]);
    let (a_lo, a_hi) = (areas[0], areas[areas.len() - 1]);
    let (v_lo, v_hi) = (volumes[0], volumes[volumes.len() - 1]);

    let mut img = RgbImage::from_pixel(args.width, args.height, Rgb([255, 255, 255]));

    for k in 1..10 {
        let f = k as f64 / 10.0;
        let (a, b) = (to_pixel(&img, 0.0, f), to_pixel(&img, 1.0, f));
        segment(&mut img, a, b, GRID);
        let (a, b) = (to_pixel(&img, f, 0.0), to_pixel(&img, f, 1.0));
        segment(&mut img, a, b, GRID);
    }
    let origin = to_pixel(&img, 0.0, 0.0);
    let x_end = to_pixel(&img, 1.0, 0.0);
    segment(&mut img, origin, x_end, AXIS);
    let y_end = to_pixel(&img, 0.0, 1.0);
    segment(&mut img, origin, y_end, AXIS);

    let area_curve: Vec<(f64, f64)> = table
        .rows()
        .map(|r| (unit(r.area, a_lo, a_hi), unit(r.elevation, e_lo, e_hi)))
        .collect();
    let volume_curve: Vec<(f64, f64)> = table
        .rows()
        .map(|r| (unit(r.volume, v_lo, v_hi), unit(r.elevation, e_lo, e_hi)))
        .collect();
    polyline(&mut img, &area_curve, AREA);
    polyline(&mut img, &volume_curve, VOLUME);

    img.save(&args.output).with_context(|| format!("saving {}", args.output.display()))?;
    println!("Wrote {} (elevation {e_lo}–{e_hi} m, area ≤ {a_hi} m2, volume ≤ {v_hi} m3)", args.output.display());
    Ok(())
}
