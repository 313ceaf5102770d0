//! Cumulative Area-Height-Volume table built from a hypsometric histogram.
//!
//! Volume is the cumulative trapezoidal integral of area over elevation:
//!
//!   V_i = Σ_{k ≤ i} (e_{k+1} − e_k) · (a_k + a_{k+1}) / 2
//!
//! One value per gap between consecutive histogram points. The column is
//! padded with a trailing 0 to match the input length, stacked next to the
//! `(area, elevation)` pairs, and the last composed row is discarded, so row
//! `i` pairs point `i` with the integral through gap `i`.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BuildError;

/// One histogram bin: cumulative area at or below `elevation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramPoint {
    pub elevation: f64,
    pub area: f64,
}

impl HistogramPoint {
    pub fn new(elevation: f64, area: f64) -> Self {
        Self { elevation, area }
    }
}

/// One row of the AHV table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AhvRow {
    pub area: f64,
    pub elevation: f64,
    pub volume: f64,
}

/// Immutable AHV lookup table.
///
/// Stored column-wise so each quantity can be used directly as an
/// interpolation axis. Construction guarantees strictly increasing
/// elevation and non-decreasing area and volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AhvTable {
    areas: Vec<f64>,
    elevations: Vec<f64>,
    volumes: Vec<f64>,
}

impl AhvTable {
    /// Integrate a histogram into an AHV table.
    ///
    /// Fails with [`BuildError`] when fewer than 2 points are supplied or
    /// when the points violate the monotonicity the table relies on.
    pub fn build(points: &[HistogramPoint]) -> Result<Self, BuildError> {
        if points.len() < 2 {
            return Err(BuildError::TooFewPoints(points.len()));
        }
        check_histogram(points)?;

        let mut cumulative = Vec::with_capacity(points.len());
        let mut running = 0.0f64;
        for pair in points.windows(2) {
            let (p0, p1) = (pair[0], pair[1]);
            running += (p1.elevation - p0.elevation) * (p0.area + p1.area) / 2.0;
            cumulative.push(running);
        }
        // Trailing sentinel aligns the volume column with the input rows;
        // the row it lands on is dropped below.
        cumulative.push(0.0);

        let kept = points.len() - 1;
        let table = Self {
            areas: points[..kept].iter().map(|p| p.area).collect(),
            elevations: points[..kept].iter().map(|p| p.elevation).collect(),
            volumes: cumulative[..kept].to_vec(),
        };
        debug!(
            rows = table.len(),
            max_volume = table.volumes[kept - 1],
            "built AHV table"
        );
        Ok(table)
    }

    /// Rebuild a table from persisted rows, re-checking the ordering invariant.
    pub fn from_rows(rows: &[AhvRow]) -> Result<Self, BuildError> {
        if rows.is_empty() {
            return Err(BuildError::TooFewPoints(0));
        }
        for (i, r) in rows.iter().enumerate() {
            if !(r.area.is_finite() && r.elevation.is_finite() && r.volume.is_finite()) {
                return Err(BuildError::NonFinite { row: i });
            }
        }
        for (i, pair) in rows.windows(2).enumerate() {
            let (prev, cur) = (pair[0], pair[1]);
            if cur.elevation <= prev.elevation {
                return Err(BuildError::ElevationNotIncreasing {
                    row: i + 1,
                    previous: prev.elevation,
                    current: cur.elevation,
                });
            }
            if cur.area < prev.area {
                return Err(BuildError::AreaDecreasing { row: i + 1, previous: prev.area, current: cur.area });
            }
            if cur.volume < prev.volume {
                return Err(BuildError::VolumeDecreasing {
                    row: i + 1,
                    previous: prev.volume,
                    current: cur.volume,
                });
            }
        }
        Ok(Self {
            areas: rows.iter().map(|r| r.area).collect(),
            elevations: rows.iter().map(|r| r.elevation).collect(),
            volumes: rows.iter().map(|r| r.volume).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.elevations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elevations.is_empty()
    }

    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Lowest sampled elevation (`e0`), the anchor for height.
    pub fn base_elevation(&self) -> f64 {
        self.elevations[0]
    }

    pub fn row(&self, i: usize) -> AhvRow {
        AhvRow { area: self.areas[i], elevation: self.elevations[i], volume: self.volumes[i] }
    }

    pub fn rows(&self) -> impl Iterator<Item = AhvRow> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }
}

fn check_histogram(points: &[HistogramPoint]) -> Result<(), BuildError> {
    for (i, p) in points.iter().enumerate() {
        if !(p.elevation.is_finite() && p.area.is_finite()) {
            return Err(BuildError::NonFinite { row: i });
        }
        if p.area < 0.0 {
            return Err(BuildError::NegativeArea { row: i, area: p.area });
        }
    }
    for (i, pair) in points.windows(2).enumerate() {
        let (prev, cur) = (pair[0], pair[1]);
        if cur.elevation <= prev.elevation {
            return Err(BuildError::ElevationNotIncreasing {
                row: i + 1,
                previous: prev.elevation,
                current: cur.elevation,
            });
        }
        if cur.area < prev.area {
            return Err(BuildError::AreaDecreasing { row: i + 1, previous: prev.area, current: cur.area });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn hist(pairs: &[(f64, f64)]) -> Vec<HistogramPoint> {
        pairs.iter().map(|&(e, a)| HistogramPoint::new(e, a)).collect()
    }

    #[test]
    fn worked_example_drops_last_row() {
        let table = AhvTable::build(&hist(&[(0.0, 0.0), (1.0, 10.0), (2.0, 30.0), (3.0, 50.0)])).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.elevations(), &[0.0, 1.0, 2.0]);
        assert_eq!(table.areas(), &[0.0, 10.0, 30.0]);
        // Gaps integrate to 5, 20, 40 → cumulative 5, 25, 65; the last row is dropped.
        assert_relative_eq!(table.volumes()[0], 5.0);
        assert_relative_eq!(table.volumes()[1], 25.0);
        assert_relative_eq!(table.volumes()[2], 65.0);
    }

    #[test]
    fn two_points_build_a_single_row() {
        let table = AhvTable::build(&hist(&[(10.0, 2.0), (11.0, 4.0)])).unwrap();
        assert_eq!(table.len(), 1);
        assert_relative_eq!(table.volumes()[0], 3.0);
    }

    #[test]
    fn fewer_than_two_points_is_a_build_error() {
        assert_eq!(AhvTable::build(&[]), Err(BuildError::TooFewPoints(0)));
        assert_eq!(
            AhvTable::build(&hist(&[(1.0, 1.0)])),
            Err(BuildError::TooFewPoints(1))
        );
    }

    #[test]
    fn disordered_elevation_is_rejected() {
        let err = AhvTable::build(&hist(&[(0.0, 0.0), (2.0, 5.0), (1.0, 6.0)])).unwrap_err();
        assert!(matches!(err, BuildError::ElevationNotIncreasing { row: 2, .. }), "{err:?}");

        let dup = AhvTable::build(&hist(&[(0.0, 0.0), (0.0, 5.0)])).unwrap_err();
        assert!(matches!(dup, BuildError::ElevationNotIncreasing { row: 1, .. }));
    }

    #[test]
    fn decreasing_or_negative_area_is_rejected() {
        let err = AhvTable::build(&hist(&[(0.0, 5.0), (1.0, 4.0), (2.0, 6.0)])).unwrap_err();
        assert!(matches!(err, BuildError::AreaDecreasing { row: 1, .. }));

        let neg = AhvTable::build(&hist(&[(0.0, -1.0), (1.0, 4.0)])).unwrap_err();
        assert!(matches!(neg, BuildError::NegativeArea { row: 0, .. }));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = AhvTable::build(&hist(&[(0.0, 0.0), (f64::NAN, 1.0)])).unwrap_err();
        assert_eq!(err, BuildError::NonFinite { row: 1 });
    }

    #[test]
    fn from_rows_round_trips_built_table() {
        let table = AhvTable::build(&hist(&[(0.0, 1.0), (1.0, 3.0), (2.0, 9.0), (3.0, 12.0)])).unwrap();
        let rows: Vec<AhvRow> = table.rows().collect();
        assert_eq!(AhvTable::from_rows(&rows).unwrap(), table);
    }

    #[test]
    fn from_rows_rejects_decreasing_volume() {
        let rows = [
            AhvRow { area: 1.0, elevation: 0.0, volume: 4.0 },
            AhvRow { area: 2.0, elevation: 1.0, volume: 3.0 },
        ];
        assert!(matches!(
            AhvTable::from_rows(&rows),
            Err(BuildError::VolumeDecreasing { row: 1, .. })
        ));
    }

    prop_compose! {
        fn monotone_histogram()(
            steps in prop::collection::vec((0.01f64..50.0, 0.0f64..1.0e4), 3..64),
            start in -500.0f64..5000.0,
        ) -> Vec<HistogramPoint> {
            let mut elevation = start;
            let mut area = 0.0;
            steps
                .into_iter()
                .map(|(de, da)| {
                    elevation += de;
                    area += da;
                    HistogramPoint::new(elevation, area)
                })
                .collect()
        }
    }

    proptest! {
        #[test]
        fn built_rows_are_monotone(points in monotone_histogram()) {
            let table = AhvTable::build(&points).unwrap();
            prop_assert_eq!(table.len(), points.len() - 1);
            for pair in table.rows().collect::<Vec<_>>().windows(2) {
                prop_assert!(pair[1].elevation > pair[0].elevation);
                prop_assert!(pair[1].area >= pair[0].area);
                prop_assert!(pair[1].volume >= pair[0].volume);
            }
        }
    }
}
