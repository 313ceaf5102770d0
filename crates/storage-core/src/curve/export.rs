//! Threshold packaging and delimited-text persistence of curves.
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::resolve::ResolvedState;
use super::table::{AhvRow, AhvTable, HistogramPoint};
use crate::error::Result;

/// Header of the persisted AHV table. The middle column holds elevation.
pub const CURVE_CSV_HEADER: [&str; 3] = ["Area (m2)", "Height (m)", "Volume (m3)"];

/// Attribute names attached to the dissolved flood feature, in field order.
pub const ATTRIBUTE_FIELDS: [&str; 4] = ["Elevation (m)", "Height (m)", "Area (m2)", "Volume (m3)"];

/// Attribute record for the flood extent feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloodAttributes {
    #[serde(rename = "Elevation (m)")]
    pub elevation: f64,
    #[serde(rename = "Height (m)")]
    pub height: f64,
    #[serde(rename = "Area (m2)")]
    pub area: f64,
    #[serde(rename = "Volume (m3)")]
    pub volume: f64,
}

impl FloodAttributes {
    /// `(field name, value)` pairs in [`ATTRIBUTE_FIELDS`] order.
    pub fn fields(&self) -> [(&'static str, f64); 4] {
        [
            (ATTRIBUTE_FIELDS[0], self.elevation),
            (ATTRIBUTE_FIELDS[1], self.height),
            (ATTRIBUTE_FIELDS[2], self.area),
            (ATTRIBUTE_FIELDS[3], self.volume),
        ]
    }
}

/// Scalar threshold for raster reclassification plus the metadata that
/// travels with the resulting geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdExport {
    pub threshold: f64,
    pub attributes: FloodAttributes,
}

impl From<ResolvedState> for ThresholdExport {
    fn from(s: ResolvedState) -> Self {
        Self {
            threshold: s.elevation,
            attributes: FloodAttributes {
                elevation: s.elevation,
                height: s.height,
                area: s.area,
                volume: s.volume,
            },
        }
    }
}

/// Write `table` as CSV, one row per entry: area, elevation, volume.
pub fn write_curve_csv<W: Write>(table: &AhvTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CURVE_CSV_HEADER)?;
    for row in table.rows() {
        wtr.write_record([row.area.to_string(), row.elevation.to_string(), row.volume.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a CSV written by [`write_curve_csv`] back into a checked table.
pub fn read_curve_csv<R: Read>(reader: R) -> Result<AhvTable> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        let (area, elevation, volume): (f64, f64, f64) = record?;
        rows.push(AhvRow { area, elevation, volume });
    }
    Ok(AhvTable::from_rows(&rows)?)
}

/// Read a hypsometric histogram CSV: one header row, then `area,elevation`
/// rows in increasing elevation.
pub fn read_histogram_csv<R: Read>(reader: R) -> Result<Vec<HistogramPoint>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);
    let mut points = Vec::new();
    for record in rdr.deserialize() {
        let (area, elevation): (f64, f64) = record?;
        points.push(HistogramPoint { elevation, area });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BuildError, Error};

    fn example_table() -> AhvTable {
        let pts: Vec<HistogramPoint> = [(0.0, 0.0), (1.0, 10.0), (2.0, 30.0), (3.0, 50.0)]
            .iter()
            .map(|&(e, a)| HistogramPoint::new(e, a))
            .collect();
        AhvTable::build(&pts).unwrap()
    }

    #[test]
    fn export_uses_elevation_as_threshold() {
        let state = ResolvedState { elevation: 104.2, height: 4.2, area: 3.0e4, volume: 5.5e4 };
        let out = ThresholdExport::from(state);
        assert_eq!(out.threshold, 104.2);
        assert_eq!(out.attributes.height, 4.2);
        assert_eq!(out.attributes.volume, 5.5e4);
    }

    #[test]
    fn attributes_serialize_with_unit_labels() {
        let attrs = FloodAttributes { elevation: 1.0, height: 2.0, area: 3.0, volume: 4.0 };
        let json = serde_json::to_value(attrs).unwrap();
        for (name, value) in attrs.fields() {
            assert_eq!(json[name].as_f64(), Some(value), "{name}");
        }
    }

    #[test]
    fn curve_csv_has_header_and_one_line_per_row() {
        let table = example_table();
        let mut buf = Vec::new();
        write_curve_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Area (m2),Height (m),Volume (m3)");
        assert_eq!(lines.len(), table.len() + 1);
        assert_eq!(lines[2], "10,1,25");

        let back = read_curve_csv(text.as_bytes()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn histogram_csv_reads_area_then_elevation() {
        let text = "Area,Elevation\n0,100\n250.5,101\n900,102\n";
        let points = read_histogram_csv(text.as_bytes()).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], HistogramPoint::new(101.0, 250.5));
    }

    #[test]
    fn malformed_curve_csv_is_rejected() {
        let text = "Area (m2),Height (m),Volume (m3)\n5,2,10\n4,1,12\n";
        assert!(matches!(
            read_curve_csv(text.as_bytes()),
            Err(Error::Build(BuildError::ElevationNotIncreasing { .. }))
        ));
        assert!(matches!(read_curve_csv("a,b,c\nx,1,2\n".as_bytes()), Err(Error::Csv(_))));
    }
}
