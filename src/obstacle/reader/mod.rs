// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading [Obstacles](crate::Obstacle) from annotated [GeoJSON](https://geojson.org/) constraints.

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::geometry::GeometryError;
use crate::{ObstacleSet, Point, Profile};

mod geojson;

use geojson::ObstacleBuilder;

/// Format of the input constraints file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    Unknown,

    /// Force uncompressed GeoJSON
    Json,

    /// Force GeoJSON with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    JsonGz,

    /// Force GeoJSON with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    JsonBz2,
}

impl FileFormat {
    /// Guesses the format based on the first few bytes of the content.
    /// Anything not compressed is assumed to be plain JSON.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&[0x1f, 0x8b]) {
            FileFormat::JsonGz
        } else if head.starts_with(b"BZh") {
            FileFormat::JsonBz2
        } else {
            FileFormat::Json
        }
    }
}

/// Additional controls for interpreting constraints as [Obstacles](crate::Obstacle).
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    /// How constraint types and weights should be converted into obstacles.
    pub profile: &'a Profile<'a>,

    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter obstacles by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite. The box should cover the start and end points of
    /// planned routes, as obstacles around them may lie outside of the sampling area.
    pub bbox: [f64; 4],
}

/// Error which can occur when loading constraints.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("constraint {index}: {source}")]
    Geometry {
        index: usize,
        #[source]
        source: GeometryError,
    },

    #[error("constraint {index}: position must have at least 2 coordinates, got {len}")]
    ShortPosition { index: usize, len: usize },
}

/// Summary of loaded constraints.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Report {
    /// Number of obstacles added to the [ObstacleSet].
    pub added: usize,

    /// Number of constraints which did not produce an obstacle,
    /// either due to their geometry type or due to the bounding box filter.
    pub skipped: usize,

    /// Start point, if present in an annotation export.
    pub start: Option<Point>,

    /// End point, if present in an annotation export.
    pub end: Option<Point>,
}

/// Parse constraints from a reader into an [ObstacleSet] as per the provided [Options].
///
/// Accepted documents are GeoJSON FeatureCollections, single Features, bare Polygon
/// and MultiPolygon geometries, and annotation exports of the form
/// `{"startPoint": {"lat", "lng"}, "endPoint": {...}, "constraints": [{"type", "weight", "geojson"}]}`.
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn add_obstacles_from_io<R: io::Read>(
    obstacles: &mut ObstacleSet,
    options: &Options<'_>,
    reader: R,
) -> Result<Report, Error> {
    let mut b = io::BufReader::new(reader);
    let format = match options.file_format {
        FileFormat::Unknown => {
            let detected = FileFormat::detect(b.fill_buf()?);
            log::debug!("detected constraints file format: {:?}", detected);
            detected
        }
        f => f,
    };

    match format {
        FileFormat::Unknown | FileFormat::Json => {
            ObstacleBuilder::new(obstacles, options).add_document(serde_json::from_reader(b)?)
        }

        FileFormat::JsonGz => {
            let d = flate2::bufread::MultiGzDecoder::new(b);
            let b = io::BufReader::new(d);
            ObstacleBuilder::new(obstacles, options).add_document(serde_json::from_reader(b)?)
        }

        FileFormat::JsonBz2 => {
            let d = bzip2::bufread::MultiBzDecoder::new(b);
            let b = io::BufReader::new(d);
            ObstacleBuilder::new(obstacles, options).add_document(serde_json::from_reader(b)?)
        }
    }
}

/// Parse constraints from a file at the provided path into an [ObstacleSet] as per the provided [Options].
pub fn add_obstacles_from_file<P: AsRef<Path>>(
    obstacles: &mut ObstacleSet,
    options: &Options<'_>,
    path: P,
) -> Result<Report, Error> {
    let f = File::open(path)?;
    add_obstacles_from_io(obstacles, options, f)
}

/// Parse constraints from a static buffer into an [ObstacleSet] as per the provided [Options].
pub fn add_obstacles_from_buffer(
    obstacles: &mut ObstacleSet,
    options: &Options<'_>,
    data: &[u8],
) -> Result<Report, Error> {
    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        f => f,
    };

    if format == FileFormat::Json {
        // Fast path is available for in-memory JSON data
        ObstacleBuilder::new(obstacles, options).add_document(serde_json::from_slice(data)?)
    } else {
        // Wrap the buffer in a cursor and use the IO path
        let options = Options {
            file_format: format,
            ..*options
        };
        add_obstacles_from_io(obstacles, &options, io::Cursor::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObstacleKind, DEFAULT_PROFILE};

    const CONSTRAINTS: &[u8] = include_bytes!("test_fixtures/constraints.geojson");
    const CONSTRAINTS_GZ: &[u8] = include_bytes!("test_fixtures/constraints.geojson.gz");
    const CONSTRAINTS_BZ2: &[u8] = include_bytes!("test_fixtures/constraints.geojson.bz2");
    const ANNOTATIONS: &[u8] = include_bytes!("test_fixtures/annotations.json");

    fn load(data: &[u8], file_format: FileFormat, bbox: [f64; 4]) -> (ObstacleSet, Report) {
        let mut obstacles = ObstacleSet::default();
        let options = Options {
            profile: &DEFAULT_PROFILE,
            file_format,
            bbox,
        };
        let report = add_obstacles_from_buffer(&mut obstacles, &options, data).unwrap();
        (obstacles, report)
    }

    fn check_constraints(obstacles: &ObstacleSet, report: &Report) {
        // ocean (hard), protected area with a hole (soft), two-part city (soft),
        // far-away lake (soft); the railway line and the station point are skipped
        assert_eq!(report.added, 4);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.start, None);
        assert_eq!(report.end, None);
        assert_eq!(obstacles.len(), 4);

        let kinds: Vec<_> = obstacles.iter().map(|o| o.kind()).collect();
        assert_eq!(
            kinds,
            [
                ObstacleKind::HardBarrier,
                ObstacleKind::SoftRegion { weight: -5.0 },
                ObstacleKind::SoftRegion { weight: 2.0 },
                ObstacleKind::SoftRegion { weight: 0.0 },
            ]
        );

        // Ocean is impassable
        assert!(obstacles.is_point_blocked(Point::new(152.5, -33.5)));
        assert!(!obstacles.is_point_blocked(Point::new(150.5, -33.5)));

        // Hole of the protected area is not penalized
        let in_hole = obstacles.segment_cost(Point::new(150.45, -33.55), Point::new(150.55, -33.55));
        assert!((in_hole - 0.1).abs() < 1e-9);
        let in_area = obstacles.segment_cost(Point::new(150.15, -33.85), Point::new(150.25, -33.85));
        assert!((in_area - 0.6).abs() < 1e-9);
    }

    #[test]
    fn detect_format() {
        assert_eq!(FileFormat::detect(CONSTRAINTS), FileFormat::Json);
        assert_eq!(FileFormat::detect(CONSTRAINTS_GZ), FileFormat::JsonGz);
        assert_eq!(FileFormat::detect(CONSTRAINTS_BZ2), FileFormat::JsonBz2);
        assert_eq!(FileFormat::detect(b""), FileFormat::Json);
    }

    #[test]
    fn load_json() {
        let (obstacles, report) = load(CONSTRAINTS, FileFormat::Json, [0.0; 4]);
        check_constraints(&obstacles, &report);
    }

    #[test]
    fn load_gz() {
        let (obstacles, report) = load(CONSTRAINTS_GZ, FileFormat::JsonGz, [0.0; 4]);
        check_constraints(&obstacles, &report);
    }

    #[test]
    fn load_bz2() {
        let (obstacles, report) = load(CONSTRAINTS_BZ2, FileFormat::JsonBz2, [0.0; 4]);
        check_constraints(&obstacles, &report);
    }

    #[test]
    fn load_unknown_through_io() {
        for data in [CONSTRAINTS, CONSTRAINTS_GZ, CONSTRAINTS_BZ2] {
            let mut obstacles = ObstacleSet::default();
            let options = Options {
                profile: &DEFAULT_PROFILE,
                file_format: FileFormat::Unknown,
                bbox: [0.0; 4],
            };
            let report = add_obstacles_from_io(&mut obstacles, &options, data).unwrap();
            check_constraints(&obstacles, &report);
        }
    }

    #[test]
    fn bbox_filter() {
        // Excludes the lake at (140, -30)
        let (obstacles, report) = load(CONSTRAINTS, FileFormat::Json, [149.0, -35.0, 154.0, -32.0]);
        assert_eq!(report.added, 3);
        assert_eq!(report.skipped, 3);
        assert_eq!(obstacles.len(), 3);
    }

    #[test]
    fn invalid_bbox_is_ignored() {
        let (obstacles, _) = load(CONSTRAINTS, FileFormat::Json, [f64::NAN, 0.0, 1.0, 1.0]);
        assert_eq!(obstacles.len(), 4);
    }

    #[test]
    fn load_annotations() {
        let (obstacles, report) = load(ANNOTATIONS, FileFormat::Unknown, [0.0; 4]);
        assert_eq!(report.added, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.start, Some(Point::new(151.2069, -33.8832)));
        assert_eq!(report.end, Some(Point::new(151.754, -32.9254)));

        let kinds: Vec<_> = obstacles.iter().map(|o| o.kind()).collect();
        assert_eq!(
            kinds,
            [
                ObstacleKind::HardBarrier,
                ObstacleKind::SoftRegion { weight: -3.0 },
            ]
        );
    }

    #[test]
    fn bare_geometry() {
        let data = br#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}"#;
        let (obstacles, report) = load(data, FileFormat::Json, [0.0; 4]);
        assert_eq!(report.added, 1);
        assert_eq!(
            obstacles.iter().next().unwrap().kind(),
            ObstacleKind::SoftRegion { weight: 0.0 }
        );
    }

    #[test]
    fn positions_with_altitude() {
        let data = br#"{"type": "Feature", "properties": {"type": "ocean_absolute_repulsor"},
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0, 5], [1, 0, 5], [1, 1, 5], [0, 0, 5]]]}}"#;
        let (obstacles, _) = load(data, FileFormat::Json, [0.0; 4]);
        assert!(obstacles.is_point_blocked(Point::new(0.7, 0.2)));
    }

    #[test]
    fn degenerate_ring() {
        let data = br#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1]]]}}
        ]}"#;
        let mut obstacles = ObstacleSet::default();
        let options = Options {
            profile: &DEFAULT_PROFILE,
            file_format: FileFormat::Json,
            bbox: [0.0; 4],
        };
        let err = add_obstacles_from_buffer(&mut obstacles, &options, data).unwrap_err();
        assert!(matches!(
            err,
            Error::Geometry {
                index: 1,
                source: GeometryError::UnclosedRing
            }
        ));
    }

    #[test]
    fn short_position() {
        let data = br#"{"type": "Polygon", "coordinates": [[[0, 0], [1], [1, 1], [0, 0]]]}"#;
        let mut obstacles = ObstacleSet::default();
        let options = Options {
            profile: &DEFAULT_PROFILE,
            file_format: FileFormat::Json,
            bbox: [0.0; 4],
        };
        let err = add_obstacles_from_buffer(&mut obstacles, &options, data).unwrap_err();
        assert!(matches!(err, Error::ShortPosition { index: 0, len: 1 }));
    }

    #[test]
    fn invalid_json() {
        let mut obstacles = ObstacleSet::default();
        let options = Options {
            profile: &DEFAULT_PROFILE,
            file_format: FileFormat::Json,
            bbox: [0.0; 4],
        };
        let err = add_obstacles_from_buffer(&mut obstacles, &options, b"{\"type\": ").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
