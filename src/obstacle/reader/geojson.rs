// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::geometry::{Bounds, Polygon, Ring};
use crate::{Obstacle, ObstacleSet, Point, Shape};

use super::{Error, Options, Report};

/// [GeoJSON position](https://datatracker.ietf.org/doc/html/rfc7946#section-3.1.1),
/// possibly with an altitude (which is ignored).
type Position = Vec<f64>;

/// Top-level document accepted by the reader.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum Document {
    Annotations(AnnotationExport),
    GeoJson(GeoJson),
}

/// Export of the annotation tool: endpoints and a list of typed constraints.
#[derive(Debug, Deserialize)]
pub(super) struct AnnotationExport {
    #[serde(rename = "startPoint")]
    start_point: Option<LatLng>,
    #[serde(rename = "endPoint")]
    end_point: Option<LatLng>,
    constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(super) struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<LatLng> for Point {
    fn from(ll: LatLng) -> Self {
        Point::new(ll.lng, ll.lat)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct Constraint {
    #[serde(rename = "type")]
    type_: Option<String>,
    weight: Option<f64>,
    geojson: Feature,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(super) enum GeoJson {
    FeatureCollection { features: Vec<Feature> },
    Feature(Feature),
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct Properties {
    #[serde(rename = "type")]
    type_: Option<String>,
    weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Feature {
    #[serde(default)]
    properties: Option<Properties>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(super) enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Helper object used for converting a parsed [Document] into [Obstacles](Obstacle).
pub(super) struct ObstacleBuilder<'a> {
    obstacles: &'a mut ObstacleSet,
    options: &'a Options<'a>,
    bbox: Option<Bounds>,
    report: Report,
}

impl<'a> ObstacleBuilder<'a> {
    pub(super) fn new(obstacles: &'a mut ObstacleSet, options: &'a Options<'a>) -> Self {
        let bbox = if options.bbox.iter().all(|&x| x == 0.0) {
            None
        } else {
            match Bounds::from_bbox(options.bbox) {
                Ok(b) => Some(b),
                Err(e) => {
                    log::warn!("ignoring bounding box filter: {}", e);
                    None
                }
            }
        };

        Self {
            obstacles,
            options,
            bbox,
            report: Report::default(),
        }
    }

    pub(super) fn add_document(mut self, doc: Document) -> Result<Report, Error> {
        match doc {
            Document::Annotations(export) => {
                self.report.start = export.start_point.map(Point::from);
                self.report.end = export.end_point.map(Point::from);
                for (index, c) in export.constraints.into_iter().enumerate() {
                    let props = c.geojson.properties.unwrap_or_default();
                    let type_ = c.type_.or(props.type_);
                    let weight = c.weight.or(props.weight);
                    self.add_geometry(index, type_.as_deref(), weight, c.geojson.geometry)?;
                }
            }

            Document::GeoJson(GeoJson::FeatureCollection { features }) => {
                for (index, f) in features.into_iter().enumerate() {
                    self.add_feature(index, f)?;
                }
            }

            Document::GeoJson(GeoJson::Feature(f)) => self.add_feature(0, f)?,

            Document::GeoJson(GeoJson::Polygon { coordinates }) => {
                self.add_geometry(0, None, None, Some(Geometry::Polygon { coordinates }))?
            }

            Document::GeoJson(GeoJson::MultiPolygon { coordinates }) => {
                self.add_geometry(0, None, None, Some(Geometry::MultiPolygon { coordinates }))?
            }
        }

        log::info!(
            "loaded {} obstacles ({} constraints skipped) with profile {}",
            self.report.added,
            self.report.skipped,
            self.options.profile.name,
        );
        Ok(self.report)
    }

    fn add_feature(&mut self, index: usize, f: Feature) -> Result<(), Error> {
        let props = f.properties.unwrap_or_default();
        self.add_geometry(index, props.type_.as_deref(), props.weight, f.geometry)
    }

    fn add_geometry(
        &mut self,
        index: usize,
        type_: Option<&str>,
        weight: Option<f64>,
        geometry: Option<Geometry>,
    ) -> Result<(), Error> {
        let shape = match geometry {
            Some(Geometry::Polygon { coordinates }) => {
                Shape::Polygon(Self::to_polygon(index, coordinates)?)
            }

            Some(Geometry::MultiPolygon { coordinates }) => Shape::MultiPolygon(
                coordinates
                    .into_iter()
                    .map(|p| Self::to_polygon(index, p))
                    .collect::<Result<Vec<_>, _>>()?,
            ),

            Some(Geometry::Unsupported) | None => {
                log::warn!(
                    "constraint {} ({:?}): only Polygon and MultiPolygon geometries are supported - skipping",
                    index,
                    type_.unwrap_or(""),
                );
                self.report.skipped += 1;
                return Ok(());
            }
        };

        let obstacle = Obstacle::new(self.options.profile.kind_of(type_, weight), shape);

        if let Some(bbox) = self.bbox {
            if !obstacle.bounds().is_some_and(|b| b.intersects(&bbox)) {
                log::debug!("constraint {}: outside of the bounding box - skipping", index);
                self.report.skipped += 1;
                return Ok(());
            }
        }

        self.obstacles.push(obstacle);
        self.report.added += 1;
        Ok(())
    }

    fn to_polygon(index: usize, rings: Vec<Vec<Position>>) -> Result<Polygon, Error> {
        let rings = rings
            .into_iter()
            .map(|positions| {
                let points = positions
                    .into_iter()
                    .map(|pos| match pos.as_slice() {
                        [x, y, ..] => Ok(Point::new(*x, *y)),
                        _ => Err(Error::ShortPosition {
                            index,
                            len: pos.len(),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ring::new(points).map_err(|source| Error::Geometry { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Polygon::new(rings).map_err(|source| Error::Geometry { index, source })
    }
}
