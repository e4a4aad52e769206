// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Point;

/// Reasons why input geometry can't be used for collision checks.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("ring has {0} distinct vertices, at least 3 are required")]
    TooFewVertices(usize),

    #[error("ring is not closed (first and last positions differ)")]
    UnclosedRing,

    #[error("non-finite coordinate")]
    NonFiniteCoordinate,

    #[error("polygon has no rings")]
    EmptyPolygon,

    #[error("invalid bounds: min_x={min_x} max_x={max_x} min_y={min_y} max_y={max_y}")]
    InvalidBounds {
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    },
}

/// Axis-aligned rectangle, closed on all sides.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Creates new bounds, ensuring all values are finite and that `min <= max`
    /// on both axes.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self, GeometryError> {
        let b = Self {
            min_x,
            max_x,
            min_y,
            max_y,
        };
        if b.is_valid() {
            Ok(b)
        } else {
            Err(GeometryError::InvalidBounds {
                min_x,
                max_x,
                min_y,
                max_y,
            })
        }
    }

    /// Creates bounds from a bounding box in the `[left, bottom, right, top]` order.
    pub fn from_bbox(bbox: [f64; 4]) -> Result<Self, GeometryError> {
        Self::new(bbox[0], bbox[2], bbox[1], bbox[3])
    }

    /// Smallest bounds containing all of the provided points, grown by `margin`
    /// on every side. Returns None if there are no points.
    pub fn around<I: IntoIterator<Item = Point>>(points: I, margin: f64) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let b = it.fold(Self::at(first), Self::extend);
        Some(Self {
            min_x: b.min_x - margin,
            max_x: b.max_x + margin,
            min_y: b.min_y - margin,
            max_y: b.max_y + margin,
        })
    }

    /// Grows the bounds to also contain all of the provided points.
    pub fn including<I: IntoIterator<Item = Point>>(self, points: I) -> Self {
        points.into_iter().fold(self, Self::extend)
    }

    /// Degenerate bounds containing a single point.
    #[inline]
    fn at(p: Point) -> Self {
        Self {
            min_x: p.x,
            max_x: p.x,
            min_y: p.y,
            max_y: p.y,
        }
    }

    #[inline]
    fn extend(self, p: Point) -> Self {
        Self {
            min_x: self.min_x.min(p.x),
            max_x: self.max_x.max(p.x),
            min_y: self.min_y.min(p.y),
            max_y: self.max_y.max(p.y),
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

/// Closed sequence of at least 3 vertices. The closing position
/// (equal to the first one) is not stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring(Vec<Point>);

impl Ring {
    /// Creates a ring from a closed sequence of positions, as used by
    /// [GeoJSON](https://datatracker.ietf.org/doc/html/rfc7946#section-3.1.6):
    /// the last position must be equal to the first one.
    ///
    /// Consecutive duplicate positions are collapsed.
    pub fn new(mut positions: Vec<Point>) -> Result<Self, GeometryError> {
        if positions.iter().any(|p| !p.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate);
        }

        match (positions.first(), positions.last()) {
            (Some(first), Some(last)) if first == last => {}
            (None, None) => return Err(GeometryError::TooFewVertices(0)),
            _ => return Err(GeometryError::UnclosedRing),
        }

        positions.pop();
        positions.dedup();
        if positions.len() > 1 && positions.first() == positions.last() {
            positions.pop();
        }

        if positions.len() < 3 {
            Err(GeometryError::TooFewVertices(positions.len()))
        } else {
            Ok(Self(positions))
        }
    }

    /// Vertices of the ring, without the closing position.
    pub fn vertices(&self) -> &[Point] {
        &self.0
    }

    /// Iterates over all edges of the ring, including the closing one.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let last = self.0[self.0.len() - 1];
        std::iter::once(last)
            .chain(self.0.iter().copied())
            .zip(self.0.iter().copied())
    }

    pub fn bounds(&self) -> Bounds {
        self.0[1..].iter().copied().fold(Bounds::at(self.0[0]), Bounds::extend)
    }
}

/// Polygon with an exterior ring and zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    rings: Vec<Ring>,
}

impl Polygon {
    /// Creates a polygon from its rings. The first ring is the exterior boundary,
    /// any subsequent rings are holes.
    pub fn new(rings: Vec<Ring>) -> Result<Self, GeometryError> {
        if rings.is_empty() {
            Err(GeometryError::EmptyPolygon)
        } else {
            Ok(Self { rings })
        }
    }

    pub fn exterior(&self) -> &Ring {
        &self.rings[0]
    }

    pub fn holes(&self) -> &[Ring] {
        &self.rings[1..]
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Bounding box of the exterior ring.
    pub fn bounds(&self) -> Bounds {
        self.exterior().bounds()
    }
}

/// Checks whether a point lies inside a ring, using the even-odd
/// [ray casting](https://en.wikipedia.org/wiki/Point_in_polygon#Ray_casting_algorithm) rule.
///
/// Points exactly on the boundary may be classified either way.
pub fn point_in_ring(p: Point, ring: &Ring) -> bool {
    let mut inside = false;
    for (a, b) in ring.edges() {
        // Only edges straddling the horizontal line through p are considered,
        // which also guarantees that a.y != b.y in the division below.
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

/// Checks whether a point lies inside the polygon's exterior ring and outside all of its holes.
pub fn point_in_polygon(p: Point, polygon: &Polygon) -> bool {
    point_in_ring(p, polygon.exterior()) && !polygon.holes().iter().any(|h| point_in_ring(p, h))
}

/// Twice the signed area of the `a, b, c` triangle: positive for counter-clockwise turns,
/// negative for clockwise turns and zero for collinear points.
#[inline]
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Checks if `p`, known to be collinear with `a` and `b`, lies on the `a-b` segment.
#[inline]
fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Checks whether segments `a1-a2` and `b1-b2` have at least one common point.
/// Touching and collinear-overlapping segments are considered intersecting.
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

/// Checks whether the `p1-p2` segment intersects any edge of any ring of the polygon.
///
/// Segments lying entirely inside (or entirely outside) the polygon are not intersecting.
pub fn segment_intersects_polygon(p1: Point, p2: Point, polygon: &Polygon) -> bool {
    polygon
        .rings()
        .iter()
        .flat_map(|r| r.edges())
        .any(|(a, b)| segments_intersect(p1, p2, a, b))
}
