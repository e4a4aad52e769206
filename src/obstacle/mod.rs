// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod profile;
pub mod reader;

pub use profile::{Profile, DEFAULT_PROFILE};

use crate::geometry::{point_in_polygon, segment_intersects_polygon, Bounds, Polygon};
use crate::{euclidean_distance, Point};

/// How an [Obstacle] affects routes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleKind {
    /// Region which can't be entered or crossed at all.
    HardBarrier,

    /// Region which may be crossed, but every segment touching it costs
    /// `|weight|` times its length on top of its length.
    SoftRegion { weight: f64 },
}

/// Geometry of an [Obstacle].
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Shape {
    /// Returns all polygons making up this shape.
    pub fn parts(&self) -> &[Polygon] {
        match self {
            Self::Polygon(p) => std::slice::from_ref(p),
            Self::MultiPolygon(ps) => ps.as_slice(),
        }
    }
}

/// Region affecting routes: either a [hard barrier](ObstacleKind::HardBarrier)
/// or a weighted [soft region](ObstacleKind::SoftRegion).
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    kind: ObstacleKind,
    shape: Shape,

    /// Bounding box of all parts, used to skip exact checks. None for empty multi-polygons.
    bounds: Option<Bounds>,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, shape: Shape) -> Self {
        let bounds = shape
            .parts()
            .iter()
            .map(|p| p.bounds())
            .reduce(|a, b| Bounds {
                min_x: a.min_x.min(b.min_x),
                max_x: a.max_x.max(b.max_x),
                min_y: a.min_y.min(b.min_y),
                max_y: a.max_y.max(b.max_y),
            });
        Self {
            kind,
            shape,
            bounds,
        }
    }

    pub fn hard_barrier(shape: Shape) -> Self {
        Self::new(ObstacleKind::HardBarrier, shape)
    }

    pub fn soft_region(shape: Shape, weight: f64) -> Self {
        Self::new(ObstacleKind::SoftRegion { weight }, shape)
    }

    pub fn kind(&self) -> ObstacleKind {
        self.kind
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    #[inline]
    fn is_hard_barrier(&self) -> bool {
        self.kind == ObstacleKind::HardBarrier
    }

    #[inline]
    fn may_touch_segment(&self, p1: Point, p2: Point) -> bool {
        match self.bounds {
            Some(b) => b.intersects(&Bounds {
                min_x: p1.x.min(p2.x),
                max_x: p1.x.max(p2.x),
                min_y: p1.y.min(p2.y),
                max_y: p1.y.max(p2.y),
            }),
            None => false,
        }
    }

    /// Returns true if this is a hard barrier containing the point.
    /// Soft regions never block points.
    pub fn blocks_point(&self, p: Point) -> bool {
        self.is_hard_barrier()
            && self.bounds.is_some_and(|b| b.contains(p))
            && self.shape.parts().iter().any(|poly| point_in_polygon(p, poly))
    }

    /// Returns true if this is a hard barrier whose boundary is crossed (or touched)
    /// by the `p1-p2` segment. Soft regions never block segments.
    pub fn blocks_segment(&self, p1: Point, p2: Point) -> bool {
        self.is_hard_barrier()
            && self.may_touch_segment(p1, p2)
            && self
                .shape
                .parts()
                .iter()
                .any(|poly| segment_intersects_polygon(p1, p2, poly))
    }

    /// Returns the extra cost of traversing the `p1-p2` segment, on top of its length.
    ///
    /// Hard barriers have no penalty, as segments crossing them are rejected outright.
    /// For soft regions the penalty is `|weight| * length`, charged once per obstacle
    /// if the segment crosses or touches any of its ring edges. Segments lying
    /// entirely inside a soft region carry no penalty.
    pub fn segment_penalty(&self, p1: Point, p2: Point) -> f64 {
        match self.kind {
            ObstacleKind::HardBarrier => 0.0,
            ObstacleKind::SoftRegion { weight } => {
                let touches = self.may_touch_segment(p1, p2)
                    && self
                        .shape
                        .parts()
                        .iter()
                        .any(|poly| segment_intersects_polygon(p1, p2, poly));
                if touches {
                    weight.abs() * euclidean_distance(p1, p2)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Ordered collection of [Obstacles](Obstacle) with predicates over all of them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ObstacleSet(Vec<Obstacle>);

impl ObstacleSet {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self(obstacles)
    }

    /// Returns the number of obstacles in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.0.iter()
    }

    pub fn push(&mut self, obstacle: Obstacle) {
        self.0.push(obstacle);
    }

    /// Removes all obstacles whose bounding box misses the provided bounds,
    /// returning the number of removed obstacles.
    ///
    /// This never changes the result of any predicate evaluated within `bounds`,
    /// it only makes them cheaper. A planner may step outside of its sampling area
    /// when steering towards its goal, so `bounds` must also cover the start
    /// and goal points (see [Bounds::including]).
    pub fn retain_intersecting(&mut self, bounds: &Bounds) -> usize {
        let before = self.0.len();
        self.0
            .retain(|o| o.bounds.is_some_and(|b| b.intersects(bounds)));
        before - self.0.len()
    }

    /// Returns true if any hard barrier contains the point.
    pub fn is_point_blocked(&self, p: Point) -> bool {
        self.0.iter().any(|o| o.blocks_point(p))
    }

    /// Returns true if any hard barrier blocks the `p1-p2` segment.
    pub fn is_segment_blocked(&self, p1: Point, p2: Point) -> bool {
        self.0.iter().any(|o| o.blocks_segment(p1, p2))
    }

    /// Returns the cost of traversing the `p1-p2` segment: its length plus
    /// the penalties of all soft regions it touches.
    pub fn segment_cost(&self, p1: Point, p2: Point) -> f64 {
        euclidean_distance(p1, p2)
            + self
                .0
                .iter()
                .map(|o| o.segment_penalty(p1, p2))
                .sum::<f64>()
    }
}

impl FromIterator<Obstacle> for ObstacleSet {
    fn from_iter<I: IntoIterator<Item = Obstacle>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Obstacle> for ObstacleSet {
    fn extend<I: IntoIterator<Item = Obstacle>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}
