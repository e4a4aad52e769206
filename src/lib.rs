// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Incremental [RRT*](https://en.wikipedia.org/wiki/Rapidly-exploring_random_tree)
//! route planning around weighted map constraints.
//!
//! Constraints are polygons (with holes) drawn over a map. [Hard barriers](ObstacleKind::HardBarrier)
//! may never be crossed, while [soft regions](ObstacleKind::SoftRegion) may be crossed at
//! a cost penalty proportional to their weight. The [Planner] grows a tree of collision-free
//! positions one [step](Planner::step) at a time, so that a host can interleave planning
//! with other work (like redrawing a map) and stop whenever it wants.
//!
//! All planning happens in planar longitude/latitude degrees. This is intentionally
//! not geodesic-correct; [earth_distance] is only used to report route lengths.
//!
//! # Example
//!
//! ```no_run
//! use rand::SeedableRng;
//!
//! let mut obstacles = corridor::ObstacleSet::default();
//! let reader_options = corridor::reader::Options {
//!     profile: &corridor::DEFAULT_PROFILE,
//!     file_format: corridor::reader::FileFormat::Unknown,
//!     bbox: [0.0; 4],
//! };
//! corridor::reader::add_obstacles_from_file(
//!     &mut obstacles,
//!     &reader_options,
//!     "path/to/constraints.geojson",
//! ).expect("failed to load constraints");
//!
//! let mut planner = corridor::Planner::new(
//!     corridor::Point::new(151.20, -33.87),
//!     corridor::Point::new(151.78, -32.93),
//!     obstacles,
//!     corridor::Bounds::new(150.5, 152.5, -34.5, -32.0).unwrap(),
//!     corridor::PlannerOptions::default(),
//!     rand::rngs::StdRng::seed_from_u64(42),
//! ).expect("invalid planner configuration");
//!
//! while planner.state() == corridor::PlannerState::Active {
//!     if let corridor::StepResult::PathFound(path) = planner.step() {
//!         println!("Route: {:?}", path);
//!     }
//! }
//! ```

pub mod c;
mod distance;
mod geometry;
mod obstacle;
mod planner;
mod tree;

pub use distance::{earth_distance, euclidean_distance, path_length_km};
pub use geometry::{
    point_in_polygon, point_in_ring, segment_intersects_polygon, segments_intersect, Bounds,
    GeometryError, Polygon, Ring,
};
pub use obstacle::{
    reader, Obstacle, ObstacleKind, ObstacleSet, Profile, Shape, DEFAULT_PROFILE,
};
pub use planner::{
    find_route, ConfigurationError, Planner, PlannerOptions, PlannerState, RewireMode, Route,
    StepResult, DEFAULT_BATCH_SIZE,
};
pub use tree::PlanningTree;

/// Identifier of a vertex in a [PlanningTree]. Identifiers are assigned sequentially
/// from 0 (the root) and are never reused or renumbered.
pub type VertexId = usize;

/// Sequence of positions, ordered from the start point.
pub type Path = Vec<Point>;

/// Position in planar coordinate-degree space.
///
/// `x` is the longitude and `y` is the latitude, following the
/// [GeoJSON](https://datatracker.ietf.org/doc/html/rfc7946#section-3.1.1) axis order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true if both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
