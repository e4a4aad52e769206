// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::*;

use std::borrow::Cow;
use std::ffi::{c_char, CStr, OsStr};
use std::mem::forget;
use std::os::unix::ffi::OsStrExt;
use std::ptr::null_mut;
use std::slice;

use rand::rngs::StdRng;
use rand::SeedableRng;

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_obstacles_new() -> *mut ObstacleSet {
    Box::into_raw(Box::<ObstacleSet>::default())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_obstacles_delete(ptr: *mut ObstacleSet) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_obstacles_len(obstacles: *const ObstacleSet) -> usize {
    obstacles.as_ref().map(|o| o.len()).unwrap_or(0)
}

#[derive(Copy, Clone)]
#[repr(C)]
pub enum CObstacleKind {
    HardBarrier = 0,
    SoftRegion = 1,
}

/// Closed ring of points: the last point must be equal to the first one.
#[repr(C)]
pub struct CRing {
    pub points: *const Point,
    pub len: usize,
}

/// Adds a single polygon obstacle. The first ring is the exterior boundary,
/// the following ones are holes. Returns false if the geometry is degenerate.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_obstacles_add_polygon(
    obstacles: *mut ObstacleSet,
    kind: CObstacleKind,
    weight: f64,
    rings: *const CRing,
    rings_len: usize,
) -> bool {
    let Some(obstacles) = obstacles.as_mut() else {
        return false;
    };
    if rings.is_null() {
        return false;
    }

    let polygon = slice::from_raw_parts(rings, rings_len)
        .iter()
        .map(|r| {
            let points = if r.points.is_null() {
                Vec::new()
            } else {
                slice::from_raw_parts(r.points, r.len).to_vec()
            };
            Ring::new(points)
        })
        .collect::<Result<Vec<_>, _>>()
        .and_then(Polygon::new);

    match polygon {
        Ok(polygon) => {
            let kind = match kind {
                CObstacleKind::HardBarrier => ObstacleKind::HardBarrier,
                CObstacleKind::SoftRegion => ObstacleKind::SoftRegion { weight },
            };
            obstacles.push(Obstacle::new(kind, Shape::Polygon(polygon)));
            true
        }

        Err(e) => {
            log::warn!("corridor_obstacles_add_polygon: {}", e);
            false
        }
    }
}

#[repr(C)]
pub struct CProfile {
    name: *const c_char,

    hard_barriers: *const *const c_char,
    hard_barriers_len: usize,

    default_weight: f64,
}

impl CProfile {
    /// Builds a buffer containing all strings referenced by this Profile.
    ///
    /// The layout of the buffer is as follows:
    /// - 0: name
    /// - 1..=hard_barriers_len: hard barrier constraint types
    unsafe fn build_string_table(&self) -> Vec<Cow<'_, str>> {
        let hard_barriers: &[*const c_char] = if self.hard_barriers.is_null() {
            &[]
        } else {
            slice::from_raw_parts(self.hard_barriers, self.hard_barriers_len)
        };

        let mut table = Vec::with_capacity(hard_barriers.len() + 1);
        table.push(c_str_or_empty(self.name));
        table.extend(hard_barriers.iter().map(|&type_cstr_ptr| c_str_or_empty(type_cstr_ptr)));
        table
    }

    fn hard_barriers_as_rust<'a>(&self, string_table: &'a [Cow<'_, str>]) -> Vec<&'a str> {
        string_table[1..].iter().map(|s| s.as_ref()).collect()
    }

    fn as_rust<'a>(&self, name: &'a str, hard_barriers: &'a [&'a str]) -> Profile<'a> {
        Profile {
            name,
            hard_barriers,
            default_weight: self.default_weight,
        }
    }
}

/// Converts a C string to Rust, treating NULL as an empty string.
unsafe fn c_str_or_empty<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::Borrowed("")
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

#[derive(Copy, Clone)]
#[repr(C)]
pub enum CFileFormat {
    Unknown = 0,
    Json = 1,
    JsonGz = 2,
    JsonBz2 = 3,
}

impl From<CFileFormat> for reader::FileFormat {
    fn from(value: CFileFormat) -> Self {
        match value {
            CFileFormat::Unknown => reader::FileFormat::Unknown,
            CFileFormat::Json => reader::FileFormat::Json,
            CFileFormat::JsonGz => reader::FileFormat::JsonGz,
            CFileFormat::JsonBz2 => reader::FileFormat::JsonBz2,
        }
    }
}

/// Options for loading constraints. A NULL `profile` selects the default profile.
#[repr(C)]
pub struct CReaderOptions {
    pub profile: *const CProfile,
    pub format: CFileFormat,
    pub bbox: [f64; 4],
}

/// Converts [CReaderOptions] into [reader::Options] and calls `f` with them.
unsafe fn with_reader_options<T>(
    c_options: &CReaderOptions,
    f: impl FnOnce(&reader::Options<'_>) -> T,
) -> T {
    match c_options.profile.as_ref() {
        Some(c_profile) => {
            let profile_strings = c_profile.build_string_table();
            let profile_hard_barriers = c_profile.hard_barriers_as_rust(&profile_strings);
            let profile = c_profile.as_rust(&profile_strings[0], &profile_hard_barriers);
            f(&reader::Options {
                profile: &profile,
                file_format: c_options.format.into(),
                bbox: c_options.bbox,
            })
        }

        None => f(&reader::Options {
            profile: &DEFAULT_PROFILE,
            file_format: c_options.format.into(),
            bbox: c_options.bbox,
        }),
    }
}

/// Loads constraints from a GeoJSON file. Returns false (and logs the reason)
/// if the file couldn't be loaded; obstacles added before the failure are kept.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_obstacles_add_from_file(
    obstacles: *mut ObstacleSet,
    c_options: *const CReaderOptions,
    c_filename: *const c_char,
) -> bool {
    let (Some(obstacles), Some(c_options)) = (obstacles.as_mut(), c_options.as_ref()) else {
        return false;
    };
    if c_filename.is_null() {
        return false;
    }

    let filename = OsStr::from_bytes(CStr::from_ptr(c_filename).to_bytes());
    let result = with_reader_options(c_options, |options| {
        reader::add_obstacles_from_file(obstacles, options, filename)
    });

    match result {
        Ok(_) => true,
        Err(e) => {
            log::error!("{}: {}", filename.to_string_lossy(), e);
            false
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_obstacles_add_from_memory(
    obstacles: *mut ObstacleSet,
    c_options: *const CReaderOptions,
    content: *const u8,
    content_len: usize,
) -> bool {
    let (Some(obstacles), Some(c_options)) = (obstacles.as_mut(), c_options.as_ref()) else {
        return false;
    };
    if content.is_null() {
        return false;
    }

    let content = slice::from_raw_parts(content, content_len);
    let result = with_reader_options(c_options, |options| {
        reader::add_obstacles_from_buffer(obstacles, options, content)
    });

    match result {
        Ok(_) => true,
        Err(e) => {
            log::error!("constraints from memory: {}", e);
            false
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_options_default() -> PlannerOptions {
    PlannerOptions::default()
}

/// Creates a new planner over a copy of the provided obstacles.
/// Returns NULL (and logs the reason) if the configuration is invalid.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_new(
    start: Point,
    goal: Point,
    obstacles: *const ObstacleSet,
    bounds: Bounds,
    options: PlannerOptions,
    seed: u64,
) -> *mut Planner {
    let obstacles = obstacles.as_ref().cloned().unwrap_or_default();
    match Planner::new(
        start,
        goal,
        obstacles,
        bounds,
        options,
        StdRng::seed_from_u64(seed),
    ) {
        Ok(planner) => Box::into_raw(Box::new(planner)),
        Err(e) => {
            log::error!("corridor_planner_new: {}", e);
            null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_delete(ptr: *mut Planner) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum CStepResultType {
    NoProgress = 0,
    Progress = 1,
    PathFound = 2,
}

/// Outcome of [corridor_planner_step]. `vertex` is the id of the inserted vertex,
/// and is only meaningful for `Progress` and `PathFound`. The route itself
/// can be retrieved with [corridor_planner_best_effort_path].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct CStepResult {
    pub type_: CStepResultType,
    pub vertex: usize,
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_step(planner: *mut Planner) -> CStepResult {
    let Some(planner) = planner.as_mut() else {
        return CStepResult {
            type_: CStepResultType::NoProgress,
            vertex: 0,
        };
    };

    match planner.step() {
        StepResult::NoProgress => CStepResult {
            type_: CStepResultType::NoProgress,
            vertex: 0,
        },
        StepResult::Progress(vertex) => CStepResult {
            type_: CStepResultType::Progress,
            vertex,
        },
        StepResult::PathFound(_) => CStepResult {
            type_: CStepResultType::PathFound,
            vertex: planner.vertex_count() - 1,
        },
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_state(planner: *const Planner) -> PlannerState {
    planner
        .as_ref()
        .map(|p| p.state())
        .unwrap_or(PlannerState::Exhausted)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_vertex_count(planner: *const Planner) -> usize {
    planner.as_ref().map(|p| p.vertex_count()).unwrap_or(0)
}

/// Returns the cost of a vertex, or NaN if it doesn't exist.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_vertex_cost(planner: *const Planner, id: usize) -> f64 {
    planner
        .as_ref()
        .and_then(|p| p.vertex_cost(id))
        .unwrap_or(f64::NAN)
}

/// Returns the position of a vertex, or NaNs if it doesn't exist.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_vertex_position(
    planner: *const Planner,
    id: usize,
) -> Point {
    planner
        .as_ref()
        .filter(|p| id < p.vertex_count())
        .map(|p| p.tree().position(id))
        .unwrap_or(Point::new(f64::NAN, f64::NAN))
}

/// Returns the parent of a vertex, or `SIZE_MAX` for the root and non-existing vertices.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_vertex_parent(
    planner: *const Planner,
    id: usize,
) -> usize {
    planner
        .as_ref()
        .filter(|p| id < p.vertex_count())
        .and_then(|p| p.tree().parent(id))
        .unwrap_or(usize::MAX)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_remaining_iterations(planner: *const Planner) -> usize {
    planner
        .as_ref()
        .map(|p| p.remaining_iterations())
        .unwrap_or(0)
}

#[repr(C)]
pub struct CPath {
    pub points: *mut Point,
    pub len: usize,
    pub capacity: usize,
}

impl CPath {
    fn new(mut points: Vec<Point>) -> Self {
        let ptr = points.as_mut_ptr();
        let len = points.len();
        let capacity = points.capacity();
        forget(points);
        CPath {
            points: ptr,
            len,
            capacity,
        }
    }

    fn empty() -> Self {
        CPath {
            points: null_mut(),
            len: 0,
            capacity: 0,
        }
    }
}

/// Returns the best-effort route of a finished planner, or an empty path
/// (with NULL `points`) while the planner is still active.
/// The result must be released with [corridor_path_delete].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_planner_best_effort_path(planner: *const Planner) -> CPath {
    planner
        .as_ref()
        .and_then(|p| p.best_effort_path())
        .map(CPath::new)
        .unwrap_or_else(CPath::empty)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_path_delete(path: CPath) {
    if !path.points.is_null() {
        drop(Vec::from_raw_parts(path.points, path.len, path.capacity));
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn corridor_earth_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    earth_distance(lat1, lon1, lat2, lon2)
}
