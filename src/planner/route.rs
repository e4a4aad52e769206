// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use rand::Rng;

use crate::{Bounds, ObstacleSet, Path, Point};

use super::{ConfigurationError, Planner, PlannerOptions, PlannerState};

/// Final result of [find_route].
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Positions from the start to the last vertex of the route.
    pub path: Path,

    /// Accumulated cost of the last vertex of the route.
    pub cost: f64,

    /// True if the route ends close to the goal; false if this is only
    /// a best-effort route towards the goal.
    pub reached_goal: bool,

    /// Number of iterations used by the planner.
    pub iterations: usize,
}

/// Runs a [Planner] until it reaches the goal or exhausts its iteration budget,
/// returning the found (or best-effort) route.
///
/// The planner is stepped in batches of `batch_size` iterations, with progress
/// logged between batches. The recommended value is [DEFAULT_BATCH_SIZE](crate::DEFAULT_BATCH_SIZE).
/// Hosts which need to do other work while planning should drive the [Planner] directly.
pub fn find_route<R: Rng>(
    start: Point,
    goal: Point,
    obstacles: ObstacleSet,
    bounds: Bounds,
    options: PlannerOptions,
    rng: R,
    batch_size: usize,
) -> Result<Route, ConfigurationError> {
    let mut planner = Planner::new(start, goal, obstacles, bounds, options, rng)?;
    let batch_size = batch_size.max(1);

    while planner.state() == PlannerState::Active {
        for _ in 0..batch_size {
            if planner.state() != PlannerState::Active {
                break;
            }
            planner.step();
        }

        log::info!(
            "{} iterations left, {} vertices in the tree",
            planner.remaining_iterations(),
            planner.vertex_count(),
        );
    }

    let vertex = planner.best_effort_vertex().unwrap_or_default();
    let route = Route {
        path: planner.tree().path_to(vertex),
        cost: planner.tree().cost(vertex),
        reached_goal: planner.state() == PlannerState::GoalReached,
        iterations: options.max_iterations - planner.remaining_iterations(),
    };

    if route.reached_goal {
        log::info!(
            "route found after {} iterations, cost {:.4}",
            route.iterations,
            route.cost,
        );
    } else {
        log::warn!(
            "goal not reached after {} iterations, returning best-effort route",
            route.iterations,
        );
    }

    Ok(route)
}
