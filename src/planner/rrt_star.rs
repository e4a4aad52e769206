// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::Rng;

use crate::{euclidean_distance, Bounds, ObstacleSet, Path, PlanningTree, Point, VertexId};

use super::{ConfigurationError, PlannerOptions, RewireMode};

/// Lifecycle of a [Planner].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum PlannerState {
    /// The iteration budget is not used up and the goal wasn't reached yet.
    Active,

    /// A vertex within `max_distance_to_goal` of the goal was inserted. Terminal.
    GoalReached,

    /// The iteration budget was used up without reaching the goal. Terminal.
    Exhausted,
}

/// Outcome of a single [Planner::step].
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    /// No vertex was inserted - the candidate was blocked, had no collision-free
    /// connection to the tree, or the planner is no longer [active](PlannerState::Active).
    /// This is an expected and frequent outcome, not an error.
    NoProgress,

    /// A new vertex was inserted into the tree.
    Progress(VertexId),

    /// A new vertex was inserted close enough to the goal; carries the route
    /// from the start to that vertex.
    PathFound(Path),
}

/// Incremental RRT* planner.
///
/// Every call to [step](Planner::step) extends the planning tree by at most one vertex,
/// so a host can interleave planning with its own work and simply stop calling `step`
/// to cancel. Randomness is injected to make runs reproducible.
#[derive(Debug, Clone)]
pub struct Planner<R: Rng = StdRng> {
    start: Point,
    goal: Point,
    obstacles: ObstacleSet,
    bounds: Bounds,
    options: PlannerOptions,
    rng: R,

    tree: PlanningTree,
    state: PlannerState,
    remaining_iterations: usize,
    goal_vertex: Option<VertexId>,
}

impl<R: Rng> Planner<R> {
    /// Creates a new planner with a tree consisting only of the start point.
    ///
    /// Start or goal points inside a hard barrier are allowed (although the goal
    /// will most likely be unreachable), and only generate a warning.
    pub fn new(
        start: Point,
        goal: Point,
        obstacles: ObstacleSet,
        bounds: Bounds,
        options: PlannerOptions,
        rng: R,
    ) -> Result<Self, ConfigurationError> {
        options.validate()?;

        if !bounds.is_valid() {
            return Err(ConfigurationError::InvalidBounds(bounds));
        }
        if !start.is_finite() {
            return Err(ConfigurationError::NonFiniteEndpoint("start"));
        }
        if !goal.is_finite() {
            return Err(ConfigurationError::NonFiniteEndpoint("goal"));
        }

        if obstacles.is_point_blocked(start) {
            log::warn!("start point {:?} lies inside a hard barrier", start);
        }
        if obstacles.is_point_blocked(goal) {
            log::warn!("goal point {:?} lies inside a hard barrier", goal);
        }

        Ok(Self {
            start,
            goal,
            obstacles,
            bounds,
            options,
            rng,
            tree: PlanningTree::new(start),
            state: PlannerState::Active,
            remaining_iterations: options.max_iterations,
            goal_vertex: None,
        })
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    pub fn tree(&self) -> &PlanningTree {
        &self.tree
    }

    /// Returns the number of vertices in the planning tree (at least 1).
    pub fn vertex_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns the cached cost of reaching a vertex from the start,
    /// or None if no such vertex exists.
    pub fn vertex_cost(&self, id: VertexId) -> Option<f64> {
        self.tree.get_cost(id)
    }

    /// Returns how many more [step](Planner::step) calls will be processed.
    pub fn remaining_iterations(&self) -> usize {
        self.remaining_iterations
    }

    /// Returns the vertex a best-effort route would lead to:
    /// the goal vertex after the goal was reached, the vertex closest to the goal
    /// after exhaustion, or None while the planner is still active.
    pub fn best_effort_vertex(&self) -> Option<VertexId> {
        match self.state {
            PlannerState::Active => None,
            PlannerState::GoalReached => self.goal_vertex,
            PlannerState::Exhausted => Some(self.tree.nearest_to_goal(self.goal)),
        }
    }

    /// Returns the route to the [best-effort vertex](Planner::best_effort_vertex).
    /// Terminal planners always return at least the start point.
    pub fn best_effort_path(&self) -> Option<Path> {
        self.best_effort_vertex().map(|id| self.tree.path_to(id))
    }

    /// Performs a single RRT* iteration.
    ///
    /// Every call made while [active](PlannerState::Active) uses up one iteration,
    /// regardless of the outcome. Calls made on a finished planner return
    /// [StepResult::NoProgress] without touching the random source.
    pub fn step(&mut self) -> StepResult {
        if self.state != PlannerState::Active {
            return StepResult::NoProgress;
        }

        self.remaining_iterations -= 1;
        let result = self.extend();

        match &result {
            StepResult::PathFound(path) => {
                log::debug!(
                    "goal reached after {} iterations, route has {} points",
                    self.options.max_iterations - self.remaining_iterations,
                    path.len(),
                );
                self.state = PlannerState::GoalReached;
            }

            _ if self.remaining_iterations == 0 => {
                log::debug!(
                    "iteration budget exhausted with {} vertices, goal not reached",
                    self.tree.len(),
                );
                self.state = PlannerState::Exhausted;
            }

            _ => {}
        }

        result
    }

    fn extend(&mut self) -> StepResult {
        let sample = self.sample();
        let nearest = self.tree.nearest(sample);
        let candidate = steer(self.tree.position(nearest), sample, self.options.step_size);

        if self.obstacles.is_point_blocked(candidate) {
            log::trace!("candidate {:?} inside a hard barrier", candidate);
            return StepResult::NoProgress;
        }

        let neighbors = self.tree.within_radius(candidate, self.options.rewire_radius);

        let Some((parent, cost)) = self.choose_parent(candidate, nearest, &neighbors) else {
            log::trace!("candidate {:?} has no collision-free connection", candidate);
            return StepResult::NoProgress;
        };

        let id = self.tree.insert(candidate, parent, cost);
        log::trace!("inserted vertex {} at {:?} with cost {}", id, candidate, cost);

        self.rewire(id, parent, &neighbors);

        if euclidean_distance(candidate, self.goal) < self.options.max_distance_to_goal {
            self.goal_vertex = Some(id);
            StepResult::PathFound(self.tree.path_to(id))
        } else {
            StepResult::Progress(id)
        }
    }

    fn sample(&mut self) -> Point {
        if self.rng.gen::<f64>() < self.options.goal_sample_rate {
            self.goal
        } else {
            let b = &self.bounds;
            Point::new(
                b.min_x + self.rng.gen::<f64>() * (b.max_x - b.min_x),
                b.min_y + self.rng.gen::<f64>() * (b.max_y - b.min_y),
            )
        }
    }

    /// Picks the cheapest unblocked parent for the candidate among `nearest`
    /// and `neighbors`, returning it along with the candidate's cost.
    fn choose_parent(
        &self,
        candidate: Point,
        nearest: VertexId,
        neighbors: &[VertexId],
    ) -> Option<(VertexId, f64)> {
        let mut best: Option<(VertexId, f64)> = None;

        for &id in std::iter::once(&nearest).chain(neighbors) {
            let position = self.tree.position(id);
            if self.obstacles.is_segment_blocked(position, candidate) {
                continue;
            }

            let cost = self.tree.cost(id) + self.obstacles.segment_cost(position, candidate);
            if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                best = Some((id, cost));
            }
        }

        best
    }

    /// Attaches neighbors to the new vertex whenever that strictly lowers their cost.
    ///
    /// Costs are monotone along tree edges, so an ancestor of `new` can never
    /// become cheaper through it and rewiring never introduces a cycle.
    fn rewire(&mut self, new: VertexId, parent: VertexId, neighbors: &[VertexId]) {
        let new_position = self.tree.position(new);
        let new_cost = self.tree.cost(new);

        for &id in neighbors {
            if id == parent {
                continue;
            }

            let position = self.tree.position(id);
            let cost = new_cost + self.obstacles.segment_cost(new_position, position);
            if cost >= self.tree.cost(id) || self.obstacles.is_segment_blocked(new_position, position)
            {
                continue;
            }

            log::trace!(
                "rewiring vertex {} through {}, cost {} -> {}",
                id,
                new,
                self.tree.cost(id),
                cost,
            );
            self.tree.reparent(id, new, cost);

            if self.options.rewire_mode == RewireMode::Propagate {
                self.propagate_cost(id);
            }
        }
    }

    /// Recomputes cached costs of all descendants of `root`.
    fn propagate_cost(&mut self, root: VertexId) {
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            let position = self.tree.position(id);
            let cost = self.tree.cost(id);

            let children = self.tree.children(id).to_vec();
            for child in children {
                let child_cost =
                    cost + self.obstacles.segment_cost(position, self.tree.position(child));
                self.tree.set_cost(child, child_cost);
                queue.push_back(child);
            }
        }
    }
}

/// Moves from `from` towards `to` by at most `step_size`.
fn steer(from: Point, to: Point, step_size: f64) -> Point {
    let dist = euclidean_distance(from, to);
    if dist <= step_size {
        to
    } else {
        let ratio = step_size / dist;
        Point::new(
            from.x + (to.x - from.x) * ratio,
            from.y + (to.y - from.y) * ratio,
        )
    }
}
