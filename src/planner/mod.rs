// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod options;
mod route;
mod rrt_star;

pub use error::{ConfigurationError, DEFAULT_BATCH_SIZE};
pub use options::{PlannerOptions, RewireMode};
pub use route::{find_route, Route};
pub use rrt_star::{Planner, PlannerState, StepResult};
