// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Recommended number of [step](crate::Planner::step) calls a host should make
/// before yielding to its own event loop.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Invalid input to [Planner::new](crate::Planner::new).
///
/// Configuration errors are detected once, at construction, and are fatal
/// for that planner.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("step_size must be positive and finite, got {0}")]
    InvalidStepSize(f64),

    #[error("max_iterations must be positive")]
    ZeroIterations,

    #[error("goal_sample_rate must be within [0, 1], got {0}")]
    GoalSampleRateOutOfRange(f64),

    #[error("rewire_radius must be non-negative and finite, got {0}")]
    InvalidRewireRadius(f64),

    #[error("max_distance_to_goal must be non-negative and finite, got {0}")]
    InvalidGoalDistance(f64),

    #[error("{0} point has a non-finite coordinate")]
    NonFiniteEndpoint(&'static str),

    #[error("invalid bounds: {0:?}")]
    InvalidBounds(crate::Bounds),
}
