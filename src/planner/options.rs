// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::ConfigurationError;

/// How far improvements found during rewiring are pushed through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub enum RewireMode {
    /// Only the rewired vertex gets its cost updated. Costs cached by its descendants
    /// become stale (too high) until they are rewired themselves.
    #[default]
    SingleHop,

    /// The cost improvement is propagated to all descendants of the rewired vertex,
    /// keeping every cached cost exact at the price of a subtree walk per rewire.
    Propagate,
}

/// Tunables of the [Planner](crate::Planner).
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct PlannerOptions {
    /// Number of [step](crate::Planner::step) calls after which the planner gives up.
    pub max_iterations: usize,

    /// Maximum length of a new tree edge, in coordinate degrees.
    pub step_size: f64,

    /// Probability of sampling the goal instead of a random point, within `[0, 1]`.
    pub goal_sample_rate: f64,

    /// A new vertex closer than this to the goal completes the route.
    pub max_distance_to_goal: f64,

    /// Radius of the neighborhood considered for parent selection and rewiring.
    /// May be smaller than `step_size`, which makes rewiring less effective.
    pub rewire_radius: f64,

    pub rewire_mode: RewireMode,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            step_size: 0.1,
            goal_sample_rate: 0.1,
            max_distance_to_goal: 0.5,
            rewire_radius: 0.5,
            rewire_mode: RewireMode::SingleHop,
        }
    }
}

impl PlannerOptions {
    /// Checks that all options are within their allowed ranges.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(ConfigurationError::InvalidStepSize(self.step_size));
        }

        if self.max_iterations == 0 {
            return Err(ConfigurationError::ZeroIterations);
        }

        if !(0.0..=1.0).contains(&self.goal_sample_rate) {
            return Err(ConfigurationError::GoalSampleRateOutOfRange(
                self.goal_sample_rate,
            ));
        }

        if !(self.rewire_radius.is_finite() && self.rewire_radius >= 0.0) {
            return Err(ConfigurationError::InvalidRewireRadius(self.rewire_radius));
        }

        if !(self.max_distance_to_goal.is_finite() && self.max_distance_to_goal >= 0.0) {
            return Err(ConfigurationError::InvalidGoalDistance(
                self.max_distance_to_goal,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(PlannerOptions::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_step_size() {
        for step_size in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let o = PlannerOptions {
                step_size,
                ..Default::default()
            };
            assert!(matches!(
                o.validate(),
                Err(ConfigurationError::InvalidStepSize(_))
            ));
        }
    }

    #[test]
    fn zero_iterations() {
        let o = PlannerOptions {
            max_iterations: 0,
            ..Default::default()
        };
        assert_eq!(o.validate(), Err(ConfigurationError::ZeroIterations));
    }

    #[test]
    fn goal_sample_rate() {
        for goal_sample_rate in [0.0, 0.5, 1.0] {
            let o = PlannerOptions {
                goal_sample_rate,
                ..Default::default()
            };
            assert_eq!(o.validate(), Ok(()));
        }

        for goal_sample_rate in [-0.01, 1.01, f64::NAN] {
            let o = PlannerOptions {
                goal_sample_rate,
                ..Default::default()
            };
            assert!(matches!(
                o.validate(),
                Err(ConfigurationError::GoalSampleRateOutOfRange(_))
            ));
        }
    }

    #[test]
    fn small_rewire_radius_is_legal() {
        let o = PlannerOptions {
            step_size: 1.0,
            rewire_radius: 0.0,
            ..Default::default()
        };
        assert_eq!(o.validate(), Ok(()));
    }

    #[test]
    fn negative_radii() {
        let o = PlannerOptions {
            rewire_radius: -1.0,
            ..Default::default()
        };
        assert_eq!(o.validate(), Err(ConfigurationError::InvalidRewireRadius(-1.0)));

        let o = PlannerOptions {
            max_distance_to_goal: -1.0,
            ..Default::default()
        };
        assert_eq!(o.validate(), Err(ConfigurationError::InvalidGoalDistance(-1.0)));
    }
}
