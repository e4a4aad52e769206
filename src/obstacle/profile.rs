// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::ObstacleKind;

/// Describes how annotated map constraints should be converted into [Obstacles](super::Obstacle).
///
/// Every constraint carries a free-form type (e.g. `"ocean_absolute_repulsor"`) and a weight.
/// Constraints whose type is listed in `hard_barriers` become [ObstacleKind::HardBarrier],
/// everything else becomes a [ObstacleKind::SoftRegion] with the constraint's weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human-readable name of the profile, used for logging.
    pub name: &'a str,

    /// Constraint types which may never be crossed.
    pub hard_barriers: &'a [&'a str],

    /// Weight used for soft regions which don't have one.
    pub default_weight: f64,
}

impl<'a> Profile<'a> {
    /// Decides the [ObstacleKind] of a constraint with the given type and weight.
    pub fn kind_of(&self, constraint_type: Option<&str>, weight: Option<f64>) -> ObstacleKind {
        if constraint_type.is_some_and(|t| self.hard_barriers.iter().any(|&h| h == t)) {
            return ObstacleKind::HardBarrier;
        }

        let weight = match weight {
            Some(w) if w.is_finite() => w,
            Some(w) => {
                log::warn!(
                    "profile {}: constraint {:?} has invalid weight {} - using {}",
                    self.name,
                    constraint_type.unwrap_or(""),
                    w,
                    self.default_weight,
                );
                self.default_weight
            }
            None => {
                log::warn!(
                    "profile {}: constraint {:?} has no weight - using {}",
                    self.name,
                    constraint_type.unwrap_or(""),
                    self.default_weight,
                );
                self.default_weight
            }
        };
        ObstacleKind::SoftRegion { weight }
    }
}

/// Profile matching the constraint types of the annotation tool:
/// oceans are impassable, everything else is weighted.
pub const DEFAULT_PROFILE: Profile<'static> = Profile {
    name: "default",
    hard_barriers: &["ocean_absolute_repulsor"],
    default_weight: 0.0,
};
