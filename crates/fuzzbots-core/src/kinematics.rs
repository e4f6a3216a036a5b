//! Heading-then-translate integrator and terminal-state classification.

use serde::{Deserialize, Serialize};

use crate::geometry::Obstacle;
use crate::{Pose, Position};

/// Result of classifying a freshly integrated pose.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Classification {
    Continue,
    Collision,
    Goal,
}

impl Classification {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Apply the turn first, then translate along the new heading. The heading is not wrapped.
#[must_use]
pub fn step(pose: &Pose, speed: f32, turn_rate: f32) -> Pose {
    let heading = pose.heading + turn_rate;
    Pose {
        position: Position::new(
            pose.position.x + speed * heading.cos(),
            pose.position.y + speed * heading.sin(),
        ),
        heading,
    }
}

/// Collision is checked before goal capture, so a pose satisfying both is a collision.
#[must_use]
pub fn classify(
    pose: &Pose,
    obstacles: &[Obstacle],
    goal: Position,
    goal_radius: f32,
) -> Classification {
    if obstacles
        .iter()
        .any(|obstacle| obstacle.contains(pose.position))
    {
        return Classification::Collision;
    }
    if pose.position.distance_to(goal) < goal_radius {
        return Classification::Goal;
    }
    Classification::Continue
}
