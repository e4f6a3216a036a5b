//! Core types shared across the FuzzBots workspace.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

pub mod episode;
pub mod geometry;
pub mod kinematics;
pub mod scenario;
pub mod sensor;

pub use episode::{Episode, EpisodeConfig, EpisodeOutcome, EpisodeResult, TickReport, run_episode};
pub use geometry::{Circle, ConvexPolygon, Obstacle, Rect};
pub use kinematics::{Classification, classify, step};
pub use scenario::{MapPreset, Scenario};
pub use sensor::{
    DEFAULT_SENSOR_OFFSETS, FRONT, FRONT_LEFT, FRONT_RIGHT, LEFT, RIGHT, SENSOR_COUNT,
    SensorReading, SensorSettings, cast_ray, scan,
};

const FULL_TURN: f32 = std::f32::consts::TAU;
const HALF_TURN: f32 = std::f32::consts::PI;

/// Wrap an angle into `(-π, π]`. NaN maps to zero.
#[must_use]
pub fn wrap_signed_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + HALF_TURN).rem_euclid(FULL_TURN) - HALF_TURN;
    if wrapped <= -HALF_TURN {
        wrapped + FULL_TURN
    } else {
        wrapped
    }
}

/// Errors raised when validating configuration structures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Errors raised when decoding a genome from its flat numeric encoding.
#[derive(Debug, Error, PartialEq)]
pub enum GenomeError {
    #[error("{kind} genome expects {expected} values but {actual} were supplied")]
    ArityMismatch {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("gene {index} is not a finite number")]
    NonFinite { index: usize },
}

/// High level simulation clock (ticks processed since the episode began).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Resets the tick counter back to zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// 2D position in world units (y grows downward, matching screen space).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Construct a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Robot pose: position plus heading in radians.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Pose {
    pub position: Position,
    pub heading: f32,
}

impl Pose {
    #[must_use]
    pub const fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            position: Position::new(x, y),
            heading,
        }
    }

    /// Bearing to `target` minus the current heading, wrapped into `(-π, π]`.
    #[must_use]
    pub fn angle_error_to(&self, target: Position) -> f32 {
        let bearing = (target.y - self.position.y).atan2(target.x - self.position.x);
        wrap_signed_angle(bearing - self.heading)
    }
}

/// Crisp command produced by a controller for one tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ControlCommand {
    pub speed: f32,
    pub turn_rate: f32,
}

impl ControlCommand {
    #[must_use]
    pub const fn new(speed: f32, turn_rate: f32) -> Self {
        Self { speed, turn_rate }
    }
}

/// Membership degrees of one linguistic variable, exported for visualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDegrees {
    pub name: Cow<'static, str>,
    pub terms: [&'static str; 3],
    pub degrees: [f32; 3],
}

/// Snapshot of a controller's most recent internal evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ControlDiagnostics {
    pub variables: Vec<VariableDegrees>,
}

/// Thin trait object used to drive controllers without coupling to concrete controller crates.
pub trait Controller: Send + Sync {
    /// Static identifier of the controller implementation.
    fn kind(&self) -> &'static str;

    /// Produce a command from the latest sensor sweep and goal angle error.
    fn compute(&mut self, readings: &SensorReading, goal_angle_error: f32) -> ControlCommand;

    /// Internal state from the most recent `compute` call, if the controller exposes one.
    fn diagnostics(&self) -> Option<ControlDiagnostics> {
        None
    }
}

impl<T: Controller + ?Sized> Controller for Box<T> {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn compute(&mut self, readings: &SensorReading, goal_angle_error: f32) -> ControlCommand {
        (**self).compute(readings, goal_angle_error)
    }

    fn diagnostics(&self) -> Option<ControlDiagnostics> {
        (**self).diagnostics()
    }
}

impl<T: Controller + ?Sized> Controller for &mut T {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn compute(&mut self, readings: &SensorReading, goal_angle_error: f32) -> ControlCommand {
        (**self).compute(readings, goal_angle_error)
    }

    fn diagnostics(&self) -> Option<ControlDiagnostics> {
        (**self).diagnostics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn wrap_signed_angle_lands_in_half_open_range() {
        assert_eq!(wrap_signed_angle(PI), PI);
        assert!((wrap_signed_angle(-PI) - PI).abs() < 1e-6);
        assert!((wrap_signed_angle(1.5 * PI) + PI / 2.0).abs() < 1e-5);
        assert!((wrap_signed_angle(-5.076) - 1.2072).abs() < 1e-3);
        assert_eq!(wrap_signed_angle(f32::NAN), 0.0);
    }

    #[test]
    fn wrap_signed_angle_handles_huge_finite_angles() {
        for angle in [1.0e10, -1.0e10, f32::MAX, f32::MIN, 3.0e7] {
            let wrapped = wrap_signed_angle(angle);
            assert!(wrapped > -PI && wrapped <= PI, "{angle} wrapped to {wrapped}");
        }
        let error = Pose::new(0.0, 0.0, 1.0e10).angle_error_to(Position::new(10.0, 0.0));
        assert!(error.is_finite() && error.abs() <= PI);
    }

    #[test]
    fn angle_error_points_toward_target() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        assert!((pose.angle_error_to(Position::new(0.0, 10.0)) - PI / 2.0).abs() < 1e-6);
        assert!((pose.angle_error_to(Position::new(0.0, -10.0)) + PI / 2.0).abs() < 1e-6);
        let facing = Pose::new(0.0, 0.0, PI / 2.0);
        assert!(facing.angle_error_to(Position::new(0.0, 10.0)).abs() < 1e-6);
    }

    #[test]
    fn tick_advances() {
        assert_eq!(Tick::zero().next().next(), Tick(2));
    }

    #[test]
    fn position_distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-6);
    }
}
