//! Ranged sensors: five rays cast from the robot against the obstacle set.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::geometry::{Circle, ConvexPolygon, Obstacle, Rect};
use crate::{ConfigError, Pose, Position};

/// Number of rays in a sensor sweep.
pub const SENSOR_COUNT: usize = 5;

/// Ray index straight ahead.
pub const FRONT: usize = 0;
/// Ray index at +45°.
pub const FRONT_LEFT: usize = 1;
/// Ray index at −45°.
pub const FRONT_RIGHT: usize = 2;
/// Ray index at +90°.
pub const LEFT: usize = 3;
/// Ray index at −90°.
pub const RIGHT: usize = 4;

/// Ray offsets relative to the heading, in sweep order.
pub const DEFAULT_SENSOR_OFFSETS: [f32; SENSOR_COUNT] =
    [0.0, FRAC_PI_4, -FRAC_PI_4, FRAC_PI_2, -FRAC_PI_2];

/// Ray casting parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorSettings {
    /// Distance reported when a ray hits nothing.
    pub max_range: f32,
    /// Relative ray angles; consumers index positionally, so the order is fixed.
    pub offsets: [f32; SENSOR_COUNT],
    /// Spacing between samples when marching rays through circles and polygons.
    pub sample_step: f32,
    /// Extra clearance added to circle radii while sensing.
    pub circle_margin: f32,
    /// Direction components smaller than this skip the matching rectangle slab.
    pub parallel_epsilon: f32,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            max_range: 150.0,
            offsets: DEFAULT_SENSOR_OFFSETS,
            sample_step: 2.0,
            circle_margin: 0.0,
            parallel_epsilon: 1e-3,
        }
    }
}

impl SensorSettings {
    /// Ensure the sensor parameters describe a usable sweep.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_range.is_finite() && self.max_range > 0.0) {
            return Err(ConfigError::InvalidConfig("sensor max_range must be positive"));
        }
        if !(self.sample_step.is_finite() && self.sample_step > 0.0) {
            return Err(ConfigError::InvalidConfig(
                "sensor sample_step must be positive",
            ));
        }
        if !(self.circle_margin.is_finite() && self.circle_margin >= 0.0) {
            return Err(ConfigError::InvalidConfig(
                "sensor circle_margin must be non-negative",
            ));
        }
        if !(self.parallel_epsilon.is_finite() && self.parallel_epsilon >= 0.0) {
            return Err(ConfigError::InvalidConfig(
                "sensor parallel_epsilon must be non-negative",
            ));
        }
        if self.offsets.iter().any(|offset| !offset.is_finite()) {
            return Err(ConfigError::InvalidConfig("sensor offsets must be finite"));
        }
        Ok(())
    }
}

/// Distances measured by one sweep, in `{front, +45°, −45°, +90°, −90°}` order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SensorReading(pub [f32; SENSOR_COUNT]);

impl SensorReading {
    /// Reading where every ray reports the same distance.
    #[must_use]
    pub const fn uniform(distance: f32) -> Self {
        Self([distance; SENSOR_COUNT])
    }

    #[must_use]
    pub const fn distances(&self) -> &[f32; SENSOR_COUNT] {
        &self.0
    }

    #[must_use]
    pub const fn front(&self) -> f32 {
        self.0[FRONT]
    }

    #[must_use]
    pub const fn front_left(&self) -> f32 {
        self.0[FRONT_LEFT]
    }

    #[must_use]
    pub const fn front_right(&self) -> f32 {
        self.0[FRONT_RIGHT]
    }

    #[must_use]
    pub const fn left(&self) -> f32 {
        self.0[LEFT]
    }

    #[must_use]
    pub const fn right(&self) -> f32 {
        self.0[RIGHT]
    }

    /// Shortest distance across all rays.
    #[must_use]
    pub fn nearest(&self) -> f32 {
        self.0.iter().copied().fold(f32::INFINITY, f32::min)
    }
}

/// Distance along one ray to the nearest obstacle, capped at `settings.max_range`.
#[must_use]
pub fn cast_ray(
    pose: &Pose,
    relative_angle: f32,
    obstacles: &[Obstacle],
    settings: &SensorSettings,
) -> f32 {
    let angle = pose.heading + relative_angle;
    let direction = Position::new(angle.cos(), angle.sin());
    let origin = pose.position;

    let mut closest = settings.max_range;
    for obstacle in obstacles {
        if obstacle.is_degenerate() {
            continue;
        }
        let hit = match obstacle {
            Obstacle::Rectangle(rect) => ray_rect(origin, direction, rect, closest, settings),
            Obstacle::Circle(circle) => {
                march(origin, direction, closest, settings.sample_step, |p| {
                    touches_circle(circle, p, settings.circle_margin)
                })
            }
            Obstacle::Polygon(polygon) => {
                march(origin, direction, closest, settings.sample_step, |p| {
                    touches_polygon(polygon, p)
                })
            }
        };
        if let Some(distance) = hit {
            if distance < closest {
                closest = distance;
            }
        }
    }
    closest
}

/// Run a full sweep using the offsets in `settings`.
#[must_use]
pub fn scan(pose: &Pose, obstacles: &[Obstacle], settings: &SensorSettings) -> SensorReading {
    let mut distances = [settings.max_range; SENSOR_COUNT];
    for (distance, offset) in distances.iter_mut().zip(settings.offsets) {
        *distance = cast_ray(pose, offset, obstacles, settings);
    }
    SensorReading(distances)
}

/// Slab test against the four rectangle edges; edge hits count as inclusive.
fn ray_rect(
    origin: Position,
    direction: Position,
    rect: &Rect,
    limit: f32,
    settings: &SensorSettings,
) -> Option<f32> {
    let min = rect.min();
    let max = rect.max();
    let mut best = limit;
    let mut found = false;

    if direction.x.abs() > settings.parallel_epsilon {
        for edge_x in [min.x, max.x] {
            let t = (edge_x - origin.x) / direction.x;
            if t > 0.0 && t < best {
                let y = origin.y + t * direction.y;
                if min.y <= y && y <= max.y {
                    best = t;
                    found = true;
                }
            }
        }
    }
    if direction.y.abs() > settings.parallel_epsilon {
        for edge_y in [min.y, max.y] {
            let t = (edge_y - origin.y) / direction.y;
            if t > 0.0 && t < best {
                let x = origin.x + t * direction.x;
                if min.x <= x && x <= max.x {
                    best = t;
                    found = true;
                }
            }
        }
    }

    found.then_some(best)
}

/// March along the ray at a fixed resolution, returning the first sample that `hit` accepts.
fn march<F>(origin: Position, direction: Position, limit: f32, step: f32, hit: F) -> Option<f32>
where
    F: Fn(Position) -> bool,
{
    let mut k = 1_u32;
    loop {
        let distance = step * k as f32;
        if distance >= limit {
            return None;
        }
        let sample = Position::new(
            origin.x + direction.x * distance,
            origin.y + direction.y * distance,
        );
        if hit(sample) {
            return Some(distance);
        }
        k += 1;
    }
}

fn touches_circle(circle: &Circle, p: Position, margin: f32) -> bool {
    circle.center.distance_to(p) < circle.radius + margin
}

fn touches_polygon(polygon: &ConvexPolygon, p: Position) -> bool {
    polygon.touches(p)
}
