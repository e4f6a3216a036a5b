//! Start pose, goal and obstacle layout for an episode, plus the built-in maps.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::geometry::{Obstacle, Rect};
use crate::{Pose, Position};

/// Default goal used by the built-in maps.
pub const DEFAULT_GOAL: Position = Position::new(200.0, 40.0);
/// Default start pose used by the built-in maps (facing −x).
pub const DEFAULT_START: Pose = Pose::new(360.0, 460.0, PI);

const RANDOM_OBSTACLE_SIZE: f32 = 20.0;
const RANDOM_OBSTACLE_ATTEMPTS: usize = 50;
const RANDOM_OBSTACLE_GOAL_CLEARANCE: f32 = 60.0;
const RANDOM_START_CLEARANCE: f32 = 15.0;
const RANDOM_START_ATTEMPTS: usize = 1_000;

const COMPLEX_MAP: [[f32; 4]; 16] = [
    // border walls
    [0.0, 0.0, 400.0, 10.0],
    [0.0, 490.0, 400.0, 500.0],
    [0.0, 0.0, 10.0, 500.0],
    [390.0, 0.0, 400.0, 500.0],
    // corridor walls
    [80.0, 400.0, 400.0, 410.0],
    [0.0, 300.0, 320.0, 310.0],
    [80.0, 200.0, 400.0, 210.0],
    [0.0, 120.0, 150.0, 130.0],
    [250.0, 120.0, 400.0, 130.0],
    // pillars
    [180.0, 410.0, 190.0, 440.0],
    [240.0, 250.0, 250.0, 300.0],
    [100.0, 150.0, 120.0, 180.0],
    [200.0, 210.0, 210.0, 240.0],
    [80.0, 210.0, 90.0, 240.0],
    [150.0, 310.0, 160.0, 350.0],
    [300.0, 340.0, 310.0, 400.0],
];

const SIMPLE_MAP: [[f32; 4]; 6] = [
    [0.0, 0.0, 400.0, 10.0],
    [0.0, 490.0, 400.0, 500.0],
    [0.0, 0.0, 10.0, 500.0],
    [390.0, 0.0, 400.0, 500.0],
    [50.0, 180.0, 280.0, 200.0],
    [200.0, 350.0, 400.0, 330.0],
];

/// Built-in obstacle layouts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MapPreset {
    #[default]
    Complex,
    Simple,
    Empty,
}

/// Everything an episode needs to know about the world, passed explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub start: Pose,
    pub goal: Position,
    pub obstacles: Vec<Obstacle>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::preset(MapPreset::Complex)
    }
}

impl Scenario {
    #[must_use]
    pub fn new(start: Pose, goal: Position, obstacles: Vec<Obstacle>) -> Self {
        Self {
            start,
            goal,
            obstacles,
        }
    }

    /// Built-in map with the default start pose and goal.
    #[must_use]
    pub fn preset(preset: MapPreset) -> Self {
        let rects: &[[f32; 4]] = match preset {
            MapPreset::Complex => &COMPLEX_MAP,
            MapPreset::Simple => &SIMPLE_MAP,
            MapPreset::Empty => &[],
        };
        let obstacles = rects
            .iter()
            .map(|&corners| Obstacle::Rectangle(Rect::from(corners)))
            .collect();
        Self::new(DEFAULT_START, DEFAULT_GOAL, obstacles)
    }

    /// Distance from the start position to the goal.
    #[must_use]
    pub fn start_distance(&self) -> f32 {
        self.start.position.distance_to(self.goal)
    }

    /// Same layout with a different start pose.
    #[must_use]
    pub fn with_start(mut self, start: Pose) -> Self {
        self.start = start;
        self
    }

    fn rectangles(&self) -> impl Iterator<Item = &Rect> + '_ {
        self.obstacles.iter().filter_map(|obstacle| match obstacle {
            Obstacle::Rectangle(rect) => Some(rect),
            _ => None,
        })
    }

    /// Drop up to `count` square blocks into free space away from the goal.
    ///
    /// Each block gets a bounded number of placement attempts; blocks that never find room are
    /// skipped, so fewer than `count` may be added. Returns how many were placed.
    pub fn add_random_obstacles(&mut self, rng: &mut dyn RngCore, count: usize) -> usize {
        let mut placed = 0;
        for _ in 0..count {
            for _ in 0..RANDOM_OBSTACLE_ATTEMPTS {
                let x = rng.random_range(30..=370) as f32;
                let y = rng.random_range(50..=450) as f32;
                if Position::new(x, y).distance_to(self.goal) < RANDOM_OBSTACLE_GOAL_CLEARANCE {
                    continue;
                }
                let candidate = Rect::new(x, y, x + RANDOM_OBSTACLE_SIZE, y + RANDOM_OBSTACLE_SIZE);
                if self.rectangles().any(|rect| rect.overlaps(&candidate)) {
                    continue;
                }
                self.obstacles.push(Obstacle::Rectangle(candidate));
                placed += 1;
                break;
            }
        }
        placed
    }

    /// Sample a start pose in the lower half of the map that keeps clear of every rectangle.
    pub fn random_start(&self, rng: &mut dyn RngCore) -> Option<Pose> {
        for _ in 0..RANDOM_START_ATTEMPTS {
            let x = rng.random_range(20..=380) as f32;
            let y = rng.random_range(250..=480) as f32;
            let candidate = Position::new(x, y);
            let blocked = self
                .rectangles()
                .any(|rect| rect.contains_with_margin(candidate, RANDOM_START_CLEARANCE))
                || self
                    .obstacles
                    .iter()
                    .any(|obstacle| obstacle.contains(candidate));
            if !blocked {
                let heading = rng.random_range(-3.14_f32..3.14);
                return Some(Pose::new(x, y, heading));
            }
        }
        None
    }
}
