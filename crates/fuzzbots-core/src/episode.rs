//! Episode driver: sense, compute, step and classify until a terminal outcome.

use fuzzbots_index::{UniformGridIndex, VisitIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::kinematics::{Classification, classify, step};
use crate::scenario::Scenario;
use crate::sensor::{SensorReading, SensorSettings, scan};
use crate::{ConfigError, ControlCommand, Controller, Pose, Tick};

/// Per-episode simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeConfig {
    /// Goal capture radius; the goal is reached when the distance is strictly smaller.
    pub goal_radius: f32,
    /// Tick budget before the episode times out.
    pub max_steps: u32,
    /// Multiplier applied to the controller's speed before integrating.
    pub speed_scale: f32,
    /// Edge length of the coarse cells used to count distinct visited locations.
    pub visit_cell_size: f32,
    pub sensor: SensorSettings,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            goal_radius: 15.0,
            max_steps: 600,
            speed_scale: 1.0,
            visit_cell_size: 10.0,
            sensor: SensorSettings::default(),
        }
    }
}

impl EpisodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.goal_radius.is_finite() && self.goal_radius > 0.0) {
            return Err(ConfigError::InvalidConfig("goal_radius must be positive"));
        }
        if !(self.speed_scale.is_finite() && self.speed_scale > 0.0) {
            return Err(ConfigError::InvalidConfig("speed_scale must be positive"));
        }
        if !(self.visit_cell_size.is_finite() && self.visit_cell_size > 0.0) {
            return Err(ConfigError::InvalidConfig(
                "visit_cell_size must be positive",
            ));
        }
        self.sensor.validate()
    }
}

/// Lifecycle of an episode. Every state but `Running` is absorbing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum EpisodeOutcome {
    #[default]
    Running,
    Goal,
    Collision,
    Timeout,
}

impl EpisodeOutcome {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Goal => "goal",
            Self::Collision => "collision",
            Self::Timeout => "timeout",
        }
    }
}

/// Summary of a finished (or interrupted) episode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EpisodeResult {
    pub outcome: EpisodeOutcome,
    /// Ticks executed, including the terminal one.
    pub step_count: u32,
    pub final_pose: Pose,
    /// Sum of the integrated per-tick speeds.
    pub path_length: f32,
    /// Sum of absolute turn rates.
    pub turn_smoothness: f32,
    /// Distinct coarse cells entered on non-terminal ticks.
    pub distinct_cells: usize,
    pub start_distance: f32,
    pub final_distance: f32,
}

/// Everything observable about one executed tick.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct TickReport {
    pub tick: Tick,
    pub readings: SensorReading,
    pub goal_angle_error: f32,
    pub command: ControlCommand,
    pub pose: Pose,
    pub classification: Classification,
}

/// A single run of one controller through one scenario, advanced a tick at a time.
pub struct Episode<'a, C> {
    scenario: &'a Scenario,
    config: &'a EpisodeConfig,
    controller: C,
    pose: Pose,
    tick: Tick,
    outcome: EpisodeOutcome,
    path_length: f32,
    turn_smoothness: f32,
    visited: UniformGridIndex,
}

impl<'a, C: Controller> Episode<'a, C> {
    /// Validate the configuration and place the robot at the scenario's start pose.
    pub fn new(
        scenario: &'a Scenario,
        config: &'a EpisodeConfig,
        controller: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let visited = UniformGridIndex::new(config.visit_cell_size)
            .map_err(|_| ConfigError::InvalidConfig("visit_cell_size must be positive"))?;
        let outcome = if config.max_steps == 0 {
            EpisodeOutcome::Timeout
        } else {
            EpisodeOutcome::Running
        };
        Ok(Self {
            scenario,
            config,
            controller,
            pose: scenario.start,
            tick: Tick::zero(),
            outcome,
            path_length: 0.0,
            turn_smoothness: 0.0,
            visited,
        })
    }

    #[must_use]
    pub const fn pose(&self) -> Pose {
        self.pose
    }

    #[must_use]
    pub const fn outcome(&self) -> EpisodeOutcome {
        self.outcome
    }

    #[must_use]
    pub const fn tick_count(&self) -> Tick {
        self.tick
    }

    #[must_use]
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Consume the episode and hand back the controller.
    pub fn into_controller(self) -> C {
        self.controller
    }

    /// Execute one tick. Returns `None` once the episode has reached a terminal outcome.
    pub fn tick(&mut self) -> Option<TickReport> {
        if self.outcome.is_terminal() {
            return None;
        }

        let readings = scan(&self.pose, &self.scenario.obstacles, &self.config.sensor);
        let goal_angle_error = self.pose.angle_error_to(self.scenario.goal);
        let command = self.controller.compute(&readings, goal_angle_error);
        let speed = command.speed * self.config.speed_scale;

        let next = step(&self.pose, speed, command.turn_rate);
        let classification = classify(
            &next,
            &self.scenario.obstacles,
            self.scenario.goal,
            self.config.goal_radius,
        );

        self.pose = next;
        self.tick = self.tick.next();
        self.path_length += speed.abs();
        self.turn_smoothness += command.turn_rate.abs();

        self.outcome = match classification {
            Classification::Collision => EpisodeOutcome::Collision,
            Classification::Goal => EpisodeOutcome::Goal,
            Classification::Continue => {
                self.visited.record(next.position.x, next.position.y);
                if self.tick.0 >= u64::from(self.config.max_steps) {
                    EpisodeOutcome::Timeout
                } else {
                    EpisodeOutcome::Running
                }
            }
        };

        if self.outcome.is_terminal() {
            debug!(
                controller = self.controller.kind(),
                outcome = self.outcome.label(),
                steps = self.tick.0,
                final_distance = self.pose.position.distance_to(self.scenario.goal),
                "episode finished"
            );
        }

        Some(TickReport {
            tick: self.tick,
            readings,
            goal_angle_error,
            command,
            pose: next,
            classification,
        })
    }

    /// Tick until a terminal outcome and return the summary.
    pub fn run(&mut self) -> EpisodeResult {
        while self.tick().is_some() {}
        self.result()
    }

    /// Summary of the episode so far.
    #[must_use]
    pub fn result(&self) -> EpisodeResult {
        EpisodeResult {
            outcome: self.outcome,
            step_count: u32::try_from(self.tick.0).unwrap_or(u32::MAX),
            final_pose: self.pose,
            path_length: self.path_length,
            turn_smoothness: self.turn_smoothness,
            distinct_cells: self.visited.distinct(),
            start_distance: self.scenario.start_distance(),
            final_distance: self.pose.position.distance_to(self.scenario.goal),
        }
    }
}

/// Run a whole episode with `controller` and return its summary.
pub fn run_episode<C: Controller>(
    controller: C,
    scenario: &Scenario,
    config: &EpisodeConfig,
) -> Result<EpisodeResult, ConfigError> {
    let mut episode = Episode::new(scenario, config, controller)?;
    Ok(episode.run())
}
