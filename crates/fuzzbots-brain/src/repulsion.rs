//! Reactive controller: goal attraction plus squared-danger repulsion per sensor.

use fuzzbots_core::{ControlCommand, Controller, SENSOR_COUNT, SensorReading};
use serde::{Deserialize, Serialize};

/// Number of genes: one reaction weight per sensor plus a goal-gain offset.
pub const GAIN_COUNT: usize = SENSOR_COUNT + 1;

/// Fixed shape constants for the repulsion controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RepulsionSettings {
    /// Readings at or beyond this distance contribute no danger.
    pub danger_range: f32,
    pub reaction_gain: f32,
    pub goal_gain: f32,
    pub cruise_speed: f32,
    pub max_turn: f32,
}

impl Default for RepulsionSettings {
    fn default() -> Self {
        Self {
            danger_range: 100.0,
            reaction_gain: 3.0,
            goal_gain: 1.5,
            cruise_speed: 4.0,
            max_turn: 0.8,
        }
    }
}

/// Steers with `goal_error * (goal_gain + gains[5]) + Σ danger_i² * gains[i] * reaction_gain`.
#[derive(Debug, Clone, PartialEq)]
pub struct RepulsionController {
    gains: [f32; GAIN_COUNT],
    settings: RepulsionSettings,
}

impl RepulsionController {
    pub const KIND: &'static str = "repulsion";

    #[must_use]
    pub fn new(gains: [f32; GAIN_COUNT]) -> Self {
        Self::with_settings(gains, RepulsionSettings::default())
    }

    #[must_use]
    pub const fn with_settings(gains: [f32; GAIN_COUNT], settings: RepulsionSettings) -> Self {
        Self { gains, settings }
    }

    #[must_use]
    pub const fn gains(&self) -> &[f32; GAIN_COUNT] {
        &self.gains
    }

    fn danger(&self, distance: f32) -> f32 {
        let range = self.settings.danger_range;
        let proximity = ((range - distance) / range).max(0.0);
        proximity * proximity
    }
}

impl Controller for RepulsionController {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn compute(&mut self, readings: &SensorReading, goal_angle_error: f32) -> ControlCommand {
        let repulsion: f32 = readings
            .distances()
            .iter()
            .zip(&self.gains)
            .map(|(distance, gain)| self.danger(*distance) * gain * self.settings.reaction_gain)
            .sum();
        let pull = self.settings.goal_gain + self.gains[SENSOR_COUNT];
        let steering = goal_angle_error * pull + repulsion;
        let turn_rate = if steering.is_finite() {
            steering.clamp(-self.settings.max_turn, self.settings.max_turn)
        } else {
            0.0
        };
        ControlCommand::new(self.settings.cruise_speed, turn_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzbots_core::{FRONT, LEFT};

    #[test]
    fn clear_view_only_pulls_toward_goal() {
        let mut controller = RepulsionController::new([1.0; GAIN_COUNT]);
        let command = controller.compute(&SensorReading::uniform(150.0), 0.2);
        // (1.5 + 1.0) * 0.2
        assert!((command.turn_rate - 0.5).abs() < 1e-6);
        assert_eq!(command.speed, 4.0);
    }

    #[test]
    fn danger_is_squared_and_weighted() {
        let mut gains = [0.0; GAIN_COUNT];
        gains[LEFT] = -0.5;
        let mut controller = RepulsionController::new(gains);
        let mut readings = SensorReading::uniform(150.0);
        readings.0[LEFT] = 50.0;
        let command = controller.compute(&readings, 0.0);
        // ((100 - 50) / 100)² * -0.5 * 3
        assert!((command.turn_rate + 0.375).abs() < 1e-6);
    }

    #[test]
    fn turn_rate_is_clamped() {
        let mut gains = [0.0; GAIN_COUNT];
        gains[FRONT] = 10.0;
        let mut controller = RepulsionController::new(gains);
        let mut readings = SensorReading::uniform(150.0);
        readings.0[FRONT] = 0.0;
        assert_eq!(controller.compute(&readings, 0.0).turn_rate, 0.8);
        assert_eq!(controller.compute(&SensorReading::uniform(150.0), -3.0).turn_rate, -0.8);
    }

    #[test]
    fn non_finite_steering_goes_straight() {
        let mut controller = RepulsionController::new([f32::NAN; GAIN_COUNT]);
        let command = controller.compute(&SensorReading::uniform(10.0), 0.1);
        assert_eq!(command.turn_rate, 0.0);
    }
}
