//! Mamdani-style fuzzy navigation controller with a fixed rule bank.

use fuzzbots_core::{
    ControlCommand, ControlDiagnostics, Controller, FRONT, FRONT_LEFT, FRONT_RIGHT, LEFT, RIGHT,
    SENSOR_COUNT, SensorReading,
};
use serde::{Deserialize, Serialize};

use crate::membership::{LinguisticVariable, MembershipSet};

const CLOSE: usize = 0;
const MEDIUM: usize = 1;
const FAR: usize = 2;

const GOAL_RIGHT: usize = 0;
const GOAL_STRAIGHT: usize = 1;
const GOAL_LEFT: usize = 2;

const SENSOR_NAMES: [&str; SENSOR_COUNT] = ["front", "front_left", "front_right", "left", "right"];

/// Tunable distance breakpoints: `(close_max, med_min, med_max, far_min)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ControllerParameters {
    pub close_max: f32,
    pub med_min: f32,
    pub med_max: f32,
    pub far_min: f32,
}

/// Hand-tuned parameters that work on the simple map.
pub const DEFAULT_PARAMETERS: ControllerParameters = ControllerParameters {
    close_max: 40.0,
    med_min: 10.0,
    med_max: 50.0,
    far_min: 40.0,
};

impl Default for ControllerParameters {
    fn default() -> Self {
        DEFAULT_PARAMETERS
    }
}

impl ControllerParameters {
    #[must_use]
    pub const fn new(close_max: f32, med_min: f32, med_max: f32, far_min: f32) -> Self {
        Self {
            close_max,
            med_min,
            med_max,
            far_min,
        }
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.close_max, self.med_min, self.med_max, self.far_min]
    }

    /// Enforce `med_min < med_max` and a non-negative close threshold.
    #[must_use]
    pub fn repaired(mut self, margin: f32) -> Self {
        if self.med_min >= self.med_max {
            self.med_min = self.med_max - margin;
        }
        self.close_max = self.close_max.max(0.0);
        self
    }
}

impl From<[f32; 4]> for ControllerParameters {
    fn from([close_max, med_min, med_max, far_min]: [f32; 4]) -> Self {
        Self::new(close_max, med_min, med_max, far_min)
    }
}

/// Fixed shape constants around the tunable breakpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FuzzyTuning {
    /// Both front and front-left must be Far above this degree to drive Fast.
    pub fast_cutoff: f32,
    /// Speed emitted when no speed rule fires.
    pub fallback_speed: f32,
    pub med_peak: f32,
    pub far_peak: f32,
    pub far_max: f32,
    /// Gap restored between `med_min` and `med_max` when they cross.
    pub repair_margin: f32,
    pub angle_right: (f32, f32, f32),
    pub angle_straight: (f32, f32, f32),
    pub angle_left: (f32, f32, f32),
}

impl Default for FuzzyTuning {
    fn default() -> Self {
        Self {
            fast_cutoff: 0.5,
            fallback_speed: 2.0,
            med_peak: 40.0,
            far_peak: 100.0,
            far_max: 1000.0,
            repair_margin: 1.0,
            angle_right: (-3.14, -1.0, -0.1),
            angle_straight: (-0.3, 0.0, 0.3),
            angle_left: (0.1, 1.0, 3.14),
        }
    }
}

/// Steering consequents; positive turn rates are toward +heading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TurnAction {
    HardRight,
    SoftRight,
    Straight,
    SoftLeft,
    HardLeft,
}

impl TurnAction {
    pub const ALL: [Self; 5] = [
        Self::HardRight,
        Self::SoftRight,
        Self::Straight,
        Self::SoftLeft,
        Self::HardLeft,
    ];
    const CRISP: [f32; 5] = [-0.8, -0.3, 0.0, 0.3, 0.8];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn crisp(self) -> f32 {
        Self::CRISP[self as usize]
    }
}

/// Speed consequents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SpeedAction {
    Stop,
    Slow,
    Medium,
    Fast,
}

impl SpeedAction {
    pub const ALL: [Self; 4] = [Self::Stop, Self::Slow, Self::Medium, Self::Fast];
    const CRISP: [f32; 4] = [0.0, 2.0, 4.0, 7.0];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn crisp(self) -> f32 {
        Self::CRISP[self as usize]
    }
}

/// Intermediate state of one evaluation: input degrees and aggregated rule strengths.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct Fuzzification {
    /// `[close, medium, far]` per sensor, in sweep order.
    pub distances: [[f32; 3]; SENSOR_COUNT],
    /// `[right, straight, left]` for the goal angle error.
    pub goal: [f32; 3],
    pub turn_strengths: [f32; 5],
    pub speed_strengths: [f32; 4],
}

impl Fuzzification {
    /// Max-aggregate a rule's firing strength into both of its consequent buckets.
    fn fire(&mut self, strength: f32, turn: TurnAction, speed: SpeedAction) {
        let slot = &mut self.turn_strengths[turn.index()];
        *slot = slot.max(strength);
        let slot = &mut self.speed_strengths[speed.index()];
        *slot = slot.max(strength);
    }

    fn close(&self, sensor: usize) -> f32 {
        self.distances[sensor][CLOSE]
    }

    fn medium(&self, sensor: usize) -> f32 {
        self.distances[sensor][MEDIUM]
    }

    fn far(&self, sensor: usize) -> f32 {
        self.distances[sensor][FAR]
    }

    fn safe(&self, sensor: usize) -> f32 {
        self.far(sensor).max(self.medium(sensor))
    }
}

/// Weighted average of crisp singletons, or `fallback` when nothing fired.
fn defuzzify(strengths: &[f32], crisp: &[f32], fallback: f32) -> f32 {
    let (num, den) = strengths
        .iter()
        .zip(crisp)
        .fold((0.0_f32, 0.0_f32), |(num, den), (s, v)| (num + s * v, den + s));
    if den > 0.0 { num / den } else { fallback }
}

/// Fuzzy controller parameterized by four distance breakpoints.
#[derive(Debug, Clone)]
pub struct FuzzyController {
    parameters: ControllerParameters,
    tuning: FuzzyTuning,
    distance: LinguisticVariable,
    angle: LinguisticVariable,
    last: Option<Fuzzification>,
}

impl FuzzyController {
    pub const KIND: &'static str = "fuzzy";

    #[must_use]
    pub fn new(parameters: ControllerParameters) -> Self {
        Self::with_tuning(parameters, FuzzyTuning::default())
    }

    /// Build the distance and angle variables; parameters are repaired first.
    #[must_use]
    pub fn with_tuning(parameters: ControllerParameters, tuning: FuzzyTuning) -> Self {
        let parameters = parameters.repaired(tuning.repair_margin);
        let distance = LinguisticVariable::new(
            "distance",
            ["close", "medium", "far"],
            [
                MembershipSet::new(0.0, 0.0, parameters.close_max),
                MembershipSet::new(parameters.med_min, tuning.med_peak, parameters.med_max),
                MembershipSet::new(parameters.far_min, tuning.far_peak, tuning.far_max),
            ],
        );
        let (ra, rb, rc) = tuning.angle_right;
        let (sa, sb, sc) = tuning.angle_straight;
        let (la, lb, lc) = tuning.angle_left;
        let angle = LinguisticVariable::new(
            "goal_angle",
            ["right", "straight", "left"],
            [
                MembershipSet::new(ra, rb, rc),
                MembershipSet::new(sa, sb, sc),
                MembershipSet::new(la, lb, lc),
            ],
        );
        Self {
            parameters,
            tuning,
            distance,
            angle,
            last: None,
        }
    }

    /// Parameters after repair.
    #[must_use]
    pub const fn parameters(&self) -> ControllerParameters {
        self.parameters
    }

    #[must_use]
    pub const fn last_fuzzification(&self) -> Option<&Fuzzification> {
        self.last.as_ref()
    }

    /// Pure evaluation: fuzzify, run the rule bank, defuzzify.
    #[must_use]
    pub fn evaluate(
        &self,
        readings: &SensorReading,
        goal_angle_error: f32,
    ) -> (ControlCommand, Fuzzification) {
        let mut fz = Fuzzification {
            distances: readings.0.map(|d| self.distance.fuzzify(d)),
            goal: self.angle.fuzzify(goal_angle_error),
            ..Fuzzification::default()
        };

        // Front blocked: hard turn away from the nearer diagonal.
        let escape = if readings.front_left() < readings.front_right() {
            TurnAction::HardRight
        } else {
            TurnAction::HardLeft
        };
        fz.fire(fz.close(FRONT), escape, SpeedAction::Slow);

        // Corridor and side clearance.
        fz.fire(fz.close(LEFT).min(fz.close(RIGHT)), TurnAction::Straight, SpeedAction::Medium);
        fz.fire(fz.close(LEFT).min(fz.far(RIGHT)), TurnAction::SoftRight, SpeedAction::Medium);
        fz.fire(fz.close(RIGHT).min(fz.far(LEFT)), TurnAction::SoftLeft, SpeedAction::Medium);
        fz.fire(fz.close(FRONT_LEFT), TurnAction::SoftRight, SpeedAction::Slow);
        fz.fire(fz.close(FRONT_RIGHT), TurnAction::SoftLeft, SpeedAction::Slow);

        // Wall following.
        fz.fire(
            fz.close(RIGHT).min(fz.close(FRONT_RIGHT)).min(fz.medium(FRONT)),
            TurnAction::SoftLeft,
            SpeedAction::Slow,
        );
        fz.fire(
            fz.close(LEFT).min(fz.close(FRONT_LEFT)).min(fz.medium(FRONT)),
            TurnAction::SoftRight,
            SpeedAction::Slow,
        );

        // Goal seeking when the way ahead is clear.
        let safe = fz.safe(FRONT).min(fz.safe(FRONT_LEFT)).min(fz.safe(FRONT_RIGHT));
        let cruise = if fz.far(FRONT).min(fz.far(FRONT_LEFT)) > self.tuning.fast_cutoff {
            SpeedAction::Fast
        } else {
            SpeedAction::Medium
        };
        fz.fire(safe.min(fz.goal[GOAL_LEFT]), TurnAction::SoftLeft, cruise);
        fz.fire(safe.min(fz.goal[GOAL_RIGHT]), TurnAction::SoftRight, cruise);
        fz.fire(safe.min(fz.goal[GOAL_STRAIGHT]), TurnAction::Straight, cruise);

        let turn_rate = defuzzify(
            &fz.turn_strengths,
            &TurnAction::ALL.map(TurnAction::crisp),
            0.0,
        );
        let speed = defuzzify(
            &fz.speed_strengths,
            &SpeedAction::ALL.map(SpeedAction::crisp),
            self.tuning.fallback_speed,
        );
        (ControlCommand::new(speed, turn_rate), fz)
    }
}

impl Controller for FuzzyController {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn compute(&mut self, readings: &SensorReading, goal_angle_error: f32) -> ControlCommand {
        let (command, fz) = self.evaluate(readings, goal_angle_error);
        self.last = Some(fz);
        command
    }

    fn diagnostics(&self) -> Option<ControlDiagnostics> {
        let fz = self.last.as_ref()?;
        let mut variables: Vec<_> = SENSOR_NAMES
            .iter()
            .zip(fz.distances)
            .map(|(name, degrees)| self.distance.describe(*name, degrees))
            .collect();
        variables.push(self.angle.describe("goal_angle", fz.goal));
        Some(ControlDiagnostics { variables })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> FuzzyController {
        FuzzyController::new(DEFAULT_PARAMETERS)
    }

    #[test]
    fn open_space_heads_straight_at_speed() {
        let (command, fz) = controller().evaluate(&SensorReading::uniform(150.0), 0.0);
        assert!(command.turn_rate.abs() < 1e-6);
        assert!(
            command.speed == SpeedAction::Fast.crisp()
                || command.speed == SpeedAction::Medium.crisp()
        );
        assert!(fz.speed_strengths[SpeedAction::Fast.index()] > 0.9);
    }

    #[test]
    fn medium_when_front_left_not_clearly_far() {
        // Far degree of 60 under far_min = 40 is 20 / 60, below the cutoff.
        let readings = SensorReading([150.0, 60.0, 150.0, 150.0, 150.0]);
        let (command, _) = controller().evaluate(&readings, 0.0);
        assert!((command.speed - SpeedAction::Medium.crisp()).abs() < 1e-5);
        assert!(command.turn_rate.abs() < 1e-6);
    }

    #[test]
    fn blocked_front_turns_away_from_nearer_diagonal() {
        let left_near = SensorReading([5.0, 20.0, 100.0, 150.0, 150.0]);
        let (command, fz) = controller().evaluate(&left_near, 0.0);
        assert!(command.turn_rate < 0.0);
        assert!(fz.turn_strengths[TurnAction::HardRight.index()] > 0.8);
        assert_eq!(fz.turn_strengths[TurnAction::HardLeft.index()], 0.0);

        let right_near = SensorReading([5.0, 100.0, 20.0, 150.0, 150.0]);
        let (command, _) = controller().evaluate(&right_near, 0.0);
        assert!(command.turn_rate > 0.0);
    }

    #[test]
    fn equal_diagonals_escape_left() {
        let readings = SensorReading([5.0, 100.0, 100.0, 150.0, 150.0]);
        let (_, fz) = controller().evaluate(&readings, 0.0);
        assert!(fz.turn_strengths[TurnAction::HardLeft.index()] > 0.8);
        assert_eq!(fz.turn_strengths[TurnAction::HardRight.index()], 0.0);
    }

    #[test]
    fn goal_on_left_steers_left() {
        let (command, fz) = controller().evaluate(&SensorReading::uniform(150.0), 1.0);
        assert!(command.turn_rate > 0.0);
        assert!((fz.goal[GOAL_LEFT] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn nothing_fires_uses_fallbacks() {
        // Readings in the dead zone between the close foot and every other set.
        let params = ControllerParameters::new(5.0, 60.0, 70.0, 900.0);
        let controller = FuzzyController::new(params);
        let (command, fz) = controller.evaluate(&SensorReading::uniform(30.0), 0.0);
        assert!(fz.turn_strengths.iter().all(|s| *s == 0.0));
        assert_eq!(command.turn_rate, 0.0);
        assert_eq!(command.speed, 2.0);
    }

    #[test]
    fn crossed_medium_bounds_are_repaired() {
        let controller = FuzzyController::new(ControllerParameters::new(40.0, 60.0, 50.0, 40.0));
        let params = controller.parameters();
        assert_eq!(params.med_min, 49.0);
        assert!(params.med_min < params.med_max);
        let negative = ControllerParameters::new(-5.0, 10.0, 50.0, 40.0).repaired(1.0);
        assert_eq!(negative.close_max, 0.0);
    }

    #[test]
    fn medium_upper_foot_below_peak_is_a_rising_ramp() {
        let controller = FuzzyController::new(ControllerParameters::new(40.0, 10.0, 30.0, 40.0));
        let (_, fz) = controller.evaluate(&SensorReading::uniform(20.0), 0.0);
        assert!((fz.distances[FRONT][MEDIUM] - 1.0 / 3.0).abs() < 1e-6);
        let (_, fz) = controller.evaluate(&SensorReading::uniform(30.0), 0.0);
        assert_eq!(fz.distances[FRONT][MEDIUM], 0.0);
    }

    #[test]
    fn compute_records_diagnostics() {
        let mut controller = controller();
        assert!(controller.diagnostics().is_none());
        let command = controller.compute(&SensorReading::uniform(150.0), 0.0);
        assert_eq!(command, controller.evaluate(&SensorReading::uniform(150.0), 0.0).0);
        let diagnostics = controller.diagnostics().expect("diagnostics");
        assert_eq!(diagnostics.variables.len(), SENSOR_COUNT + 1);
        assert_eq!(diagnostics.variables[0].name, "front");
        assert_eq!(diagnostics.variables[5].terms, ["right", "straight", "left"]);
        assert_eq!(diagnostics.variables[5].degrees, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn action_tables_line_up() {
        assert_eq!(TurnAction::HardRight.crisp(), -0.8);
        assert_eq!(TurnAction::SoftLeft.crisp(), 0.3);
        assert_eq!(SpeedAction::Fast.crisp(), 7.0);
        assert_eq!(SpeedAction::Stop.crisp(), 0.0);
    }
}
