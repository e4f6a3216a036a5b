//! Scalar fitness of an episode result.

use fuzzbots_core::{ConfigError, EpisodeOutcome, EpisodeResult};
use serde::{Deserialize, Serialize};

/// Reward and penalty magnitudes. All values are named defaults carried over from hand tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitnessWeights {
    /// Multiplier on the distance closed toward the goal.
    pub progress_weight: f32,
    pub goal_bonus: f32,
    /// Reward per unused step when the goal is reached.
    pub goal_step_reward: f32,
    pub collision_penalty: f32,
    /// Loitering is only judged once an episode has run longer than this.
    pub stagnation_min_steps: u32,
    /// Distinct cells per step below which the episode counts as loitering.
    pub stagnation_ratio: f32,
    pub stagnation_penalty: f32,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            progress_weight: 2.0,
            goal_bonus: 5000.0,
            goal_step_reward: 2.0,
            collision_penalty: 200.0,
            stagnation_min_steps: 50,
            stagnation_ratio: 0.15,
            stagnation_penalty: 1000.0,
        }
    }
}

impl FitnessWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            self.progress_weight,
            self.goal_bonus,
            self.goal_step_reward,
            self.collision_penalty,
            self.stagnation_penalty,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::InvalidConfig(
                "fitness weights must be finite and non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.stagnation_ratio) {
            return Err(ConfigError::InvalidConfig(
                "stagnation_ratio must lie in [0, 1]",
            ));
        }
        Ok(())
    }

    /// Score `result` from an episode whose step budget was `max_steps`. Never negative.
    #[must_use]
    pub fn score(&self, result: &EpisodeResult, max_steps: u32) -> f32 {
        let mut fitness =
            self.progress_weight * (result.start_distance - result.final_distance);

        match result.outcome {
            EpisodeOutcome::Goal => {
                let unused = max_steps.saturating_sub(result.step_count);
                fitness += self.goal_bonus + self.goal_step_reward * unused as f32;
            }
            EpisodeOutcome::Collision => fitness -= self.collision_penalty,
            EpisodeOutcome::Timeout | EpisodeOutcome::Running => {}
        }

        if result.step_count > self.stagnation_min_steps {
            let ratio = result.distinct_cells as f32 / result.step_count as f32;
            if ratio < self.stagnation_ratio {
                fitness -= self.stagnation_penalty;
            }
        }

        if fitness.is_finite() { fitness.max(0.0) } else { 0.0 }
    }
}
