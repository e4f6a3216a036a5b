//! Head-to-head races between two controllers on randomized scenarios.

use fuzzbots_core::{
    ConfigError, Controller, EpisodeConfig, EpisodeOutcome, EpisodeResult, Scenario, run_episode,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Who won a single round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RoundWinner {
    Baseline,
    Challenger,
    Draw,
    /// Neither side produced a scoring outcome (a timeout was involved).
    NoContest,
}

/// Decide a round. Reaching the goal beats crashing, the faster goal wins when both arrive
/// (the challenger takes equal times), and a double crash is a draw. Timeouts never score.
#[must_use]
pub fn judge(baseline: &EpisodeResult, challenger: &EpisodeResult) -> RoundWinner {
    use EpisodeOutcome::{Collision, Goal};
    match (baseline.outcome, challenger.outcome) {
        (Goal, Collision) => RoundWinner::Baseline,
        (Collision, Goal) => RoundWinner::Challenger,
        (Collision, Collision) => RoundWinner::Draw,
        (Goal, Goal) if baseline.step_count < challenger.step_count => RoundWinner::Baseline,
        (Goal, Goal) => RoundWinner::Challenger,
        _ => RoundWinner::NoContest,
    }
}

/// Both results of one round plus its verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundRecord {
    pub round: u32,
    pub baseline: EpisodeResult,
    pub challenger: EpisodeResult,
    pub winner: RoundWinner,
}

/// Aggregate tallies over every round.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComparisonSummary {
    pub rounds: u32,
    pub baseline_goals: u32,
    pub challenger_goals: u32,
    pub baseline_wins: u32,
    pub challenger_wins: u32,
    pub draws: u32,
    pub records: Vec<RoundRecord>,
}

impl ComparisonSummary {
    fn record(&mut self, record: RoundRecord) {
        self.rounds += 1;
        self.baseline_goals += u32::from(record.baseline.outcome == EpisodeOutcome::Goal);
        self.challenger_goals += u32::from(record.challenger.outcome == EpisodeOutcome::Goal);
        match record.winner {
            RoundWinner::Baseline => self.baseline_wins += 1,
            RoundWinner::Challenger => self.challenger_wins += 1,
            RoundWinner::Draw => self.draws += 1,
            RoundWinner::NoContest => {}
        }
        self.records.push(record);
    }

    /// Fraction of rounds in which the baseline reached the goal.
    #[must_use]
    pub fn baseline_success_rate(&self) -> f32 {
        rate(self.baseline_goals, self.rounds)
    }

    #[must_use]
    pub fn challenger_success_rate(&self) -> f32 {
        rate(self.challenger_goals, self.rounds)
    }
}

fn rate(goals: u32, rounds: u32) -> f32 {
    if rounds == 0 {
        0.0
    } else {
        goals as f32 / rounds as f32
    }
}

/// Settings for a comparison session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonConfig {
    pub rounds: u32,
    /// Random blocks added to the base map each round.
    pub random_obstacles: usize,
    /// Sample a fresh start pose each round instead of the base map's.
    pub random_start: bool,
    pub episode: EpisodeConfig,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            random_obstacles: 3,
            random_start: true,
            episode: EpisodeConfig::default(),
        }
    }
}

/// Race fresh controllers from `baseline` and `challenger` on `rounds` randomized copies of `base`.
pub fn compare<A, B, FA, FB>(
    base: &Scenario,
    config: &ComparisonConfig,
    rng: &mut dyn RngCore,
    mut baseline: FA,
    mut challenger: FB,
) -> Result<ComparisonSummary, ConfigError>
where
    A: Controller,
    B: Controller,
    FA: FnMut() -> A,
    FB: FnMut() -> B,
{
    config.episode.validate()?;
    let mut summary = ComparisonSummary::default();
    for round in 1..=config.rounds {
        let mut scenario = base.clone();
        scenario.add_random_obstacles(rng, config.random_obstacles);
        if config.random_start {
            if let Some(start) = scenario.random_start(rng) {
                scenario.start = start;
            }
        }

        let baseline_result = run_episode(baseline(), &scenario, &config.episode)?;
        let challenger_result = run_episode(challenger(), &scenario, &config.episode)?;
        let winner = judge(&baseline_result, &challenger_result);
        debug!(
            round,
            baseline = baseline_result.outcome.label(),
            challenger = challenger_result.outcome.label(),
            ?winner,
            "round finished"
        );
        summary.record(RoundRecord {
            round,
            baseline: baseline_result,
            challenger: challenger_result,
            winner,
        });
    }
    Ok(summary)
}
