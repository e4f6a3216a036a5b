use fuzzbots_brain::{DEFAULT_PARAMETERS, FuzzyController, FuzzyGenome, GainVector, Genome};
use fuzzbots_core::{
    Controller, Episode, EpisodeConfig, EpisodeOutcome, MapPreset, Scenario, run_episode,
};

#[test]
fn default_fuzzy_controller_reaches_goal_on_empty_map() {
    let scenario = Scenario::preset(MapPreset::Empty);
    let config = EpisodeConfig::default();
    let result = run_episode(FuzzyController::new(DEFAULT_PARAMETERS), &scenario, &config)
        .expect("episode");
    assert_eq!(result.outcome, EpisodeOutcome::Goal);
    assert!(result.step_count < 500, "took {} ticks", result.step_count);
}

#[test]
fn heading_error_shrinks_until_inside_straight_band() {
    let scenario = Scenario::preset(MapPreset::Empty);
    let config = EpisodeConfig::default();
    let mut episode = Episode::new(&scenario, &config, FuzzyController::new(DEFAULT_PARAMETERS))
        .expect("episode");

    let mut previous: Option<f32> = None;
    while let Some(report) = episode.tick() {
        let error = report.goal_angle_error.abs();
        if let Some(prev) = previous {
            if prev > 0.3 {
                assert!(error < prev, "error grew from {prev} to {error}");
            }
        }
        previous = Some(error);
    }
    assert_eq!(episode.outcome(), EpisodeOutcome::Goal);
}

#[test]
fn default_fuzzy_controller_solves_simple_map() {
    let scenario = Scenario::preset(MapPreset::Simple);
    let config = EpisodeConfig::default();
    let result = run_episode(FuzzyGenome::default().controller(), &scenario, &config)
        .expect("episode");
    assert_eq!(result.outcome, EpisodeOutcome::Goal);
    assert!(result.final_distance < config.goal_radius);
}

#[test]
fn diagnostics_follow_the_episode() {
    let scenario = Scenario::preset(MapPreset::Complex);
    let config = EpisodeConfig::default();
    let mut episode = Episode::new(&scenario, &config, FuzzyController::new(DEFAULT_PARAMETERS))
        .expect("episode");
    let report = episode.tick().expect("first tick");
    let diagnostics = episode.controller().diagnostics().expect("diagnostics");
    assert_eq!(diagnostics.variables.len(), 6);
    for variable in &diagnostics.variables {
        assert!(variable.degrees.iter().all(|d| (0.0..=1.0).contains(d)));
    }
    assert!(report.command.speed >= 0.0);
}

#[test]
fn repulsion_genome_runs_a_full_episode() {
    let scenario = Scenario::preset(MapPreset::Simple);
    let config = EpisodeConfig {
        max_steps: 200,
        ..EpisodeConfig::default()
    };
    let result = run_episode(GainVector::default().controller(), &scenario, &config)
        .expect("episode");
    assert!(result.outcome.is_terminal());
    assert!(result.step_count <= 200);
    assert!(result.path_length.is_finite());
}
