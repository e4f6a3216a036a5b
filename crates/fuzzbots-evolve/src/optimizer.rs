//! Generation loop: evaluate every genome once, report, then breed the next population.

use fuzzbots_brain::Genome;
use fuzzbots_core::{EpisodeConfig, EpisodeOutcome, Scenario, run_episode};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fitness::FitnessWeights;
use crate::population::{Breeding, Population, Scored, evolve};
use crate::EvolveError;

/// Hyperparameters of a training run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: u32,
    /// Per-gene mutation probability.
    pub mutation_rate: f32,
    /// Mutation noise magnitude; `None` uses the genome's own default.
    pub mutation_scale: Option<f32>,
    pub elite_count: usize,
    /// Optional RNG seed for deterministic runs.
    pub rng_seed: Option<u64>,
    /// Evaluate genomes on the rayon pool rather than sequentially.
    pub parallel: bool,
    pub episode: EpisodeConfig,
    pub fitness: FitnessWeights,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 100,
            mutation_rate: 0.15,
            mutation_scale: None,
            elite_count: 4,
            rng_seed: None,
            parallel: true,
            episode: EpisodeConfig::default(),
            fitness: FitnessWeights::default(),
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), EvolveError> {
        if self.population_size < 2 {
            return Err(EvolveError::InvalidConfig(
                "population_size must be at least 2",
            ));
        }
        if self.generations == 0 {
            return Err(EvolveError::InvalidConfig("generations must be positive"));
        }
        if self.elite_count == 0 || self.elite_count > self.population_size {
            return Err(EvolveError::InvalidConfig(
                "elite_count must be between 1 and population_size",
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EvolveError::InvalidConfig(
                "mutation_rate must lie in [0, 1]",
            ));
        }
        if let Some(scale) = self.mutation_scale {
            if !(scale.is_finite() && scale >= 0.0) {
                return Err(EvolveError::InvalidConfig(
                    "mutation_scale must be finite and non-negative",
                ));
            }
        }
        self.episode.validate()?;
        self.fitness.validate()?;
        Ok(())
    }

    /// Returns the configured RNG seed, generating one from entropy if absent.
    fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}

/// Summary emitted after each generation has been evaluated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationReport {
    /// One-based generation number.
    pub generation: u32,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    /// Individuals whose episode reached the goal.
    pub goal_count: usize,
    pub best_genes: Vec<f32>,
}

/// Drives the generation loop for one genome family on one scenario.
pub struct Optimizer<G: Genome> {
    config: EvolutionConfig,
    scenario: Scenario,
    breeding: Breeding,
    rng: SmallRng,
    population: Vec<G>,
    last: Option<Population<G>>,
    champion: Option<Scored<G>>,
    generation: u32,
}

impl<G: Genome> Optimizer<G> {
    /// Validate the configuration and draw a random initial population.
    pub fn new(config: EvolutionConfig, scenario: Scenario) -> Result<Self, EvolveError> {
        config.validate()?;
        let mut rng = config.seeded_rng();
        let population = (0..config.population_size)
            .map(|_| G::random(&mut rng))
            .collect();
        Ok(Self::assemble(config, scenario, rng, population))
    }

    /// Start from caller-supplied genomes instead of a random population.
    pub fn with_population(
        config: EvolutionConfig,
        scenario: Scenario,
        population: Vec<G>,
    ) -> Result<Self, EvolveError> {
        config.validate()?;
        if population.len() != config.population_size {
            return Err(EvolveError::PopulationSize {
                expected: config.population_size,
                actual: population.len(),
            });
        }
        let rng = config.seeded_rng();
        Ok(Self::assemble(config, scenario, rng, population))
    }

    fn assemble(
        config: EvolutionConfig,
        scenario: Scenario,
        rng: SmallRng,
        population: Vec<G>,
    ) -> Self {
        let breeding = Breeding {
            population_size: config.population_size,
            elite_count: config.elite_count,
            mutation_rate: config.mutation_rate,
            mutation_scale: config
                .mutation_scale
                .unwrap_or_else(G::default_mutation_scale),
        };
        Self {
            config,
            scenario,
            breeding,
            rng,
            population,
            last: None,
            champion: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Genomes awaiting evaluation in the next generation.
    #[must_use]
    pub fn population(&self) -> &[G] {
        &self.population
    }

    /// The most recently evaluated population, best first.
    #[must_use]
    pub fn last_population(&self) -> Option<&Population<G>> {
        self.last.as_ref()
    }

    /// Best individual seen across all generations so far.
    #[must_use]
    pub fn champion(&self) -> Option<&Scored<G>> {
        self.champion.as_ref()
    }

    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.generation >= self.config.generations
    }

    /// Run one episode per genome and score it; results keep the input order.
    pub fn evaluate(&self, genomes: &[G]) -> Result<Vec<(Scored<G>, EpisodeOutcome)>, EvolveError> {
        let episode = &self.config.episode;
        let weights = &self.config.fitness;
        let scenario = &self.scenario;
        let score = |genome: &G| -> Result<(Scored<G>, EpisodeOutcome), EvolveError> {
            let result = run_episode(genome.controller(), scenario, episode)?;
            let fitness = weights.score(&result, episode.max_steps);
            Ok((
                Scored {
                    genome: genome.clone(),
                    fitness,
                },
                result.outcome,
            ))
        };
        if self.config.parallel {
            genomes.par_iter().map(score).collect()
        } else {
            genomes.iter().map(score).collect()
        }
    }

    /// Evaluate the current population, record the report and breed the next population.
    pub fn step(&mut self) -> Result<GenerationReport, EvolveError> {
        let evaluated = self.evaluate(&self.population)?;
        let goal_count = evaluated
            .iter()
            .filter(|(_, outcome)| *outcome == EpisodeOutcome::Goal)
            .count();
        let scored = Population::new(evaluated.into_iter().map(|(scored, _)| scored).collect());
        let best = scored.best().cloned().ok_or(EvolveError::EmptyPopulation)?;

        self.generation += 1;
        let report = GenerationReport {
            generation: self.generation,
            best_fitness: best.fitness,
            mean_fitness: scored.mean_fitness(),
            goal_count,
            best_genes: best.genome.to_vec(),
        };
        info!(
            genome = G::KIND,
            generation = report.generation,
            best = report.best_fitness,
            mean = report.mean_fitness,
            goals = report.goal_count,
            "generation evaluated"
        );

        if self
            .champion
            .as_ref()
            .is_none_or(|champion| best.fitness > champion.fitness)
        {
            self.champion = Some(best);
        }
        self.population = evolve(&scored, &self.breeding, &mut self.rng);
        self.last = Some(scored);
        Ok(report)
    }

    /// Run every remaining generation, handing each report to `observer`, and return the champion.
    pub fn run<F>(&mut self, mut observer: F) -> Result<Scored<G>, EvolveError>
    where
        F: FnMut(&GenerationReport) -> Result<(), EvolveError>,
    {
        while !self.is_finished() {
            let report = self.step()?;
            observer(&report)?;
        }
        self.champion.clone().ok_or(EvolveError::EmptyPopulation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzbots_brain::{FuzzyGenome, GainVector};
    use fuzzbots_core::MapPreset;

    fn quick_config(seed: u64) -> EvolutionConfig {
        EvolutionConfig {
            population_size: 6,
            generations: 3,
            elite_count: 2,
            rng_seed: Some(seed),
            episode: EpisodeConfig {
                max_steps: 150,
                ..EpisodeConfig::default()
            },
            ..EvolutionConfig::default()
        }
    }

    #[test]
    fn validate_rejects_bad_hyperparameters() {
        let mut config = EvolutionConfig::default();
        config.elite_count = 0;
        assert!(config.validate().is_err());
        let mut config = EvolutionConfig::default();
        config.mutation_rate = 1.5;
        assert!(config.validate().is_err());
        let mut config = EvolutionConfig::default();
        config.population_size = 1;
        assert!(config.validate().is_err());
        let mut config = EvolutionConfig::default();
        config.episode.goal_radius = -1.0;
        assert!(matches!(config.validate(), Err(EvolveError::Config(_))));
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn population_size_mismatch_is_rejected() {
        let result = Optimizer::with_population(
            quick_config(1),
            Scenario::preset(MapPreset::Simple),
            vec![FuzzyGenome::default(); 3],
        );
        assert!(matches!(
            result,
            Err(EvolveError::PopulationSize {
                expected: 6,
                actual: 3
            })
        ));
    }

    #[test]
    fn step_reports_and_refills_population() {
        let mut optimizer: Optimizer<FuzzyGenome> =
            Optimizer::new(quick_config(42), Scenario::preset(MapPreset::Simple))
                .expect("optimizer");
        let report = optimizer.step().expect("step");
        assert_eq!(report.generation, 1);
        assert_eq!(report.best_genes.len(), 4);
        assert!(report.best_fitness >= report.mean_fitness);
        assert_eq!(optimizer.population().len(), 6);
        let last = optimizer.last_population().expect("evaluated");
        assert_eq!(last.len(), 6);
        // Elites lead the next population unchanged.
        assert_eq!(optimizer.population()[0], last.members()[0].genome);
        assert_eq!(optimizer.population()[1], last.members()[1].genome);
    }

    #[test]
    fn parallel_and_sequential_evaluation_agree() {
        let scenario = Scenario::preset(MapPreset::Simple);
        let genomes = vec![FuzzyGenome::default(), FuzzyGenome([20.0, 5.0, 30.0, 60.0])];
        let mut config = quick_config(7);
        config.population_size = 2;
        config.elite_count = 1;
        let parallel = Optimizer::with_population(config.clone(), scenario.clone(), genomes.clone())
            .expect("optimizer");
        config.parallel = false;
        let sequential =
            Optimizer::with_population(config, scenario, genomes.clone()).expect("optimizer");
        assert_eq!(
            parallel.evaluate(&genomes).expect("parallel"),
            sequential.evaluate(&genomes).expect("sequential")
        );
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = || {
            let mut optimizer: Optimizer<GainVector> =
                Optimizer::new(quick_config(99), Scenario::preset(MapPreset::Simple))
                    .expect("optimizer");
            let mut reports = Vec::new();
            let champion = optimizer
                .run(|report| {
                    reports.push(report.clone());
                    Ok(())
                })
                .expect("run");
            (champion, reports)
        };
        let (champion_a, reports_a) = run();
        let (champion_b, reports_b) = run();
        assert_eq!(champion_a, champion_b);
        assert_eq!(reports_a, reports_b);
        assert_eq!(reports_a.len(), 3);
    }
}
