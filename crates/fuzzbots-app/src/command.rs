//! Subcommand implementations. Each returns a summary; printing is left to the binary.

use anyhow::{Context, Result};
use clap::Args;
use fuzzbots_brain::{FuzzyGenome, GainVector, Genome};
use fuzzbots_core::{EpisodeConfig, EpisodeResult, Pose, Scenario, run_episode};
use fuzzbots_evolve::{ComparisonConfig, ComparisonSummary, EvolutionConfig, EvolveError, Optimizer};
use fuzzbots_storage::{HistoryWriter, load_genome, save_genome};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::PathBuf;
use tracing::info;

use crate::{GenomeChoice, MapChoice, parse_start};

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Genome family to optimize.
    #[arg(long, value_enum, default_value_t = GenomeChoice::Fuzzy)]
    pub genome: GenomeChoice,
    /// Map every individual is evaluated on.
    #[arg(long, value_enum, default_value_t = MapChoice::Complex)]
    pub map: MapChoice,
    #[arg(long, default_value_t = 100)]
    pub generations: u32,
    #[arg(long, default_value_t = 20)]
    pub population: usize,
    /// Individuals copied unchanged into the next generation.
    #[arg(long, default_value_t = 4)]
    pub elite: usize,
    /// Per-gene mutation probability.
    #[arg(long, default_value_t = 0.15)]
    pub mutation_rate: f32,
    /// Mutation magnitude; defaults to the genome family's own scale.
    #[arg(long)]
    pub mutation_scale: Option<f32>,
    #[arg(long, default_value_t = 600)]
    pub max_steps: u32,
    /// RNG seed; omit for a random run.
    #[arg(long, env = "FUZZBOTS_SEED")]
    pub seed: Option<u64>,
    /// Where the best genome is written.
    #[arg(long, default_value = "best_params.json")]
    pub out: PathBuf,
    /// Optional JSON-lines file receiving one report per generation.
    #[arg(long)]
    pub history: Option<PathBuf>,
    /// Evaluate genomes on the current thread only.
    #[arg(long)]
    pub sequential: bool,
}

impl TrainArgs {
    fn evolution_config(&self) -> EvolutionConfig {
        EvolutionConfig {
            population_size: self.population,
            generations: self.generations,
            mutation_rate: self.mutation_rate,
            mutation_scale: self.mutation_scale,
            elite_count: self.elite,
            rng_seed: self.seed,
            parallel: !self.sequential,
            episode: EpisodeConfig {
                max_steps: self.max_steps,
                ..EpisodeConfig::default()
            },
            ..EvolutionConfig::default()
        }
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSummary {
    pub kind: &'static str,
    pub fitness: f32,
    pub genes: Vec<f32>,
    pub generations: u32,
    pub out: PathBuf,
}

pub fn train(args: &TrainArgs) -> Result<TrainSummary> {
    match args.genome {
        GenomeChoice::Fuzzy => train_genome::<FuzzyGenome>(args),
        GenomeChoice::Repulsion => train_genome::<GainVector>(args),
    }
}

fn train_genome<G: Genome>(args: &TrainArgs) -> Result<TrainSummary> {
    let scenario = Scenario::preset(args.map.into());
    let mut optimizer: Optimizer<G> = Optimizer::new(args.evolution_config(), scenario)
        .context("invalid training configuration")?;
    let mut history = args
        .history
        .as_ref()
        .map(HistoryWriter::create)
        .transpose()
        .context("failed to create history file")?;

    info!(
        genome = G::KIND,
        map = ?args.map,
        generations = args.generations,
        population = args.population,
        "training started"
    );
    let champion = optimizer.run(|report| {
        if let Some(writer) = history.as_mut() {
            writer
                .record(report)
                .map_err(|err| EvolveError::Observer(err.to_string()))?;
        }
        Ok(())
    })?;

    save_genome(&args.out, &champion.genome)
        .with_context(|| format!("failed to save genome to {}", args.out.display()))?;
    Ok(TrainSummary {
        kind: G::KIND,
        fitness: champion.fitness,
        genes: champion.genome.to_vec(),
        generations: optimizer.generation(),
        out: args.out.clone(),
    })
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Genome file; the built-in defaults are used when omitted.
    #[arg(long)]
    pub params: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = GenomeChoice::Fuzzy)]
    pub genome: GenomeChoice,
    #[arg(long, value_enum, default_value_t = MapChoice::Complex)]
    pub map: MapChoice,
    /// Start pose as `x,y,heading`.
    #[arg(long, value_parser = parse_start, allow_hyphen_values = true)]
    pub start: Option<Pose>,
    #[arg(long, default_value_t = 600)]
    pub max_steps: u32,
}

/// One episode plus the genes that drove it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub kind: &'static str,
    pub genes: Vec<f32>,
    pub result: EpisodeResult,
}

pub fn run(args: &RunArgs) -> Result<RunSummary> {
    match args.genome {
        GenomeChoice::Fuzzy => run_genome::<FuzzyGenome>(args, FuzzyGenome::default()),
        GenomeChoice::Repulsion => run_genome::<GainVector>(args, GainVector::default()),
    }
}

fn run_genome<G: Genome>(args: &RunArgs, fallback: G) -> Result<RunSummary> {
    let genome = match &args.params {
        Some(path) => load_genome::<G>(path).with_context(|| {
            format!("failed to load {} genome from {}", G::KIND, path.display())
        })?,
        None => fallback,
    };
    let mut scenario = Scenario::preset(args.map.into());
    if let Some(start) = args.start {
        scenario.start = start;
    }
    let config = EpisodeConfig {
        max_steps: args.max_steps,
        ..EpisodeConfig::default()
    };
    let result = run_episode(genome.controller(), &scenario, &config)
        .context("invalid episode configuration")?;
    Ok(RunSummary {
        kind: G::KIND,
        genes: genome.to_vec(),
        result,
    })
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Tuned fuzzy parameters raced against the hand-tuned defaults.
    #[arg(long, default_value = "best_params.json")]
    pub params: PathBuf,
    #[arg(long, default_value_t = 10)]
    pub rounds: u32,
    #[arg(long, env = "FUZZBOTS_SEED")]
    pub seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = MapChoice::Complex)]
    pub map: MapChoice,
    /// Random blocks added to the map each round.
    #[arg(long, default_value_t = 3)]
    pub obstacles: usize,
    /// Keep the map's start pose instead of sampling one per round.
    #[arg(long)]
    pub fixed_start: bool,
    #[arg(long, default_value_t = 600)]
    pub max_steps: u32,
}

pub fn compare(args: &CompareArgs) -> Result<ComparisonSummary> {
    let tuned: FuzzyGenome = load_genome(&args.params).with_context(|| {
        format!(
            "failed to load tuned parameters from {}",
            args.params.display()
        )
    })?;
    let baseline = FuzzyGenome::default();
    let config = ComparisonConfig {
        rounds: args.rounds,
        random_obstacles: args.obstacles,
        random_start: !args.fixed_start,
        episode: EpisodeConfig {
            max_steps: args.max_steps,
            ..EpisodeConfig::default()
        },
    };
    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::seed_from_u64(rand::random()),
    };
    let base = Scenario::preset(args.map.into());
    let summary = fuzzbots_evolve::compare(
        &base,
        &config,
        &mut rng,
        || baseline.controller(),
        || tuned.controller(),
    )
    .context("invalid comparison configuration")?;
    Ok(summary)
}
