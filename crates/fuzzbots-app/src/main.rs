use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fuzzbots_app::{CompareArgs, RunArgs, TrainArgs, compare, run, train};
use fuzzbots_core::EpisodeOutcome;
use owo_colors::OwoColorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fuzzbots",
    version,
    about = "Evolve and race fuzzy-logic navigation controllers"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Optimize controller parameters with a genetic algorithm.
    Train(TrainArgs),
    /// Drive one episode and print its result.
    Run(RunArgs),
    /// Race tuned parameters against the hand-tuned defaults.
    Compare(CompareArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => {
            let summary = train(&args)?;
            info!(fitness = summary.fitness, out = %summary.out.display(), "training finished");
            println!(
                "{} {} after {} generations",
                "Best".green().bold(),
                summary.kind,
                summary.generations
            );
            println!("  fitness: {:.2}", summary.fitness);
            println!("  genes:   {:?}", summary.genes);
            println!("  saved:   {}", summary.out.display());
        }
        Command::Run(args) => {
            let summary = run(&args)?;
            let label = summary.result.outcome.label();
            match summary.result.outcome {
                EpisodeOutcome::Goal => println!("{}", label.green().bold()),
                EpisodeOutcome::Collision => println!("{}", label.red().bold()),
                _ => println!("{}", label.yellow().bold()),
            }
            println!("{} genes: {:?}", summary.kind, summary.genes);
            let json = serde_json::to_string_pretty(&summary.result)
                .context("failed to render episode result")?;
            println!("{json}");
        }
        Command::Compare(args) => {
            let summary = compare(&args)?;
            println!("{}", "Comparison".bold());
            println!("  rounds:            {}", summary.rounds);
            println!(
                "  default success:   {:.0}%",
                summary.baseline_success_rate() * 100.0
            );
            println!(
                "  tuned success:     {:.0}%",
                summary.challenger_success_rate() * 100.0
            );
            println!(
                "  races (tuned-default-draw): {}-{}-{}",
                summary.challenger_wins.green(),
                summary.baseline_wins.red(),
                summary.draws
            );
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
