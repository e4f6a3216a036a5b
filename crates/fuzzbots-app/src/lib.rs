//! Shared plumbing for the `fuzzbots` command-line driver.

use clap::ValueEnum;
use fuzzbots_core::{MapPreset, Pose};

pub mod command;

pub use command::{
    CompareArgs, RunArgs, RunSummary, TrainArgs, TrainSummary, compare, run, train,
};

/// Genome family selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenomeChoice {
    /// Four fuzzy distance breakpoints.
    Fuzzy,
    /// Six reactive-repulsion gains.
    Repulsion,
}

/// Built-in map selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MapChoice {
    Complex,
    Simple,
    Empty,
}

impl From<MapChoice> for MapPreset {
    fn from(choice: MapChoice) -> Self {
        match choice {
            MapChoice::Complex => Self::Complex,
            MapChoice::Simple => Self::Simple,
            MapChoice::Empty => Self::Empty,
        }
    }
}

/// Parse `x,y,heading` (heading in radians) into a pose.
pub fn parse_start(raw: &str) -> Result<Pose, String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [x, y, heading] = parts.as_slice() else {
        return Err(format!("expected x,y,heading but got {raw:?}"));
    };
    let parse = |label: &str, value: &str| -> Result<f32, String> {
        value
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("{label} must be a finite number, got {value:?}"))
    };
    Ok(Pose::new(
        parse("x", x)?,
        parse("y", y)?,
        parse("heading", heading)?,
    ))
}
