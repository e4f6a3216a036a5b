//! JSON persistence for tuned genomes and per-generation training history.

use fuzzbots_brain::{ControllerParameters, FuzzyGenome, Genome};
use fuzzbots_core::GenomeError;
use fuzzbots_evolve::GenerationReport;
use serde::Deserialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("genome error: {0}")]
    Genome(#[from] GenomeError),
    #[error("keyed parameter files only describe fuzzy genomes, not {kind}")]
    UnsupportedFormat { kind: &'static str },
}

/// Accepted on-disk shapes: the ordered gene list, or the older keyed fuzzy-parameter object.
#[derive(Deserialize)]
#[serde(untagged)]
enum GenomeFile {
    List(Vec<f32>),
    Keyed(ControllerParameters),
}

/// Decode a genome from JSON text.
pub fn parse_genome<G: Genome>(text: &str) -> Result<G, StorageError> {
    match serde_json::from_str::<GenomeFile>(text)? {
        GenomeFile::List(genes) => Ok(G::from_genes(&genes)?),
        GenomeFile::Keyed(parameters) => {
            if G::KIND != FuzzyGenome::KIND {
                return Err(StorageError::UnsupportedFormat { kind: G::KIND });
            }
            Ok(G::from_genes(&parameters.to_array())?)
        }
    }
}

/// Load a genome saved by [`save_genome`] (or a legacy keyed parameter file).
pub fn load_genome<G: Genome>(path: impl AsRef<Path>) -> Result<G, StorageError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let genome = parse_genome(&text)?;
    debug!(path = %path.display(), kind = G::KIND, "loaded genome");
    Ok(genome)
}

/// Write the genome as an ordered JSON list.
pub fn save_genome<G: Genome>(path: impl AsRef<Path>, genome: &G) -> Result<(), StorageError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, genome.genes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), kind = G::KIND, genes = ?genome.genes(), "saved genome");
    Ok(())
}

/// Appends one JSON line per generation report.
pub struct HistoryWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl HistoryWriter {
    /// Create (or truncate) the history file.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(Self::from_file(path, file))
    }

    /// Open the history file for appending, creating it when missing.
    pub fn append(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self::from_file(path, file))
    }

    fn from_file(path: PathBuf, file: File) -> Self {
        Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reports written through this handle.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Write one report and flush so partial runs leave a readable file.
    pub fn record(&mut self, report: &GenerationReport) -> Result<(), StorageError> {
        serde_json::to_writer(&mut self.writer, report)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}

/// Read every report from a history file, skipping blank lines.
pub fn read_history(path: impl AsRef<Path>) -> Result<Vec<GenerationReport>, StorageError> {
    let reader = BufReader::new(File::open(path)?);
    let mut reports = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        reports.push(serde_json::from_str(&line)?);
    }
    Ok(reports)
}
