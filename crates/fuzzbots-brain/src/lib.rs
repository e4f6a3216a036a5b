//! Controllers for FuzzBots and the genome encodings searched by the optimizer.

use fuzzbots_core::{Controller, GenomeError};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod fuzzy;
pub mod membership;
pub mod repulsion;

pub use fuzzy::{
    ControllerParameters, DEFAULT_PARAMETERS, Fuzzification, FuzzyController, FuzzyTuning,
    SpeedAction, TurnAction,
};
pub use membership::{LinguisticVariable, MembershipSet, trimf};
pub use repulsion::{GAIN_COUNT, RepulsionController, RepulsionSettings};

/// Flat real-valued encoding of a controller, subject to genetic search.
pub trait Genome: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Stable identifier used in logs and persisted files.
    const KIND: &'static str;
    /// Number of genes in the encoding.
    const ARITY: usize;

    type Controller: Controller + 'static;

    fn genes(&self) -> &[f32];

    fn genes_mut(&mut self) -> &mut [f32];

    /// Decode from an ordered list; the length must equal `ARITY` and every gene must be finite.
    fn from_genes(genes: &[f32]) -> Result<Self, GenomeError>;

    /// Sample a fresh individual for the initial population.
    fn random(rng: &mut dyn RngCore) -> Self;

    /// Noise half-width used when the caller does not configure one.
    fn default_mutation_scale() -> f32;

    /// Build the controller this genome encodes.
    fn controller(&self) -> Self::Controller;

    /// Each gene independently receives uniform noise in `(-scale, scale)` with probability `rate`.
    fn mutate(&mut self, rng: &mut dyn RngCore, rate: f32, scale: f32) {
        let scale = scale.abs();
        for gene in self.genes_mut() {
            if rng.random::<f32>() < rate && scale > 0.0 {
                *gene += rng.random_range(-scale..scale);
            }
        }
    }

    /// Single-cut crossover: genes before the cut come from `self`, the rest from `other`.
    fn crossover(&self, other: &Self, rng: &mut dyn RngCore) -> Self {
        let mut child = self.clone();
        let len = child.genes().len().min(other.genes().len());
        if len < 2 {
            return child;
        }
        let cut = rng.random_range(1..len);
        child.genes_mut()[cut..len].copy_from_slice(&other.genes()[cut..len]);
        child
    }

    /// Genes as an owned list, the persisted form.
    fn to_vec(&self) -> Vec<f32> {
        self.genes().to_vec()
    }
}

fn decode<const N: usize>(kind: &'static str, genes: &[f32]) -> Result<[f32; N], GenomeError> {
    let array: [f32; N] = genes.try_into().map_err(|_| GenomeError::ArityMismatch {
        kind,
        expected: N,
        actual: genes.len(),
    })?;
    if let Some(index) = array.iter().position(|gene| !gene.is_finite()) {
        return Err(GenomeError::NonFinite { index });
    }
    Ok(array)
}

/// Four distance breakpoints for the fuzzy controller, stored unrepaired.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FuzzyGenome(pub [f32; 4]);

impl FuzzyGenome {
    #[must_use]
    pub fn parameters(&self) -> ControllerParameters {
        ControllerParameters::from(self.0)
    }
}

impl Default for FuzzyGenome {
    fn default() -> Self {
        Self(DEFAULT_PARAMETERS.to_array())
    }
}

impl From<ControllerParameters> for FuzzyGenome {
    fn from(parameters: ControllerParameters) -> Self {
        Self(parameters.to_array())
    }
}

impl Genome for FuzzyGenome {
    const KIND: &'static str = FuzzyController::KIND;
    const ARITY: usize = 4;

    type Controller = FuzzyController;

    fn genes(&self) -> &[f32] {
        &self.0
    }

    fn genes_mut(&mut self) -> &mut [f32] {
        &mut self.0
    }

    fn from_genes(genes: &[f32]) -> Result<Self, GenomeError> {
        decode(Self::KIND, genes).map(Self)
    }

    fn random(rng: &mut dyn RngCore) -> Self {
        Self([
            rng.random_range(20.0..60.0),
            rng.random_range(5.0..30.0),
            rng.random_range(30.0..80.0),
            rng.random_range(30.0..70.0),
        ])
    }

    fn default_mutation_scale() -> f32 {
        5.0
    }

    fn controller(&self) -> FuzzyController {
        FuzzyController::new(self.parameters())
    }
}

/// Five per-sensor reaction weights plus the goal-gain offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct GainVector(pub [f32; GAIN_COUNT]);

impl GainVector {
    /// Standard normal sample via Box-Muller.
    fn gaussian(rng: &mut dyn RngCore) -> f32 {
        let u1 = rng.random::<f32>().clamp(f32::MIN_POSITIVE, 1.0);
        let u2 = rng.random::<f32>();
        (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
    }
}

impl Genome for GainVector {
    const KIND: &'static str = RepulsionController::KIND;
    const ARITY: usize = GAIN_COUNT;

    type Controller = RepulsionController;

    fn genes(&self) -> &[f32] {
        &self.0
    }

    fn genes_mut(&mut self) -> &mut [f32] {
        &mut self.0
    }

    fn from_genes(genes: &[f32]) -> Result<Self, GenomeError> {
        decode(Self::KIND, genes).map(Self)
    }

    fn random(rng: &mut dyn RngCore) -> Self {
        let mut gains = [0.0; GAIN_COUNT];
        for gain in &mut gains {
            *gain = rng.random_range(-1.0..1.0);
        }
        Self(gains)
    }

    fn default_mutation_scale() -> f32 {
        0.06
    }

    fn controller(&self) -> RepulsionController {
        RepulsionController::new(self.0)
    }

    /// Gains take Gaussian noise with standard deviation `scale` rather than uniform noise.
    fn mutate(&mut self, rng: &mut dyn RngCore, rate: f32, scale: f32) {
        let sigma = scale.abs();
        for gain in &mut self.0 {
            if rng.random::<f32>() < rate {
                *gain += Self::gaussian(rng) * sigma;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn decode_checks_arity_and_finiteness() {
        assert_eq!(
            FuzzyGenome::from_genes(&[1.0, 2.0, 3.0]),
            Err(GenomeError::ArityMismatch {
                kind: "fuzzy",
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            GainVector::from_genes(&[0.0, 0.0, f32::NAN, 0.0, 0.0, 0.0]),
            Err(GenomeError::NonFinite { index: 2 })
        );
        let genome = FuzzyGenome::from_genes(&[40.0, 10.0, 50.0, 40.0]).expect("decode");
        assert_eq!(genome, FuzzyGenome::default());
        assert_eq!(genome.to_vec(), vec![40.0, 10.0, 50.0, 40.0]);
    }

    #[test]
    fn random_genomes_fall_in_sampling_ranges() {
        let mut rng = SmallRng::seed_from_u64(0xFEED);
        for _ in 0..32 {
            let FuzzyGenome([close, med_min, med_max, far]) = FuzzyGenome::random(&mut rng);
            assert!((20.0..60.0).contains(&close));
            assert!((5.0..30.0).contains(&med_min));
            assert!((30.0..80.0).contains(&med_max));
            assert!((30.0..70.0).contains(&far));
            let gains = GainVector::random(&mut rng);
            assert!(gains.0.iter().all(|g| (-1.0..1.0).contains(g)));
        }
    }

    #[test]
    fn mutate_with_zero_rate_is_identity() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut genome = FuzzyGenome::default();
        genome.mutate(&mut rng, 0.0, 5.0);
        assert_eq!(genome, FuzzyGenome::default());
        let mut gains = GainVector([0.5; GAIN_COUNT]);
        gains.mutate(&mut rng, 0.0, 0.06);
        assert_eq!(gains, GainVector([0.5; GAIN_COUNT]));
    }

    #[test]
    fn mutate_with_full_rate_perturbs_within_scale() {
        let mut rng = SmallRng::seed_from_u64(2);
        let original = FuzzyGenome::default();
        let mut genome = original;
        genome.mutate(&mut rng, 1.0, 5.0);
        assert_ne!(genome, original);
        for (after, before) in genome.0.iter().zip(original.0) {
            assert!((after - before).abs() < 5.0);
        }
    }

    #[test]
    fn crossover_takes_prefix_and_suffix() {
        let a = GainVector([1.0; GAIN_COUNT]);
        let b = GainVector([2.0; GAIN_COUNT]);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..20 {
            let child = a.crossover(&b, &mut rng);
            assert_eq!(child.0[0], 1.0);
            assert_eq!(child.0[GAIN_COUNT - 1], 2.0);
            let cut = child.0.iter().position(|g| *g == 2.0).expect("cut");
            assert!(child.0[cut..].iter().all(|g| *g == 2.0));
            assert!(child.0[..cut].iter().all(|g| *g == 1.0));
        }
    }

    #[test]
    fn genome_builds_its_controller() {
        let controller = FuzzyGenome([40.0, 60.0, 50.0, 40.0]).controller();
        assert_eq!(controller.parameters().med_min, 49.0);
        assert_eq!(Controller::kind(&controller), "fuzzy");
        let repulsion = GainVector([0.25; GAIN_COUNT]).controller();
        assert_eq!(repulsion.gains(), &[0.25; GAIN_COUNT]);
    }

    #[test]
    fn genomes_serialize_as_plain_lists() {
        let json = serde_json::to_string(&FuzzyGenome::default()).expect("serialize");
        assert_eq!(json, "[40.0,10.0,50.0,40.0]");
    }
}
