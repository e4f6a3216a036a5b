//! Scored populations and the elitist breeding step.

use fuzzbots_brain::Genome;
use ordered_float::OrderedFloat;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// A genome paired with the fitness it earned this generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scored<G> {
    pub genome: G,
    pub fitness: f32,
}

/// Breeding hyperparameters used by [`evolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breeding {
    pub population_size: usize,
    pub elite_count: usize,
    pub mutation_rate: f32,
    pub mutation_scale: f32,
}

/// One generation's evaluated individuals, best first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Population<G> {
    members: Vec<Scored<G>>,
}

impl<G> Population<G> {
    /// Sort by descending fitness; ties keep their evaluation order.
    #[must_use]
    pub fn new(mut members: Vec<Scored<G>>) -> Self {
        members.sort_by_key(|scored| std::cmp::Reverse(OrderedFloat(scored.fitness)));
        Self { members }
    }

    #[must_use]
    pub fn members(&self) -> &[Scored<G>] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn best(&self) -> Option<&Scored<G>> {
        self.members.first()
    }

    #[must_use]
    pub fn mean_fitness(&self) -> f32 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|s| s.fitness).sum::<f32>() / self.members.len() as f32
    }

    pub fn into_members(self) -> Vec<Scored<G>> {
        self.members
    }
}

/// Build the next generation: the top `elite_count` genomes unchanged, then children bred from
/// two distinct elites (when more than one exists) by single-cut crossover and mutation.
pub fn evolve<G: Genome>(
    population: &Population<G>,
    breeding: &Breeding,
    rng: &mut dyn RngCore,
) -> Vec<G> {
    let elites: Vec<&G> = population
        .members()
        .iter()
        .take(breeding.elite_count.max(1))
        .map(|scored| &scored.genome)
        .collect();
    if elites.is_empty() {
        return Vec::new();
    }

    let mut next: Vec<G> = elites
        .iter()
        .take(breeding.population_size)
        .map(|genome| (*genome).clone())
        .collect();
    while next.len() < breeding.population_size {
        let (first, second) = pick_pair(elites.len(), rng);
        let mut child = elites[first].crossover(elites[second], rng);
        child.mutate(rng, breeding.mutation_rate, breeding.mutation_scale);
        next.push(child);
    }
    next
}

/// Two distinct indices below `len`, or the same index twice when `len == 1`.
fn pick_pair(len: usize, rng: &mut dyn RngCore) -> (usize, usize) {
    if len < 2 {
        return (0, 0);
    }
    let first = rng.random_range(0..len);
    let mut second = rng.random_range(0..len - 1);
    if second >= first {
        second += 1;
    }
    (first, second)
}
