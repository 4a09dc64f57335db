use itertools::Itertools;
use ordered_float::OrderedFloat;
use rand::Rng;
use std::cmp::Reverse;

use crate::config::NestConfig;
use crate::ga::{Chromosome, Gene, PartInstance};

/// A generation of chromosomes. Kept sorted ascending by fitness once
/// evaluated; `members[0]` is the incumbent.
#[derive(Clone, Debug)]
pub struct Population {
    pub members: Vec<Chromosome>,
}

impl Population {
    /// Seeds a generation: the founder orders instances by descending net
    /// area (priority parts first), every other member is a mutation of it.
    pub fn initialize(
        instances: &[PartInstance],
        config: &NestConfig,
        rng: &mut impl Rng,
    ) -> Population {
        let order = (0..instances.len())
            .sorted_by_key(|&i| {
                (
                    Reverse(instances[i].priority),
                    Reverse(OrderedFloat(instances[i].template.net_area())),
                )
            })
            .collect_vec();
        let founder = Chromosome::new(
            order
                .into_iter()
                .map(|i| Gene {
                    instance: i,
                    rotation: random_rotation(&instances[i], rng),
                })
                .collect(),
        );

        let mut members = vec![founder.clone()];
        while members.len() < config.population_size.max(1) {
            members.push(founder.mutated(instances, config.mutation_rate.max(0.1), rng));
        }
        Population { members }
    }

    /// Breeds the next generation from a ranked population: the best member
    /// survives verbatim, the rest come from rank-weighted parent pairs via
    /// order crossover plus mutation.
    pub fn next_generation(
        &self,
        instances: &[PartInstance],
        config: &NestConfig,
        rng: &mut impl Rng,
    ) -> Population {
        let mut members = vec![self.members[0].clone()];
        while members.len() < config.population_size.max(1) {
            let male = self.rank_weighted_index(rng, None);
            let female = self.rank_weighted_index(rng, Some(male));
            let (c1, c2) = crossover(&self.members[male], &self.members[female], rng);
            members.push(c1.mutated(instances, config.mutation_rate, rng));
            if members.len() < config.population_size {
                members.push(c2.mutated(instances, config.mutation_rate, rng));
            }
        }
        Population { members }
    }

    /// Sorts members ascending by fitness; unevaluated members sink to the end.
    pub fn rank(&mut self) {
        self.members
            .sort_by_key(|c| OrderedFloat(c.fitness.unwrap_or(f64::INFINITY)));
    }

    /// Picks an index with probability decreasing linearly in rank.
    fn rank_weighted_index(&self, rng: &mut impl Rng, exclude: Option<usize>) -> usize {
        let pool = (0..self.members.len())
            .filter(|i| Some(*i) != exclude)
            .collect_vec();
        let n = pool.len() as f64;
        let r: f64 = rng.random();
        let weight = 1.0 / n;
        let mut lower = 0.0;
        let mut upper = weight;
        for (rank, idx) in pool.iter().enumerate() {
            if r >= lower && r < upper {
                return *idx;
            }
            lower = upper;
            upper += 2.0 * weight * ((pool.len() - rank) as f64 / n);
        }
        pool[0]
    }
}

fn random_rotation(instance: &PartInstance, rng: &mut impl Rng) -> f64 {
    // allowed_rotations is never empty, see PartInstance::expand
    let allowed = &instance.allowed_rotations;
    allowed[rng.random_range(0..allowed.len())]
}

/// One-point order crossover: each child takes a prefix of one parent in
/// place, then the other parent's remaining genes in their relative order.
fn crossover(
    male: &Chromosome,
    female: &Chromosome,
    rng: &mut impl Rng,
) -> (Chromosome, Chromosome) {
    let len = male.genes.len();
    if len < 2 {
        return (
            Chromosome::new(male.genes.clone()),
            Chromosome::new(female.genes.clone()),
        );
    }
    let frac: f64 = rng.random::<f64>().clamp(0.1, 0.9);
    let cut = ((frac * (len - 1) as f64).round() as usize).clamp(1, len - 1);

    let child = |head: &Chromosome, tail: &Chromosome| {
        let mut genes: Vec<Gene> = head.genes[..cut].to_vec();
        let taken: Vec<usize> = genes.iter().map(|g| g.instance).collect();
        genes.extend(
            tail.genes
                .iter()
                .filter(|g| !taken.contains(&g.instance))
                .cloned(),
        );
        Chromosome::new(genes)
    };
    (child(male, female), child(female, male))
}
