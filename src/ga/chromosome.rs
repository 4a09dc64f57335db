use rand::Rng;

use crate::config::NestConfig;
use crate::entities::{NestItem, Polygon};

/// One concrete part to place: an expansion of a [`NestItem`] into
/// `quantity` separately placeable instances.
#[derive(Clone, Debug)]
pub struct PartInstance {
    pub id: usize,
    pub template: Polygon,
    /// Angles this instance may be rotated by, degrees.
    pub allowed_rotations: Vec<f64>,
    pub priority: bool,
}

impl PartInstance {
    /// Expands grouped items into one instance per unit of quantity,
    /// assigning sequential ids. Per-part `strict_angles` override the
    /// global rotation set when enabled in config.
    pub fn expand(items: &[NestItem], config: &NestConfig) -> Vec<PartInstance> {
        let rotation_set = config.rotation_set();
        let mut out = Vec::new();
        let mut id = 0;
        for item in items {
            let allowed = match (&item.polygon.strict_angles, config.strict_angles) {
                (Some(angles), true) if !angles.is_empty() => angles.clone(),
                _ => rotation_set.clone(),
            };
            for _ in 0..item.quantity {
                let mut template = item.polygon.clone();
                template.id = id;
                out.push(PartInstance {
                    id,
                    template,
                    allowed_rotations: allowed.clone(),
                    priority: item.polygon.priority,
                });
                id += 1;
            }
        }
        out
    }
}

/// One gene: which instance to place, at which rotation.
#[derive(Clone, Debug, PartialEq)]
pub struct Gene {
    /// Index into the instance list.
    pub instance: usize,
    /// Degrees, drawn from the instance's allowed set.
    pub rotation: f64,
}

/// A placement order over all instances plus a rotation per gene.
#[derive(Clone, Debug, PartialEq)]
pub struct Chromosome {
    pub genes: Vec<Gene>,
    /// Total fitness once evaluated; `None` for fresh offspring.
    pub fitness: Option<f64>,
}

impl Chromosome {
    pub fn new(genes: Vec<Gene>) -> Self {
        Chromosome {
            genes,
            fitness: None,
        }
    }

    /// Copy with per-gene mutations applied: each position may swap with its
    /// neighbour or redraw its rotation, each with half the mutation rate.
    pub fn mutated(
        &self,
        instances: &[PartInstance],
        mutation_rate: f64,
        rng: &mut impl Rng,
    ) -> Chromosome {
        let mut genes = self.genes.clone();
        let half = (mutation_rate * 0.5).clamp(0.0, 1.0);
        for i in 0..genes.len() {
            if rng.random_bool(half) && i + 1 < genes.len() {
                genes.swap(i, i + 1);
            }
            if rng.random_bool(half) {
                let allowed = &instances[genes[i].instance].allowed_rotations;
                genes[i].rotation = allowed[rng.random_range(0..allowed.len())];
            }
        }
        Chromosome::new(genes)
    }
}
