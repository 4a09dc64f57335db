use serde::{Deserialize, Serialize};

/// How the placement worker ranks valid candidate positions.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PlacementStrategy {
    /// Lowest (y, x) position: parts fall to the bottom-left.
    Gravity,
    /// Smallest bounding rect of everything placed so far plus the part.
    BoundingBox,
    /// Smallest convex hull of everything placed so far plus the part.
    Squeeze,
}

/// Configuration for a nesting session.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NestConfig {
    /// Minimum gap between placed parts. Applied as an outward offset of
    /// half this value on every part before placement.
    pub spacing: f64,
    /// Minimum gap between parts and the sheet edge.
    pub sheet_spacing: f64,
    /// Number of equally spaced rotation angles parts may take (4 = every 90 degrees).
    pub rotations: usize,
    /// Number of chromosomes per generation.
    pub population_size: usize,
    /// Per-gene mutation probability, in [0, 1].
    pub mutation_rate: f64,
    /// Number of placements evaluated concurrently (thread pool size).
    pub parallel_nests: usize,
    pub placement_strategy: PlacementStrategy,
    /// Evaluate the population on a rayon pool. Turn off for reproducible runs.
    pub use_parallel: bool,
    /// Run the spacing offset phase at the start of every iteration.
    pub offset_tree_phase: bool,
    /// Geometric tolerance driver; also controls near-duplicate vertex merging.
    pub curve_tolerance: f64,
    /// Scales the instance count of every part, to nest n-fold.
    pub multiplier: usize,
    /// Honor per-part rotation restrictions (`Polygon::strict_angles`).
    pub strict_angles: bool,
    /// Seed for the PRNG. If not defined, the algorithm will run in non-deterministic mode using entropy
    pub prng_seed: Option<u64>,
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            spacing: 0.0,
            sheet_spacing: 0.0,
            rotations: 4,
            population_size: 10,
            mutation_rate: 0.1,
            parallel_nests: 4,
            placement_strategy: PlacementStrategy::Gravity,
            use_parallel: true,
            offset_tree_phase: true,
            curve_tolerance: 0.72,
            multiplier: 1,
            strict_angles: false,
            prng_seed: Some(0),
        }
    }
}

impl NestConfig {
    /// The global set of allowed rotation angles, in degrees.
    pub fn rotation_set(&self) -> Vec<f64> {
        if self.rotations == 0 {
            return vec![0.0];
        }
        (0..self.rotations)
            .map(|i| i as f64 * 360.0 / self.rotations as f64)
            .collect()
    }

    /// Tolerance used by the geometry kernel for coincidence tests.
    pub fn geometry_eps(&self) -> f64 {
        (self.curve_tolerance * 1e-3).max(1e-9)
    }
}
