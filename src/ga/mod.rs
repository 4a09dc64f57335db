mod chromosome;
mod population;

pub use chromosome::{Chromosome, Gene, PartInstance};
pub use population::Population;
