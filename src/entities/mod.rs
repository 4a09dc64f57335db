mod nest_item;
mod nest_result;
mod placement;
mod polygon;

pub use nest_item::NestItem;
pub use nest_result::{FitnessBreakdown, NestResult};
pub use placement::{PartPlacement, SheetLayout};
pub use polygon::Polygon;
