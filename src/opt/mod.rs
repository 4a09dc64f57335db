pub mod engine;
pub mod fitness;
pub mod placement;
