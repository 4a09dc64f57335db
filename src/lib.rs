//! Irregular 2D nesting engine.
//!
//! `opennest` packs irregular polygonal parts onto rectangular or polygonal
//! sheets. The geometry kernel builds no-fit polygons with an orbital sliding
//! construction, a genetic algorithm searches over part order and rotation,
//! and a placement worker turns each chromosome into a concrete layout which
//! is scored by a multi-term fitness function.
//!
//! The main entry point is [`opt::engine::NestEngine`]: add part and sheet
//! templates, `start()` a session and call `iterate()` until satisfied.

pub mod config;
pub mod entities;
pub mod ga;
pub mod geometry;
pub mod opt;
