//! Comparison engine

mod comparison_engine;

pub use comparison_engine::ComparisonEngine;
