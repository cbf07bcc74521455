//! Stats module - per-chart summary statistics

mod calculator;

pub use calculator::{BoxStats, Estimate, LinearFit, StatsCalculator, CONFIDENCE_LEVEL};
