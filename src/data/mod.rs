//! Data module - column extraction from the caller's table

mod processor;

pub use processor::{DataProcessor, Group, GroupedValues};
