//! graph_maker - styled statistical charts from Polars DataFrames.
//!
//! A [`GraphMaker`] holds the presentation settings shared by every chart
//! (style, title, axis labels, column selectors) and a shared table, and
//! draws boxplots, barplots, pie charts and scatterplots from them. Each
//! operation returns a [`Figure`] that can be inspected or rendered to a
//! bitmap, PNG or SVG.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod graph_maker;
pub mod stats;
pub mod telemetry;

pub use charts::{Chart, Figure, FigureSize, Orientation, Style};
pub use config::GraphConfig;
pub use error::{GraphError, GraphResult};
pub use graph_maker::{BarplotOptions, BoxplotOptions, GraphMaker, PieOptions, ScatterOptions};
