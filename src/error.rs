//! Error types shared by every drawing operation.

use polars::prelude::PolarsError;
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("no {0} column selected")]
    MissingColumnSelector(&'static str),
    #[error("no data attached to the graph maker")]
    NoData,
    #[error("column \"{0}\" does not exist in the data")]
    ColumnNotFound(String),
    #[error("column \"{0}\" is not numeric")]
    NonNumericColumn(String),
    #[error("no rows left to plot after dropping missing values")]
    EmptySelection,
    #[error("column \"{column}\" has a missing value in row {row}")]
    MissingValue { column: String, row: usize },

    #[error("value for orient must be either \"v\" or \"h\" but {0} was passed")]
    InvalidOrientation(String),

    #[error("No data passed for the piechart")]
    MissingPieData,
    #[error("invalid pie values: {0}")]
    InvalidPieValues(String),

    #[error("unknown style \"{0}\"; expected darkgrid, whitegrid, dark, white or ticks")]
    UnknownStyle(String),
    #[error("invalid figure size: {width} x {height} inches")]
    InvalidFigureSize { width: f64, height: f64 },
    #[error("invalid {axis} limits: ({low}, {high})")]
    InvalidLimits {
        axis: &'static str,
        low: f64,
        high: f64,
    },
    #[error("cannot fit a regression line: {0}")]
    DegenerateRegression(&'static str),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("failed to render chart: {0}")]
    Render(String),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
