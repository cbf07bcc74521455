//! Charts module - chart models, layout and rendering

mod figure;
mod plotter;
mod renderer;
mod style;

pub use figure::{
    check_limits, padded_range, Bar, BarChart, BoxChart, BoxElement, Chart, Figure, FigureSize,
    Orientation, PieChart, RegressionLine, ScatterChart, SwarmPoint, Wedge, AXIS_MARGIN, DPI,
};
pub use plotter::{ChartPlotter, GROUP_WIDTH, MAX_PIE_DECIMALS, REGRESSION_SAMPLES};
pub use renderer::StaticChartRenderer;
pub use style::{palette_color, Style, PALETTE, POINT_COLOR};
