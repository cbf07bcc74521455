//! GraphMaker - styled charts from a shared DataFrame.
//!
//! Holds the presentation settings every chart shares (style, labels, title,
//! column selectors) and draws boxplots, barplots, pie charts and
//! scatterplots from them. Every operation returns a [`Figure`] or a
//! [`GraphError`] describing why the chart could not be drawn.

use crate::charts::{
    check_limits, Chart, ChartPlotter, Figure, FigureSize, Orientation, Style,
};
use crate::config::GraphConfig;
use crate::data::DataProcessor;
use crate::error::{GraphError, GraphResult};
use crate::stats::StatsCalculator;
use polars::prelude::DataFrame;
use std::sync::Arc;
use tracing::{debug, warn};

/// Optional settings for [`GraphMaker::boxplot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxplotOptions {
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    /// Width and height in inches.
    pub figsize: Option<(f64, f64)>,
    /// Rotation of the x tick labels in degrees.
    pub rotation: Option<f64>,
    /// Column that splits each category into colored sub-groups.
    pub hue: Option<String>,
    /// Overlay the individual observations on the boxes.
    pub show_points: bool,
}

impl BoxplotOptions {
    pub fn with_xlim(mut self, low: f64, high: f64) -> Self {
        self.xlim = Some((low, high));
        self
    }

    pub fn with_ylim(mut self, low: f64, high: f64) -> Self {
        self.ylim = Some((low, high));
        self
    }

    pub fn with_figsize(mut self, width: f64, height: f64) -> Self {
        self.figsize = Some((width, height));
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn with_hue(mut self, column: impl Into<String>) -> Self {
        self.hue = Some(column.into());
        self
    }

    pub fn with_points(mut self, show_points: bool) -> Self {
        self.show_points = show_points;
        self
    }
}

/// Optional settings for [`GraphMaker::barplot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarplotOptions {
    pub figsize: Option<(f64, f64)>,
    pub orient: Orientation,
    pub hue: Option<String>,
}

impl BarplotOptions {
    pub fn with_figsize(mut self, width: f64, height: f64) -> Self {
        self.figsize = Some((width, height));
        self
    }

    pub fn with_orient(mut self, orient: Orientation) -> Self {
        self.orient = orient;
        self
    }

    pub fn with_hue(mut self, column: impl Into<String>) -> Self {
        self.hue = Some(column.into());
        self
    }
}

/// Optional settings for [`GraphMaker::pie`].
#[derive(Debug, Clone, PartialEq)]
pub struct PieOptions {
    /// Wedge sizes. When set, the configured table and `x` column are ignored.
    pub x: Option<Vec<f64>>,
    /// Decimals shown in the percentage labels.
    pub decimals: usize,
    /// Distance of the percentage labels from the centre, in radii.
    pub pct_distance: f64,
    /// Legend entries, one per wedge.
    pub labels: Option<Vec<String>>,
    pub figsize: Option<(f64, f64)>,
    /// Overrides the configured title for this chart.
    pub title: Option<String>,
}

impl Default for PieOptions {
    fn default() -> Self {
        Self {
            x: None,
            decimals: 1,
            pct_distance: 1.15,
            labels: None,
            figsize: None,
            title: None,
        }
    }
}

impl PieOptions {
    pub fn with_values(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.x = Some(values.into());
        self
    }

    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_pct_distance(mut self, pct_distance: f64) -> Self {
        self.pct_distance = pct_distance;
        self
    }

    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_figsize(mut self, width: f64, height: f64) -> Self {
        self.figsize = Some((width, height));
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Optional settings for [`GraphMaker::scatterplot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterOptions {
    /// Overlay a least-squares line with its confidence band.
    pub reg_line: bool,
    pub figsize: Option<(f64, f64)>,
    /// End the line at the data instead of the edges of the x axis.
    pub truncate: bool,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
}

impl ScatterOptions {
    pub fn with_reg_line(mut self, reg_line: bool) -> Self {
        self.reg_line = reg_line;
        self
    }

    pub fn with_figsize(mut self, width: f64, height: f64) -> Self {
        self.figsize = Some((width, height));
        self
    }

    pub fn with_truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn with_xlim(mut self, low: f64, high: f64) -> Self {
        self.xlim = Some((low, high));
        self
    }

    pub fn with_ylim(mut self, low: f64, high: f64) -> Self {
        self.ylim = Some((low, high));
        self
    }
}

/// Draws consistently styled charts from one table.
#[derive(Debug, Clone, Default)]
pub struct GraphMaker {
    pub style: Style,
    pub x_label: String,
    pub y_label: String,
    pub title: String,
    /// Column plotted along the x axis.
    pub x: Option<String>,
    /// Column plotted along the y axis.
    pub y: Option<String>,
    /// Shared with the caller, never modified.
    pub data: Option<Arc<DataFrame>>,
}

impl GraphMaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: GraphConfig, data: Option<Arc<DataFrame>>) -> Self {
        Self {
            style: config.style,
            x_label: config.x_label,
            y_label: config.y_label,
            title: config.title,
            x: config.x,
            y: config.y,
            data,
        }
    }

    /// Current presentation settings, without the table.
    pub fn config(&self) -> GraphConfig {
        GraphConfig {
            style: self.style,
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            title: self.title.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn with_y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_x(mut self, column: impl Into<String>) -> Self {
        self.x = Some(column.into());
        self
    }

    pub fn with_y(mut self, column: impl Into<String>) -> Self {
        self.y = Some(column.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<Arc<DataFrame>>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Box-and-whisker plot of `y` grouped by `x`.
    pub fn boxplot(&self, options: &BoxplotOptions) -> GraphResult<Figure> {
        Self::finish("boxplot", self.build_boxplot(options))
    }

    /// Mean of `y` per category of `x`, as vertical or horizontal bars.
    pub fn barplot(&self, options: &BarplotOptions) -> GraphResult<Figure> {
        Self::finish("barplot", self.build_barplot(options))
    }

    /// Pie chart of the explicit values, or of the `x` column.
    pub fn pie(&self, options: &PieOptions) -> GraphResult<Figure> {
        Self::finish("pie", self.build_pie(options))
    }

    /// `y` against `x`, optionally with a regression line.
    pub fn scatterplot(&self, options: &ScatterOptions) -> GraphResult<Figure> {
        Self::finish("scatterplot", self.build_scatterplot(options))
    }

    fn finish(operation: &'static str, result: GraphResult<Figure>) -> GraphResult<Figure> {
        match &result {
            Ok(figure) => debug!(operation, title = %figure.title, "chart drawn"),
            Err(err) => warn!(operation, error = %err, "chart not drawn"),
        }
        result
    }

    fn table(&self) -> GraphResult<&DataFrame> {
        self.data.as_deref().ok_or(GraphError::NoData)
    }

    fn selected<'a>(selector: &'a Option<String>, axis: &'static str) -> GraphResult<&'a str> {
        selector
            .as_deref()
            .ok_or(GraphError::MissingColumnSelector(axis))
    }

    /// Figure carrying this maker's style, title and axis labels.
    fn figure(&self, chart: Chart, size: FigureSize) -> Figure {
        let mut figure = Figure::new(chart, self.style, size);
        figure.title = self.title.clone();
        figure.x_label = self.x_label.clone();
        figure.y_label = self.y_label.clone();
        figure
    }

    fn build_boxplot(&self, options: &BoxplotOptions) -> GraphResult<Figure> {
        let size = FigureSize::resolve(options.figsize)?;
        let xlim = check_limits("x", options.xlim)?;
        let ylim = check_limits("y", options.ylim)?;

        let df = self.table()?;
        let y = Self::selected(&self.y, "y")?;
        let grouped =
            DataProcessor::group_by_category(df, self.x.as_deref(), y, options.hue.as_deref())?;
        let chart = ChartPlotter::box_chart(&grouped, options.show_points);

        let mut figure = self.figure(Chart::Box(chart), size);
        figure.x_limits = xlim;
        figure.y_limits = ylim;
        figure.x_tick_rotation = options.rotation;
        Ok(figure)
    }

    fn build_barplot(&self, options: &BarplotOptions) -> GraphResult<Figure> {
        let size = FigureSize::resolve(options.figsize)?;

        let df = self.table()?;
        let y = Self::selected(&self.y, "y")?;
        let grouped =
            DataProcessor::group_by_category(df, self.x.as_deref(), y, options.hue.as_deref())?;
        let chart = ChartPlotter::bar_chart(&grouped, options.orient);

        let mut figure = self.figure(Chart::Bar(chart), size);
        if options.orient == Orientation::Horizontal {
            // values run along x, categories along y
            std::mem::swap(&mut figure.x_label, &mut figure.y_label);
        }
        Ok(figure)
    }

    fn build_pie(&self, options: &PieOptions) -> GraphResult<Figure> {
        let size = FigureSize::resolve(options.figsize)?;

        let values = match &options.x {
            Some(values) => values.clone(),
            None => {
                let column = self.x.as_deref().ok_or(GraphError::MissingPieData)?;
                DataProcessor::column_values(self.table()?, column)?
            }
        };
        let chart = ChartPlotter::pie_chart(
            &values,
            options.decimals,
            options.pct_distance,
            options.labels.as_deref(),
        )?;

        let mut figure = Figure::new(Chart::Pie(chart), self.style, size);
        figure.title = options.title.clone().unwrap_or_else(|| self.title.clone());
        Ok(figure)
    }

    fn build_scatterplot(&self, options: &ScatterOptions) -> GraphResult<Figure> {
        let size = FigureSize::resolve(options.figsize)?;
        let xlim = check_limits("x", options.xlim)?;
        let ylim = check_limits("y", options.ylim)?;

        let df = self.table()?;
        let x = Self::selected(&self.x, "x")?;
        let y = Self::selected(&self.y, "y")?;
        let (xs, ys) = DataProcessor::paired_values(df, x, y)?;

        let mut chart = ChartPlotter::scatter_chart(&xs, &ys, None);
        if options.reg_line {
            let fit = StatsCalculator::linear_fit(&xs, &ys)?;
            let (start, end) = if options.truncate {
                xs.iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
                        (min.min(v), max.max(v))
                    })
            } else {
                xlim.unwrap_or_else(|| chart.data_x_range())
            };
            chart.regression = Some(ChartPlotter::regression_line(&fit, start, end));
        }

        let mut figure = self.figure(Chart::Scatter(chart), size);
        figure.x_limits = xlim;
        figure.y_limits = ylim;
        Ok(figure)
    }
}
