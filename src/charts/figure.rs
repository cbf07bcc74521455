//! The plot handle returned by every `GraphMaker` operation.
//!
//! A `Figure` is a fully resolved chart: statistics are computed, groups
//! are laid out and colours assigned. Rendering it is a separate step, see
//! [`Figure::render`], [`Figure::to_png`] and [`Figure::to_svg`].

use crate::charts::renderer::StaticChartRenderer;
use crate::charts::style::Style;
use crate::error::{GraphError, GraphResult};
use crate::stats::{BoxStats, Estimate};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::style::RGBColor;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

/// Pixels per inch when turning a figure size into a bitmap.
pub const DPI: f64 = 100.0;

/// Fraction of the data span added on each side of an automatic axis range.
pub const AXIS_MARGIN: f64 = 0.05;

/// Figure dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width: 6.4,
            height: 4.8,
        }
    }
}

impl FigureSize {
    pub fn new(width: f64, height: f64) -> GraphResult<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(GraphError::InvalidFigureSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Resolve an optional `(width, height)` pair, falling back to the default size.
    pub fn resolve(size: Option<(f64, f64)>) -> GraphResult<Self> {
        match size {
            Some((width, height)) => Self::new(width, height),
            None => Ok(Self::default()),
        }
    }

    pub fn pixels(&self) -> (u32, u32) {
        (
            ((self.width * DPI).round() as u32).max(1),
            ((self.height * DPI).round() as u32).max(1),
        )
    }
}

/// Validate user supplied axis limits. Reversed limits are allowed.
pub fn check_limits(axis: &'static str, limits: Option<(f64, f64)>) -> GraphResult<Option<(f64, f64)>> {
    match limits {
        Some((low, high)) if !low.is_finite() || !high.is_finite() || low == high => {
            Err(GraphError::InvalidLimits { axis, low, high })
        }
        other => Ok(other),
    }
}

/// Data span widened by `AXIS_MARGIN` on both sides.
pub fn padded_range(low: f64, high: f64) -> (f64, f64) {
    if !low.is_finite() || !high.is_finite() {
        return (0.0, 1.0);
    }
    if low == high {
        return (low - 0.5, high + 0.5);
    }
    let pad = (high - low) * AXIS_MARGIN;
    (low - pad, high + pad)
}

fn extent(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        })
}

fn category_range(count: usize) -> (f64, f64) {
    (-0.5, count.max(1) as f64 - 0.5)
}

/// Bar direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Categories along the x axis.
    #[default]
    Vertical,
    /// Categories along the y axis.
    Horizontal,
}

impl FromStr for Orientation {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v" => Ok(Orientation::Vertical),
            "h" => Ok(Orientation::Horizontal),
            other => Err(GraphError::InvalidOrientation(other.to_string())),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Orientation::Vertical => "v",
            Orientation::Horizontal => "h",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxElement {
    pub category: usize,
    pub hue: Option<usize>,
    /// Centre on the category axis.
    pub position: f64,
    pub width: f64,
    pub color: RGBColor,
    pub stats: BoxStats,
}

/// A single observation overlaid on the boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwarmPoint {
    pub x: f64,
    pub y: f64,
    /// Dark grey, or the hue level's colour when split by hue.
    pub color: RGBColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxChart {
    pub categories: Vec<String>,
    pub hue_levels: Vec<String>,
    pub boxes: Vec<BoxElement>,
    /// Empty unless points were requested.
    pub points: Vec<SwarmPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub category: usize,
    pub hue: Option<usize>,
    /// Centre on the category axis.
    pub position: f64,
    pub width: f64,
    pub color: RGBColor,
    pub estimate: Estimate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub orientation: Orientation,
    pub categories: Vec<String>,
    pub hue_levels: Vec<String>,
    pub bars: Vec<Bar>,
}

/// One pie slice. Angles are in degrees, counter-clockwise from 3 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub value: f64,
    pub fraction: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub color: RGBColor,
    /// Formatted percentage, e.g. `"42.5%"`.
    pub label: String,
}

impl Wedge {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub wedges: Vec<Wedge>,
    /// Distance of the percentage labels from the centre, in radii.
    pub pct_distance: f64,
    /// Legend entries, at most one per wedge.
    pub legend: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionLine {
    pub slope: f64,
    pub intercept: f64,
    pub x_start: f64,
    pub x_end: f64,
    /// Sampled `(x, y)` points of the fitted line.
    pub line: Vec<(f64, f64)>,
    /// Sampled `(x, low, high)` confidence band; empty when it cannot be estimated.
    pub band: Vec<(f64, f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub points: Vec<(f64, f64)>,
    pub regression: Option<RegressionLine>,
}

impl ScatterChart {
    /// Padded x span of the points.
    pub fn data_x_range(&self) -> (f64, f64) {
        let (low, high) = extent(self.points.iter().map(|p| p.0));
        padded_range(low, high)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Box(BoxChart),
    Bar(BarChart),
    Pie(PieChart),
    Scatter(ScatterChart),
}

impl Chart {
    pub fn kind(&self) -> &'static str {
        match self {
            Chart::Box(_) => "boxplot",
            Chart::Bar(_) => "barplot",
            Chart::Pie(_) => "pie",
            Chart::Scatter(_) => "scatterplot",
        }
    }
}

/// A drawn chart together with its presentation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub style: Style,
    pub size: FigureSize,
    pub x_limits: Option<(f64, f64)>,
    pub y_limits: Option<(f64, f64)>,
    /// Rotation of the x tick labels in degrees, counter-clockwise.
    pub x_tick_rotation: Option<f64>,
    pub chart: Chart,
}

impl Figure {
    pub fn new(chart: Chart, style: Style, size: FigureSize) -> Self {
        Self {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            style,
            size,
            x_limits: None,
            y_limits: None,
            x_tick_rotation: None,
            chart,
        }
    }

    pub fn as_box(&self) -> Option<&BoxChart> {
        match &self.chart {
            Chart::Box(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn as_bar(&self) -> Option<&BarChart> {
        match &self.chart {
            Chart::Bar(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn as_pie(&self) -> Option<&PieChart> {
        match &self.chart {
            Chart::Pie(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn as_scatter(&self) -> Option<&ScatterChart> {
        match &self.chart {
            Chart::Scatter(chart) => Some(chart),
            _ => None,
        }
    }

    /// Visible x range: the explicit limits, else derived from the data.
    pub fn x_range(&self) -> (f64, f64) {
        if let Some(limits) = self.x_limits {
            return limits;
        }
        match &self.chart {
            Chart::Box(chart) => category_range(chart.categories.len()),
            Chart::Bar(chart) => match chart.orientation {
                Orientation::Vertical => category_range(chart.categories.len()),
                Orientation::Horizontal => Self::bar_value_range(chart),
            },
            Chart::Pie(_) => (-1.0, 1.0),
            Chart::Scatter(chart) => chart.data_x_range(),
        }
    }

    /// Visible y range: the explicit limits, else derived from the data.
    pub fn y_range(&self) -> (f64, f64) {
        if let Some(limits) = self.y_limits {
            return limits;
        }
        match &self.chart {
            Chart::Box(chart) => {
                let boxes = chart.boxes.iter().flat_map(|b| {
                    let (low, high) = b.stats.extent();
                    [low, high]
                });
                let points = chart.points.iter().map(|p| p.y);
                let (low, high) = extent(boxes.chain(points));
                padded_range(low, high)
            }
            Chart::Bar(chart) => match chart.orientation {
                Orientation::Vertical => Self::bar_value_range(chart),
                Orientation::Horizontal => category_range(chart.categories.len()),
            },
            Chart::Pie(_) => (-1.0, 1.0),
            Chart::Scatter(chart) => {
                let points = chart.points.iter().map(|p| p.1);
                let band = chart
                    .regression
                    .iter()
                    .flat_map(|r| r.band.iter().flat_map(|&(_, low, high)| [low, high]));
                let line = chart
                    .regression
                    .iter()
                    .flat_map(|r| r.line.iter().map(|p| p.1));
                let (low, high) = extent(points.chain(band).chain(line));
                padded_range(low, high)
            }
        }
    }

    /// Bars always start at zero, so the value axis includes it.
    fn bar_value_range(chart: &BarChart) -> (f64, f64) {
        let values = chart.bars.iter().flat_map(|bar| {
            let (low, high) = bar.estimate.ci.unwrap_or((bar.estimate.mean, bar.estimate.mean));
            [bar.estimate.mean, low, high]
        });
        let (low, high) = extent(values.chain([0.0]));
        padded_range(low, high)
    }

    /// Render to an RGB bitmap of `size.pixels()`.
    pub fn render(&self) -> GraphResult<RgbImage> {
        StaticChartRenderer::render_rgb(self)
    }

    /// Render and encode as PNG.
    pub fn to_png(&self) -> GraphResult<Vec<u8>> {
        let image = DynamicImage::ImageRgb8(self.render()?);
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Render as an SVG document.
    pub fn to_svg(&self) -> GraphResult<String> {
        StaticChartRenderer::render_svg(self)
    }

    /// Render and write to `path`; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> GraphResult<()> {
        self.render()?.save(path.as_ref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_size_is_640_by_480_pixels() {
        assert_eq!(FigureSize::default().pixels(), (640, 480));
        assert_eq!(FigureSize::new(8.0, 3.0).unwrap().pixels(), (800, 300));
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        assert!(FigureSize::new(0.0, 4.0).is_err());
        assert!(FigureSize::new(4.0, f64::NAN).is_err());
        assert!(FigureSize::resolve(Some((-1.0, 2.0))).is_err());
    }

    #[test]
    fn limits_must_be_finite_and_distinct() {
        assert!(check_limits("x", Some((1.0, 1.0))).is_err());
        assert!(check_limits("y", Some((0.0, f64::INFINITY))).is_err());
        assert_eq!(check_limits("x", Some((5.0, 1.0))).unwrap(), Some((5.0, 1.0)));
        assert_eq!(check_limits("x", None).unwrap(), None);
    }

    #[test]
    fn padded_range_adds_margins() {
        assert_eq!(padded_range(0.0, 10.0), (-0.5, 10.5));
        assert_eq!(padded_range(3.0, 3.0), (2.5, 3.5));
    }

    #[test]
    fn orientation_parses_only_v_and_h() {
        assert_eq!("v".parse::<Orientation>().unwrap(), Orientation::Vertical);
        assert_eq!("h".parse::<Orientation>().unwrap(), Orientation::Horizontal);
        let err = "d".parse::<Orientation>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "value for orient must be either \"v\" or \"h\" but d was passed"
        );
    }

    #[test]
    fn explicit_limits_override_data_ranges() {
        let chart = Chart::Scatter(ScatterChart {
            points: vec![(0.0, 0.0), (10.0, 20.0)],
            regression: None,
        });
        let mut figure = Figure::new(chart, Style::default(), FigureSize::default());
        assert_eq!(figure.x_range(), (-0.5, 10.5));
        assert_eq!(figure.y_range(), (-1.0, 21.0));
        figure.x_limits = Some((2.0, 4.0));
        assert_eq!(figure.x_range(), (2.0, 4.0));
    }
}
