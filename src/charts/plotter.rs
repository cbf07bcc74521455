//! Chart Plotter Module
//! Lays out grouped data as chart geometry: dodged boxes and bars, swarm
//! points, pie wedges and sampled regression lines.

use crate::charts::figure::{
    Bar, BarChart, BoxChart, BoxElement, Orientation, PieChart, RegressionLine, ScatterChart,
    SwarmPoint, Wedge,
};
use crate::charts::style::{palette_color, POINT_COLOR};
use crate::data::GroupedValues;
use crate::error::{GraphError, GraphResult};
use crate::stats::{LinearFit, StatsCalculator};
use plotters::style::RGBColor;
use std::collections::HashMap;

/// Share of a category slot covered by its boxes or bars.
pub const GROUP_WIDTH: f64 = 0.8;

/// Number of samples along a regression line.
pub const REGRESSION_SAMPLES: usize = 100;

/// Most decimals a pie percentage label may show.
pub const MAX_PIE_DECIMALS: usize = 15;

/// Builds chart models from processed data.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Colour of a group: by hue level when split, else by category.
    pub fn group_color(category: usize, hue: Option<usize>) -> RGBColor {
        palette_color(hue.unwrap_or(category))
    }

    /// Centre and width of the element for `hue` within `category`.
    pub fn dodge(category: usize, hue: Option<usize>, hue_count: usize) -> (f64, f64) {
        let center = category as f64;
        match hue {
            Some(h) if hue_count > 0 => {
                let width = GROUP_WIDTH / hue_count as f64;
                (center - GROUP_WIDTH / 2.0 + (h as f64 + 0.5) * width, width)
            }
            _ => (center, GROUP_WIDTH),
        }
    }

    /// Calculate beeswarm positions for points that collide at `resolution`.
    ///
    /// Points whose values round to the same bucket are spread symmetrically
    /// across `width`; isolated points stay on `center`.
    pub fn beeswarm_positions(y_values: &[f64], center: f64, width: f64, resolution: f64) -> Vec<f64> {
        let n = y_values.len();
        if n == 0 {
            return Vec::new();
        }

        let mut positions = vec![center; n];
        let resolution = if resolution > 0.0 { resolution } else { 1e-6 };

        let mut value_indices: HashMap<i64, Vec<usize>> = HashMap::new();
        for (i, &y) in y_values.iter().enumerate() {
            let key = (y / resolution).round() as i64;
            value_indices.entry(key).or_default().push(i);
        }

        for indices in value_indices.values() {
            if indices.len() > 1 {
                let count = indices.len();
                let step = width / (count.max(2) - 1) as f64;
                let start = center - width / 2.0;

                for (i, &idx) in indices.iter().enumerate() {
                    positions[idx] = start + i as f64 * step;
                }
            }
        }

        positions
    }

    pub fn box_chart(grouped: &GroupedValues, show_points: bool) -> BoxChart {
        let hue_count = grouped.hue_levels.len();
        let boxes = grouped
            .groups
            .iter()
            .filter_map(|group| {
                let stats = StatsCalculator::box_stats(&group.values)?;
                let (position, width) = Self::dodge(group.category, group.hue, hue_count);
                Some(BoxElement {
                    category: group.category,
                    hue: group.hue,
                    position,
                    width,
                    color: Self::group_color(group.category, group.hue),
                    stats,
                })
            })
            .collect();

        let points = if show_points {
            Self::swarm_points(grouped)
        } else {
            Vec::new()
        };

        BoxChart {
            categories: grouped.categories.clone(),
            hue_levels: grouped.hue_levels.clone(),
            boxes,
            points,
        }
    }

    /// One swarm per category, centred on the category rather than on the
    /// dodged boxes. Points take their hue level's colour when split.
    pub fn swarm_points(grouped: &GroupedValues) -> Vec<SwarmPoint> {
        let mut points = Vec::new();
        for category in 0..grouped.categories.len() {
            let members: Vec<(f64, Option<usize>)> = grouped
                .groups
                .iter()
                .filter(|group| group.category == category)
                .flat_map(|group| group.values.iter().map(move |&v| (v, group.hue)))
                .collect();
            if members.is_empty() {
                continue;
            }

            let values: Vec<f64> = members.iter().map(|&(v, _)| v).collect();
            let (low, high) = values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
                    (min.min(v), max.max(v))
                });
            let xs = Self::beeswarm_positions(
                &values,
                category as f64,
                GROUP_WIDTH * 0.8,
                (high - low) / 100.0,
            );

            points.extend(xs.into_iter().zip(members).map(|(x, (y, hue))| SwarmPoint {
                x,
                y,
                color: hue.map(palette_color).unwrap_or(POINT_COLOR),
            }));
        }
        points
    }

    pub fn bar_chart(grouped: &GroupedValues, orientation: Orientation) -> BarChart {
        let hue_count = grouped.hue_levels.len();
        let bars = grouped
            .groups
            .iter()
            .filter_map(|group| {
                let estimate = StatsCalculator::mean_estimate(&group.values)?;
                let (position, width) = Self::dodge(group.category, group.hue, hue_count);
                Some(Bar {
                    category: group.category,
                    hue: group.hue,
                    position,
                    width,
                    color: Self::group_color(group.category, group.hue),
                    estimate,
                })
            })
            .collect();

        BarChart {
            orientation,
            categories: grouped.categories.clone(),
            hue_levels: grouped.hue_levels.clone(),
            bars,
        }
    }

    /// Slice `values` into wedges labelled with their percentage share.
    pub fn pie_chart(
        values: &[f64],
        decimals: usize,
        pct_distance: f64,
        labels: Option<&[String]>,
    ) -> GraphResult<PieChart> {
        if decimals > MAX_PIE_DECIMALS {
            return Err(GraphError::InvalidPieValues(format!(
                "at most {MAX_PIE_DECIMALS} decimals can be shown, got {decimals}"
            )));
        }
        if values.is_empty() {
            return Err(GraphError::InvalidPieValues("no values".to_string()));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(GraphError::InvalidPieValues(format!(
                "wedge sizes must be non-negative, got {bad}"
            )));
        }
        let total: f64 = values.iter().sum();
        if total <= 0.0 {
            return Err(GraphError::InvalidPieValues(
                "wedge sizes sum to zero".to_string(),
            ));
        }

        let mut start_angle = 0.0;
        let wedges = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let fraction = value / total;
                let end_angle = start_angle + fraction * 360.0;
                let wedge = Wedge {
                    value,
                    fraction,
                    start_angle,
                    end_angle,
                    color: palette_color(i),
                    label: format!("{:.*}%", decimals, fraction * 100.0),
                };
                start_angle = end_angle;
                wedge
            })
            .collect::<Vec<_>>();

        let legend = labels
            .map(|labels| labels.iter().take(wedges.len()).cloned().collect())
            .unwrap_or_default();

        Ok(PieChart {
            wedges,
            pct_distance,
            legend,
        })
    }

    /// Sample `fit` between `x_start` and `x_end`.
    pub fn regression_line(fit: &LinearFit, x_start: f64, x_end: f64) -> RegressionLine {
        let step = (x_end - x_start) / (REGRESSION_SAMPLES - 1) as f64;
        let xs: Vec<f64> = (0..REGRESSION_SAMPLES)
            .map(|i| x_start + i as f64 * step)
            .collect();

        let line = xs.iter().map(|&x| (x, fit.predict(x))).collect();
        let band = xs
            .iter()
            .filter_map(|&x| fit.confidence_band(x).map(|(low, high)| (x, low, high)))
            .collect();

        RegressionLine {
            slope: fit.slope,
            intercept: fit.intercept,
            x_start,
            x_end,
            line,
            band,
        }
    }

    pub fn scatter_chart(xs: &[f64], ys: &[f64], regression: Option<RegressionLine>) -> ScatterChart {
        ScatterChart {
            points: xs.iter().copied().zip(ys.iter().copied()).collect(),
            regression,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Group;
    use approx::assert_relative_eq;

    fn grouped_with_hue() -> GroupedValues {
        GroupedValues {
            categories: vec!["a".into(), "b".into()],
            hue_levels: vec!["x".into(), "y".into()],
            groups: vec![
                Group {
                    category: 0,
                    hue: Some(0),
                    values: vec![1.0, 2.0, 3.0],
                },
                Group {
                    category: 0,
                    hue: Some(1),
                    values: vec![2.0, 2.0, 4.0],
                },
                Group {
                    category: 1,
                    hue: Some(1),
                    values: vec![5.0],
                },
            ],
        }
    }

    #[test]
    fn dodge_splits_the_category_slot() {
        let (left, width) = ChartPlotter::dodge(1, Some(0), 2);
        let (right, _) = ChartPlotter::dodge(1, Some(1), 2);
        assert_relative_eq!(width, 0.4);
        assert_relative_eq!(left, 0.8);
        assert_relative_eq!(right, 1.2);
        assert_eq!(ChartPlotter::dodge(2, None, 0), (2.0, GROUP_WIDTH));
    }

    #[test]
    fn beeswarm_spreads_only_duplicates() {
        let xs = ChartPlotter::beeswarm_positions(&[1.0, 2.0, 2.0, 3.0], 0.0, 0.4, 0.01);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[3], 0.0);
        assert_relative_eq!(xs[1], -0.2);
        assert_relative_eq!(xs[2], 0.2);
    }

    #[test]
    fn box_chart_colors_by_hue_and_collects_points() {
        let chart = ChartPlotter::box_chart(&grouped_with_hue(), true);
        assert_eq!(chart.boxes.len(), 3);
        assert_eq!(chart.boxes[1].color, palette_color(1));
        assert_eq!(chart.boxes[2].color, palette_color(1));
        assert_eq!(chart.points.len(), 7);
        assert_eq!(chart.points[0].color, palette_color(0));
        assert_eq!(chart.points[3].color, palette_color(1));

        let without = ChartPlotter::box_chart(&grouped_with_hue(), false);
        assert!(without.points.is_empty());
    }

    #[test]
    fn hue_swarm_sits_on_the_category_centre() {
        let points = ChartPlotter::swarm_points(&grouped_with_hue());
        // category 0 holds 1, 2, 3 and 2, 2, 4: the three 2s collide
        let category_a: Vec<&SwarmPoint> = points.iter().filter(|p| p.x < 0.5).collect();
        assert_eq!(category_a.len(), 6);
        let spread: Vec<f64> = category_a.iter().filter(|p| p.y == 2.0).map(|p| p.x).collect();
        assert_eq!(spread.len(), 3);
        assert_relative_eq!(spread[0], -0.32);
        assert_relative_eq!(spread[1], 0.0);
        assert_relative_eq!(spread[2], 0.32);
        let lone = points.iter().find(|p| p.y == 5.0).unwrap();
        assert_relative_eq!(lone.x, 1.0);
        assert_eq!(lone.color, palette_color(1));
    }

    #[test]
    fn swarm_without_hue_is_dark_grey() {
        let grouped = GroupedValues {
            categories: vec!["a".into()],
            hue_levels: Vec::new(),
            groups: vec![Group {
                category: 0,
                hue: None,
                values: vec![1.0, 2.0],
            }],
        };
        let points = ChartPlotter::swarm_points(&grouped);
        assert!(points.iter().all(|p| p.color == POINT_COLOR && p.x == 0.0));
    }

    #[test]
    fn bar_chart_estimates_means() {
        let chart = ChartPlotter::bar_chart(&grouped_with_hue(), Orientation::Horizontal);
        assert_eq!(chart.orientation, Orientation::Horizontal);
        let means: Vec<f64> = chart.bars.iter().map(|b| b.estimate.mean).collect();
        assert_eq!(means, vec![2.0, 8.0 / 3.0, 5.0]);
        assert!(chart.bars[2].estimate.ci.is_none());
    }

    #[test]
    fn pie_labels_use_requested_precision() {
        let chart = ChartPlotter::pie_chart(&[1.0, 2.0, 1.0], 2, 1.15, None).unwrap();
        let labels: Vec<&str> = chart.wedges.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(labels, vec!["25.00%", "50.00%", "25.00%"]);
        assert_relative_eq!(chart.wedges[2].end_angle, 360.0);
        assert_relative_eq!(chart.wedges[1].mid_angle(), 180.0);
        assert!(chart.legend.is_empty());
    }

    #[test]
    fn pie_legend_is_capped_at_wedge_count() {
        let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let chart = ChartPlotter::pie_chart(&[3.0, 1.0], 0, 1.15, Some(labels.as_slice())).unwrap();
        assert_eq!(chart.legend, vec!["a", "b"]);
        assert_eq!(chart.wedges[0].label, "75%");
    }

    #[test]
    fn pie_rejects_negative_or_empty_values() {
        assert!(ChartPlotter::pie_chart(&[1.0, -1.0], 1, 1.15, None).is_err());
        assert!(ChartPlotter::pie_chart(&[0.0, 0.0], 1, 1.15, None).is_err());
        assert!(ChartPlotter::pie_chart(&[], 1, 1.15, None).is_err());
    }

    #[test]
    fn pie_caps_label_precision() {
        assert!(ChartPlotter::pie_chart(&[1.0], MAX_PIE_DECIMALS, 1.15, None).is_ok());
        let err = ChartPlotter::pie_chart(&[1.0], usize::MAX, 1.15, None).unwrap_err();
        assert!(matches!(err, GraphError::InvalidPieValues(_)));
    }

    #[test]
    fn regression_line_spans_requested_extent() {
        let fit = StatsCalculator::linear_fit(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.2]).unwrap();
        let line = ChartPlotter::regression_line(&fit, -1.0, 4.0);
        assert_eq!(line.line.len(), REGRESSION_SAMPLES);
        assert_relative_eq!(line.line[0].0, -1.0);
        assert_relative_eq!(line.line[REGRESSION_SAMPLES - 1].0, 4.0, epsilon = 1e-12);
        assert_eq!(line.band.len(), REGRESSION_SAMPLES);
    }
}
