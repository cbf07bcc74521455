//! Static Chart Renderer
//! Draws a `Figure` with plotters, either into an RGB bitmap or an SVG
//! document.
//!
//! Layout:
//! 1. Title centered above the plot area
//! 2. Cartesian charts: themed plot area, mesh, axis descriptions, series,
//!    hue legend in the upper right
//! 3. Pie charts: wedges on the left, percentage labels at `pct_distance`,
//!    legend to the right of the pie

use crate::charts::figure::{
    BarChart, BoxChart, Chart, Figure, Orientation, PieChart, ScatterChart,
};
use crate::charts::style::palette_color;
use crate::error::{GraphError, GraphResult};
use image::RgbImage;
use plotters::chart::ChartContext;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const FONT: &str = "sans-serif";
const EDGE: RGBColor = RGBColor(61, 61, 61);

type Plane<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn render_err(err: impl std::fmt::Display) -> GraphError {
    GraphError::Render(err.to_string())
}

/// Label of the category at an integer tick, empty between ticks.
fn category_name(names: &[String], value: f64) -> String {
    let index = value.round();
    if (value - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    names.get(index as usize).cloned().unwrap_or_default()
}

/// plotters only turns text by quarter turns; snap to the nearest one.
fn tick_transform(rotation: Option<f64>) -> FontTransform {
    let quarter_turns = rotation
        .filter(|r| r.is_finite())
        .map(|r| (r.rem_euclid(360.0) / 90.0).round() as i64 % 4)
        .unwrap_or(0);
    match quarter_turns {
        1 => FontTransform::Rotate270,
        2 => FontTransform::Rotate180,
        3 => FontTransform::Rotate90,
        _ => FontTransform::None,
    }
}

fn in_range(value: f64, (low, high): (f64, f64)) -> bool {
    value >= low.min(high) && value <= low.max(high)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    pub fn render_rgb(figure: &Figure) -> GraphResult<RgbImage> {
        let (width, height) = figure.size.pixels();
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::draw(&root, figure)?;
            root.present().map_err(render_err)?;
        }
        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| GraphError::Render("bitmap buffer has the wrong size".to_string()))
    }

    pub fn render_svg(figure: &Figure) -> GraphResult<String> {
        let (width, height) = figure.size.pixels();
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            Self::draw(&root, figure)?;
            root.present().map_err(render_err)?;
        }
        Ok(svg)
    }

    fn draw<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> GraphResult<()> {
        root.fill(&WHITE).map_err(render_err)?;
        match &figure.chart {
            Chart::Box(chart) => Self::draw_box_chart(root, figure, chart),
            Chart::Bar(chart) => Self::draw_bar_chart(root, figure, chart),
            Chart::Pie(chart) => Self::draw_pie_chart(root, figure, chart),
            Chart::Scatter(chart) => Self::draw_scatter_chart(root, figure, chart),
        }
    }

    fn plane<'a, DB: DrawingBackend>(
        root: &'a DrawingArea<DB, Shift>,
        figure: &Figure,
    ) -> GraphResult<Plane<'a, DB>> {
        let (x_low, x_high) = figure.x_range();
        let (y_low, y_high) = figure.y_range();

        let mut builder = ChartBuilder::on(root);
        builder
            .margin(15)
            .x_label_area_size(if figure.x_tick_rotation.is_some() { 70 } else { 45 })
            .y_label_area_size(60);
        if !figure.title.is_empty() {
            builder.caption(&figure.title, (FONT, 20));
        }

        let chart = builder
            .build_cartesian_2d(x_low..x_high, y_low..y_high)
            .map_err(render_err)?;
        chart
            .plotting_area()
            .fill(&figure.style.background())
            .map_err(render_err)?;
        Ok(chart)
    }

    fn draw_mesh<DB: DrawingBackend>(
        chart: &mut Plane<'_, DB>,
        figure: &Figure,
        x_categories: Option<&[String]>,
        y_categories: Option<&[String]>,
    ) -> GraphResult<()> {
        let x_format = |v: &f64| match x_categories {
            Some(names) => category_name(names, *v),
            None => format!("{v:.2}"),
        };
        let y_format = |v: &f64| match y_categories {
            Some(names) => category_name(names, *v),
            None => format!("{v:.2}"),
        };
        let x_label_style = (FONT, 12)
            .into_font()
            .transform(tick_transform(figure.x_tick_rotation));

        let mut mesh = chart.configure_mesh();
        mesh.x_desc(figure.x_label.as_str())
            .y_desc(figure.y_label.as_str())
            .axis_desc_style((FONT, 14))
            .x_label_style(x_label_style)
            .y_label_style((FONT, 12))
            .x_label_formatter(&x_format)
            .y_label_formatter(&y_format)
            .light_line_style(WHITE.mix(0.0))
            .set_all_tick_mark_size(if figure.style.tick_marks() { 5 } else { 0 });
        if let Some(names) = x_categories {
            mesh.x_labels(names.len().max(1)).disable_x_mesh();
        }
        if let Some(names) = y_categories {
            mesh.y_labels(names.len().max(1)).disable_y_mesh();
        }
        match figure.style.grid() {
            Some(grid) => {
                mesh.bold_line_style(grid.stroke_width(1));
            }
            None => {
                mesh.disable_mesh();
            }
        }
        mesh.draw().map_err(render_err)
    }

    fn draw_hue_legend<'a, DB: DrawingBackend + 'a>(
        chart: &mut Plane<'a, DB>,
        hue_levels: &[String],
    ) -> GraphResult<()> {
        if hue_levels.is_empty() {
            return Ok(());
        }
        for (i, level) in hue_levels.iter().enumerate() {
            let color = palette_color(i);
            chart
                .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())
                .map_err(render_err)?
                .label(level.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(EDGE)
            .label_font((FONT, 12))
            .draw()
            .map_err(render_err)
    }

    fn draw_box_chart<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
        data: &BoxChart,
    ) -> GraphResult<()> {
        let mut chart = Self::plane(root, figure)?;
        Self::draw_mesh(&mut chart, figure, Some(data.categories.as_slice()), None)?;

        for element in &data.boxes {
            let stats = &element.stats;
            let left = element.position - element.width * 0.45;
            let right = element.position + element.width * 0.45;
            let cap = element.width * 0.2;
            let x = element.position;

            chart
                .draw_series([
                    Rectangle::new([(left, stats.q1), (right, stats.q3)], element.color.filled()),
                    Rectangle::new([(left, stats.q1), (right, stats.q3)], EDGE.stroke_width(1)),
                ])
                .map_err(render_err)?;
            chart
                .draw_series([
                    PathElement::new(vec![(left, stats.median), (right, stats.median)], EDGE.stroke_width(2)),
                    PathElement::new(vec![(x, stats.whisker_low), (x, stats.q1)], EDGE.stroke_width(1)),
                    PathElement::new(vec![(x, stats.q3), (x, stats.whisker_high)], EDGE.stroke_width(1)),
                    PathElement::new(
                        vec![(x - cap, stats.whisker_low), (x + cap, stats.whisker_low)],
                        EDGE.stroke_width(1),
                    ),
                    PathElement::new(
                        vec![(x - cap, stats.whisker_high), (x + cap, stats.whisker_high)],
                        EDGE.stroke_width(1),
                    ),
                ])
                .map_err(render_err)?;
            chart
                .draw_series(
                    stats
                        .fliers
                        .iter()
                        .map(|&v| Circle::new((x, v), 3, EDGE.stroke_width(1))),
                )
                .map_err(render_err)?;
        }

        let y_range = figure.y_range();
        chart
            .draw_series(
                data.points
                    .iter()
                    .filter(|p| in_range(p.y, y_range))
                    .map(|p| Circle::new((p.x, p.y), 3, p.color.filled())),
            )
            .map_err(render_err)?;

        Self::draw_hue_legend(&mut chart, &data.hue_levels)
    }

    fn draw_bar_chart<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
        data: &BarChart,
    ) -> GraphResult<()> {
        let mut chart = Self::plane(root, figure)?;
        let horizontal = data.orientation == Orientation::Horizontal;
        if horizontal {
            Self::draw_mesh(&mut chart, figure, None, Some(data.categories.as_slice()))?;
        } else {
            Self::draw_mesh(&mut chart, figure, Some(data.categories.as_slice()), None)?;
        }

        // (category axis, value axis) -> (x, y)
        let place = |slot: f64, value: f64| if horizontal { (value, slot) } else { (slot, value) };

        chart
            .draw_series(data.bars.iter().map(|bar| {
                let half = bar.width / 2.0;
                Rectangle::new(
                    [
                        place(bar.position - half, 0.0),
                        place(bar.position + half, bar.estimate.mean),
                    ],
                    bar.color.filled(),
                )
            }))
            .map_err(render_err)?;
        chart
            .draw_series(data.bars.iter().filter_map(|bar| {
                let (low, high) = bar.estimate.ci?;
                Some(PathElement::new(
                    vec![place(bar.position, low), place(bar.position, high)],
                    EDGE.stroke_width(2),
                ))
            }))
            .map_err(render_err)?;

        Self::draw_hue_legend(&mut chart, &data.hue_levels)
    }

    fn draw_scatter_chart<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
        data: &ScatterChart,
    ) -> GraphResult<()> {
        let mut chart = Self::plane(root, figure)?;
        Self::draw_mesh(&mut chart, figure, None, None)?;

        let x_range = figure.x_range();
        let y_range = figure.y_range();
        let color = palette_color(0);

        chart
            .draw_series(
                data.points
                    .iter()
                    .filter(|(x, y)| in_range(*x, x_range) && in_range(*y, y_range))
                    .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
            )
            .map_err(render_err)?;

        if let Some(regression) = &data.regression {
            if !regression.band.is_empty() {
                let upper = regression.band.iter().map(|&(x, _, high)| (x, high));
                let lower = regression.band.iter().rev().map(|&(x, low, _)| (x, low));
                chart
                    .draw_series(std::iter::once(Polygon::new(
                        upper.chain(lower).collect::<Vec<_>>(),
                        color.mix(0.15).filled(),
                    )))
                    .map_err(render_err)?;
            }
            chart
                .draw_series(LineSeries::new(
                    regression.line.iter().copied(),
                    color.stroke_width(2),
                ))
                .map_err(render_err)?;
        }

        Ok(())
    }

    fn draw_pie_chart<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
        data: &PieChart,
    ) -> GraphResult<()> {
        let (width, height) = root.dim_in_pixel();
        let (width, height) = (width as f64, height as f64);
        let radius = (width * 0.3).min(height * 0.32);
        let (cx, cy) = (width * 0.4, height * 0.55);
        let point = |angle: f64, distance: f64| {
            let rad = angle.to_radians();
            (
                (cx + distance * rad.cos()).round() as i32,
                (cy - distance * rad.sin()).round() as i32,
            )
        };

        if !figure.title.is_empty() {
            root.draw(&Text::new(
                figure.title.clone(),
                ((width / 2.0) as i32, (height * 0.07) as i32),
                (FONT, 20)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            ))
            .map_err(render_err)?;
        }

        for wedge in &data.wedges {
            let steps = ((wedge.end_angle - wedge.start_angle) / 2.0).ceil().max(1.0) as usize;
            let mut outline = vec![point(0.0, 0.0)];
            outline.extend((0..=steps).map(|i| {
                let angle = wedge.start_angle + (wedge.end_angle - wedge.start_angle) * i as f64 / steps as f64;
                point(angle, radius)
            }));

            root.draw(&Polygon::new(outline.clone(), wedge.color.filled()))
                .map_err(render_err)?;
            outline.push(point(0.0, 0.0));
            root.draw(&PathElement::new(outline, WHITE.stroke_width(1)))
                .map_err(render_err)?;
        }

        let label_style = (FONT, 13)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        for wedge in &data.wedges {
            root.draw(&Text::new(
                wedge.label.clone(),
                point(wedge.mid_angle(), radius * data.pct_distance),
                label_style.clone(),
            ))
            .map_err(render_err)?;
        }

        if !data.legend.is_empty() {
            let row = 22.0;
            let left = (cx + radius * data.pct_distance.max(1.0) + 40.0) as i32;
            let top = (cy - row * data.legend.len() as f64 / 2.0) as i32;
            let entry_style = (FONT, 13)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center));

            let mut text_width = 0;
            for label in &data.legend {
                let (w, _) = root
                    .estimate_text_size(label, &entry_style)
                    .map_err(render_err)?;
                text_width = text_width.max(w as i32);
            }
            root.draw(&Rectangle::new(
                [
                    (left - 8, top - 8),
                    (left + 28 + text_width, top + (row * data.legend.len() as f64) as i32 + 4),
                ],
                EDGE.mix(0.4).stroke_width(1),
            ))
            .map_err(render_err)?;

            for (i, label) in data.legend.iter().enumerate() {
                let y = top + (row * i as f64) as i32;
                root.draw(&Rectangle::new(
                    [(left, y), (left + 14, y + 14)],
                    palette_color(i).filled(),
                ))
                .map_err(render_err)?;
                root.draw(&Text::new(label.clone(), (left + 20, y + 7), entry_style.clone()))
                    .map_err(render_err)?;
            }
        }

        Ok(())
    }
}
