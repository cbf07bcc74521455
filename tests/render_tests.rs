//! Rendering goes through plotters' text layout, which needs a system
//! sans-serif font. Run with `cargo test -- --ignored` on a machine that has one.

use graph_maker::{BarplotOptions, BoxplotOptions, GraphMaker, Orientation, PieOptions, ScatterOptions};
use polars::prelude::*;

fn maker() -> GraphMaker {
    let df = df!(
        "day" => ["Thu", "Fri", "Thu", "Sat", "Fri", "Sat"],
        "sex" => ["M", "F", "F", "M", "M", "F"],
        "total" => [10.0, 20.0, 14.0, 31.0, 22.0, 29.0],
        "tip" => [1.5, 3.0, 2.0, 5.0, 3.5, 4.0]
    )
    .expect("valid frame");
    GraphMaker::new()
        .with_x("day")
        .with_y("total")
        .with_title("Bills")
        .with_data(df)
}

#[test]
#[ignore = "needs a system sans-serif font"]
fn bitmap_matches_figure_size() -> anyhow::Result<()> {
    let figure = maker().boxplot(&BoxplotOptions::default().with_figsize(5.0, 3.0).with_points(true))?;
    let image = figure.render()?;
    assert_eq!(image.dimensions(), (500, 300));
    Ok(())
}

#[test]
#[ignore = "needs a system sans-serif font"]
fn png_bytes_carry_the_png_signature() -> anyhow::Result<()> {
    let figure = maker().barplot(&BarplotOptions::default().with_orient(Orientation::Horizontal))?;
    let png = figure.to_png()?;
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    Ok(())
}

#[test]
#[ignore = "needs a system sans-serif font"]
fn svg_contains_the_title() -> anyhow::Result<()> {
    let figure = maker()
        .with_x("total")
        .with_y("tip")
        .scatterplot(&ScatterOptions::default().with_reg_line(true))?;
    let svg = figure.to_svg()?;
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Bills"));
    Ok(())
}

#[test]
#[ignore = "needs a system sans-serif font"]
fn pie_with_legend_renders() -> anyhow::Result<()> {
    let figure = maker().pie(
        &PieOptions::default()
            .with_values(vec![1.0, 2.0, 3.0])
            .with_labels(["a", "b", "c"]),
    )?;
    let svg = figure.to_svg()?;
    assert!(svg.contains("50.0%"));
    Ok(())
}

#[test]
#[ignore = "needs a system sans-serif font"]
fn hue_legend_lists_every_level() -> anyhow::Result<()> {
    let figure = maker().boxplot(&BoxplotOptions::default().with_hue("sex").with_points(true))?;
    let svg = figure.to_svg()?;
    assert!(svg.contains("\nM\n</text>"));
    assert!(svg.contains("\nF\n</text>"));

    let bars = maker().barplot(&BarplotOptions::default().with_hue("sex"))?;
    assert_eq!(bars.render()?.dimensions(), (640, 480));
    Ok(())
}
