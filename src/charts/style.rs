//! Visual themes and the categorical colour palette.

use crate::error::GraphError;
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical palette, cycled by group index.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(76, 114, 176),  // Blue
    RGBColor(221, 132, 82),  // Orange
    RGBColor(85, 168, 104),  // Green
    RGBColor(196, 78, 82),   // Red
    RGBColor(129, 114, 179), // Purple
    RGBColor(147, 120, 96),  // Brown
    RGBColor(218, 139, 195), // Pink
    RGBColor(140, 140, 140), // Grey
    RGBColor(204, 185, 116), // Olive
    RGBColor(100, 181, 205), // Cyan
];

/// Colour of swarm points drawn over boxes.
pub const POINT_COLOR: RGBColor = RGBColor(64, 64, 64);

const SHADED_BACKGROUND: RGBColor = RGBColor(234, 234, 242);
const PLAIN_BACKGROUND: RGBColor = RGBColor(255, 255, 255);
const LIGHT_GRID: RGBColor = RGBColor(204, 204, 204);

pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Named visual theme applied to every chart a `GraphMaker` draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Shaded plot area with a white grid.
    #[default]
    DarkGrid,
    /// White plot area with a light grey grid.
    WhiteGrid,
    /// Shaded plot area, no grid.
    Dark,
    /// White plot area, no grid.
    White,
    /// White plot area, no grid, tick marks on the axes.
    Ticks,
}

impl Style {
    pub fn name(&self) -> &'static str {
        match self {
            Style::DarkGrid => "darkgrid",
            Style::WhiteGrid => "whitegrid",
            Style::Dark => "dark",
            Style::White => "white",
            Style::Ticks => "ticks",
        }
    }

    pub fn background(&self) -> RGBColor {
        match self {
            Style::DarkGrid | Style::Dark => SHADED_BACKGROUND,
            Style::WhiteGrid | Style::White | Style::Ticks => PLAIN_BACKGROUND,
        }
    }

    pub fn grid(&self) -> Option<RGBColor> {
        match self {
            Style::DarkGrid => Some(PLAIN_BACKGROUND),
            Style::WhiteGrid => Some(LIGHT_GRID),
            Style::Dark | Style::White | Style::Ticks => None,
        }
    }

    pub fn tick_marks(&self) -> bool {
        matches!(self, Style::Ticks)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "darkgrid" => Ok(Style::DarkGrid),
            "whitegrid" => Ok(Style::WhiteGrid),
            "dark" => Ok(Style::Dark),
            "white" => Ok(Style::White),
            "ticks" => Ok(Style::Ticks),
            _ => Err(GraphError::UnknownStyle(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("WhiteGrid".parse::<Style>().unwrap(), Style::WhiteGrid);
        assert_eq!(" ticks ".parse::<Style>().unwrap(), Style::Ticks);
        for style in [
            Style::DarkGrid,
            Style::WhiteGrid,
            Style::Dark,
            Style::White,
            Style::Ticks,
        ] {
            assert_eq!(style.name().parse::<Style>().unwrap(), style);
        }
    }

    #[test]
    fn unknown_style_is_rejected() {
        let err = "neon".parse::<Style>().unwrap_err();
        assert!(matches!(err, GraphError::UnknownStyle(ref s) if s == "neon"));
    }

    #[test]
    fn only_grid_styles_draw_a_grid() {
        assert!(Style::DarkGrid.grid().is_some());
        assert!(Style::WhiteGrid.grid().is_some());
        assert!(Style::White.grid().is_none());
        assert!(Style::Ticks.tick_marks());
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(palette_color(0), palette_color(PALETTE.len()));
    }
}
