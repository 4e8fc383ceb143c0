//! Data model for plotting solved trajectories.
//!
//! Nothing in here draws anything: a [Figure] only arranges series into panels, and a
//! [Renderer] decides what to do with it.

mod render;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PkError;

pub use render::CsvRenderer;

/// Maximum number of series a side by side figure can hold
pub const MAX_SIDE_BY_SIDE: usize = 2;

/// How several series are arranged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Every series on the same panel
    #[default]
    Overlay,
    /// One panel per series, at most [MAX_SIDE_BY_SIDE]
    SideBySide,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Overlay => write!(f, "overlay"),
            Layout::SideBySide => write!(f, "side_by_side"),
        }
    }
}

impl FromStr for Layout {
    type Err = PkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overlay" => Ok(Layout::Overlay),
            "side_by_side" => Ok(Layout::SideBySide),
            other => Err(PkError::validation(format!(
                "unknown layout '{}', options are 'overlay' or 'side_by_side'",
                other
            ))),
        }
    }
}

/// A single curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, times: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            times,
            values,
        }
    }

    /// `(time, value)` points of the curve
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Panel {
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    layout: Layout,
    panels: Vec<Panel>,
}

impl Figure {
    pub fn new(layout: Layout, series: Vec<Series>) -> Result<Self, PkError> {
        if let Some(s) = series.iter().find(|s| s.times.len() != s.values.len()) {
            return Err(PkError::validation(format!(
                "series '{}' has {} time points but {} values",
                s.label,
                s.times.len(),
                s.values.len()
            )));
        }
        let panels = match layout {
            Layout::Overlay => vec![Panel { series }],
            Layout::SideBySide => {
                if series.len() > MAX_SIDE_BY_SIDE {
                    return Err(PkError::validation(format!(
                        "side by side figures support at most {} series, got {}",
                        MAX_SIDE_BY_SIDE,
                        series.len()
                    )));
                }
                series
                    .into_iter()
                    .map(|s| Panel { series: vec![s] })
                    .collect()
            }
        };
        Ok(Self { layout, panels })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }
}

/// Presentation backend for a [Figure]
pub trait Renderer {
    fn render(&mut self, figure: &Figure) -> Result<(), PkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(label: &str) -> Series {
        Series::new(label, vec![0.0, 1.0], vec![2.0, 1.0])
    }

    #[test]
    fn overlay_uses_single_panel() {
        let figure = Figure::new(
            Layout::Overlay,
            vec![series("a"), series("b"), series("c")],
        )
        .unwrap();
        assert_eq!(figure.panels().len(), 1);
        assert_eq!(figure.panels()[0].series.len(), 3);
    }

    #[test]
    fn side_by_side_uses_one_panel_per_series() {
        let figure = Figure::new(Layout::SideBySide, vec![series("a"), series("b")]).unwrap();
        assert_eq!(figure.panels().len(), 2);
        assert_eq!(figure.panels()[1].series[0].label, "b");
    }

    #[test]
    fn side_by_side_is_limited_to_two() {
        let err = Figure::new(
            Layout::SideBySide,
            vec![series("a"), series("b"), series("c")],
        )
        .unwrap_err();
        assert!(matches!(err, PkError::Validation(_)));
    }

    #[test]
    fn mismatched_series_is_rejected() {
        let bad = Series::new("bad", vec![0.0], vec![]);
        assert!(Figure::new(Layout::Overlay, vec![bad]).is_err());
    }

    #[test]
    fn layout_parsing() {
        assert_eq!("overlay".parse::<Layout>().unwrap(), Layout::Overlay);
        assert_eq!(
            "side_by_side".parse::<Layout>().unwrap(),
            Layout::SideBySide
        );
        assert!("grid".parse::<Layout>().is_err());
        assert_eq!(Layout::SideBySide.to_string(), "side_by_side");
    }

    #[test]
    fn series_points() {
        let points: Vec<_> = series("a").points().collect();
        assert_eq!(points, vec![(0.0, 2.0), (1.0, 1.0)]);
    }
}
