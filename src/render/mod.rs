//! Chart rendering module
//!
//! Draws labeled price series for visual inspection

mod svg;

pub use svg::SvgRenderer;

use crate::series::TimeSeries;

/// A labeled line on a chart
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub label: String,
    /// CSS color for the line
    pub color: String,
    pub data: TimeSeries,
}

impl ChartSeries {
    pub fn new(label: impl Into<String>, color: impl Into<String>, data: TimeSeries) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            data,
        }
    }
}

/// A line chart with a shared time axis
#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
}

/// Trait for chart outputs
pub trait ChartRenderer {
    fn render(&self, chart: &Chart) -> anyhow::Result<()>;
}
