//! SVG line chart output

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use super::{Chart, ChartRenderer};

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const Y_TICKS: usize = 5;
const X_TICKS: usize = 6;

/// Writes a chart as a standalone SVG file
pub struct SvgRenderer {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl SvgRenderer {
    /// 1200x600 chart at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_size(path, 1200, 600)
    }

    pub fn with_size(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }

    /// Render the chart to an SVG document
    pub fn to_svg(&self, chart: &Chart) -> anyhow::Result<String> {
        let bounds = Bounds::of(chart)
            .ok_or_else(|| anyhow::anyhow!("Chart '{}' has no data points", chart.title))?;

        let (w, h) = (self.width as f64, self.height as f64);
        let plot_w = w - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = h - MARGIN_TOP - MARGIN_BOTTOM;
        let x_of = |t: f64| MARGIN_LEFT + (t - bounds.x_min) / (bounds.x_max - bounds.x_min) * plot_w;
        let y_of = |v: f64| MARGIN_TOP + (bounds.y_max - v) / (bounds.y_max - bounds.y_min) * plot_h;

        let mut out = String::new();
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#
        )?;
        writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            out,
            r#"<text x="{:.1}" y="28" text-anchor="middle" font-size="18">{}</text>"#,
            w / 2.0,
            escape(&chart.title)
        )?;

        // Grid
        for i in 0..=Y_TICKS {
            let v = bounds.y_min + (bounds.y_max - bounds.y_min) * i as f64 / Y_TICKS as f64;
            let y = y_of(v);
            writeln!(
                out,
                r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#dddddd"/>"##,
                MARGIN_LEFT,
                MARGIN_LEFT + plot_w
            )?;
            writeln!(
                out,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
                MARGIN_LEFT - 8.0,
                y + 4.0,
                format_value(v, bounds.y_max - bounds.y_min)
            )?;
        }
        for i in 0..=X_TICKS {
            let t = bounds.x_min + (bounds.x_max - bounds.x_min) * i as f64 / X_TICKS as f64;
            let x = x_of(t);
            writeln!(
                out,
                r##"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="#dddddd"/>"##,
                MARGIN_TOP,
                MARGIN_TOP + plot_h
            )?;
            let label = chrono::DateTime::from_timestamp_millis(t as i64)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            writeln!(
                out,
                r#"<text x="{x:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                MARGIN_TOP + plot_h + 18.0,
                label
            )?;
        }
        writeln!(
            out,
            r#"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{plot_w:.1}" height="{plot_h:.1}" fill="none" stroke="black"/>"#
        )?;

        // Axis labels
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            h - 15.0,
            escape(&chart.x_label)
        )?;
        writeln!(
            out,
            r#"<text x="20" y="{:.1}" text-anchor="middle" transform="rotate(-90 20 {:.1})">{}</text>"#,
            MARGIN_TOP + plot_h / 2.0,
            MARGIN_TOP + plot_h / 2.0,
            escape(&chart.y_label)
        )?;

        // Lines
        for series in &chart.series {
            if series.data.is_empty() {
                continue;
            }
            let mut points = String::new();
            for p in series.data.points() {
                let t = p.timestamp.timestamp_millis() as f64;
                write!(points, "{:.1},{:.1} ", x_of(t), y_of(p.value))?;
            }
            writeln!(
                out,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
                escape(&series.color),
                points.trim_end()
            )?;
        }

        // Legend
        for (i, series) in chart.series.iter().enumerate() {
            let y = MARGIN_TOP + 20.0 + 20.0 * i as f64;
            let x = MARGIN_LEFT + 15.0;
            writeln!(
                out,
                r#"<line x1="{x:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="3"/>"#,
                x + 25.0,
                escape(&series.color)
            )?;
            writeln!(
                out,
                r#"<text x="{:.1}" y="{:.1}">{}</text>"#,
                x + 32.0,
                y + 4.0,
                escape(&series.label)
            )?;
        }

        writeln!(out, "</svg>")?;
        Ok(out)
    }
}

impl ChartRenderer for SvgRenderer {
    fn render(&self, chart: &Chart) -> anyhow::Result<()> {
        let svg = self.to_svg(chart)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, svg)?;

        tracing::info!(path = ?self.path, series = chart.series.len(), "Wrote price chart");
        Ok(())
    }
}

/// Data extent across all series, padded so lines do not touch the frame
struct Bounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Bounds {
    fn of(chart: &Chart) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for series in &chart.series {
            let (Some(first), Some(last)) = (series.data.first(), series.data.last()) else {
                continue;
            };
            let Some((lo, hi)) = series.data.value_range() else {
                continue;
            };
            let (t0, t1) = (
                first.timestamp.timestamp_millis() as f64,
                last.timestamp.timestamp_millis() as f64,
            );
            bounds = Some(match bounds {
                None => Self {
                    x_min: t0,
                    x_max: t1,
                    y_min: lo,
                    y_max: hi,
                },
                Some(b) => Self {
                    x_min: b.x_min.min(t0),
                    x_max: b.x_max.max(t1),
                    y_min: b.y_min.min(lo),
                    y_max: b.y_max.max(hi),
                },
            });
        }

        bounds.map(|mut b| {
            if b.x_max <= b.x_min {
                b.x_min -= 86_400_000.0;
                b.x_max += 86_400_000.0;
            }
            let pad = if b.y_max > b.y_min {
                (b.y_max - b.y_min) * 0.05
            } else {
                b.y_max.abs().max(1.0) * 0.05
            };
            b.y_min -= pad;
            b.y_max += pad;
            b
        })
    }
}

fn format_value(v: f64, span: f64) -> String {
    if span >= 100.0 {
        format!("{:.0}", v)
    } else if span >= 1.0 {
        format!("{:.2}", v)
    } else {
        format!("{:.4}", v)
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
