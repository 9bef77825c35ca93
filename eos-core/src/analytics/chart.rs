//! Bar chart rendering.
//!
//! Analytics modules hand a label→value series to a [`ChartRenderer`] and get
//! back an [`EncodedImage`]: image bytes as base64 text, ready to embed in a
//! data URI or a JSON payload. The only renderer is [`SvgBarChart`].

use crate::config::ChartConfig;
use crate::error::{Error, Result};
use crate::format::format_number;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 70.0;
const Y_TICKS: usize = 5;
const BAR_FILL: &str = "#4c72b0";

/// Axis titles for one chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
}

impl AxisLabels {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// Rendered image as base64 text plus its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub media_type: String,
    pub data: String,
}

impl EncodedImage {
    /// `data:` URI suitable for an `<img src>` attribute.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// Decode back to raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.data)
            .map_err(|e| Error::Render(format!("invalid base64 image data: {e}")))
    }

    /// File extension matching the media type.
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_str() {
            "image/svg+xml" => "svg",
            "image/png" => "png",
            _ => "bin",
        }
    }
}

/// Turns a label→value series into an encoded image.
///
/// Implementations must be pure functions of their arguments.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, series: &[(String, f64)], axes: &AxisLabels, title: &str)
        -> Result<EncodedImage>;
}

/// Labeled vertical bar chart drawn as SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgBarChart {
    width: u32,
    height: u32,
}

impl SvgBarChart {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// Draw the chart as an SVG document.
    pub fn to_svg(&self, series: &[(String, f64)], axes: &AxisLabels, title: &str) -> Result<String> {
        if let Some((label, value)) = series.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Render(format!(
                "value for '{label}' is not finite ({value})"
            )));
        }

        let width = f64::from(self.width);
        let height = f64::from(self.height);
        let plot_w = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_h = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let baseline = MARGIN_TOP + plot_h;

        let max_value = series.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let y_max = nice_ceiling(max_value);

        let mut svg = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(
            svg,
            r#"<rect width="{}" height="{}" fill="white"/>"#,
            self.width, self.height
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="28" font-size="16" text-anchor="middle">{}</text>"#,
            width / 2.0,
            escape_xml(title)
        );

        for tick in 0..=Y_TICKS {
            let value = y_max * tick as f64 / Y_TICKS as f64;
            let y = baseline - plot_h * tick as f64 / Y_TICKS as f64;
            let _ = writeln!(
                svg,
                r##"<line x1="{x0:.1}" y1="{y:.1}" x2="{x1:.1}" y2="{y:.1}" stroke="#dddddd"/>"##,
                x0 = MARGIN_LEFT,
                x1 = MARGIN_LEFT + plot_w,
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end">{}</text>"#,
                MARGIN_LEFT - 6.0,
                y + 4.0,
                format_number(value)
            );
        }

        if !series.is_empty() {
            let slot = plot_w / series.len() as f64;
            let bar_w = slot * 0.6;
            for (i, (label, value)) in series.iter().enumerate() {
                let bar_h = plot_h * value.max(0.0) / y_max;
                let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_w) / 2.0;
                let center = x + bar_w / 2.0;
                let _ = writeln!(
                    svg,
                    r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{}: {}</title></rect>"#,
                    x,
                    baseline - bar_h,
                    bar_w,
                    bar_h,
                    BAR_FILL,
                    escape_xml(label),
                    format_number(*value)
                );
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="middle">{}</text>"#,
                    center,
                    baseline - bar_h - 4.0,
                    format_number(*value)
                );
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">{}</text>"#,
                    center,
                    baseline + 18.0,
                    escape_xml(label)
                );
            }
        }

        let _ = writeln!(
            svg,
            r#"<line x1="{x:.1}" y1="{top:.1}" x2="{x:.1}" y2="{b:.1}" stroke="black"/>"#,
            x = MARGIN_LEFT,
            top = MARGIN_TOP,
            b = baseline
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{x0:.1}" y1="{b:.1}" x2="{x1:.1}" y2="{b:.1}" stroke="black"/>"#,
            x0 = MARGIN_LEFT,
            x1 = MARGIN_LEFT + plot_w,
            b = baseline
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="13" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            height - 20.0,
            escape_xml(&axes.x)
        );
        let y_mid = MARGIN_TOP + plot_h / 2.0;
        let _ = writeln!(
            svg,
            r#"<text x="18" y="{y:.1}" font-size="13" text-anchor="middle" transform="rotate(-90 18 {y:.1})">{label}</text>"#,
            y = y_mid,
            label = escape_xml(&axes.y)
        );
        svg.push_str("</svg>\n");

        Ok(svg)
    }
}

impl Default for SvgBarChart {
    fn default() -> Self {
        Self::from_config(&ChartConfig::default())
    }
}

impl ChartRenderer for SvgBarChart {
    fn render(
        &self,
        series: &[(String, f64)],
        axes: &AxisLabels,
        title: &str,
    ) -> Result<EncodedImage> {
        let svg = self.to_svg(series, axes, title)?;
        Ok(EncodedImage {
            media_type: "image/svg+xml".to_string(),
            data: BASE64.encode(svg.as_bytes()),
        })
    }
}

/// Round `value` up to 1, 2 or 5 times a power of ten; never below 1.
fn nice_ceiling(value: f64) -> f64 {
    if value <= 1.0 {
        return 1.0;
    }
    let magnitude = 10f64.powi(value.log10().floor() as i32);
    [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|candidate| *candidate >= value)
        .unwrap_or(10.0 * magnitude)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(l, v)| (l.to_string(), *v)).collect()
    }

    fn axes() -> AxisLabels {
        AxisLabels::new("Subject", "Average score")
    }

    #[test]
    fn test_svg_contains_bars_labels_and_titles() {
        let chart = SvgBarChart::new(600, 300);
        let svg = chart
            .to_svg(
                &series(&[("Math", 87.5), ("Science", 95.0)]),
                &axes(),
                "Average score by subject",
            )
            .unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"width="600""#));
        assert_eq!(svg.matches(BAR_FILL).count(), 2);
        assert!(svg.contains(">Math<"));
        assert!(svg.contains(">87.50<"));
        assert!(svg.contains(">Average score by subject<"));
        assert!(svg.contains(">Average score<"));
    }

    #[test]
    fn test_render_round_trips_through_base64() {
        let chart = SvgBarChart::default();
        let data = series(&[("2", 50.0)]);
        let image = chart.render(&data, &axes(), "t").unwrap();

        assert_eq!(image.media_type, "image/svg+xml");
        assert_eq!(image.extension(), "svg");
        assert!(image.data_uri().starts_with("data:image/svg+xml;base64,"));

        let decoded = String::from_utf8(image.decode().unwrap()).unwrap();
        assert_eq!(decoded, chart.to_svg(&data, &axes(), "t").unwrap());
    }

    #[test]
    fn test_labels_are_escaped() {
        let svg = SvgBarChart::default()
            .to_svg(&series(&[("R&D <lab>", 1.0)]), &axes(), "A \"quoted\" title")
            .unwrap();
        assert!(svg.contains("R&amp;D &lt;lab&gt;"));
        assert!(svg.contains("A &quot;quoted&quot; title"));
        assert!(!svg.contains("<lab>"));
    }

    #[test]
    fn test_empty_series_renders_axes_only() {
        let svg = SvgBarChart::default().to_svg(&[], &axes(), "Empty").unwrap();
        assert_eq!(svg.matches(BAR_FILL).count(), 0);
        assert!(svg.contains(">Empty<"));
    }

    #[test]
    fn test_non_finite_value_is_a_render_error() {
        let err = SvgBarChart::default()
            .render(&series(&[("Math", f64::NAN)]), &axes(), "t")
            .unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[test]
    fn test_nice_ceiling() {
        assert_eq!(nice_ceiling(0.0), 1.0);
        assert_eq!(nice_ceiling(3.0), 5.0);
        assert_eq!(nice_ceiling(10.0), 10.0);
        assert_eq!(nice_ceiling(87.5), 100.0);
        assert_eq!(nice_ceiling(120.0), 200.0);
    }
}
