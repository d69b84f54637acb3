use super::chart::{Bounds, ChartModel, MarkerStyle, Series};
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct SvgOptions {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Fraction of the data span added around the points.
    pub padding: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: 60.0,
            padding: 0.05,
        }
    }
}

/// Linear map from data coordinates to SVG pixels (y grows downwards).
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    bounds: Bounds,
    options: SvgOptions,
}

impl Viewport {
    pub fn fit(chart: &ChartModel, options: SvgOptions) -> Self {
        let bounds = chart
            .bounds()
            .unwrap_or(Bounds {
                min_x: -1.0,
                max_x: 1.0,
                min_y: -1.0,
                max_y: 1.0,
            })
            .padded(options.padding);
        Self { bounds, options }
    }

    pub fn to_pixels(&self, x: f64, y: f64) -> (f64, f64) {
        let SvgOptions {
            width,
            height,
            margin,
            ..
        } = self.options;
        let b = &self.bounds;
        let px = margin + (x - b.min_x) / (b.max_x - b.min_x) * (width - 2.0 * margin);
        let py = height - margin - (y - b.min_y) / (b.max_y - b.min_y) * (height - 2.0 * margin);
        (px, py)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

pub fn render_svg(chart: &ChartModel, options: SvgOptions) -> String {
    let viewport = Viewport::fit(chart, options);
    let SvgOptions {
        width,
        height,
        margin,
        ..
    } = options;
    let bounds = viewport.bounds();

    let mut svg = String::with_capacity(16 * 1024);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    ));
    svg.push('\n');
    svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
    svg.push('\n');
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="18" text-anchor="middle">{}</text>"#,
        width / 2.0,
        margin / 2.0,
        escape(&chart.title)
    ));
    svg.push('\n');

    // Axes along the bottom and left edges of the plot area.
    let (left, bottom) = (margin, height - margin);
    let (right, top) = (width - margin, margin);
    svg.push_str(&format!(
        r#"<line x1="{left}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="black"/><line x1="{left}" y1="{bottom}" x2="{left}" y2="{top}" stroke="black"/>"#
    ));
    svg.push('\n');
    for (x, y, anchor, value) in [
        (left, bottom + 16.0, "start", bounds.min_x),
        (right, bottom + 16.0, "end", bounds.max_x),
        (left - 6.0, bottom, "end", bounds.min_y),
        (left - 6.0, top + 4.0, "end", bounds.max_y),
    ] {
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{y:.1}" font-family="sans-serif" font-size="10" text-anchor="{anchor}">{value:.2}</text>"#
        ));
        svg.push('\n');
    }
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="12" text-anchor="middle">{}</text>"#,
        width / 2.0,
        height - margin / 3.0,
        escape(&chart.x_label)
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="12" text-anchor="middle" transform="rotate(-90 {:.1} {:.1})">{}</text>"#,
        margin / 3.0,
        height / 2.0,
        margin / 3.0,
        height / 2.0,
        escape(&chart.y_label)
    ));
    svg.push('\n');

    // Data first so centroid and selection markers stay on top.
    for series in chart.cluster_series() {
        push_series(&mut svg, series, &viewport);
    }
    for series in chart.series.iter().filter(|s| s.style != MarkerStyle::Circle) {
        push_series(&mut svg, series, &viewport);
    }

    push_legend(&mut svg, chart, width - margin + 8.0, margin);
    svg.push_str("</svg>\n");
    svg
}

fn push_series(svg: &mut String, series: &Series, viewport: &Viewport) {
    svg.push_str(&format!(r#"<g data-series="{}">"#, escape(&series.label)));
    for point in &series.points {
        let (cx, cy) = viewport.to_pixels(point.position.x, point.position.y);
        let fill = point.color.unwrap_or(series.color);
        let stroke = series.border.map_or(String::new(), |b| {
            format!(r#" stroke="{}" stroke-width="{}""#, b.color, b.width)
        });
        let r = series.radius;
        match series.style {
            MarkerStyle::Circle => svg.push_str(&format!(
                r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r}" fill="{fill}"{stroke}/>"#
            )),
            MarkerStyle::Triangle => svg.push_str(&format!(
                r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{fill}"{stroke}/>"#,
                cx,
                cy - r,
                cx - r,
                cy + r * 0.8,
                cx + r,
                cy + r * 0.8
            )),
            MarkerStyle::Cross => svg.push_str(&format!(
                r#"<path d="M{:.2} {:.2}L{:.2} {:.2}M{:.2} {:.2}L{:.2} {:.2}" stroke="{fill}" stroke-width="3"/>"#,
                cx - r,
                cy - r,
                cx + r,
                cy + r,
                cx - r,
                cy + r,
                cx + r,
                cy - r
            )),
        }
    }
    svg.push_str("</g>\n");
}

fn push_legend(svg: &mut String, chart: &ChartModel, x: f64, y: f64) {
    for (row, series) in chart.series.iter().enumerate() {
        let ly = y + row as f64 * 18.0;
        svg.push_str(&format!(
            r#"<rect x="{x:.1}" y="{:.1}" width="10" height="10" fill="{}"/><text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="11">{}</text>"#,
            ly - 9.0,
            series.color,
            x + 14.0,
            ly,
            escape(&series.label)
        ));
        svg.push('\n');
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render and write the chart, replacing any previous file.
pub fn write_svg(chart: &ChartModel, path: &Path, options: SvgOptions) -> std::io::Result<()> {
    std::fs::write(path, render_svg(chart, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PageState;
    use crate::domain::{InitMethod, Point};

    fn chart() -> ChartModel {
        let mut state = PageState::new(2, InitMethod::Manual);
        state.dataset = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        state.centroids = vec![Point::new(5.0, 5.0), Point::new(1.0, 1.0)];
        state.manual_selection = vec![Point::new(0.0, 0.0)];
        ChartModel::from_state(&state)
    }

    #[test]
    fn test_viewport_maps_padded_bounds_into_plot_area() {
        let options = SvgOptions::default();
        let viewport = Viewport::fit(&chart(), options);
        let (left, bottom) = viewport.to_pixels(0.0, 0.0);
        let (right, top) = viewport.to_pixels(10.0, 10.0);
        assert!(left > options.margin && right < options.width - options.margin);
        assert!(top > options.margin && bottom < options.height - options.margin);
    }

    #[test]
    fn test_viewport_inverts_y_axis() {
        let viewport = Viewport::fit(&chart(), SvgOptions::default());
        let (_, low) = viewport.to_pixels(0.0, 0.0);
        let (_, high) = viewport.to_pixels(0.0, 10.0);
        assert!(high < low);
    }

    #[test]
    fn test_svg_contains_every_marker_kind() {
        let svg = render_svg(&chart(), SvgOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains("KMeans Clustering"));
        assert!(svg.contains(r#"data-series="Cluster 1""#));
    }

    #[test]
    fn test_empty_chart_still_renders() {
        let state = PageState::new(3, InitMethod::Random);
        let svg = render_svg(&ChartModel::from_state(&state), SvgOptions::default());
        assert!(!svg.contains("<circle"));
        assert!(svg.contains("Cluster 2"));
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape("a<b & \"c\">"), "a&lt;b &amp; &quot;c&quot;&gt;");
    }
}
