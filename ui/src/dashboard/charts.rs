//! SVG chart rendering. Every builder returns standalone markup so charts can
//! be embedded inline and checked in tests without a browser.

use std::fmt::Write;

use dioxus::prelude::*;

use crate::core::format;
use crate::core::stats::BoxStats;
use crate::dashboard::distribution::{ClusterBox, CorrelationMatrix, Histogram};
use crate::dashboard::summary::PcaPoint;
use crate::t;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 340.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 40.0;

const BAR_COLOR: &str = "#6495ed";
/// Qualitative palette for cluster colouring.
const SET2: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

/// Words drawn inside charts, resolved for the active locale.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLabels {
    pub no_data: String,
    pub frequency: String,
    pub cluster: String,
    pub not_available: String,
}

impl ChartLabels {
    pub fn localized() -> Self {
        Self {
            no_data: t!("chart-no-data"),
            frequency: t!("chart-frequency"),
            cluster: t!("chart-cluster"),
            not_available: t!("chart-not-available"),
        }
    }
}

#[component]
pub fn Chart(svg: String) -> Element {
    rsx! {
        figure { class: "chart", dangerous_inner_html: "{svg}" }
    }
}

pub fn cluster_color(cluster: u32) -> &'static str {
    SET2[cluster as usize % SET2.len()]
}

/// Linear map from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy)]
struct Scale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl Scale {
    fn new((d0, d1): (f64, f64), (r0, r1): (f64, f64)) -> Self {
        let (d0, d1) = if d1 > d0 {
            (d0, d1)
        } else {
            (d0 - 0.5, d0 + 0.5)
        };
        Self { d0, d1, r0, r1 }
    }

    fn map(&self, value: f64) -> f64 {
        self.r0 + (value - self.d0) / (self.d1 - self.d0) * (self.r1 - self.r0)
    }

    fn ticks(&self, count: usize) -> Vec<f64> {
        let step = (self.d1 - self.d0) / count.max(1) as f64;
        (0..=count).map(|i| self.d0 + step * i as f64).collect()
    }
}

fn padded_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return None;
    }
    let pad = ((max - min) * 0.05).max(f64::EPSILON);
    Some((min - pad, max + pad))
}

pub(crate) fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn open_svg(out: &mut String, title: &str, height: f64) {
    let _ = write!(
        out,
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 {WIDTH} {height}' role='img' class='chart__svg'>\
         <rect width='{WIDTH}' height='{height}' fill='#ffffff'/>\
         <text x='{x}' y='28' class='chart__title' font-size='16' font-weight='600' fill='#212529'>{title}</text>",
        x = MARGIN_LEFT,
        title = escape_xml(title),
    );
}

fn empty_chart(title: &str, labels: &ChartLabels) -> String {
    let mut out = String::new();
    open_svg(&mut out, title, HEIGHT);
    let _ = write!(
        out,
        "<text x='{x}' y='{y}' text-anchor='middle' fill='#6c757d' font-size='14'>{message}</text></svg>",
        x = WIDTH / 2.0,
        y = HEIGHT / 2.0,
        message = escape_xml(&labels.no_data),
    );
    out
}

fn y_axis(out: &mut String, scale: &Scale, label: Option<&str>) {
    for tick in scale.ticks(5) {
        let y = scale.map(tick);
        let _ = write!(
            out,
            "<line x1='{x0}' x2='{x1}' y1='{y:.1}' y2='{y:.1}' stroke='#e9ecef'/>\
             <text x='{tx}' y='{ty:.1}' text-anchor='end' font-size='11' fill='#495057'>{label}</text>",
            x0 = MARGIN_LEFT,
            x1 = WIDTH - MARGIN_RIGHT,
            tx = MARGIN_LEFT - 6.0,
            ty = y + 4.0,
            label = format::format_tick(tick),
        );
    }
    if let Some(label) = label {
        let _ = write!(
            out,
            "<text transform='translate(14 {cy}) rotate(-90)' text-anchor='middle' font-size='12' fill='#495057'>{label}</text>",
            cy = HEIGHT / 2.0,
            label = escape_xml(label),
        );
    }
}

/// Frequency bars with a marginal box strip above them.
pub fn histogram_svg(histogram: &Histogram, title: &str, labels: &ChartLabels) -> String {
    let (Some(first), Some(last)) = (histogram.bins.first(), histogram.bins.last()) else {
        return empty_chart(title, labels);
    };

    let strip = 28.0;
    let plot_top = MARGIN_TOP + strip;
    let plot_bottom = HEIGHT - MARGIN_BOTTOM;
    let x = Scale::new((first.start, last.end), (MARGIN_LEFT, WIDTH - MARGIN_RIGHT));
    let max_count = histogram.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let y = Scale::new((0.0, max_count as f64), (plot_bottom, plot_top));

    let mut out = String::new();
    open_svg(&mut out, title, HEIGHT);
    y_axis(&mut out, &y, Some(&labels.frequency));
    let frequency = escape_xml(&labels.frequency);

    for bin in &histogram.bins {
        if bin.count == 0 {
            continue;
        }
        let x0 = x.map(bin.start);
        let x1 = x.map(bin.end);
        let top = y.map(bin.count as f64);
        let _ = write!(
            out,
            "<rect x='{x0:.1}' y='{top:.1}' width='{w:.1}' height='{h:.1}' fill='{BAR_COLOR}' stroke='#ffffff'>\
             <title>{label}: {start}–{end}&#10;{frequency}: {count}</title></rect>",
            w = (x1 - x0).max(1.0),
            h = plot_bottom - top,
            label = escape_xml(&histogram.metric.label()),
            start = format::format_tick(bin.start),
            end = format::format_tick(bin.end),
            count = bin.count,
        );
    }

    for tick in x.ticks(6) {
        let _ = write!(
            out,
            "<text x='{px:.1}' y='{py}' text-anchor='middle' font-size='11' fill='#495057'>{label}</text>",
            px = x.map(tick),
            py = plot_bottom + 16.0,
            label = format::format_tick(tick),
        );
    }

    if let Some(marginal) = &histogram.marginal {
        horizontal_box(&mut out, marginal, &x, MARGIN_TOP + 4.0, strip - 8.0);
    }

    out.push_str("</svg>");
    out
}

fn horizontal_box(out: &mut String, stats: &BoxStats, x: &Scale, top: f64, height: f64) {
    let mid = top + height / 2.0;
    let _ = write!(
        out,
        "<g class='chart__marginal'>\
         <line x1='{lw:.1}' x2='{uw:.1}' y1='{mid:.1}' y2='{mid:.1}' stroke='{BAR_COLOR}'/>\
         <rect x='{q1:.1}' y='{top:.1}' width='{bw:.1}' height='{height:.1}' fill='{BAR_COLOR}' fill-opacity='0.35' stroke='{BAR_COLOR}'/>\
         <line x1='{med:.1}' x2='{med:.1}' y1='{top:.1}' y2='{bottom:.1}' stroke='#1d3f8f' stroke-width='2'/>\
         </g>",
        lw = x.map(stats.lower_whisker),
        uw = x.map(stats.upper_whisker),
        q1 = x.map(stats.q1),
        bw = (x.map(stats.q3) - x.map(stats.q1)).max(1.0),
        med = x.map(stats.median),
        bottom = top + height,
    );
    for outlier in &stats.outliers {
        let _ = write!(
            out,
            "<circle cx='{cx:.1}' cy='{mid:.1}' r='2.5' fill='none' stroke='{BAR_COLOR}'/>",
            cx = x.map(*outlier),
        );
    }
}

/// Vertical box per cluster with every observation overlaid.
pub fn box_plot_svg(
    boxes: &[ClusterBox],
    title: &str,
    y_label: &str,
    labels: &ChartLabels,
) -> String {
    let Some(extent) = padded_extent(boxes.iter().flat_map(|b| b.points.iter().map(|(_, v)| *v)))
    else {
        return empty_chart(title, labels);
    };

    let plot_bottom = HEIGHT - MARGIN_BOTTOM;
    let y = Scale::new(extent, (plot_bottom, MARGIN_TOP));
    let band = (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / boxes.len() as f64;

    let mut out = String::new();
    open_svg(&mut out, title, HEIGHT);
    y_axis(&mut out, &y, Some(y_label));
    let cluster_word = escape_xml(&labels.cluster);

    for (idx, group) in boxes.iter().enumerate() {
        let color = cluster_color(group.cluster);
        let center = MARGIN_LEFT + band * (idx as f64 + 0.5);
        let half = (band * 0.2).min(40.0);
        let stats = &group.stats;
        let q3 = y.map(stats.q3);
        let q1 = y.map(stats.q1);

        let _ = write!(
            out,
            "<g class='chart__box'>\
             <line x1='{center:.1}' x2='{center:.1}' y1='{uw:.1}' y2='{q3:.1}' stroke='{color}'/>\
             <line x1='{center:.1}' x2='{center:.1}' y1='{q1:.1}' y2='{lw:.1}' stroke='{color}'/>\
             <rect x='{left:.1}' y='{q3:.1}' width='{w:.1}' height='{h:.1}' fill='{color}' fill-opacity='0.3' stroke='{color}'/>\
             <line x1='{left:.1}' x2='{right:.1}' y1='{med:.1}' y2='{med:.1}' stroke='{color}' stroke-width='2'/>\
             <text x='{center:.1}' y='{label_y}' text-anchor='middle' font-size='11' fill='#495057'>{cluster}</text>\
             </g>",
            uw = y.map(stats.upper_whisker),
            lw = y.map(stats.lower_whisker),
            left = center - half,
            right = center + half,
            w = half * 2.0,
            h = (q1 - q3).max(1.0),
            med = y.map(stats.median),
            label_y = plot_bottom + 16.0,
            cluster = group.cluster,
        );

        for (point_idx, (image, value)) in group.points.iter().enumerate() {
            // Deterministic jitter to the left of the box.
            let jitter = ((point_idx * 37) % 11) as f64 / 10.0;
            let cx = center - half - 8.0 - jitter * half * 0.8;
            let _ = write!(
                out,
                "<circle cx='{cx:.1}' cy='{cy:.1}' r='2.5' fill='{color}' fill-opacity='0.8'>\
                 <title>{cluster_word}: {cluster}&#10;{image}: {value:.2}</title></circle>",
                cy = y.map(*value),
                cluster = group.cluster,
                image = escape_xml(image),
            );
        }
    }

    out.push_str("</svg>");
    out
}

/// Red (negative) to white to blue (positive), grey for undefined cells.
fn diverging_color(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "#e9ecef".to_string();
    };
    let v = v.clamp(-1.0, 1.0);
    let (target, t) = if v < 0.0 {
        ((178.0, 24.0, 43.0), -v)
    } else {
        ((33.0, 102.0, 172.0), v)
    };
    let mix = |end: f64| (255.0 + (end - 255.0) * t).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(target.0), mix(target.1), mix(target.2))
}

/// Annotated heatmap of the correlation matrix.
pub fn correlation_svg(matrix: &CorrelationMatrix, title: &str, labels: &ChartLabels) -> String {
    let height = 400.0;
    let n = matrix.metrics.len();
    let label_width = 130.0;
    let grid = (height - MARGIN_TOP - 60.0).min(WIDTH - label_width - MARGIN_RIGHT);
    let cell = grid / n as f64;
    let left = label_width + 20.0;

    let mut out = String::new();
    open_svg(&mut out, title, height);

    for (i, row_metric) in matrix.metrics.iter().enumerate() {
        let y = MARGIN_TOP + cell * i as f64;
        let _ = write!(
            out,
            "<text x='{tx}' y='{ty:.1}' text-anchor='end' font-size='11' fill='#495057'>{label}</text>",
            tx = left - 8.0,
            ty = y + cell / 2.0 + 4.0,
            label = row_metric.as_str(),
        );
        for (j, col_metric) in matrix.metrics.iter().enumerate() {
            let value = matrix.values[i][j];
            let x = left + cell * j as f64;
            let text = value
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| escape_xml(&labels.not_available));
            let text_color = match value {
                Some(v) if v.abs() > 0.6 => "#ffffff",
                _ => "#212529",
            };
            let _ = write!(
                out,
                "<rect x='{x:.1}' y='{y:.1}' width='{cell:.1}' height='{cell:.1}' fill='{fill}' stroke='#ffffff'>\
                 <title>{row} × {col}: {text}</title></rect>\
                 <text x='{cx:.1}' y='{cy:.1}' text-anchor='middle' font-size='12' fill='{text_color}'>{text}</text>",
                fill = diverging_color(value),
                row = row_metric.as_str(),
                col = col_metric.as_str(),
                cx = x + cell / 2.0,
                cy = y + cell / 2.0 + 4.0,
            );
        }
    }

    for (j, metric) in matrix.metrics.iter().enumerate() {
        let _ = write!(
            out,
            "<text x='{x:.1}' y='{y:.1}' text-anchor='middle' font-size='11' fill='#495057'>{label}</text>",
            x = left + cell * (j as f64 + 0.5),
            y = MARGIN_TOP + grid + 16.0,
            label = metric.as_str(),
        );
    }

    out.push_str("</svg>");
    out
}

/// PCA projection coloured by cluster, image name as hover title.
pub fn scatter_svg(points: &[PcaPoint], title: &str, labels: &ChartLabels) -> String {
    let (Some(x_extent), Some(y_extent)) = (
        padded_extent(points.iter().map(|p| p.x)),
        padded_extent(points.iter().map(|p| p.y)),
    ) else {
        return empty_chart(title, labels);
    };

    let height = 420.0;
    let plot_bottom = height - MARGIN_BOTTOM;
    let legend_width = 110.0;
    let x = Scale::new(x_extent, (MARGIN_LEFT, WIDTH - MARGIN_RIGHT - legend_width));
    let y = Scale::new(y_extent, (plot_bottom, MARGIN_TOP));

    let mut out = String::new();
    open_svg(&mut out, title, height);
    for tick in y.ticks(5) {
        let _ = write!(
            out,
            "<text x='{tx}' y='{ty:.1}' text-anchor='end' font-size='11' fill='#495057'>{label}</text>",
            tx = MARGIN_LEFT - 6.0,
            ty = y.map(tick) + 4.0,
            label = format::format_tick(tick),
        );
    }
    for tick in x.ticks(6) {
        let _ = write!(
            out,
            "<text x='{tx:.1}' y='{ty}' text-anchor='middle' font-size='11' fill='#495057'>{label}</text>",
            tx = x.map(tick),
            ty = plot_bottom + 16.0,
            label = format::format_tick(tick),
        );
    }

    let cluster_word = escape_xml(&labels.cluster);
    let mut clusters: Vec<u32> = points.iter().map(|p| p.cluster).collect();
    clusters.sort_unstable();
    clusters.dedup();

    for point in points {
        let _ = write!(
            out,
            "<circle cx='{cx:.1}' cy='{cy:.1}' r='4.5' fill='{color}' fill-opacity='0.75'>\
             <title>{image}&#10;PCA1: {px:.3}&#10;PCA2: {py:.3}&#10;{cluster_word}: {cluster}</title></circle>",
            cx = x.map(point.x),
            cy = y.map(point.y),
            color = cluster_color(point.cluster),
            image = escape_xml(&point.image),
            px = point.x,
            py = point.y,
            cluster = point.cluster,
        );
    }

    let legend_x = WIDTH - MARGIN_RIGHT - legend_width + 16.0;
    for (idx, cluster) in clusters.iter().enumerate() {
        let ly = MARGIN_TOP + 18.0 * idx as f64;
        let _ = write!(
            out,
            "<circle cx='{legend_x}' cy='{ly}' r='5' fill='{color}'/>\
             <text x='{tx}' y='{ty}' font-size='12' fill='#212529'>{cluster}</text>",
            color = cluster_color(*cluster),
            tx = legend_x + 10.0,
            ty = ly + 4.0,
        );
    }

    out.push_str("</svg>");
    out
}
