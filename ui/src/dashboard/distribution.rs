use std::collections::BTreeMap;

use dioxus::prelude::*;

use crate::core::stats::{self, Bin, BoxStats};
use crate::core::{Metric, MetricsTable, SharedConfig, SharedTable};
use crate::dashboard::charts::{self, Chart, ChartLabels};
use crate::t;

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub metric: Metric,
    pub bins: Vec<Bin>,
    /// Number of non-missing values binned.
    pub total: usize,
    /// Marginal box drawn above the bars.
    pub marginal: Option<BoxStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBox {
    pub cluster: u32,
    pub stats: BoxStats,
    /// Every observation of the group, `(image, value)` in table order.
    pub points: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub metrics: [Metric; 4],
    /// `None` where fewer than two complete pairs exist or a side is constant.
    pub values: [[Option<f64>; 4]; 4],
}

impl CorrelationMatrix {
    pub fn get(&self, row: Metric, col: Metric) -> Option<f64> {
        let i = self.metrics.iter().position(|m| *m == row)?;
        let j = self.metrics.iter().position(|m| *m == col)?;
        self.values[i][j]
    }
}

pub fn histogram(table: &MetricsTable, metric: Metric, bins: usize) -> Histogram {
    tracing::info!(%metric, "histogram: metric selected");
    let values = table.metric_values(metric);
    Histogram {
        metric,
        bins: stats::histogram(&values, bins),
        total: values.len(),
        marginal: stats::box_stats(&values),
    }
}

/// One box per cluster, ascending by id. Clusters with no value for `metric` are omitted.
pub fn box_by_cluster(table: &MetricsTable, metric: Metric) -> Vec<ClusterBox> {
    tracing::info!(%metric, "boxplot: metric selected");
    let mut groups: BTreeMap<u32, Vec<(String, f64)>> = BTreeMap::new();
    for row in table.rows() {
        if let Some(value) = row.metric(metric) {
            groups
                .entry(row.cluster)
                .or_default()
                .push((row.image.clone(), value));
        }
    }

    groups
        .into_iter()
        .filter_map(|(cluster, points)| {
            let values: Vec<f64> = points.iter().map(|(_, value)| *value).collect();
            stats::box_stats(&values).map(|stats| ClusterBox {
                cluster,
                stats,
                points,
            })
        })
        .collect()
}

/// Pearson matrix over the four metrics using pairwise-complete rows.
pub fn correlation(table: &MetricsTable) -> CorrelationMatrix {
    tracing::info!("correlation matrix refreshed");
    let metrics = Metric::ALL;
    let mut values = [[None; 4]; 4];

    for i in 0..metrics.len() {
        values[i][i] = Some(1.0);
        for j in (i + 1)..metrics.len() {
            let pairs: Vec<(f64, f64)> = table
                .rows()
                .iter()
                .filter_map(|row| Some((row.metric(metrics[i])?, row.metric(metrics[j])?)))
                .collect();
            let r = stats::pearson(&pairs);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix { metrics, values }
}

#[component]
pub fn DistributionView(metrics: Vec<Metric>, default_metric: Metric) -> Element {
    let table = use_context::<SharedTable>();
    let config = use_context::<SharedConfig>();
    let mut selected = use_signal(move || default_metric);

    let metric = selected();
    let labels = ChartLabels::localized();
    let histogram_svg = charts::histogram_svg(
        &histogram(&table, metric, config.histogram_bins),
        &t!("chart-histogram-title", metric = metric.label()),
        &labels,
    );
    let box_svg = charts::box_plot_svg(
        &box_by_cluster(&table, metric),
        &t!("chart-box-title", metric = metric.label()),
        &metric.label(),
        &labels,
    );
    let corr_svg = charts::correlation_svg(
        &correlation(&table),
        &t!("chart-correlation-title"),
        &labels,
    );

    let on_change = move |evt: FormEvent| {
        if let Some(metric) = Metric::parse(&evt.value()) {
            selected.set(metric);
        }
    };

    rsx! {
        section { class: "dashboard-card distributions",
            h5 { {t!("dist-select-metric")} }
            select { class: "dashboard-select", onchange: on_change,
                for option_metric in metrics.iter().copied() {
                    option {
                        key: "{option_metric}",
                        value: "{option_metric}",
                        selected: option_metric == metric,
                        "{option_metric.label()}"
                    }
                }
            }

            Chart { svg: histogram_svg }
            Chart { svg: box_svg }
            Chart { svg: corr_svg }
        }
    }
}
