use dioxus::prelude::*;

use crate::core::{format, MetricsTable, SharedTable};
use crate::dashboard::charts::{self, Chart, ChartLabels};
use crate::dashboard::export::ExportPanel;
use crate::dashboard::router::SummaryStats;
use crate::dashboard::table_view::MetricsTableView;
use crate::t;

#[derive(Debug, Clone, PartialEq)]
pub struct PcaPoint {
    pub image: String,
    pub cluster: u32,
    pub x: f64,
    pub y: f64,
}

/// Projection coordinates for every row that has both PCA components.
pub fn pca_points(table: &MetricsTable) -> Vec<PcaPoint> {
    table
        .rows()
        .iter()
        .filter_map(|row| {
            Some(PcaPoint {
                image: row.image.clone(),
                cluster: row.cluster,
                x: row.pca1?,
                y: row.pca2?,
            })
        })
        .collect()
}

#[component]
pub fn SummaryPanel(stats: SummaryStats) -> Element {
    let table = use_context::<SharedTable>();
    let scatter = charts::scatter_svg(
        &pca_points(&table),
        &t!("chart-pca-title"),
        &ChartLabels::localized(),
    );

    let cards = [
        (t!("summary-images"), stats.image_count.to_string()),
        (t!("summary-clusters"), stats.cluster_count.to_string()),
        (
            t!("summary-mean-density"),
            format::format_summary(stats.mean_damage_density),
        ),
        (
            t!("summary-mean-confidence"),
            format::format_summary(stats.mean_confidence),
        ),
    ];

    rsx! {
        section { class: "dashboard-card summary",
            div { class: "summary-cards",
                for (label, value) in cards.into_iter() {
                    div { key: "{label}", class: "summary-card",
                        span { class: "summary-card__label", "{label}" }
                        strong { class: "summary-card__value", "{value}" }
                    }
                }
            }

            h5 { {t!("summary-table-heading")} }
            MetricsTableView {}
            ExportPanel {}

            Chart { svg: scatter }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MetricRow;

    #[test]
    fn skips_rows_without_both_components() {
        let table = MetricsTable::from_rows(vec![
            MetricRow {
                pca1: Some(0.5),
                pca2: Some(-1.0),
                ..MetricRow::new("a.jpg", 1)
            },
            MetricRow {
                pca1: Some(0.2),
                ..MetricRow::new("b.jpg", 0)
            },
            MetricRow::new("c.jpg", 0),
        ]);
        assert_eq!(
            pca_points(&table),
            vec![PcaPoint {
                image: "a.jpg".to_string(),
                cluster: 1,
                x: 0.5,
                y: -1.0,
            }]
        );
    }
}
