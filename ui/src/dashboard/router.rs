use std::fmt;

use crate::core::{stats, DashboardConfig, Metric, MetricsTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    General,
    Visual,
    Distribution,
    Top,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::General, Tab::Visual, Tab::Distribution, Tab::Top];

    pub fn id(self) -> &'static str {
        match self {
            Tab::General => "tab-general",
            Tab::Visual => "tab-visual",
            Tab::Distribution => "tab-dist",
            Tab::Top => "tab-top",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.id() == id)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Headline figures shown on the general tab. Means skip missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub image_count: usize,
    pub cluster_count: usize,
    pub mean_damage_density: Option<f64>,
    pub mean_confidence: Option<f64>,
}

impl SummaryStats {
    pub fn compute(table: &MetricsTable) -> Self {
        Self {
            image_count: table.len(),
            cluster_count: table.clusters().len(),
            mean_damage_density: stats::mean(&table.metric_values(Metric::DamageDensity)),
            mean_confidence: stats::mean(&table.metric_values(Metric::MeanConfidence)),
        }
    }
}

/// Declarative description of what a tab shows before any control is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum TabView {
    General(SummaryStats),
    Visual {
        clusters: Vec<u32>,
        default_cluster: Option<u32>,
    },
    Distribution {
        metrics: [Metric; 4],
        default_metric: Metric,
    },
    Top {
        metrics: [Metric; 4],
        default_metric: Metric,
        min_n: i64,
        max_n: i64,
        default_n: i64,
    },
    Unrecognized(String),
}

/// Map a tab id to its view. Unknown ids yield [`TabView::Unrecognized`].
pub fn route(table: &MetricsTable, config: &DashboardConfig, tab_id: &str) -> TabView {
    match Tab::parse(tab_id) {
        Some(Tab::General) => TabView::General(SummaryStats::compute(table)),
        Some(Tab::Visual) => {
            let clusters = table.clusters();
            TabView::Visual {
                default_cluster: clusters.first().copied(),
                clusters,
            }
        }
        Some(Tab::Distribution) => TabView::Distribution {
            metrics: Metric::ALL,
            default_metric: Metric::DamageCount,
        },
        Some(Tab::Top) => TabView::Top {
            metrics: Metric::ALL,
            default_metric: Metric::DamageCount,
            min_n: 1,
            max_n: config.top_n_max.max(1),
            default_n: config.top_n_default.clamp(1, config.top_n_max.max(1)),
        },
        None => {
            tracing::warn!(tab_id, "unrecognized tab");
            TabView::Unrecognized(tab_id.to_string())
        }
    }
}
