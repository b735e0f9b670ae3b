use dioxus::prelude::*;

use crate::core::{SharedConfig, SharedTable};
use crate::dashboard::{route, DistributionView, GalleryView, SummaryPanel, TabView, TopView};
use crate::t;

/// Routed page for one dashboard tab.
#[component]
pub fn Dashboard(tab_id: String) -> Element {
    // Re-render on locale switches made from the navbar.
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    let table = use_context::<SharedTable>();
    let config = use_context::<SharedConfig>();
    tracing::debug!(%tab_id, "rendering tab");

    let body = match route(&table, &config, &tab_id) {
        TabView::General(stats) => rsx! { SummaryPanel { stats } },
        TabView::Visual {
            clusters,
            default_cluster,
        } => rsx! {
            GalleryView { clusters, default_cluster }
        },
        TabView::Distribution {
            metrics,
            default_metric,
        } => rsx! {
            DistributionView { metrics: metrics.to_vec(), default_metric }
        },
        TabView::Top {
            metrics,
            default_metric,
            min_n,
            max_n,
            default_n,
        } => rsx! {
            TopView {
                metrics: metrics.to_vec(),
                default_metric,
                min_n,
                max_n,
                default_n,
            }
        },
        TabView::Unrecognized(id) => rsx! {
            section { class: "dashboard-card",
                p { class: "dashboard-card__placeholder", {t!("tab-unrecognized", id = id)} }
            }
        },
    };

    rsx! {
        div { style: "display:none", "{lang_marker}" }
        section { class: "page page-dashboard",
            h1 { class: "page-dashboard__title", {t!("dashboard-title")} }
            // Keyed so switching tabs resets each view's control state.
            div { key: "{tab_id}", {body} }
        }
    }
}
