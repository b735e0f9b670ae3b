use std::cmp::Ordering;

use dioxus::prelude::*;

use crate::core::{DashboardConfig, Metric, MetricRow, MetricsTable, SharedConfig, SharedTable};
use crate::t;

#[derive(Debug, Clone, PartialEq)]
pub struct TopCard {
    pub image_url: String,
    pub filename: String,
    /// `"{metric}: {value:.3}"`; infinities print as `inf` / `-inf`.
    pub value_label: String,
    pub cluster: u32,
}

/// Result of a top-N request. Every failure is a value the view can render.
#[derive(Debug, Clone, PartialEq)]
pub enum TopOutcome {
    Cards(Vec<TopCard>),
    InvalidMetric(String),
    NoValidData,
    NoValidImages,
    Failed(String),
}

/// Highest `n` rows by `metric`, rendered as cards.
///
/// Rows are sliced before the image-extension filter runs, so fewer than `n`
/// cards come back when some of the top rows have no usable image.
pub fn top_images(table: &MetricsTable, config: &DashboardConfig, metric: &str, n: i64) -> TopOutcome {
    tracing::info!(metric, n, "top-n: selection changed");
    match try_top_images(table, config, metric, n) {
        Ok(outcome) => outcome,
        Err(message) => {
            tracing::error!(metric, n, %message, "top-n: failed to build cards");
            TopOutcome::Failed(message)
        }
    }
}

fn try_top_images(
    table: &MetricsTable,
    config: &DashboardConfig,
    metric_name: &str,
    n: i64,
) -> Result<TopOutcome, String> {
    let Some(metric) = Metric::parse(metric_name) else {
        tracing::warn!(metric = metric_name, "top-n: unknown metric");
        return Ok(TopOutcome::InvalidMetric(metric_name.to_string()));
    };
    let count = usize::try_from(n).map_err(|_| format!("invalid image count {n}"))?;

    let mut ranked: Vec<(&MetricRow, f64)> = table
        .rows()
        .iter()
        .filter_map(|row| {
            row.metric(metric)
                .filter(|value| !value.is_nan())
                .map(|value| (row, value))
        })
        .collect();
    if ranked.is_empty() {
        tracing::warn!(%metric, "top-n: no rows carry this metric");
        return Ok(TopOutcome::NoValidData);
    }

    // Stable: equal values (0.0 and -0.0 included) keep table order.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(count);

    let cards: Vec<TopCard> = ranked
        .into_iter()
        .filter_map(|(row, value)| {
            let filename = row.image.trim();
            if filename.is_empty() || !filename.ends_with(config.image_extension.as_str()) {
                return None;
            }
            Some(TopCard {
                image_url: config.image_url(filename),
                filename: filename.to_string(),
                value_label: format!("{metric}: {value:.3}"),
                cluster: row.cluster,
            })
        })
        .collect();

    if cards.is_empty() {
        tracing::warn!(%metric, n, "top-n: no usable images among the top rows");
        return Ok(TopOutcome::NoValidImages);
    }
    Ok(TopOutcome::Cards(cards))
}

#[component]
pub fn TopView(
    metrics: Vec<Metric>,
    default_metric: Metric,
    min_n: i64,
    max_n: i64,
    default_n: i64,
) -> Element {
    let table = use_context::<SharedTable>();
    let config = use_context::<SharedConfig>();
    let mut metric = use_signal(move || default_metric.as_str().to_string());
    let mut count = use_signal(move || default_n);

    let outcome = top_images(&table, &config, &metric(), count());

    let on_metric = move |evt: FormEvent| metric.set(evt.value());
    let on_count = move |evt: FormEvent| {
        if let Ok(n) = evt.value().parse::<i64>() {
            count.set(n);
        }
    };

    let body = match outcome {
        TopOutcome::Cards(cards) => rsx! {
            div { class: "image-grid",
                for card in cards.into_iter() {
                    {render_card(card)}
                }
            }
        },
        TopOutcome::InvalidMetric(name) => rsx! {
            p { class: "dashboard-card__placeholder", {t!("top-invalid-metric", metric = name)} }
        },
        TopOutcome::NoValidData => rsx! {
            p { class: "dashboard-card__placeholder", {t!("top-no-data")} }
        },
        TopOutcome::NoValidImages => rsx! {
            p { class: "dashboard-card__placeholder", {t!("top-no-images")} }
        },
        TopOutcome::Failed(message) => rsx! {
            p { class: "dashboard-card__placeholder dashboard-card__placeholder--error",
                {t!("top-failed", error = message)}
            }
        },
    };

    rsx! {
        section { class: "dashboard-card top-images",
            h5 { {t!("top-select-metric")} }
            select { class: "dashboard-select", onchange: on_metric,
                for option_metric in metrics.iter().copied() {
                    option {
                        key: "{option_metric}",
                        value: "{option_metric}",
                        selected: option_metric.as_str() == metric(),
                        "{option_metric.label()}"
                    }
                }
            }

            label { class: "dashboard-slider",
                span { {t!("top-count-label", count = count().to_string())} }
                input {
                    r#type: "range",
                    min: "{min_n}",
                    max: "{max_n}",
                    step: "1",
                    value: "{count()}",
                    oninput: on_count,
                }
            }

            {body}
        }
    }
}

fn render_card(card: TopCard) -> Element {
    let TopCard {
        image_url,
        filename,
        value_label,
        cluster,
    } = card;

    rsx! {
        article { key: "{filename}", class: "image-card",
            img { class: "image-card__img", src: "{image_url}", alt: "{filename}", loading: "lazy" }
            div { class: "image-card__body",
                h6 { class: "image-card__title", "{filename}" }
                p { class: "image-card__meta", "{value_label}" }
                p { class: "image-card__meta", {t!("card-cluster", id = cluster.to_string())} }
            }
        }
    }
}
