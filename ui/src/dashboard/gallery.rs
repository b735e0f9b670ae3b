use dioxus::prelude::*;

use crate::core::{format, DashboardConfig, MetricsTable, SharedConfig, SharedTable};
use crate::t;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageCard {
    pub image_url: String,
    pub filename: String,
    pub confidence: String,
    pub density: String,
}

/// First `gallery_limit` rows of `cluster`, in table order.
pub fn gallery(table: &MetricsTable, config: &DashboardConfig, cluster: u32) -> Vec<ImageCard> {
    tracing::info!(cluster, "gallery: cluster selected");
    table
        .rows()
        .iter()
        .filter(|row| row.cluster == cluster)
        .take(config.gallery_limit)
        .map(|row| ImageCard {
            image_url: config.image_url(&row.image),
            filename: row.image.clone(),
            confidence: format::format_number(row.mean_confidence, 2),
            density: format::format_number(row.damage_density, 2),
        })
        .collect()
}

#[component]
pub fn GalleryView(clusters: Vec<u32>, default_cluster: Option<u32>) -> Element {
    let table = use_context::<SharedTable>();
    let config = use_context::<SharedConfig>();
    let mut selected = use_signal(move || default_cluster);

    let cards = selected()
        .map(|cluster| gallery(&table, &config, cluster))
        .unwrap_or_default();

    let on_change = move |evt: FormEvent| {
        if let Ok(cluster) = evt.value().parse::<u32>() {
            selected.set(Some(cluster));
        }
    };

    rsx! {
        section { class: "dashboard-card gallery",
            h5 { {t!("gallery-select-cluster")} }
            select {
                class: "dashboard-select",
                disabled: clusters.is_empty(),
                onchange: on_change,
                for cluster in clusters.iter().copied() {
                    option {
                        key: "{cluster}",
                        value: "{cluster}",
                        selected: selected() == Some(cluster),
                        {t!("gallery-cluster-option", id = cluster.to_string())}
                    }
                }
            }

            if cards.is_empty() {
                p { class: "dashboard-card__placeholder", {t!("gallery-empty")} }
            } else {
                div { class: "image-grid",
                    for card in cards.into_iter() {
                        {render_card(card)}
                    }
                }
            }
        }
    }
}

fn render_card(card: ImageCard) -> Element {
    let ImageCard {
        image_url,
        filename,
        confidence,
        density,
    } = card;

    rsx! {
        article { key: "{filename}", class: "image-card",
            img { class: "image-card__img", src: "{image_url}", alt: "{filename}", loading: "lazy" }
            div { class: "image-card__body",
                h6 { class: "image-card__title", "{filename}" }
                p { class: "image-card__meta", {t!("card-confidence", value = confidence)} }
                p { class: "image-card__meta", {t!("card-density", value = density)} }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MetricRow;

    fn table(rows: usize) -> MetricsTable {
        MetricsTable::from_rows(
            (0..rows)
                .map(|idx| MetricRow {
                    mean_confidence: Some(0.904),
                    damage_density: (idx % 2 == 0).then_some(0.126),
                    ..MetricRow::new(format!("img_{idx:02}.jpg"), (idx % 3) as u32)
                })
                .collect(),
        )
    }

    #[test]
    fn caps_at_twelve_cards_in_table_order() {
        let table = table(60);
        let cards = gallery(&table, &DashboardConfig::default(), 1);
        assert_eq!(cards.len(), 12);
        assert_eq!(cards[0].filename, "img_01.jpg");
        assert_eq!(cards[1].filename, "img_04.jpg");
        for card in &cards {
            let row = table
                .rows()
                .iter()
                .find(|row| row.image == card.filename)
                .unwrap();
            assert_eq!(row.cluster, 1);
        }
    }

    #[test]
    fn formats_card_fields() {
        let cards = gallery(&table(3), &DashboardConfig::default(), 0);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].confidence, "0.90");
        assert_eq!(cards[0].density, "0.13");
        assert!(cards[0].image_url.ends_with("/train_inference/img_00.jpg"));

        let odd = gallery(&table(3), &DashboardConfig::default(), 1);
        assert_eq!(odd[0].density, "N/A");
    }

    #[test]
    fn unknown_cluster_is_empty() {
        assert!(gallery(&table(6), &DashboardConfig::default(), 42).is_empty());
    }
}
