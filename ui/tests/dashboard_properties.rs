//! End-to-end checks of the dashboard bindings over a parsed snapshot.

use std::collections::BTreeSet;

use ui::core::{DashboardConfig, Metric, MetricsTable};
use ui::dashboard::{
    correlation, export_csv, gallery, route, top_images, ExportError, TabView, TopOutcome,
};

const HEADER: &str =
    "image,cluster,damage_count,damage_density,mean_confidence,max_confidence,PCA1,PCA2,source";

/// 40 rows over clusters 0..=2 with a few missing cells and repeated counts.
fn snapshot() -> MetricsTable {
    let mut text = String::from(HEADER);
    text.push('\n');
    for idx in 0..40u32 {
        let count = if idx % 7 == 0 {
            String::new()
        } else {
            (idx % 6).to_string()
        };
        let density = if idx % 9 == 0 {
            "nan".to_string()
        } else {
            format!("{}", f64::from(idx) / 40.0)
        };
        text.push_str(&format!(
            "roof_{idx:02}.jpg,{},{count},{density},{},{},{},{},drone\n",
            idx % 3,
            0.5 + f64::from(idx % 5) / 10.0,
            0.6 + f64::from(idx % 4) / 10.0,
            f64::from(idx) * 0.1 - 2.0,
            f64::from(idx % 8) * -0.2,
        ));
    }
    MetricsTable::from_csv(&text).expect("snapshot parses")
}

#[test]
fn gallery_is_capped_and_cluster_pure() {
    let table = snapshot();
    let config = DashboardConfig::default();
    for cluster in table.clusters() {
        let cards = gallery(&table, &config, cluster);
        assert!(!cards.is_empty());
        assert!(cards.len() <= 12);
        for card in &cards {
            let row = table
                .rows()
                .iter()
                .find(|row| row.image == card.filename)
                .expect("card comes from the table");
            assert_eq!(row.cluster, cluster);
        }
    }
    assert!(gallery(&table, &config, 99).is_empty());
}

#[test]
fn correlation_is_symmetric_with_unit_diagonal() {
    let table = snapshot();
    let matrix = correlation(&table);
    assert_eq!(matrix.metrics, Metric::ALL);
    for i in 0..4 {
        assert_eq!(matrix.values[i][i], Some(1.0));
        for j in 0..4 {
            assert_eq!(matrix.values[i][j], matrix.values[j][i]);
            if let Some(r) = matrix.values[i][j] {
                assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&r));
            }
        }
    }
}

#[test]
fn top_n_is_bounded_and_non_increasing() {
    let table = snapshot();
    let config = DashboardConfig::default();
    for metric in Metric::ALL {
        for n in 1..=10 {
            let TopOutcome::Cards(cards) = top_images(&table, &config, metric.as_str(), n) else {
                panic!("expected cards for {metric} n={n}");
            };
            assert!(cards.len() <= n as usize);

            let values: Vec<f64> = cards
                .iter()
                .map(|card| {
                    let row = table
                        .rows()
                        .iter()
                        .find(|row| row.image == card.filename)
                        .expect("card comes from the table");
                    row.metric(metric).expect("ranked rows carry the metric")
                })
                .collect();
            assert!(values.windows(2).all(|pair| pair[0] >= pair[1]));
        }
    }
}

#[test]
fn top_n_ties_keep_table_order() {
    let table = snapshot();
    let config = DashboardConfig::default();
    // damage_count peaks at 5 for idx 5, 11, 17, 23, 29 (35 is missing).
    let TopOutcome::Cards(cards) = top_images(&table, &config, "damage_count", 5) else {
        panic!("expected cards");
    };
    let names: Vec<&str> = cards.iter().map(|card| card.filename.as_str()).collect();
    assert_eq!(
        names,
        vec!["roof_05.jpg", "roof_11.jpg", "roof_17.jpg", "roof_23.jpg", "roof_29.jpg"]
    );
}

#[test]
fn top_n_reports_invalid_metric_and_missing_data() {
    let table = snapshot();
    let config = DashboardConfig::default();
    assert_eq!(
        top_images(&table, &config, "not_a_real_metric", 3),
        TopOutcome::InvalidMetric("not_a_real_metric".to_string())
    );

    let empty_counts = MetricsTable::from_csv(&format!(
        "{HEADER}\na.jpg,0,,0.1,0.5,0.6,0,0,x\nb.jpg,1,nan,0.2,0.5,0.6,0,0,x\n"
    ))
    .unwrap();
    assert_eq!(
        top_images(&empty_counts, &config, "damage_count", 5),
        TopOutcome::NoValidData
    );
}

#[test]
fn example_scenario_yields_single_card() {
    let table = MetricsTable::from_csv(&format!(
        "{HEADER}\na.jpg,0,5,0.3,0.9,0.95,0,0,x\nb.jpg,0,2,0.1,0.5,0.6,0,0,x\n"
    ))
    .unwrap();
    let outcome = top_images(&table, &DashboardConfig::default(), "damage_count", 1);
    let TopOutcome::Cards(cards) = outcome else {
        panic!("expected cards");
    };
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].filename, "a.jpg");
    assert_eq!(cards[0].value_label, "damage_count: 5.000");
}

#[test]
fn export_round_trip_preserves_shape() {
    let table = snapshot();
    let export = export_csv(&table).unwrap();
    let reloaded = MetricsTable::from_csv(std::str::from_utf8(&export.bytes).unwrap()).unwrap();

    assert_eq!(reloaded.len(), table.len());
    let original: BTreeSet<&String> = table.columns().iter().collect();
    let round_tripped: BTreeSet<&String> = reloaded.columns().iter().collect();
    assert_eq!(original, round_tripped);
    assert_eq!(reloaded.rows(), table.rows());

    assert!(matches!(
        export_csv(&MetricsTable::default()),
        Err(ExportError::EmptyTable)
    ));
}

#[test]
fn every_tab_routes_and_unknown_ids_fall_back() {
    let table = snapshot();
    let config = DashboardConfig::default();
    for id in ["tab-general", "tab-visual", "tab-dist", "tab-top"] {
        assert!(!matches!(
            route(&table, &config, id),
            TabView::Unrecognized(_)
        ));
    }
    assert_eq!(
        route(&table, &config, "tab-missing"),
        TabView::Unrecognized("tab-missing".to_string())
    );
}
