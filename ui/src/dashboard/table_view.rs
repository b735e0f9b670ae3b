use std::cmp::Ordering;

use dioxus::prelude::*;

use crate::core::{MetricsTable, SharedConfig, SharedTable};
use crate::t;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    /// Case-insensitive substring matched against every cell.
    pub filter: String,
    pub sort: Option<(String, SortDirection)>,
    /// Zero-based; clamped to the last page.
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            filter: String::new(),
            sort: None,
            page: 0,
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub page: usize,
    /// At least 1, even when nothing matches.
    pub page_count: usize,
    pub total_matches: usize,
}

pub fn table_page(table: &MetricsTable, query: &TableQuery) -> TablePage {
    let needle = query.filter.trim().to_lowercase();
    let mut rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| table.row_cells(row))
        .filter(|cells| {
            needle.is_empty()
                || cells
                    .iter()
                    .any(|cell| cell.to_lowercase().contains(&needle))
        })
        .collect();

    if let Some((column, direction)) = &query.sort {
        if let Some(idx) = table.columns().iter().position(|name| name == column) {
            rows.sort_by(|a, b| compare_cells(&a[idx], &b[idx], *direction));
        }
    }

    let page_size = query.page_size.max(1);
    let total_matches = rows.len();
    let page_count = total_matches.div_ceil(page_size).max(1);
    let page = query.page.min(page_count - 1);

    TablePage {
        columns: table.columns().to_vec(),
        rows: rows
            .into_iter()
            .skip(page * page_size)
            .take(page_size)
            .collect(),
        page,
        page_count,
        total_matches,
    }
}

/// Numbers rank before text; numbers compare numerically and text lexically.
/// Empty cells sort last in either direction.
fn compare_cells(a: &str, b: &str, direction: SortDirection) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let ordering = match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    };
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

#[component]
pub fn MetricsTableView() -> Element {
    let table = use_context::<SharedTable>();
    let config = use_context::<SharedConfig>();
    let page_size = config.table_page_size;
    let mut query = use_signal(move || TableQuery {
        page_size,
        ..TableQuery::default()
    });

    let current = query();
    let view = table_page(&table, &current);
    let last_page = view.page_count - 1;

    let on_filter = move |evt: FormEvent| {
        let mut next = query();
        next.filter = evt.value();
        next.page = 0;
        query.set(next);
    };

    rsx! {
        div { class: "metrics-table",
            input {
                class: "metrics-table__filter",
                r#type: "search",
                placeholder: t!("table-filter-placeholder"),
                value: "{current.filter}",
                oninput: on_filter,
            }
            div { class: "metrics-table__scroll",
                table {
                    thead {
                        tr {
                            for column in view.columns.iter().cloned() {
                                {
                                    let arrow = match &current.sort {
                                        Some((name, direction)) if *name == column => direction.arrow(),
                                        _ => "",
                                    };
                                    let sort_column = column.clone();
                                    rsx! {
                                        th {
                                            key: "{column}",
                                            onclick: move |_| {
                                                let mut next = query();
                                                next.sort = Some(match next.sort.take() {
                                                    Some((name, direction)) if name == sort_column => {
                                                        (name, direction.flipped())
                                                    }
                                                    _ => (sort_column.clone(), SortDirection::Ascending),
                                                });
                                                query.set(next);
                                            },
                                            "{column} {arrow}"
                                        }
                                    }
                                }
                            }
                        }
                    }
                    tbody {
                        for (idx, cells) in view.rows.iter().enumerate() {
                            tr { key: "{idx}",
                                for (col, cell) in cells.iter().enumerate() {
                                    td { key: "{col}", "{cell}" }
                                }
                            }
                        }
                    }
                }
            }
            div { class: "metrics-table__pager",
                button {
                    r#type: "button",
                    class: "button",
                    disabled: view.page == 0,
                    onclick: move |_| {
                        let mut next = query();
                        next.page = next.page.saturating_sub(1);
                        query.set(next);
                    },
                    "‹"
                }
                span {
                    {t!(
                        "table-page-status",
                        page = (view.page + 1).to_string(),
                        pages = view.page_count.to_string(),
                        matches = view.total_matches.to_string()
                    )}
                }
                button {
                    r#type: "button",
                    class: "button",
                    disabled: view.page >= last_page,
                    onclick: move |_| {
                        let mut next = query();
                        next.page = (next.page + 1).min(last_page);
                        query.set(next);
                    },
                    "›"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MetricRow;

    fn table() -> MetricsTable {
        MetricsTable::from_rows(
            (0..25)
                .map(|idx| MetricRow {
                    damage_count: (idx % 5 != 0).then_some(idx as u64),
                    damage_density: Some(idx as f64 / 100.0),
                    ..MetricRow::new(format!("roof_{idx:02}.jpg"), idx as u32 % 3)
                })
                .collect(),
        )
    }

    #[test]
    fn pages_hold_ten_rows() {
        let page = table_page(&table(), &TableQuery::default());
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.total_matches, 25);
        assert_eq!(page.rows[0][0], "roof_00.jpg");
    }

    #[test]
    fn page_index_is_clamped() {
        let query = TableQuery {
            page: 99,
            ..TableQuery::default()
        };
        let page = table_page(&table(), &query);
        assert_eq!(page.page, 2);
        assert_eq!(page.rows.len(), 5);
    }

    #[test]
    fn filter_is_case_insensitive() {
        let query = TableQuery {
            filter: "ROOF_1".to_string(),
            ..TableQuery::default()
        };
        let page = table_page(&table(), &query);
        assert_eq!(page.total_matches, 10);
        assert!(page.rows.iter().all(|cells| cells[0].starts_with("roof_1")));
    }

    #[test]
    fn no_match_still_has_one_page() {
        let query = TableQuery {
            filter: "zzz".to_string(),
            ..TableQuery::default()
        };
        let page = table_page(&table(), &query);
        assert_eq!(page.page_count, 1);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn numeric_sort_puts_missing_last() {
        let query = TableQuery {
            sort: Some(("damage_count".to_string(), SortDirection::Descending)),
            page_size: 25,
            ..TableQuery::default()
        };
        let page = table_page(&table(), &query);
        let counts: Vec<&str> = page.rows.iter().map(|cells| cells[2].as_str()).collect();
        assert_eq!(&counts[..3], &["24", "23", "22"]);
        assert!(counts[20..].iter().all(|cell| cell.is_empty()));
    }

    #[test]
    fn unknown_sort_column_keeps_table_order() {
        let query = TableQuery {
            sort: Some(("nope".to_string(), SortDirection::Ascending)),
            ..TableQuery::default()
        };
        let page = table_page(&table(), &query);
        assert_eq!(page.rows[1][0], "roof_01.jpg");
    }

    /// A free-text column mixing numbers, words and blanks.
    fn noted_table() -> MetricsTable {
        let mut text = String::from(
            "image,cluster,damage_count,damage_density,mean_confidence,max_confidence,PCA1,PCA2,note\n",
        );
        let notes = ["5a", "9", "10", "", "hail", "-2.5", "10b", "7", "moss", "1e2"];
        for idx in 0..300 {
            let note = notes[(idx * 7 + idx / 10) % notes.len()];
            text.push_str(&format!("roof_{idx:03}.jpg,0,1,0.1,0.5,0.6,0,0,{note}\n"));
        }
        MetricsTable::from_csv(&text).unwrap()
    }

    fn sorted_column(table: &MetricsTable, column: &str, direction: SortDirection) -> Vec<String> {
        let idx = table.columns().iter().position(|c| c == column).unwrap();
        let query = TableQuery {
            sort: Some((column.to_string(), direction)),
            page_size: table.len(),
            ..TableQuery::default()
        };
        table_page(table, &query)
            .rows
            .into_iter()
            .map(|mut cells| cells.swap_remove(idx))
            .collect()
    }

    #[test]
    fn mixed_column_sorts_numbers_then_text_then_blanks() {
        let table = noted_table();

        let ascending = sorted_column(&table, "note", SortDirection::Ascending);
        assert_eq!(ascending.len(), 300);
        let blanks = ascending.iter().position(String::is_empty).unwrap();
        assert!(ascending[blanks..].iter().all(String::is_empty));
        let text_start = ascending
            .iter()
            .position(|cell| cell.parse::<f64>().is_err())
            .unwrap();
        let numbers: Vec<f64> = ascending[..text_start]
            .iter()
            .map(|cell| cell.parse().unwrap())
            .collect();
        assert!(numbers.windows(2).all(|pair| pair[0] <= pair[1]));
        let words = &ascending[text_start..blanks];
        assert!(words.iter().all(|cell| cell.parse::<f64>().is_err()));
        assert!(words.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(ascending.first().map(String::as_str), Some("-2.5"));

        let descending = sorted_column(&table, "note", SortDirection::Descending);
        assert_eq!(descending.first().map(String::as_str), Some("moss"));
        let non_blank = descending.iter().filter(|cell| !cell.is_empty()).count();
        assert_eq!(non_blank, blanks);
        assert!(descending[non_blank..].iter().all(String::is_empty));
        let reversed: Vec<&String> = ascending[..blanks].iter().rev().collect();
        assert_eq!(descending[..non_blank].iter().collect::<Vec<_>>(), reversed);
        assert_eq!(descending[non_blank - 1], "-2.5");
    }

    #[test]
    fn image_column_sorts_as_text() {
        let table = MetricsTable::from_rows(
            ["b.jpg", "a10.jpg", "a9.jpg", "C.jpg"]
                .into_iter()
                .map(|image| MetricRow::new(image.to_string(), 0))
                .collect(),
        );
        assert_eq!(
            sorted_column(&table, "image", SortDirection::Ascending),
            ["C.jpg", "a10.jpg", "a9.jpg", "b.jpg"]
        );
        assert_eq!(
            sorted_column(&table, "image", SortDirection::Descending),
            ["b.jpg", "a9.jpg", "a10.jpg", "C.jpg"]
        );
    }
}
