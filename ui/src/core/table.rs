//! In-memory metrics table: one row per inference image, loaded once and shared
//! read-only with every view.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::csv::{self, CsvError};

pub const COL_IMAGE: &str = "image";
pub const COL_CLUSTER: &str = "cluster";
pub const COL_PCA1: &str = "PCA1";
pub const COL_PCA2: &str = "PCA2";

/// Columns every snapshot must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_IMAGE,
    COL_CLUSTER,
    "damage_count",
    "damage_density",
    "mean_confidence",
    "max_confidence",
    COL_PCA1,
    COL_PCA2,
];

/// Cell spellings treated as a missing value.
const MISSING_TOKENS: &[&str] = &[
    "", "nan", "NaN", "NAN", "-nan", "NA", "N/A", "n/a", "<NA>", "null", "NULL", "None",
];

/// Read-only handle threaded through the component tree via context.
pub type SharedTable = Arc<MetricsTable>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    DamageCount,
    DamageDensity,
    MeanConfidence,
    MaxConfidence,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::DamageCount,
        Metric::DamageDensity,
        Metric::MeanConfidence,
        Metric::MaxConfidence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::DamageCount => "damage_count",
            Metric::DamageDensity => "damage_density",
            Metric::MeanConfidence => "mean_confidence",
            Metric::MaxConfidence => "max_confidence",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|metric| metric.as_str() == name)
    }

    /// `damage_count` -> `Damage count`.
    pub fn label(self) -> String {
        let spaced = self.as_str().replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricRow {
    pub image: String,
    pub cluster: u32,
    pub damage_count: Option<u64>,
    pub damage_density: Option<f64>,
    pub mean_confidence: Option<f64>,
    pub max_confidence: Option<f64>,
    pub pca1: Option<f64>,
    pub pca2: Option<f64>,
    /// Cells of non-required columns, aligned with [`MetricsTable::extra_columns`].
    pub extra: Vec<String>,
}

impl MetricRow {
    pub fn new(image: impl Into<String>, cluster: u32) -> Self {
        Self {
            image: image.into(),
            cluster,
            ..Self::default()
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::DamageCount => self.damage_count.map(|count| count as f64),
            Metric::DamageDensity => self.damage_density,
            Metric::MeanConfidence => self.mean_confidence,
            Metric::MaxConfidence => self.max_confidence,
        }
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] CsvError),
    #[error("snapshot has no header row")]
    Empty,
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("row {row}: expected {expected} cells, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: empty `image` value")]
    MissingImage { row: usize },
    #[error("row {row}: invalid cluster id `{value}`")]
    InvalidCluster { row: usize, value: String },
    #[error("row {row}: invalid `{column}` value `{value}`")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
}

/// Immutable table of per-image metrics. Rows keep snapshot order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    columns: Vec<String>,
    extra_columns: Vec<String>,
    rows: Vec<MetricRow>,
}

impl Default for MetricsTable {
    fn default() -> Self {
        Self::from_rows(Vec::new())
    }
}

/// Where each header column lands when reading a row.
enum Slot {
    Required(usize),
    Extra(usize),
}

impl MetricsTable {
    /// Build a table with exactly the required columns.
    pub fn from_rows(rows: Vec<MetricRow>) -> Self {
        Self {
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            extra_columns: Vec::new(),
            rows,
        }
    }

    pub fn from_csv(text: &str) -> Result<Self, TableError> {
        let mut records = csv::parse_records(text)?.into_iter();
        let header: Vec<String> = records
            .next()
            .ok_or(TableError::Empty)?
            .into_iter()
            .map(|name| name.trim().to_string())
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !header.iter().any(|name| name == *required))
            .map(|required| required.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(TableError::MissingColumns(missing));
        }

        let mut extra_columns = Vec::new();
        let slots: Vec<Slot> = header
            .iter()
            .map(|name| match REQUIRED_COLUMNS.iter().position(|c| c == name) {
                Some(idx) => Slot::Required(idx),
                None => {
                    extra_columns.push(name.clone());
                    Slot::Extra(extra_columns.len() - 1)
                }
            })
            .collect();

        let mut rows = Vec::new();
        for (offset, record) in records.enumerate() {
            // Data rows start on line 2 of the file.
            let row_number = offset + 2;
            if record.len() != header.len() {
                return Err(TableError::RaggedRow {
                    row: row_number,
                    expected: header.len(),
                    found: record.len(),
                });
            }
            rows.push(parse_row(
                row_number,
                &slots,
                &header,
                record,
                extra_columns.len(),
            )?);
        }

        Ok(Self {
            columns: header,
            extra_columns,
            rows,
        })
    }

    /// Header in snapshot order, required and extra columns interleaved as loaded.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct cluster ids in ascending order.
    pub fn clusters(&self) -> Vec<u32> {
        self.rows
            .iter()
            .map(|row| row.cluster)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Non-missing values of `metric` in table order.
    pub fn metric_values(&self, metric: Metric) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.metric(metric))
            .collect()
    }

    /// Render a single cell the way it is written on export.
    pub fn cell(&self, row: &MetricRow, column: &str) -> String {
        match column {
            COL_IMAGE => row.image.clone(),
            COL_CLUSTER => row.cluster.to_string(),
            COL_PCA1 => format_optional(row.pca1),
            COL_PCA2 => format_optional(row.pca2),
            other => match Metric::parse(other) {
                Some(Metric::DamageCount) => row
                    .damage_count
                    .map(|count| count.to_string())
                    .unwrap_or_default(),
                Some(metric) => format_optional(row.metric(metric)),
                None => self
                    .extra_columns
                    .iter()
                    .position(|name| name == other)
                    .and_then(|idx| row.extra.get(idx).cloned())
                    .unwrap_or_default(),
            },
        }
    }

    /// All cells of a row, aligned with [`columns`](Self::columns).
    pub fn row_cells(&self, row: &MetricRow) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| self.cell(row, column))
            .collect()
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_row(
    row: usize,
    slots: &[Slot],
    header: &[String],
    record: Vec<String>,
    extra_len: usize,
) -> Result<MetricRow, TableError> {
    let mut required: [Option<String>; REQUIRED_COLUMNS.len()] = Default::default();
    let mut extra = vec![String::new(); extra_len];

    for (slot, cell) in slots.iter().zip(record) {
        match slot {
            Slot::Required(idx) => required[*idx] = Some(cell),
            Slot::Extra(idx) => extra[*idx] = cell,
        }
    }

    let take = |idx: usize| required[idx].as_deref().unwrap_or("").trim();
    let image = take(0).to_string();
    if image.is_empty() {
        return Err(TableError::MissingImage { row });
    }
    let cluster = parse_cluster(take(1)).ok_or_else(|| TableError::InvalidCluster {
        row,
        value: take(1).to_string(),
    })?;

    let float = |idx: usize| parse_float(row, header_name(header, idx), take(idx));

    Ok(MetricRow {
        image,
        cluster,
        damage_count: parse_count(row, take(2))?,
        damage_density: float(3)?,
        mean_confidence: float(4)?,
        max_confidence: float(5)?,
        pca1: float(6)?,
        pca2: float(7)?,
        extra,
    })
}

fn header_name(header: &[String], required_idx: usize) -> &str {
    let name = REQUIRED_COLUMNS[required_idx];
    header
        .iter()
        .find(|column| column.as_str() == name)
        .map(String::as_str)
        .unwrap_or(name)
}

fn is_missing(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw)
}

/// Integral ids, tolerating the `3.0` spelling some writers emit.
fn parse_cluster(raw: &str) -> Option<u32> {
    if let Ok(value) = raw.parse::<u32>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

fn parse_count(row: usize, raw: &str) -> Result<Option<u64>, TableError> {
    if is_missing(raw) {
        return Ok(None);
    }
    if let Ok(value) = raw.parse::<u64>() {
        return Ok(Some(value));
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
            Ok(Some(value as u64))
        }
        _ => Err(TableError::InvalidNumber {
            row,
            column: "damage_count".to_string(),
            value: raw.to_string(),
        }),
    }
}

fn parse_float(row: usize, column: &str, raw: &str) -> Result<Option<f64>, TableError> {
    if is_missing(raw) {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_nan() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(TableError::InvalidNumber {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}
