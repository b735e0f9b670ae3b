use std::path::{Path, PathBuf};

use dioxus::prelude::*;
use thiserror::Error;

use crate::core::{csv, MetricsTable, SharedTable};
use crate::t;

pub const EXPORT_FILENAME: &str = "roof_metrics.csv";
pub const EXPORT_MIME: &str = "text/csv";

/// Downloadable payload: the full table, header in snapshot column order.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there are no rows to export")]
    EmptyTable,
    #[error("failed to write export to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn export_csv(table: &MetricsTable) -> Result<CsvExport, ExportError> {
    if table.is_empty() {
        tracing::warn!("export requested on an empty table");
        return Err(ExportError::EmptyTable);
    }

    let mut out = String::new();
    csv::write_record(&mut out, table.columns());
    for row in table.rows() {
        csv::write_record(&mut out, &table.row_cells(row));
    }

    tracing::info!(rows = table.len(), "csv export prepared");
    Ok(CsvExport {
        filename: EXPORT_FILENAME,
        mime: EXPORT_MIME,
        bytes: out.into_bytes(),
    })
}

/// Write `export` into `dir`, creating it when needed. Returns the written path.
pub fn save_export(export: &CsvExport, dir: &Path) -> Result<PathBuf, ExportError> {
    let io_error = |source| ExportError::Io {
        path: dir.display().to_string(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(io_error)?;
    let path = dir.join(export.filename);
    std::fs::write(&path, &export.bytes).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!(path = %path.display(), "csv export written");
    Ok(path)
}

fn desktop_export_dir() -> Result<PathBuf, String> {
    let dirs = directories::ProjectDirs::from("com", "Roofdash", "Roofdash")
        .ok_or("Unable to determine export directory")?;
    Ok(dirs.data_dir().join("exports"))
}

fn perform_export(table: &MetricsTable) -> Result<String, String> {
    let export = export_csv(table).map_err(|err| err.to_string())?;
    let dir = desktop_export_dir()?;
    let path = save_export(&export, &dir).map_err(|err| err.to_string())?;
    Ok(path.display().to_string())
}

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Done(String),
    Error(String),
}

#[component]
pub fn ExportPanel() -> Element {
    let table = use_context::<SharedTable>();
    let mut status = use_signal(|| ExportStatus::Idle);

    let on_export = move |_| match perform_export(&table) {
        Ok(path) => status.set(ExportStatus::Done(path)),
        Err(err) => {
            tracing::error!(%err, "csv export failed");
            status.set(ExportStatus::Error(err));
        }
    };

    let feedback = match status() {
        ExportStatus::Idle => None,
        ExportStatus::Done(path) => Some((
            "export-panel__status export-panel__status--success",
            t!("export-done", path = path),
        )),
        ExportStatus::Error(err) => Some((
            "export-panel__status export-panel__status--error",
            t!("export-failed", error = err),
        )),
    };

    rsx! {
        div { class: "export-panel",
            button {
                r#type: "button",
                class: "button button--primary",
                onclick: on_export,
                {t!("export-button")}
            }
            if let Some((class_name, message)) = feedback {
                p { class: "{class_name}", "{message}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = "\
image,cluster,damage_count,damage_density,mean_confidence,max_confidence,PCA1,PCA2,note
a.jpg,0,3,0.125,0.9,0.95,1.5,-0.25,\"hail, heavy\"
b.jpg,1,,0.5,,0.4,0.1,0.2,
";

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            export_csv(&MetricsTable::default()),
            Err(ExportError::EmptyTable)
        ));
    }

    #[test]
    fn export_round_trips_rows_and_columns() {
        let table = MetricsTable::from_csv(SNAPSHOT).unwrap();
        let export = export_csv(&table).unwrap();
        assert_eq!(export.filename, "roof_metrics.csv");
        assert_eq!(export.mime, "text/csv");

        let text = String::from_utf8(export.bytes).unwrap();
        let reloaded = MetricsTable::from_csv(&text).unwrap();
        assert_eq!(reloaded.columns(), table.columns());
        assert_eq!(reloaded.rows(), table.rows());
        assert!(text.starts_with("image,cluster,damage_count"));
        assert!(text.contains("\"hail, heavy\""));
    }

    #[test]
    fn missing_values_export_as_empty_cells() {
        let table = MetricsTable::from_csv(SNAPSHOT).unwrap();
        let text = String::from_utf8(export_csv(&table).unwrap().bytes).unwrap();
        let second = text.lines().nth(2).unwrap();
        assert_eq!(second, "b.jpg,1,,0.5,,0.4,0.1,0.2,");
    }

    #[test]
    fn saves_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let table = MetricsTable::from_csv(SNAPSHOT).unwrap();
        let export = export_csv(&table).unwrap();
        let path = save_export(&export, &dir.path().join("exports")).unwrap();
        assert!(path.ends_with("roof_metrics.csv"));
        assert_eq!(std::fs::read(path).unwrap(), export.bytes);
    }
}
