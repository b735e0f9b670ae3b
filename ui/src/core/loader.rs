//! One-shot startup loader: mirrors the metrics snapshot from the artifact hub
//! into the local cache directory and parses it into a [`MetricsTable`].
//!
//! The mirror is conditional. When a cached copy and its manifest exist the
//! request carries `If-None-Match`, so an unchanged snapshot costs a `304`
//! and no body transfer. A transport failure falls back to the cached copy
//! when one exists; everything else is fatal for the caller.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::config::DashboardConfig;
use super::table::{MetricsTable, TableError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const MANIFEST_NAME: &str = ".roofdash-cache.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("dataset file not found: {0}")]
    NotFound(String),
    #[error("snapshot from {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },
    #[error("I/O error at {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid snapshot {}: {source}", .path.display())]
    Parse { path: PathBuf, source: TableError },
}

/// How the local copy was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Downloaded,
    NotModified,
    /// Remote unreachable; the previous mirror was used as is.
    OfflineCache,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
struct CacheManifest {
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
}

fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .build()
    })
}

/// Mirror the snapshot and parse it. Any error means the dashboard cannot start.
pub fn load_dataset(config: &DashboardConfig) -> Result<MetricsTable, LoadError> {
    let (path, outcome) = sync_snapshot(config)?;
    info!(?outcome, path = %path.display(), "metrics snapshot ready");

    let text = fs::read_to_string(&path).map_err(|source| io_error(&path, source))?;
    let table = MetricsTable::from_csv(&text).map_err(|source| LoadError::Parse {
        path: path.clone(),
        source,
    })?;

    info!(
        "loaded {} images, {} columns",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Bring the local mirror up to date and return its path.
pub fn sync_snapshot(config: &DashboardConfig) -> Result<(PathBuf, SyncOutcome), LoadError> {
    let url = config.dataset_url();
    let target = config.cached_dataset_path();
    let manifest_path = config.cache_dir.join(MANIFEST_NAME);

    let cached = target
        .is_file()
        .then(|| read_manifest(&manifest_path))
        .flatten()
        .filter(|manifest| manifest.url == url);

    let mut request = agent().get(&url);
    if let Some(etag) = cached.as_ref().and_then(|m| m.etag.as_deref()) {
        request = request.set("If-None-Match", etag);
    }

    let outcome = match request.call() {
        Ok(response) if response.status() == 304 => SyncOutcome::NotModified,
        Ok(response) => {
            let etag = response.header("ETag").map(str::to_string);
            let bytes = read_bounded(response, config.max_snapshot_bytes).map_err(|err| {
                if err.kind() == io::ErrorKind::InvalidData {
                    LoadError::TooLarge {
                        url: url.clone(),
                        limit: config.max_snapshot_bytes,
                    }
                } else {
                    LoadError::Http {
                        url: url.clone(),
                        message: err.to_string(),
                    }
                }
            })?;
            write_atomic(&target, &bytes)?;
            write_manifest(&manifest_path, &CacheManifest { url: url.clone(), etag });
            SyncOutcome::Downloaded
        }
        Err(ureq::Error::Status(404, _)) => return Err(LoadError::NotFound(url)),
        Err(ureq::Error::Status(code, _)) if is_outage(code) && target.is_file() => {
            warn!(%url, status = code, "hub unavailable, using cached snapshot");
            SyncOutcome::OfflineCache
        }
        Err(ureq::Error::Status(code, _)) => {
            return Err(LoadError::Http {
                url,
                message: format!("HTTP status {code}"),
            })
        }
        Err(ureq::Error::Transport(transport)) => {
            if target.is_file() {
                warn!(%url, error = %transport, "hub unreachable, using cached snapshot");
                SyncOutcome::OfflineCache
            } else {
                return Err(LoadError::Http {
                    url,
                    message: transport.to_string(),
                });
            }
        }
    };

    if !target.is_file() {
        return Err(LoadError::NotFound(target.display().to_string()));
    }
    Ok((target, outcome))
}

fn read_bounded(response: ureq::Response, max_bytes: usize) -> Result<Vec<u8>, io::Error> {
    if let Some(length) = response
        .header("Content-Length")
        .and_then(|value| value.parse::<u64>().ok())
    {
        if length > max_bytes as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Response too large: {length} bytes"),
            ));
        }
    }

    let mut limited = response.into_reader().take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}

/// Write through a sibling temp file so a torn download never replaces a good mirror.
fn write_atomic(target: &Path, bytes: &[u8]) -> Result<(), LoadError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }
    let partial = target.with_extension("partial");
    fs::write(&partial, bytes).map_err(|source| io_error(&partial, source))?;
    fs::rename(&partial, target).map_err(|source| io_error(target, source))?;
    Ok(())
}

fn io_error(path: &Path, source: io::Error) -> LoadError {
    LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_manifest(path: &Path) -> Option<CacheManifest> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

fn write_manifest(path: &Path, manifest: &CacheManifest) {
    let written = serde_json::to_string_pretty(manifest)
        .map_err(|err| err.to_string())
        .and_then(|json| fs::write(path, json).map_err(|err| err.to_string()));
    if let Err(err) = written {
        // Only costs a full download next time.
        warn!(path = %path.display(), %err, "could not record snapshot manifest");
    }
}

/// Statuses that say the hub is down or throttling rather than that the file is bad.
fn is_outage(code: u16) -> bool {
    code >= 500 || code == 429
}
