//! Dashboard configuration: where the metrics snapshot lives, where images are
//! served from, and the limits the views apply.
//!
//! Defaults point at the public roof-damage repositories. Every field can be
//! overridden through a `ROOFDASH_*` environment variable (see [`DashboardConfig::from_env`]).

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

pub const DEFAULT_HUB_HOST: &str = "https://huggingface.co";
pub const DEFAULT_DATASET_REPO: &str = "jobejaranom/roof-dashboard-data";
pub const DEFAULT_DATASET_PATH: &str = "dashboard_data/df_metrics_clustered.csv";
pub const DEFAULT_IMAGE_REPO: &str = "jobejaranom/yolo-roof-damage";

/// Read-only handle provided to components via context.
pub type SharedConfig = Arc<DashboardConfig>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Scheme + host of the artifact hub, without trailing slash.
    pub hub_host: String,
    /// `owner/name` of the repository holding the metrics snapshot.
    pub dataset_repo: String,
    /// Path of the CSV inside the dataset repository.
    pub dataset_path: String,
    pub revision: String,
    /// Local directory the snapshot is mirrored into.
    pub cache_dir: PathBuf,
    pub max_snapshot_bytes: usize,
    /// `owner/name` of the repository serving inference images.
    pub image_repo: String,
    pub image_prefix: String,
    /// Suffix an image filename must carry to be shown in the top-N grid.
    pub image_extension: String,
    pub gallery_limit: usize,
    pub histogram_bins: usize,
    pub top_n_default: i64,
    pub top_n_max: i64,
    pub table_page_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            hub_host: DEFAULT_HUB_HOST.to_string(),
            dataset_repo: DEFAULT_DATASET_REPO.to_string(),
            dataset_path: DEFAULT_DATASET_PATH.to_string(),
            revision: "main".to_string(),
            cache_dir: PathBuf::from("dashboard_data"),
            max_snapshot_bytes: 64 * 1024 * 1024,
            image_repo: DEFAULT_IMAGE_REPO.to_string(),
            image_prefix: "train_inference".to_string(),
            image_extension: ".jpg".to_string(),
            gallery_limit: 12,
            histogram_bins: 30,
            top_n_default: 3,
            top_n_max: 10,
            table_page_size: 10,
        }
    }
}

impl DashboardConfig {
    /// Defaults overlaid with any `ROOFDASH_*` variables found in the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Overlay `ROOFDASH_*` environment variables onto an existing config.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a JSON config document; absent fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Same as [`with_env`](Self::with_env) but reading values through `lookup`,
    /// which keeps the override logic testable without touching process state.
    pub fn with_overrides<F>(self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self;
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = read("ROOFDASH_HUB_HOST") {
            config.hub_host = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = read("ROOFDASH_DATASET_REPO") {
            config.dataset_repo = value;
        }
        if let Some(value) = read("ROOFDASH_DATASET_PATH") {
            config.dataset_path = value.trim_start_matches('/').to_string();
        }
        if let Some(value) = read("ROOFDASH_REVISION") {
            config.revision = value;
        }
        if let Some(value) = read("ROOFDASH_CACHE_DIR") {
            config.cache_dir = PathBuf::from(value);
        }
        if let Some(value) = read("ROOFDASH_IMAGE_REPO") {
            config.image_repo = value;
        }
        if let Some(bytes) = read("ROOFDASH_MAX_SNAPSHOT_BYTES").and_then(|v| v.parse().ok()) {
            config.max_snapshot_bytes = bytes;
        }

        config
    }

    /// Remote location of the metrics snapshot.
    pub fn dataset_url(&self) -> String {
        format!(
            "{}/{}/resolve/{}/{}",
            self.hub_host, self.dataset_repo, self.revision, self.dataset_path
        )
    }

    /// Where the snapshot is mirrored locally.
    pub fn cached_dataset_path(&self) -> PathBuf {
        self.dataset_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.cache_dir.clone(), |path, segment| path.join(segment))
    }

    /// Public URL of an inference image. Constructed only, never fetched here.
    pub fn image_url(&self, filename: &str) -> String {
        format!(
            "{}/{}/resolve/main/{}/{}",
            self.hub_host, self.image_repo, self.image_prefix, filename
        )
    }
}
