use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default download endpoint. Query parameters `id` (and `confirm` on the
/// second pass) are appended to whatever query the endpoint already carries.
pub const DEFAULT_ENDPOINT: &str = "https://docs.google.com/uc?export=download";

/// Receive buffer size in bytes; also the upper bound on body chunk size.
pub const DEFAULT_BUFFER_BYTES: usize = 32 * 1024;

/// Emit one progress dot every this many body chunks.
pub const DEFAULT_PROGRESS_STRIDE: u64 = 100;

/// Global configuration loaded from `~/.config/gdget/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GdgetConfig {
    /// Base download URL; `id`/`confirm` query parameters are appended.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// curl receive buffer size in bytes (chunks handed to the writer are at most this large).
    #[serde(default = "default_buffer_bytes")]
    pub buffer_bytes: usize,
    /// Progress dot stride: one dot per N chunks written.
    #[serde(default = "default_progress_stride")]
    pub progress_stride: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_buffer_bytes() -> usize {
    DEFAULT_BUFFER_BYTES
}

fn default_progress_stride() -> u64 {
    DEFAULT_PROGRESS_STRIDE
}

impl Default for GdgetConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            buffer_bytes: default_buffer_bytes(),
            progress_stride: default_progress_stride(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gdget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GdgetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GdgetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GdgetConfig = toml::from_str(&data)?;
    Ok(cfg)
}
