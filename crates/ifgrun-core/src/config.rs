use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How the storage scheme is removed from the interferogram location when
/// naming the working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixStrip {
    /// Remove a literal leading `s3://` only.
    #[default]
    Exact,
    /// Remove every leading `s`, `3`, `:` and `/` character. Matches the
    /// historical job scripts, and eats the start of bucket names such as `sentinel`.
    Charset,
}

/// Parallel downloader settings (optional `[download]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Downloader executable.
    pub program: String,
    /// Manifest of URLs, relative to the working directory.
    pub manifest: String,
    /// Maximum connections per server (`-x`).
    pub connections: u32,
    /// Number of pieces each file is split into (`-s`).
    pub splits: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            program: "aria2c".to_string(),
            manifest: "download-links.txt".to_string(),
            connections: 8,
            splits: 8,
        }
    }
}

/// ISCE processor settings (optional `[isce]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IsceConfig {
    pub program: String,
    /// Flag selecting which processing steps to execute.
    pub steps_flag: String,
    /// Combined stdout/stderr of the processor is teed here.
    pub log_file: String,
}

impl Default for IsceConfig {
    fn default() -> Self {
        Self {
            program: "topsApp.py".to_string(),
            steps_flag: "--steps".to_string(),
            log_file: "topsApp.log".to_string(),
        }
    }
}

/// Intermediate product removal (optional `[cleanup]` section). Off unless enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub enabled: bool,
    /// Shell patterns passed to `rm -r`, relative to the working directory.
    pub paths: Vec<String>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        let paths = [
            "S1*zip",
            "dem*",
            "coarse_coreg",
            "coarse_interferogram",
            "coarse_offsets",
            "ESD",
            "fine_coreg",
            "fine_interferogram",
            "fine_offsets",
            "geom_master",
            "masterdir",
            "PICKLE",
            "slavedir",
        ];
        Self {
            enabled: false,
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Global configuration loaded from `~/.config/ifgrun/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Environment variables with this prefix are echoed before the job starts.
    pub env_prefix: String,
    /// Shell used to run every stage command (invoked as `<shell> -c <cmd>`).
    pub shell: PathBuf,
    /// Directory mirroring command; called as `<sync_command> <src> <dst>`.
    pub sync_command: String,
    pub prefix_strip: PrefixStrip,
    /// Sync the working directory back to the interferogram location after processing.
    pub upload_results: bool,
    pub download: DownloadConfig,
    pub isce: IsceConfig,
    pub cleanup: CleanupConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            env_prefix: "AWS_BATCH".to_string(),
            shell: PathBuf::from("/bin/sh"),
            sync_command: "aws s3 sync".to_string(),
            prefix_strip: PrefixStrip::default(),
            upload_results: false,
            download: DownloadConfig::default(),
            isce: IsceConfig::default(),
            cleanup: CleanupConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs =
        xdg::BaseDirectories::with_prefix("ifgrun").context("locate XDG directories")?;
    xdg_dirs
        .place_config_file("config.toml")
        .context("create config directory")
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RunnerConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RunnerConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create default config {}", path.display()))?;
        }
        fs::write(&path, toml)
            .with_context(|| format!("create default config {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from(path: &Path) -> Result<RunnerConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: RunnerConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
