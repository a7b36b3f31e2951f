//! Command lines for each stage of an interferogram job.

use crate::config::{CleanupConfig, DownloadConfig, IsceConfig, RunnerConfig};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sync,
    Download,
    Process,
    Upload,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Sync => "sync",
            Stage::Download => "download",
            Stage::Process => "process",
            Stage::Upload => "upload",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// Mirror the interferogram config directory, then the DEM directory, into `.`.
pub fn sync_commands(cfg: &RunnerConfig, interferogram: &str, dem: &str) -> [String; 2] {
    [
        format!("{} {} .", cfg.sync_command, interferogram),
        format!("{} {} .", cfg.sync_command, dem),
    ]
}

/// SLC download with resume (`-c`) and per-server connection/split parallelism.
pub fn download_command(cfg: &DownloadConfig) -> String {
    format!(
        "{} -c -x {} -s {} -i {}",
        cfg.program, cfg.connections, cfg.splits, cfg.manifest
    )
}

pub fn process_command(cfg: &IsceConfig) -> String {
    format!("{} {} 2>&1 | tee {}", cfg.program, cfg.steps_flag, cfg.log_file)
}

/// Sync the working directory back to the interferogram location.
pub fn upload_command(cfg: &RunnerConfig, interferogram: &str) -> String {
    format!("{} . {}", cfg.sync_command, interferogram)
}

/// `None` when there is nothing to remove.
pub fn cleanup_command(cfg: &CleanupConfig) -> Option<String> {
    if cfg.paths.is_empty() {
        return None;
    }
    Some(format!("rm -r {}", cfg.paths.join(" ")))
}
