//! CLI for a single interferogram job.

use anyhow::{Context, Result};
use clap::Parser;
use ifgrun_core::config::{self, RunnerConfig};
use ifgrun_core::job::{JobRunner, JobSpec};
use ifgrun_core::shell::ShellRunner;
use std::path::{Path, PathBuf};

/// Run ISCE topsApp for one interferogram inside a batch container.
#[derive(Debug, Parser)]
#[command(name = "ifgrun")]
#[command(about = "Run ISCE topsApp for a single interferogram", long_about = None)]
pub struct Cli {
    /// Interferogram location (s3://int-name).
    #[arg(short = 'i', value_name = "URI")]
    pub interferogram: String,

    /// DEM location (s3://dems-are-here).
    #[arg(short = 'd', value_name = "URI")]
    pub dem: String,

    /// Config file to use instead of ~/.config/ifgrun/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remove intermediate processing products after topsApp finishes.
    #[arg(long)]
    pub cleanup: bool,

    /// Sync the working directory back to the interferogram location.
    #[arg(long)]
    pub upload: bool,
}

impl Cli {
    /// Config from `--config` or the XDG default, with flag overrides applied.
    pub fn load_config(&self) -> Result<RunnerConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            // The job needs no config file; an unwritable config home must not stop it.
            None => config::load_or_init().unwrap_or_else(|e| {
                tracing::warn!("using built-in config: {:#}", e);
                RunnerConfig::default()
            }),
        };
        if self.cleanup {
            cfg.cleanup.enabled = true;
        }
        if self.upload {
            cfg.upload_results = true;
        }
        Ok(cfg)
    }

    pub fn run(self) -> Result<()> {
        let base = std::env::current_dir().context("read current directory")?;
        self.run_in(&base)
    }

    /// Run the job with `base` as the launch directory.
    pub fn run_in(self, base: &Path) -> Result<()> {
        let cfg = self.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let spec = JobSpec::new(self.interferogram, self.dem);
        let mut job = JobRunner::new(&cfg, ShellRunner::new(&cfg.shell));
        let report = job.run(&spec, base)?;

        // Stage failures are visible in the log only; the job itself succeeded.
        for failed in report.failed() {
            tracing::warn!(stage = %failed.stage, command = %failed.command, "{}", failed.outcome);
        }
        Ok(())
    }
}
