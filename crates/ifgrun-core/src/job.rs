//! The interferogram job sequence.
//!
//! Diagnostics, working directory, sync, SLC download, topsApp, then the
//! optional upload and cleanup stages. Each stage is a shell command; its
//! outcome is recorded in the [`JobReport`] and the sequence carries on
//! whatever the outcome was. Only failing to set up the working directory
//! stops a job.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::RunnerConfig;
use crate::diagnostics;
use crate::location;
use crate::shell::{CommandOutcome, CommandRunner};
use crate::stages::{self, Stage};

/// Storage locations for one interferogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// Interferogram processing directory, e.g. `s3://myints/job1`.
    pub interferogram: String,
    /// DEM directory, e.g. `s3://dems/region1`.
    pub dem: String,
}

impl JobSpec {
    pub fn new(interferogram: impl Into<String>, dem: impl Into<String>) -> Self {
        Self {
            interferogram: interferogram.into(),
            dem: dem.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub command: String,
    pub outcome: CommandOutcome,
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub workdir: PathBuf,
    pub stages: Vec<StageReport>,
}

impl JobReport {
    pub fn failed(&self) -> impl Iterator<Item = &StageReport> {
        self.stages.iter().filter(|s| !s.outcome.is_success())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed().next().is_none()
    }
}

pub struct JobRunner<'a, R> {
    cfg: &'a RunnerConfig,
    runner: R,
    /// Receives the diagnostics and the processor command line (stdout by default).
    out: Box<dyn Write + 'a>,
}

impl<'a, R: CommandRunner> JobRunner<'a, R> {
    pub fn new(cfg: &'a RunnerConfig, runner: R) -> Self {
        Self {
            cfg,
            runner,
            out: Box::new(io::stdout()),
        }
    }

    /// Send the lines normally printed to stdout to `out` instead.
    pub fn with_output(mut self, out: impl Write + 'a) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Create (if needed) the working directory for `spec` under `base`.
    pub fn prepare_workdir(&self, spec: &JobSpec, base: &Path) -> Result<PathBuf> {
        let name = location::workdir_name(&spec.interferogram, self.cfg.prefix_strip)
            .context("derive working directory")?;
        let workdir = base.join(name);
        if !workdir.is_dir() {
            fs::create_dir_all(&workdir)
                .with_context(|| format!("create working directory {}", workdir.display()))?;
            tracing::debug!("created working directory {}", workdir.display());
        }
        Ok(workdir)
    }

    /// Run the whole job with `base` as the launch directory.
    ///
    /// Returns `Err` only if the working directory cannot be set up; stage
    /// failures are reported in the returned [`JobReport`].
    pub fn run(&mut self, spec: &JobSpec, base: &Path) -> Result<JobReport> {
        diagnostics::emit_batch_params(&mut self.out, &self.cfg.env_prefix);

        let workdir = self.prepare_workdir(spec, base)?;
        tracing::info!(
            interferogram = %spec.interferogram,
            dem = %spec.dem,
            workdir = %workdir.display(),
            "starting interferogram job"
        );
        let mut report = JobReport {
            workdir,
            stages: Vec::new(),
        };

        for cmd in stages::sync_commands(self.cfg, &spec.interferogram, &spec.dem) {
            self.run_stage(&mut report, Stage::Sync, cmd);
        }

        self.run_stage(
            &mut report,
            Stage::Download,
            stages::download_command(&self.cfg.download),
        );

        let process = stages::process_command(&self.cfg.isce);
        if let Err(e) = writeln!(self.out, "{}", process).and_then(|()| self.out.flush()) {
            tracing::warn!("cannot print process command: {}", e);
        }
        self.run_stage(&mut report, Stage::Process, process);

        if self.cfg.upload_results {
            let cmd = stages::upload_command(self.cfg, &spec.interferogram);
            self.run_stage(&mut report, Stage::Upload, cmd);
        }

        if self.cfg.cleanup.enabled {
            match stages::cleanup_command(&self.cfg.cleanup) {
                Some(cmd) => self.run_stage(&mut report, Stage::Cleanup, cmd),
                None => tracing::debug!("cleanup enabled but no paths configured"),
            }
        }

        let failed: Vec<String> = report.failed().map(|s| s.stage.to_string()).collect();
        if failed.is_empty() {
            tracing::info!(stages = report.stages.len(), "job finished");
        } else {
            tracing::warn!(
                stages = report.stages.len(),
                failed = %failed.join(","),
                "job finished with failed stages"
            );
        }
        Ok(report)
    }

    fn run_stage(&mut self, report: &mut JobReport, stage: Stage, command: String) {
        tracing::debug!(%stage, "stage start");
        let outcome = self.runner.run(&command, &report.workdir);
        report.stages.push(StageReport {
            stage,
            command,
            outcome,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrefixStrip;

    struct Ok0;

    impl CommandRunner for Ok0 {
        fn run(&mut self, _command: &str, _cwd: &Path) -> CommandOutcome {
            CommandOutcome::Exited(0)
        }
    }

    #[test]
    fn prepare_workdir_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let cfg = RunnerConfig::default();
        let job = JobRunner::new(&cfg, Ok0);
        let spec = JobSpec::new("s3://myints/job1", "s3://dems/region1");
        let first = job.prepare_workdir(&spec, base.path()).unwrap();
        let second = job.prepare_workdir(&spec, base.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, base.path().join("myints/job1"));
        assert!(first.is_dir());
    }

    #[test]
    fn prepare_workdir_follows_strip_mode() {
        let base = tempfile::tempdir().unwrap();
        let cfg = RunnerConfig {
            prefix_strip: PrefixStrip::Charset,
            ..RunnerConfig::default()
        };
        let job = JobRunner::new(&cfg, Ok0);
        let spec = JobSpec::new("s3://sentinel/job", "s3://dems/region1");
        let dir = job.prepare_workdir(&spec, base.path()).unwrap();
        assert_eq!(dir, base.path().join("entinel/job"));
    }

    #[test]
    fn bad_location_is_an_error_before_any_stage() {
        let base = tempfile::tempdir().unwrap();
        let cfg = RunnerConfig::default();
        let mut job = JobRunner::new(&cfg, Ok0);
        let spec = JobSpec::new("s3://", "s3://dems/region1");
        let err = job.run(&spec, base.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("derive working directory"));
    }

    #[test]
    fn report_failed_stages() {
        let report = JobReport {
            workdir: PathBuf::from("w"),
            stages: vec![
                StageReport {
                    stage: Stage::Sync,
                    command: "a".into(),
                    outcome: CommandOutcome::Exited(0),
                },
                StageReport {
                    stage: Stage::Download,
                    command: "b".into(),
                    outcome: CommandOutcome::Exited(1),
                },
            ],
        };
        assert!(!report.all_succeeded());
        let failed: Vec<Stage> = report.failed().map(|s| s.stage).collect();
        assert_eq!(failed, vec![Stage::Download]);
    }
}
