use std::env;
use std::path::PathBuf;

pub mod builtin;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod file_updater;
pub mod output;
pub mod patch;

use crate::cli::Args;
use crate::config::Config;
use crate::output::PatchReport;
use crate::patch::{apply_patch, MatchPolicy, OnFailure, WriteMode};

pub struct PatchApplication {
    config: Config,
    args: Args,
}

impl PatchApplication {
    pub fn new(args: Args, config: Config) -> Self {
        Self { config, args }
    }

    pub fn target_path(&self) -> PathBuf {
        let target = self
            .args
            .target
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.config.patch.target));
        self.args.working_directory.join(target)
    }

    pub fn match_policy(&self) -> MatchPolicy {
        self.args
            .match_policy
            .unwrap_or(self.config.patch.match_policy)
    }

    pub fn on_failure(&self) -> OnFailure {
        if self.args.strict {
            OnFailure::Fail
        } else {
            self.config.patch.on_failure
        }
    }

    pub fn writes_default_config(&self) -> bool {
        self.args.write_default_config
    }

    pub fn write_default_config(&self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        Config::default().save(&self.args.config_file)?;
        println!(
            "📝 Wrote built-in patch configuration to {:?}",
            self.args.config_file
        );
        Ok(())
    }

    pub fn run(&self) -> std::result::Result<PatchReport, Box<dyn std::error::Error>> {
        let descriptor = self.config.descriptor()?;
        let target = self.target_path();
        let policy = self.match_policy();
        let mode = if self.args.dry_run {
            WriteMode::DryRun
        } else {
            WriteMode::Write
        };

        println!("🔧 Patching {:?} (match policy: {})", target, policy);

        let result = apply_patch(&target, &descriptor, policy, mode)?;

        Ok(PatchReport::new(
            target.display().to_string(),
            result.outcome,
            result.occurrences,
            self.args.dry_run,
            result.hint,
        ))
    }

    /// Turns an unapplied patch into an error when configured to fail.
    pub fn check_outcome(
        &self,
        report: &PatchReport,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        if report.outcome.is_applied() || self.on_failure() == OnFailure::Warn {
            return Ok(());
        }

        Err(format!(
            "Patch not applied to {} ({}) and on_failure is set to fail",
            report.target,
            report.outcome.name()
        )
        .into())
    }
}

pub fn create_patch_application(
) -> std::result::Result<PatchApplication, Box<dyn std::error::Error>> {
    // Parse command line arguments or use environment variables (for GitHub Actions)
    let args = if env::var("GITHUB_ACTIONS").is_ok() {
        Args::from_env()
    } else {
        Args::parse()
    };

    if args.write_default_config {
        return Ok(PatchApplication::new(args, Config::default()));
    }

    let config = Config::load(&args.config_file)
        .map_err(|e| format!("Failed to load config from {:?}: {}", args.config_file, e))?;

    Ok(PatchApplication::new(args, config))
}
