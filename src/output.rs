use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::patch::PatchOutcome;

#[derive(Debug, Serialize)]
pub struct PatchReport {
    pub applied: bool,
    pub outcome: PatchOutcome,
    pub target: String,
    pub replaced: usize,
    pub occurrences: usize,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub finished_at: String,
}

impl PatchReport {
    pub fn new(
        target: String,
        outcome: PatchOutcome,
        occurrences: usize,
        dry_run: bool,
        hint: Option<String>,
    ) -> Self {
        let replaced = match outcome {
            PatchOutcome::Applied { replaced } => replaced,
            _ => 0,
        };

        Self {
            applied: outcome.is_applied() && !dry_run,
            outcome,
            target,
            replaced,
            occurrences,
            dry_run,
            hint,
            finished_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

pub fn output_results(report: &PatchReport) -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Output for GitHub Actions
    if env::var("GITHUB_ACTIONS").is_ok() {
        if let Ok(output_file) = env::var("GITHUB_OUTPUT") {
            append_to(Path::new(&output_file), &github_output(report))
                .map_err(|e| format!("Failed to write GitHub Actions output: {}", e))?;
        }

        write_step_summary(report)?;
    }

    println!("📊 Result: {}", serde_json::to_string_pretty(report)?);

    Ok(())
}

// Runners share these files between steps, so they are appended to.
fn append_to(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    file.write_all(content.as_bytes())
}

fn github_output(report: &PatchReport) -> String {
    format!(
        "applied={}\noutcome={}\nreplaced={}\n",
        report.applied,
        report.outcome.name(),
        report.replaced
    )
}

fn step_summary(report: &PatchReport) -> String {
    match &report.outcome {
        PatchOutcome::Applied { replaced } if report.dry_run => format!(
            "🔍 **Patch Preview (Dry Run)**\n\n✅ `{}` would be patched ({} occurrence(s))\n",
            report.target, replaced
        ),
        PatchOutcome::Applied { replaced } => format!(
            "✅ **Patch applied**\n\n- **File:** `{}`\n- **Replaced:** {}\n",
            report.target, replaced
        ),
        PatchOutcome::NotFound => format!(
            "⚠️ **Patch not applied** - target block not found in `{}`\n{}",
            report.target,
            report
                .hint
                .as_ref()
                .map(|hint| format!("\n{}\n", hint))
                .unwrap_or_default()
        ),
        PatchOutcome::Ambiguous { occurrences } => format!(
            "❌ **Patch not applied** - target block occurs {} times in `{}`\n",
            occurrences, report.target
        ),
    }
}

fn write_step_summary(report: &PatchReport) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if let Ok(summary_file) = env::var("GITHUB_STEP_SUMMARY") {
        append_to(Path::new(&summary_file), &step_summary(report))
            .map_err(|e| format!("Failed to write GitHub Step Summary: {}", e))?;
    }

    Ok(())
}
