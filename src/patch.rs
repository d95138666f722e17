use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::diagnostics::{describe_miss, print_diff, print_miss};
use crate::file_updater::{read_target, write_atomically};

/// What to do when the target block occurs more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Exactly one occurrence is required; several is reported as ambiguous.
    #[default]
    Unique,
    First,
    All,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "unique" => Ok(MatchPolicy::Unique),
            "first" => Ok(MatchPolicy::First),
            "all" => Ok(MatchPolicy::All),
            other => Err(format!(
                "Invalid match policy '{}': expected unique, first or all",
                other
            )),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchPolicy::Unique => "unique",
            MatchPolicy::First => "first",
            MatchPolicy::All => "all",
        };
        write!(f, "{}", name)
    }
}

/// Whether a patch that could not be applied fails the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    #[default]
    Warn,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Write,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchDescriptor {
    old_text: String,
    new_text: String,
}

impl PatchDescriptor {
    pub fn new(
        old_text: impl Into<String>,
        new_text: impl Into<String>,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let old_text = old_text.into();
        if old_text.is_empty() {
            return Err("Target block must not be empty".into());
        }

        Ok(Self {
            old_text,
            new_text: new_text.into(),
        })
    }

    pub fn old_text(&self) -> &str {
        &self.old_text
    }

    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    /// The descriptor that undoes this one.
    pub fn reversed(&self) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        Self::new(self.new_text.clone(), self.old_text.clone())
    }

    /// Splits `content` around already-patched sites. A replacement that
    /// embeds the target would otherwise match again on every run, so only
    /// the returned segments are searched.
    fn unpatched_segments<'a>(&self, content: &'a str) -> Vec<&'a str> {
        if self.new_text.contains(&self.old_text) {
            content.split(self.new_text.as_str()).collect()
        } else {
            vec![content]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatchOutcome {
    Applied { replaced: usize },
    NotFound,
    Ambiguous { occurrences: usize },
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            PatchOutcome::Applied { .. } => "applied",
            PatchOutcome::NotFound => "not_found",
            PatchOutcome::Ambiguous { .. } => "ambiguous",
        }
    }
}

/// Result of patching an in-memory text. `content` is only set when applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPatch {
    pub outcome: PatchOutcome,
    pub occurrences: usize,
    pub content: Option<String>,
}

pub fn patch_text(content: &str, descriptor: &PatchDescriptor, policy: MatchPolicy) -> TextPatch {
    let segments = descriptor.unpatched_segments(content);
    let occurrences: usize = segments
        .iter()
        .map(|segment| segment.matches(descriptor.old_text()).count())
        .sum();

    let limit = match (occurrences, policy) {
        (0, _) => {
            return TextPatch {
                outcome: PatchOutcome::NotFound,
                occurrences,
                content: None,
            }
        }
        (n, MatchPolicy::Unique) if n > 1 => {
            return TextPatch {
                outcome: PatchOutcome::Ambiguous { occurrences: n },
                occurrences,
                content: None,
            }
        }
        (_, MatchPolicy::Unique) | (_, MatchPolicy::First) => 1,
        (n, MatchPolicy::All) => n,
    };

    let mut remaining = limit;
    let patched: Vec<String> = segments
        .iter()
        .map(|segment| {
            let count = segment.matches(descriptor.old_text()).count().min(remaining);
            remaining -= count;
            segment.replacen(descriptor.old_text(), descriptor.new_text(), count)
        })
        .collect();

    TextPatch {
        outcome: PatchOutcome::Applied { replaced: limit },
        occurrences,
        content: Some(patched.join(descriptor.new_text())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    pub outcome: PatchOutcome,
    pub occurrences: usize,
    /// Where a drifted target block probably lives, when it was not found.
    pub hint: Option<String>,
}

/// Applies `descriptor` to the file at `path`, leaving it untouched unless the
/// outcome is `Applied` and `mode` is `WriteMode::Write`.
pub fn apply_patch(
    path: &Path,
    descriptor: &PatchDescriptor,
    policy: MatchPolicy,
    mode: WriteMode,
) -> std::result::Result<FilePatch, Box<dyn std::error::Error>> {
    let content = read_target(path)?;
    let patched = patch_text(&content, descriptor, policy);

    let mut hint = None;
    match (&patched.outcome, patched.content) {
        (PatchOutcome::Applied { replaced }, Some(new_content)) => match mode {
            WriteMode::Write => {
                write_atomically(path, &new_content)?;
                println!("Patch applied successfully.");
                println!("📝 Replaced {} occurrence(s) in {:?}", replaced, path);
            }
            WriteMode::DryRun => {
                println!("🔍 Dry run mode - {:?} will not be modified", path);
                print_diff(&content, &new_content);
            }
        },
        (PatchOutcome::Ambiguous { occurrences }, _) => {
            eprintln!(
                "❌ Error: Target block found {} times; refusing to patch.",
                occurrences
            );
            eprintln!("   Use match_policy = \"first\" or \"all\" to patch anyway");
        }
        _ => {
            hint = describe_miss(&content, descriptor);
            print_miss(descriptor, hint.as_deref());
        }
    }

    Ok(FilePatch {
        outcome: patched.outcome,
        occurrences: patched.occurrences,
        hint,
    })
}
