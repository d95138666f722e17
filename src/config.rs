use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::builtin::fetch_posts_race_guard;
use crate::patch::{MatchPolicy, OnFailure, PatchDescriptor};

pub const DEFAULT_TARGET: &str = "src/components/CommunityContext.js";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub patch: PatchConfig,
    /// Directory that `old_file`/`new_file` are relative to.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PatchConfig {
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_file: Option<String>,
    #[serde(default)]
    pub match_policy: MatchPolicy,
    #[serde(default)]
    pub on_failure: OnFailure,
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patch: fetch_posts_race_guard(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();

        if !path.exists() {
            println!("⚠️  Configuration file not found, using built-in fetchPosts patch");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {:?}: {}", path, e))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse TOML config {:?}: {}", path, e))?;

        config.base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        config.validate()?;

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let content = toml::to_string(self)
            .map_err(|e| format!("Failed to serialize config to TOML: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config file {:?}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let patch = &self.patch;

        if patch.target.trim().is_empty() {
            return Err("patch.target must not be empty".into());
        }
        check_source("old", &patch.old_text, &patch.old_file)?;
        check_source("new", &patch.new_text, &patch.new_file)?;
        if matches!(&patch.old_text, Some(text) if text.is_empty()) {
            return Err("patch.old_text must not be empty".into());
        }

        Ok(())
    }

    /// Resolves the configured blocks, reading `old_file`/`new_file` if given.
    pub fn descriptor(&self) -> std::result::Result<PatchDescriptor, Box<dyn std::error::Error>> {
        let old_text = self.resolve_block("old", &self.patch.old_text, &self.patch.old_file)?;
        let new_text = self.resolve_block("new", &self.patch.new_text, &self.patch.new_file)?;

        PatchDescriptor::new(old_text, new_text)
            .map_err(|e| format!("Invalid patch in configuration: {}", e).into())
    }

    fn resolve_block(
        &self,
        side: &str,
        text: &Option<String>,
        file: &Option<String>,
    ) -> std::result::Result<String, Box<dyn std::error::Error>> {
        match (text, file) {
            (Some(text), None) => Ok(text.clone()),
            (None, Some(file)) => {
                let path = self.base_dir.join(file);
                std::fs::read_to_string(&path).map_err(|e| {
                    format!("Failed to read patch.{}_file {:?}: {}", side, path, e).into()
                })
            }
            _ => Err(format!(
                "patch needs exactly one of {}_text or {}_file",
                side, side
            )
            .into()),
        }
    }
}

fn check_source(
    side: &str,
    text: &Option<String>,
    file: &Option<String>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    match (text, file) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        (Some(_), Some(_)) => Err(format!(
            "patch.{}_text and patch.{}_file are mutually exclusive",
            side, side
        )
        .into()),
        (None, None) => Err(format!("patch needs one of {}_text or {}_file", side, side).into()),
    }
}
