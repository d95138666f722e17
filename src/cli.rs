use std::env;
use std::path::PathBuf;

use crate::patch::MatchPolicy;

pub const DEFAULT_CONFIG_FILE: &str = ".patch-config.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub config_file: PathBuf,
    pub working_directory: PathBuf,
    pub target: Option<PathBuf>,
    pub match_policy: Option<MatchPolicy>,
    pub dry_run: bool,
    pub strict: bool,
    pub write_default_config: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            working_directory: PathBuf::from("."),
            target: None,
            match_policy: None,
            dry_run: false,
            strict: false,
            write_default_config: false,
        }
    }
}

impl Args {
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args) {
            Ok(Some(args)) => args,
            Ok(None) => {
                Self::print_help();
                std::process::exit(0);
            }
            Err(message) => {
                eprintln!("Error: {}", message);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
        }
    }

    /// Parses arguments without the program name. `Ok(None)` means help was requested.
    pub fn parse_from(args: &[String]) -> Result<Option<Self>, String> {
        let mut parsed = Self::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config-file" => {
                    parsed.config_file = PathBuf::from(value_of(args, i)?);
                    i += 2;
                }
                "--working-directory" => {
                    parsed.working_directory = PathBuf::from(value_of(args, i)?);
                    i += 2;
                }
                "--target" => {
                    parsed.target = Some(PathBuf::from(value_of(args, i)?));
                    i += 2;
                }
                "--match-policy" => {
                    parsed.match_policy = Some(value_of(args, i)?.parse()?);
                    i += 2;
                }
                "--dry-run" => {
                    parsed.dry_run = true;
                    i += 1;
                }
                "--strict" => {
                    parsed.strict = true;
                    i += 1;
                }
                "--write-default-config" => {
                    parsed.write_default_config = true;
                    i += 1;
                }
                "--help" | "-h" => return Ok(None),
                other => return Err(format!("Unknown argument: {}", other)),
            }
        }

        Ok(Some(parsed))
    }

    pub fn from_env() -> Self {
        Self {
            config_file: env::var("CONFIG_FILE")
                .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string())
                .into(),
            working_directory: env::var("WORKING_DIRECTORY")
                .unwrap_or_else(|_| ".".to_string())
                .into(),
            target: env::var("TARGET")
                .ok()
                .filter(|t| !t.is_empty())
                .map(PathBuf::from),
            match_policy: policy_from_env(env::var("MATCH_POLICY").ok()),
            dry_run: env_flag("DRY_RUN"),
            strict: env_flag("STRICT"),
            write_default_config: false,
        }
    }

    fn print_help() {
        println!("block-patch");
        println!("Replaces an exact block of source text in a single file");
        println!();
        println!("OPTIONS:");
        println!("    --config-file <FILE>           Path to the patch configuration [default: .patch-config.toml]");
        println!("    --working-directory <DIR>      Working directory [default: .]");
        println!("    --target <FILE>                Override the file to patch");
        println!("    --match-policy <POLICY>        unique, first or all [default: unique]");
        println!("    --dry-run                      Show the change without writing it");
        println!("    --strict                       Exit non-zero when the patch cannot be applied");
        println!("    --write-default-config         Write the built-in patch to the config file and exit");
        println!("    --help, -h                     Print help information");
    }
}

fn value_of(args: &[String], i: usize) -> Result<&str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", args[i]))
}

fn policy_from_env(value: Option<String>) -> Option<MatchPolicy> {
    let value = value.filter(|v| !v.is_empty())?;
    match value.parse() {
        Ok(policy) => Some(policy),
        Err(e) => {
            println!("⚠️  Ignoring MATCH_POLICY: {}", e);
            None
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .unwrap_or_else(|_| "false".to_string())
        .parse()
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let parsed = Args::parse_from(&[]).unwrap().unwrap();
        assert_eq!(parsed, Args::default());
        assert_eq!(parsed.config_file, PathBuf::from(".patch-config.toml"));
    }

    #[test]
    fn test_all_options() {
        let parsed = Args::parse_from(&args(&[
            "--config-file",
            "patches/race.toml",
            "--working-directory",
            "frontend",
            "--target",
            "src/other.js",
            "--match-policy",
            "first",
            "--dry-run",
            "--strict",
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(parsed.config_file, PathBuf::from("patches/race.toml"));
        assert_eq!(parsed.working_directory, PathBuf::from("frontend"));
        assert_eq!(parsed.target, Some(PathBuf::from("src/other.js")));
        assert_eq!(parsed.match_policy, Some(MatchPolicy::First));
        assert!(parsed.dry_run);
        assert!(parsed.strict);
        assert!(!parsed.write_default_config);
    }

    #[test]
    fn test_help_short_circuits() {
        assert_eq!(Args::parse_from(&args(&["--dry-run", "-h"])).unwrap(), None);
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let err = Args::parse_from(&args(&["--target"])).unwrap_err();
        assert_eq!(err, "--target requires a value");
    }

    #[test]
    fn test_unknown_argument_is_rejected() {
        let err = Args::parse_from(&args(&["--force"])).unwrap_err();
        assert_eq!(err, "Unknown argument: --force");
    }

    #[test]
    fn test_match_policy_from_env_value() {
        assert_eq!(policy_from_env(Some("all".to_string())), Some(MatchPolicy::All));
        assert_eq!(policy_from_env(Some("most".to_string())), None);
        assert_eq!(policy_from_env(Some(String::new())), None);
        assert_eq!(policy_from_env(None), None);
    }

    #[test]
    fn test_bad_match_policy_is_rejected() {
        assert!(Args::parse_from(&args(&["--match-policy", "most"])).is_err());
    }
}
