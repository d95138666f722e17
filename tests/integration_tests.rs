use block_patch::builtin::{FETCH_POSTS_AFTER, FETCH_POSTS_BEFORE};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_patcher(dir: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_block-patch"))
        .args(["--working-directory", dir.to_str().unwrap()])
        .args(["--config-file", dir.join(".patch-config.toml").to_str().unwrap()])
        .args(extra)
        .env_remove("GITHUB_ACTIONS")
        .output()
        .expect("Failed to run block-patch")
}

fn write_config(dir: &Path, body: &str) {
    std::fs::write(dir.join(".patch-config.toml"), body).expect("Failed to write config");
}

fn community_context(block: &str) -> String {
    format!(
        "import {{ useCallback, useRef }} from 'react';\n\nexport function CommunityProvider() {{\n{}\n}}\n",
        block
    )
}

#[test]
fn test_builtin_patch_applies_once() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let components = temp_dir.path().join("src/components");
    std::fs::create_dir_all(&components).unwrap();
    let target = components.join("CommunityContext.js");
    std::fs::write(&target, community_context(FETCH_POSTS_BEFORE)).unwrap();

    let first = run_patcher(temp_dir.path(), &[]);
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
    assert!(stdout.contains("Patch applied successfully."), "{}", stdout);
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        community_context(FETCH_POSTS_AFTER)
    );

    let second = run_patcher(temp_dir.path(), &[]);
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(second.status.success());
    assert!(stdout.contains("Error: Target block not found in file."), "{}", stdout);
    assert!(stdout.contains("Target start:   // Memoized fetch logic"), "{}", stdout);
    assert!(stdout.contains("already present"), "{}", stdout);
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        community_context(FETCH_POSTS_AFTER)
    );
}

#[test]
fn test_not_found_exits_zero_unless_strict() {
    let temp_dir = TempDir::new().unwrap();
    write_config(
        temp_dir.path(),
        "[patch]\ntarget = \"app.js\"\nold_text = \"Z\"\nnew_text = \"X\"\n",
    );
    std::fs::write(temp_dir.path().join("app.js"), "A B C").unwrap();

    let relaxed = run_patcher(temp_dir.path(), &[]);
    assert!(relaxed.status.success());

    let strict = run_patcher(temp_dir.path(), &["--strict"]);
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stderr).contains("on_failure is set to fail"));

    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("app.js")).unwrap(),
        "A B C"
    );
}

#[test]
fn test_match_policy_flag_controls_repeated_blocks() {
    let temp_dir = TempDir::new().unwrap();
    write_config(
        temp_dir.path(),
        "[patch]\ntarget = \"app.js\"\nold_text = \"B\"\nnew_text = \"X\"\non_failure = \"fail\"\n",
    );
    let target = temp_dir.path().join("app.js");
    std::fs::write(&target, "A B B C").unwrap();

    let unique = run_patcher(temp_dir.path(), &[]);
    assert!(!unique.status.success());
    assert!(String::from_utf8_lossy(&unique.stderr).contains("found 2 times"));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "A B B C");

    let first = run_patcher(temp_dir.path(), &["--match-policy", "first"]);
    assert!(first.status.success());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "A X B C");

    std::fs::write(&target, "A B B C").unwrap();
    let all = run_patcher(temp_dir.path(), &["--match-policy", "all"]);
    assert!(all.status.success());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "A X X C");
}

#[test]
fn test_dry_run_shows_diff_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    write_config(
        temp_dir.path(),
        "[patch]\ntarget = \"app.js\"\nold_text = \"let b = 1;\\n\"\nnew_text = \"let b = 2;\\n\"\n",
    );
    let target = temp_dir.path().join("app.js");
    std::fs::write(&target, "let a = 0;\nlet b = 1;\n").unwrap();

    let output = run_patcher(temp_dir.path(), &["--dry-run"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("-let b = 1;"), "{}", stdout);
    assert!(stdout.contains("+let b = 2;"), "{}", stdout);
    assert!(stdout.contains("\"applied\": false"), "{}", stdout);
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "let a = 0;\nlet b = 1;\n"
    );
}

#[test]
fn test_missing_target_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    write_config(
        temp_dir.path(),
        "[patch]\ntarget = \"missing.js\"\nold_text = \"B\"\nnew_text = \"X\"\n",
    );

    let output = run_patcher(temp_dir.path(), &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read target file"));
}

#[test]
fn test_write_default_config_round_trips() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_patcher(temp_dir.path(), &["--write-default-config"]);
    assert!(output.status.success());

    let written = std::fs::read_to_string(temp_dir.path().join(".patch-config.toml")).unwrap();
    assert!(written.contains("[patch]"));
    assert!(written.contains("CommunityContext.js"));
    assert!(written.contains("match_policy = \"unique\""));
}
