use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

fn haven_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_haven"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    fs::write(
        root.join("mentors.json"),
        r#"[
  {
    "id": "m1",
    "name": "Priya Sharma",
    "user_type": "senior",
    "bio_for_profile": "Final-year CS student, interned twice in big tech.",
    "confident_queries": ["Resume Review"],
    "mentor_internships": [{ "company_org": "Google", "role_position": "SWE Intern" }],
    "groups": ["Coding Club"]
  },
  {
    "name": "Daniel Okafor",
    "user_type": "alumni",
    "bio_for_profile": null,
    "mentor_struggles": null
  }
]"#,
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/haven.sqlite"

[model]
provider = "disabled"

[refresh]
delay_ms = 0

[server]
bind = "127.0.0.1:7341"
"#,
        root.display()
    );

    let config_path = config_dir.join("haven.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_haven(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = haven_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run haven binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn import_fixture(tmp: &TempDir, config_path: &Path) {
    let (_, _, ok) = run_haven(config_path, &["init"]);
    assert!(ok, "init failed");
    let file = tmp.path().join("mentors.json");
    let (stdout, stderr, ok) = run_haven(config_path, &["import", file.to_str().unwrap()]);
    assert!(ok, "import failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("imported 2 mentors"));
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_haven(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/haven.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_haven(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_haven(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_import_is_idempotent() {
    let (tmp, config_path) = setup_test_env();

    import_fixture(&tmp, &config_path);
    let file = tmp.path().join("mentors.json");
    let (stdout, _, ok) = run_haven(&config_path, &["import", file.to_str().unwrap()]);
    assert!(ok);
    assert!(stdout.contains("imported 2 mentors"));

    let (stdout, _, ok) = run_haven(&config_path, &["embed", "pending", "--dry-run"]);
    assert!(ok);
    assert!(stdout.contains("dry-run"));
    // The mentor without an id keeps the one generated by the first import.
    assert!(
        stdout.contains("mentors needing embeddings: 2"),
        "unexpected pending output: {}",
        stdout
    );
    assert!(stdout.contains("Priya Sharma (m1)"));
}

#[test]
fn test_short_query_prints_failure_outcome() {
    let (tmp, config_path) = setup_test_env();
    import_fixture(&tmp, &config_path);

    let (stdout, stderr, ok) = run_haven(&config_path, &["match", "help"]);
    assert!(ok, "match failed: {}", stderr);

    let outcome: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["success"], false);
    assert_eq!(outcome["code"], "query_too_short");
}

#[test]
fn test_match_with_disabled_model_is_service_error() {
    let (tmp, config_path) = setup_test_env();
    import_fixture(&tmp, &config_path);

    let (stdout, _, ok) = run_haven(
        &config_path,
        &["match", "I need help with my resume for a Google internship"],
    );
    assert!(ok);

    let outcome: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["success"], false);
    assert_eq!(outcome["code"], "service_error");
}

#[test]
fn test_embed_all_reports_every_failure() {
    let (tmp, config_path) = setup_test_env();
    import_fixture(&tmp, &config_path);

    let (stdout, _, ok) = run_haven(&config_path, &["embed", "all"]);
    assert!(ok);

    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["processed"], 2);
    assert_eq!(report["succeeded"], 0);
    assert_eq!(report["failed"].as_array().unwrap().len(), 2);
}

#[test]
fn test_embed_unknown_mentor() {
    let (tmp, config_path) = setup_test_env();
    import_fixture(&tmp, &config_path);

    let (stdout, _, ok) = run_haven(&config_path, &["embed", "mentor", "nobody"]);
    assert!(ok);
    let outcome: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["code"], "not_found");
}

#[test]
fn test_summarize_falls_back_when_model_disabled() {
    let (_tmp, config_path) = setup_test_env();

    let bio = "Final-year CS student who interned twice in big tech and loves mentoring.";
    let (stdout, stderr, ok) = run_haven(&config_path, &["summarize", bio]);
    assert!(ok, "summarize failed: {}", stderr);
    assert_eq!(stdout.trim(), format!("{}...", &bio[..50]));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");

    let (_, stderr, ok) = run_haven(&missing, &["init"]);
    assert!(!ok);
    assert!(stderr.contains("Failed to read config file"));
}
