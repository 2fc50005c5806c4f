//! Integration tests for the `devplan` binary.
//!
//! Each test runs the binary against a temporary project directory and an
//! isolated XDG config home, so neither the user's config nor their
//! `DEVPLAN_*` environment leaks in.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

use devplan_test_utils::ProjectFixture;

fn devplan(xdg: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("devplan");
    cmd.env("XDG_CONFIG_HOME", xdg.path())
        .env("DEVPLAN_PROJECT_NAME", "Shop")
        .env("RUST_LOG", "warn")
        .env_remove("DEVPLAN_SOURCE_DIR")
        .env_remove("DEVPLAN_OUTPUT_DIR")
        .env_remove("DEVPLAN_MAX_CONTEXT_CHARS")
        .env_remove("DEVPLAN_GENERATOR");
    cmd
}

fn run_args(fixture: &ProjectFixture) -> Vec<String> {
    vec![
        "run".to_string(),
        "--source".to_string(),
        fixture.docs_dir().display().to_string(),
        "--output".to_string(),
        fixture.output_dir().display().to_string(),
    ]
}

// -----------------------------------------------------------------------
// devplan init
// -----------------------------------------------------------------------

#[test]
fn init_writes_config_and_refuses_to_overwrite() {
    let xdg = TempDir::new().unwrap();
    let path = xdg.path().join("devplan").join("config.toml");

    devplan(&xdg)
        .args(["init", "--project-name", "Shop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config written to"));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("project_name = \"Shop\""), "config: {contents}");
    assert!(contents.contains("max_context_chars_per_task = 4000"), "config: {contents}");

    devplan(&xdg)
        .args(["init", "--project-name", "Other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    devplan(&xdg)
        .args(["init", "--project-name", "Other", "--force"])
        .assert()
        .success();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("project_name = \"Other\""));
}

// -----------------------------------------------------------------------
// devplan run
// -----------------------------------------------------------------------

#[test]
fn dry_run_writes_scaffold_plan() {
    let xdg = TempDir::new().unwrap();
    let fixture = ProjectFixture::with_standard_docs();

    devplan(&xdg)
        .args(run_args(&fixture))
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Development plan written."))
        .stdout(predicate::str::contains("TASK-001 — Project Scaffold / Bootstrap"));

    let list = fixture.read_output("task_list.md");
    assert!(list.starts_with("# Task List\n\nGenerated: "));
    assert!(list.contains("- [ ] TASK-001 — Project Scaffold / Bootstrap\n"));

    let doc = fixture.read_output("tasks/TASK-001.md");
    assert!(doc.starts_with("# TASK-001 — Project Scaffold / Bootstrap\n"));
    assert!(doc.contains("- Project: Shop\n"));
    assert!(doc.contains("```xml"));
}

#[test]
fn run_reads_plan_from_file() {
    let xdg = TempDir::new().unwrap();
    let fixture = ProjectFixture::with_standard_docs();
    let plan = fixture.root().join("plan.md");
    std::fs::write(&plan, "- [ ] Signup API\n  - [ ] hash password\n- [x] Landing page\n").unwrap();

    devplan(&xdg)
        .args(run_args(&fixture))
        .arg("--input")
        .arg(&plan)
        .assert()
        .success();

    let list = fixture.read_output("task_list.md");
    assert!(list.contains("- [ ] TASK-001 — Project Scaffold / Bootstrap\n"));
    assert!(list.contains("- [ ] TASK-002 — Signup API\n"));
    assert!(list.contains("- [x] TASK-003 — Landing page\n"));

    let doc = fixture.read_output("tasks/TASK-002.md");
    assert!(doc.contains("- [ ] hash password"));
    assert!(doc.contains("Users can sign up and sign in with email."));
}

#[test]
fn run_reads_plan_from_stdin() {
    let xdg = TempDir::new().unwrap();
    let fixture = ProjectFixture::with_standard_docs();

    devplan(&xdg)
        .args(run_args(&fixture))
        .args(["--input", "-"])
        .write_stdin("<task>Setup CI</task><context>pipeline info</context>")
        .assert()
        .success();

    let doc = fixture.read_output("tasks/TASK-002.md");
    assert!(doc.starts_with("# TASK-002 — Setup CI\n"));
    assert!(doc.contains("<context>\npipeline info\n</context>"));
}

#[test]
fn missing_documents_fail_after_writing() {
    let xdg = TempDir::new().unwrap();
    let fixture = ProjectFixture::empty();

    devplan(&xdg)
        .args(run_args(&fixture))
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no context documents found"));

    assert!(fixture.output_dir().join("task_list.md").exists());
    assert!(fixture.output_dir().join("tasks/TASK-001.md").exists());
}

#[test]
fn missing_input_file_is_an_error() {
    let xdg = TempDir::new().unwrap();
    let fixture = ProjectFixture::with_standard_docs();

    devplan(&xdg)
        .args(run_args(&fixture))
        .args(["--input", "/definitely/not/here.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read plan file"));

    assert!(!fixture.output_dir().join("task_list.md").exists());
}

#[cfg(unix)]
#[test]
fn configured_generator_output_is_used() {
    let xdg = TempDir::new().unwrap();
    let fixture = ProjectFixture::with_standard_docs();
    let config = fixture.root().join("devplan.toml");
    std::fs::write(
        &config,
        r#"
project_name = "Shop"

[generator]
command = "sh"
args = ["-c", "cat >/dev/null; echo '- [ ] Generated checkout'"]
timeout_secs = 30
"#,
    )
    .unwrap();

    devplan(&xdg)
        .arg("--config")
        .arg(&config)
        .args(run_args(&fixture))
        .assert()
        .success();

    let list = fixture.read_output("task_list.md");
    assert!(list.contains("- [ ] TASK-002 — Generated checkout\n"), "list: {list}");
}

#[cfg(unix)]
#[test]
fn failing_generator_falls_back_to_scaffold_plan() {
    let xdg = TempDir::new().unwrap();
    let fixture = ProjectFixture::with_standard_docs();

    devplan(&xdg)
        .env("DEVPLAN_GENERATOR", "false")
        .args(run_args(&fixture))
        .assert()
        .success()
        .stderr(predicate::str::contains("using scaffold plan"));

    let list = fixture.read_output("task_list.md");
    assert!(list.contains("- [ ] TASK-001 — Project Scaffold / Bootstrap\n"));
    assert!(list.contains("TASK-002"));
}

// -----------------------------------------------------------------------
// devplan parse / context
// -----------------------------------------------------------------------

#[test]
fn parse_prints_json() {
    let xdg = TempDir::new().unwrap();

    let output = devplan(&xdg)
        .args(["parse", "--json"])
        .write_stdin("- [x] Ship feature\n  - [ ] write docs\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let tasks: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(tasks[0]["id"], "TASK-001");
    assert_eq!(tasks[1]["id"], "TASK-002");
    assert_eq!(tasks[1]["title"], "Ship feature");
    assert_eq!(tasks[1]["checked"], true);
    assert_eq!(tasks[1]["subtasks"][0], "- [ ] write docs");
}

#[test]
fn parse_prints_text_summary() {
    let xdg = TempDir::new().unwrap();

    devplan(&xdg)
        .arg("parse")
        .write_stdin("- [ ] Build API\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("- [ ] TASK-001 — Project Scaffold / Bootstrap"))
        .stdout(predicate::str::contains("- [ ] TASK-002 — Build API"));
}

#[test]
fn context_prints_budgeted_documents() {
    let xdg = TempDir::new().unwrap();
    let fixture = ProjectFixture::with_docs(&[
        ("requirements.md", "R\n\nMore R"),
        ("srs.md", "SRS content"),
    ]);

    devplan(&xdg)
        .arg("context")
        .arg("--source")
        .arg(fixture.docs_dir())
        .args(["--max-context-chars", "12"])
        .assert()
        .success()
        .stdout("R\n\nMore R\n\nS\n")
        .stderr(predicate::str::contains("requirements.md, srs.md"));
}

#[test]
fn context_without_documents_fails() {
    let xdg = TempDir::new().unwrap();
    let fixture = ProjectFixture::empty();

    devplan(&xdg)
        .arg("context")
        .arg("--source")
        .arg(fixture.docs_dir())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no context documents found"));
}
