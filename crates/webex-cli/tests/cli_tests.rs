//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const EXAMPLE_QUIZ: &str = "../../quizzes/example.toml";

/// A command isolated from user config and environment overrides.
fn webex(home: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("webex").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("WEBEX_AVERAGE_DIVISOR")
        .env_remove("WEBEX_SELECT_MARKS");
    cmd
}

#[test]
fn validate_example_quiz() {
    let home = TempDir::new().unwrap();
    webex(&home)
        .arg("validate")
        .arg("--quiz")
        .arg(EXAMPLE_QUIZ)
        .assert()
        .success()
        .stdout(predicate::str::contains("Example Quiz"))
        .stdout(predicate::str::contains("2 sections, 7 items"))
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn validate_reports_warnings() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[quiz]
id = "broken"
title = "Broken"

[[sections]]
id = "s1"

[[sections.domains]]
label = "Ghost"
items = "4"

[[sections.items]]
type = "radiogroup"
id = "q1"
selected = 5
options = [{ label = "a", value = "x", points = 1 }]
"#,
    )
    .unwrap();

    webex(&home)
        .arg("validate")
        .arg("--quiz")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[s1/q1] WARNING"))
        .stdout(predicate::str::contains("no option with value"))
        .stdout(predicate::str::contains("selected option 5 does not exist"))
        .stdout(predicate::str::contains("domain 'Ghost'"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    let home = TempDir::new().unwrap();
    webex(&home)
        .arg("validate")
        .arg("--quiz")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_prints_section_summaries() {
    let home = TempDir::new().unwrap();
    webex(&home)
        .arg("grade")
        .arg("--quiz")
        .arg(EXAMPLE_QUIZ)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[basics] 3 of 4 answered • 4 of 5 pts",
        ))
        .stdout(predicate::str::contains("[survey] 1 of 3 answered"))
        .stdout(predicate::str::contains("Average: 0.60"))
        .stdout(predicate::str::contains("Trust"))
        .stdout(predicate::str::contains("Care"))
        .stdout(predicate::str::contains(
            "Total: 4 of 7 answered • 7 of 11 pts",
        ));
}

#[test]
fn grade_hidden_omits_average_and_domains() {
    let home = TempDir::new().unwrap();
    webex(&home)
        .arg("grade")
        .arg("--quiz")
        .arg(EXAMPLE_QUIZ)
        .arg("--hidden")
        .assert()
        .success()
        .stdout(predicate::str::contains("[survey] 1 of 3 answered"))
        .stdout(predicate::str::contains("Average").not())
        .stdout(predicate::str::contains("Trust").not());
}

#[test]
fn grade_responses_file_overrides_document() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let responses = dir.path().join("responses.json");
    std::fs::write(
        &responses,
        r#"{ "capital": "Lyon", "planet": 1, "nobody": "x" }"#,
    )
    .unwrap();

    webex(&home)
        .arg("grade")
        .arg("--quiz")
        .arg(EXAMPLE_QUIZ)
        .arg("--responses")
        .arg(&responses)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[basics] 3 of 4 answered • 3 of 5 pts",
        ))
        .stderr(predicate::str::contains("unknown item 'nobody'"));
}

#[test]
fn grade_writes_reports() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    webex(&home)
        .arg("grade")
        .arg("--quiz")
        .arg(EXAMPLE_QUIZ)
        .arg("--format")
        .arg("all")
        .arg("--output")
        .arg(out.path())
        .assert()
        .success();

    let names: Vec<String> = std::fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().any(|n| n.ends_with(".json")));
    assert!(names.iter().any(|n| n.ends_with(".html")));
    assert!(names.iter().any(|n| n.ends_with(".md")));

    let json = names.iter().find(|n| n.ends_with(".json")).unwrap();
    let content = std::fs::read_to_string(out.path().join(json)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["quiz"]["id"], "example");
    assert_eq!(value["totals"]["correct_units"], 4);
    assert_eq!(value["sections"][1]["summary"]["average"], "0.60");
}

#[test]
fn grade_uses_config_divisor() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("webex.toml");
    std::fs::write(&config, "[rules]\naverage_divisor = 2\n").unwrap();

    webex(&home)
        .arg("grade")
        .arg("--quiz")
        .arg(EXAMPLE_QUIZ)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Average: 1.50"));
}

#[test]
fn grade_rejects_unknown_format() {
    let home = TempDir::new().unwrap();
    webex(&home)
        .arg("grade")
        .arg("--quiz")
        .arg(EXAMPLE_QUIZ)
        .arg("--format")
        .arg("sarif")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn init_creates_files() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    webex(&home)
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created webex.toml"))
        .stdout(predicate::str::contains("Created quizzes/example.toml"));

    assert!(dir.path().join("webex.toml").exists());
    assert!(dir.path().join("quizzes/example.toml").exists());

    // The generated files must be usable as-is.
    webex(&home)
        .current_dir(dir.path())
        .arg("grade")
        .arg("--quiz")
        .arg("quizzes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Example Quiz"));
}

#[test]
fn init_skips_existing() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    // First init
    webex(&home)
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    webex(&home)
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    webex(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Self-check quiz grading engine"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    webex(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("webex"));
}
