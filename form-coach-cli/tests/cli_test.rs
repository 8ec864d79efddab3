use assert_cmd::Command;
use form_coach_engine::synthetic::PoseBuilder;
use form_coach_engine::FrameReport;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn form_coach(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("form-coach").unwrap();
    cmd.env("HOME", home).env_remove("FORM_COACH_CONFIG");
    cmd
}

fn write_arm_raise_recording(dir: &Path, cycles: usize) -> std::path::PathBuf {
    let angles = [
        10.0, 10.0, 10.0, 40.0, 70.0, 100.0, 130.0, 160.0, 165.0, 165.0, 165.0, 135.0, 105.0,
        75.0, 45.0, 15.0,
    ];
    let mut lines = String::new();
    for _ in 0..cycles {
        for angle in angles {
            let frame = PoseBuilder::standing().arms(angle, angle).build();
            lines.push_str(&serde_json::to_string(&frame).unwrap());
            lines.push('\n');
        }
    }

    let path = dir.join("arm_raise.jsonl");
    fs::write(&path, lines).unwrap();
    path
}

#[test]
fn test_help_command() {
    let home = TempDir::new().unwrap();
    form_coach(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("form coaching"))
        .stdout(predicate::str::contains("replay"))
        .stdout(predicate::str::contains("exercises"));
}

#[test]
fn test_version_command() {
    let home = TempDir::new().unwrap();
    form_coach(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_completions_command() {
    let home = TempDir::new().unwrap();
    form_coach(home.path())
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_form__coach()"));
}

#[test]
fn test_exercises_lists_every_exercise() {
    let home = TempDir::new().unwrap();
    form_coach(home.path())
        .arg("exercises")
        .assert()
        .success()
        .stdout(predicate::str::contains("arm_raise"))
        .stdout(predicate::str::contains("knee_raise"))
        .stdout(predicate::str::contains("torso_twist"))
        .stdout(predicate::str::contains("side_bend"))
        .stdout(predicate::str::contains("squat"));
}

#[test]
fn test_difficulties_table() {
    let home = TempDir::new().unwrap();
    form_coach(home.path())
        .arg("difficulties")
        .assert()
        .success()
        .stdout(predicate::str::contains("beginner"))
        .stdout(predicate::str::contains("advanced"));
}

#[test]
fn test_config_path_defaults_to_home() {
    let home = TempDir::new().unwrap();
    form_coach(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".form-coach"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_and_show() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");

    form_coach(home.path())
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration initialized"));
    assert!(config.exists());

    form_coach(home.path())
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    form_coach(home.path())
        .args(["config", "show"])
        .env("FORM_COACH_CONFIG", &config)
        .assert()
        .success()
        .stdout(predicate::str::contains("visibility_threshold"));
}

#[test]
fn test_invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.toml");
    fs::write(&config, "smoothing_window = 0\n").unwrap();

    form_coach(home.path())
        .args(["difficulties", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_replay_prints_events_and_summary() {
    let home = TempDir::new().unwrap();
    let recording = write_arm_raise_recording(home.path(), 5);

    form_coach(home.path())
        .arg("replay")
        .arg(&recording)
        .args(["--exercise", "arm_raise", "--difficulty", "beginner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exercise_started"))
        .stdout(predicate::str::contains("Rep 5"))
        .stdout(predicate::str::contains("target_reached"))
        .stdout(predicate::str::contains("Replay Summary"))
        .stdout(predicate::str::contains("80 (80 visible)"));
}

#[test]
fn test_replay_json_output() {
    let home = TempDir::new().unwrap();
    let recording = write_arm_raise_recording(home.path(), 2);

    let output = form_coach(home.path())
        .arg("replay")
        .arg(&recording)
        .args(["--exercise", "arm-raise", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let reports: Vec<FrameReport> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports.len(), 32);
    assert_eq!(reports.last().unwrap().analysis.reps, 2);
}

#[test]
fn test_replay_rejects_unknown_exercise() {
    let home = TempDir::new().unwrap();
    let recording = write_arm_raise_recording(home.path(), 1);

    form_coach(home.path())
        .arg("replay")
        .arg(&recording)
        .args(["--exercise", "burpee"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("burpee"));
}

#[test]
fn test_replay_missing_file() {
    let home = TempDir::new().unwrap();
    form_coach(home.path())
        .args(["replay", "missing.jsonl", "--exercise", "squat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open"));
}
