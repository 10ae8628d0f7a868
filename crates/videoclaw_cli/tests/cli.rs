//! End-to-end tests for the `videoclaw` binary.
//!
//! Every test points `--root` and `--config` into its own temp directory so
//! the user's projects and global config are never touched.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const SCRIPT: &str = "An astronaut meets a robot on mars";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join("projects")
    }

    fn project(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    fn state_file(&self, name: &str) -> PathBuf {
        self.project(name).join(".videoclaw").join("state.json")
    }

    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("videoclaw").unwrap();
        cmd.arg("--root")
            .arg(self.root())
            .arg("--config")
            .arg(self.dir.path().join("global.toml"));
        for (key, _) in std::env::vars() {
            if key.starts_with("VIDEOCLAW_") {
                cmd.env_remove(key);
            }
        }
        cmd
    }

    fn init(&self, name: &str) {
        self.cmd().args(["init", name]).assert().success();
    }

    fn state(&self, name: &str) -> serde_json::Value {
        read_json(&self.state_file(name))
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_help() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("AI short video creation pipeline"))
        .stdout(predicate::str::contains("storyboard"))
        .stdout(predicate::str::contains("alternatives"));
}

#[test]
fn test_init_creates_layout() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["init", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project 'demo'"));

    for dir in ["assets", "storyboard", "videos", "audio"] {
        assert!(ws.project("demo").join(dir).is_dir(), "{} missing", dir);
    }
    let state = ws.state("demo");
    assert_eq!(state["project_id"], "demo");
    assert_eq!(state["status"], "initialized");
    assert_eq!(state["steps"], serde_json::json!({}));
}

#[test]
fn test_init_twice_fails() {
    let ws = Workspace::new();
    ws.init("demo");
    ws.cmd()
        .args(["init", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("demo"));
}

#[test]
fn test_init_rejects_bad_name() {
    let ws = Workspace::new();
    ws.cmd().args(["init", "../escape"]).assert().failure();
    assert!(!ws.dir.path().join("escape").exists());
}

#[test]
fn test_status_of_new_project() {
    let ws = Workspace::new();
    ws.init("demo");
    ws.cmd()
        .args(["status", "--project", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status:  initialized"))
        .stdout(predicate::str::contains("analyze"));
}

#[test]
fn test_status_unknown_project_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["status", "--project", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_analyze_records_output() {
    let ws = Workspace::new();
    ws.init("demo");
    ws.cmd()
        .args(["analyze", "--project", "demo", "--script", SCRIPT])
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze: done"));

    let state = ws.state("demo");
    assert_eq!(state["status"], "analyzed");
    assert_eq!(state["steps"]["analyze"]["status"], "completed");
    let output = &state["steps"]["analyze"]["output"];
    assert_eq!(output["script"], SCRIPT);
    assert!(!output["characters"].as_array().unwrap().is_empty());
}

#[test]
fn test_analyze_from_file() {
    let ws = Workspace::new();
    ws.init("demo");
    let script = ws.dir.path().join("script.txt");
    fs::write(&script, SCRIPT).unwrap();

    ws.cmd()
        .args(["analyze", "--project", "demo", "--script-file"])
        .arg(&script)
        .assert()
        .success();
    assert_eq!(ws.state("demo")["steps"]["analyze"]["output"]["script"], SCRIPT);
}

#[test]
fn test_storyboard_before_assets_is_refused() {
    let ws = Workspace::new();
    ws.init("demo");
    ws.cmd()
        .args(["analyze", "--project", "demo", "--script", SCRIPT])
        .assert()
        .success();
    let before = fs::read(ws.state_file("demo")).unwrap();

    ws.cmd()
        .args(["storyboard", "--project", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("assets"));

    assert_eq!(fs::read(ws.state_file("demo")).unwrap(), before);
}

#[test]
fn test_assets_with_variants() {
    let ws = Workspace::new();
    ws.init("demo");
    ws.cmd()
        .args(["analyze", "--project", "demo", "--script", SCRIPT])
        .assert()
        .success();
    ws.cmd()
        .args(["assets", "--project", "demo", "-n", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("assets: done"));

    let state = ws.state("demo");
    assert_eq!(state["status"], "assets_generated");
    let characters = state["steps"]["assets"]["output"]["characters"]
        .as_object()
        .unwrap();
    for entry in characters.values() {
        let variants = entry["variants"].as_array().unwrap();
        assert_eq!(variants.len(), 3);
        assert_eq!(entry["chosen"], variants[0]);
        for variant in variants {
            assert!(Path::new(variant.as_str().unwrap()).exists());
        }
    }
    assert!(state["selections"]["assets"]["chosen"].is_string());

    ws.cmd()
        .args(["alternatives", "--project", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_3.png"));
}

#[test]
fn test_select_promotes_variant() {
    let ws = Workspace::new();
    ws.init("demo");
    ws.cmd()
        .args(["analyze", "--project", "demo", "--script", SCRIPT])
        .assert()
        .success();
    ws.cmd()
        .args(["assets", "--project", "demo", "-n", "2"])
        .assert()
        .success();

    let state = ws.state("demo");
    let (name, entry) = state["steps"]["assets"]["output"]["characters"]
        .as_object()
        .unwrap()
        .iter()
        .next()
        .map(|(k, v)| (k.clone(), v.clone()))
        .unwrap();
    let second = entry["variants"][1].as_str().unwrap().to_string();

    ws.cmd()
        .args(["select", "--project", "demo", "--step", "assets", "--artifact", &second])
        .assert()
        .success();

    let state = ws.state("demo");
    assert_eq!(state["steps"]["assets"]["output"]["characters"][&name]["chosen"], second.as_str());
    assert_eq!(state["selections"]["assets"]["chosen"], second.as_str());

    ws.cmd()
        .args(["select", "--project", "demo", "--step", "assets", "--artifact", "nope.png"])
        .assert()
        .failure();
}

#[test]
fn test_project_config_set_and_get() {
    let ws = Workspace::new();
    ws.init("demo");
    ws.cmd()
        .args(["config", "--project", "demo", "--get", "project.name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"));

    ws.cmd()
        .args(["config", "--project", "demo", "--set", "pipeline.num_variants=4"])
        .assert()
        .success();
    ws.cmd()
        .args(["config", "--project", "demo", "--get", "pipeline.num_variants"])
        .assert()
        .success()
        .stdout(predicate::str::diff("4\n"));

    ws.cmd()
        .args(["config", "--project", "demo", "--get", "no.such.key"])
        .assert()
        .failure();
}

#[test]
fn test_global_config_file_is_created_on_set() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["config", "--set", "models.image.provider=mock"])
        .assert()
        .success();
    let content = fs::read_to_string(ws.dir.path().join("global.toml")).unwrap();
    assert!(content.contains("provider = \"mock\""));

    ws.cmd()
        .args(["config", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("models.image.provider = mock"));
}

#[test]
fn test_unknown_provider_fails_step() {
    let ws = Workspace::new();
    ws.init("demo");
    ws.cmd()
        .args(["analyze", "--project", "demo", "--script", SCRIPT])
        .assert()
        .success();
    ws.cmd()
        .args(["assets", "--project", "demo", "--provider", "nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent"));
}

#[test]
fn test_validate() {
    let ws = Workspace::new();
    ws.init("demo");
    ws.cmd()
        .args(["validate", "--project", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning"));
    ws.cmd()
        .args(["validate", "--project", "demo", "--strict"])
        .assert()
        .failure();

    ws.cmd()
        .args(["analyze", "--project", "demo", "--script", SCRIPT])
        .assert()
        .success();
    ws.cmd()
        .args(["validate", "--project", "demo", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Characters:"));
}

#[test]
fn test_validate_corrupt_state_fails() {
    let ws = Workspace::new();
    ws.init("demo");
    fs::write(ws.state_file("demo"), "{not json").unwrap();
    ws.cmd()
        .args(["validate", "--project", "demo"])
        .assert()
        .failure();
    ws.cmd()
        .args(["status", "--project", "demo"])
        .assert()
        .failure();
}

#[test]
fn test_run_reports_every_step() {
    let ws = Workspace::new();
    ws.init("demo");

    // Merge needs a real ffmpeg; only the generation steps are checked here.
    let output = ws
        .cmd()
        .args(["run", "--project", "demo", "--script", SCRIPT, "--json"])
        .output()
        .unwrap();
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    for step in ["analyze", "assets", "storyboard", "i2v", "audio"] {
        assert_eq!(report["results"][step]["status"], "success", "{}", step);
    }
    assert!(report["results"]["merge"].is_object());

    let state = ws.state("demo");
    assert_eq!(state["steps"]["i2v"]["status"], "completed");
    assert!(ws.project("demo").join("videos").join("video_000.mp4").exists());
}

#[test]
fn test_num_variants_long_form() {
    let ws = Workspace::new();
    ws.init("demo");
    ws.cmd()
        .args(["analyze", "--project", "demo", "--script", SCRIPT])
        .assert()
        .success();
    ws.cmd()
        .args(["assets", "--project", "demo", "--num-variants", "2"])
        .assert()
        .success();

    let state = ws.state("demo");
    for entry in state["steps"]["assets"]["output"]["scenes"]
        .as_object()
        .unwrap()
        .values()
    {
        assert_eq!(entry["variants"].as_array().unwrap().len(), 2);
    }
}

#[test]
fn test_t2i_writes_image() {
    let ws = Workspace::new();
    let output = ws.dir.path().join("out").join("cat.png");

    ws.cmd()
        .args(["t2i", "--prompt", "a cat on the moon", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated:"));

    let bytes = fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
    // Only the image itself is left beside it.
    assert_eq!(fs::read_dir(output.parent().unwrap()).unwrap().count(), 1);
}

#[test]
fn test_t2i_unknown_provider_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["t2i", "-p", "a cat", "--provider", "nonexistent", "-o"])
        .arg(ws.dir.path().join("cat.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent"));
    assert!(!ws.dir.path().join("cat.png").exists());
}

#[test]
fn test_i2i_from_reference() {
    let ws = Workspace::new();
    let reference = ws.dir.path().join("ref.png");
    let output = ws.dir.path().join("styled.png");
    ws.cmd()
        .args(["t2i", "-p", "a cat", "-o"])
        .arg(&reference)
        .assert()
        .success();

    ws.cmd()
        .args(["i2i", "-p", "the same cat in watercolor", "-i"])
        .arg(&reference)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated:"));
    assert!(output.exists());
}

#[test]
fn test_i2i_missing_input_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["i2i", "-p", "watercolor", "-i"])
        .arg(ws.dir.path().join("missing.png"))
        .arg("-o")
        .arg(ws.dir.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input image not found"));
}

#[test]
fn test_upload_copies_to_storage() {
    let ws = Workspace::new();
    let mirror = ws.dir.path().join("mirror");
    ws.cmd()
        .arg("config")
        .arg("--set")
        .arg(format!("storage.mirror_dir={}", mirror.display()))
        .assert()
        .success();
    let source = ws.dir.path().join("final.mp4");
    fs::write(&source, b"video").unwrap();

    ws.cmd()
        .args(["upload", "--provider", "local", "-r", "demo/final.mp4", "-i"])
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded: file://"));

    assert_eq!(fs::read(mirror.join("demo").join("final.mp4")).unwrap(), b"video");
}

#[test]
fn test_upload_missing_file_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["upload", "-r", "demo/final.mp4", "-i"])
        .arg(ws.dir.path().join("missing.mp4"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}
