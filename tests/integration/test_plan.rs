//! Integration tests for `feza plan`

use crate::helpers::{TestWorkspace, run_feza, run_feza_failing};
use anyhow::Result;

#[test]
fn test_plan_default_targets() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_feza(&ws.path, &["plan", "v1.2.3", "--name", "foo"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("dist/feza_manifest.json"));

  let manifest = ws.manifest()?;
  assert_eq!(manifest["tag"], "v1.2.3");
  assert_eq!(manifest["version"], "1.2.3");
  assert_eq!(manifest["name"], "foo");

  let filenames: Vec<&str> = manifest["assets"]
    .as_array()
    .unwrap()
    .iter()
    .map(|a| a["filename"].as_str().unwrap())
    .collect();
  assert_eq!(
    filenames,
    vec!["foo-darwin-arm64.tar.gz", "foo-darwin-amd64.tar.gz", "foo-linux-amd64.tar.gz"]
  );
  assert!(manifest["assets"].as_array().unwrap().iter().all(|a| a["sha256"] == ""));

  Ok(())
}

#[test]
fn test_plan_custom_targets_keep_order_and_duplicates() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_feza(
    &ws.path,
    &["plan", "v0.1.0", "--name", "foo", "--targets", "linux-arm64, linux-amd64,linux-arm64"],
  )?;

  let manifest = ws.manifest()?;
  let targets: Vec<&str> = manifest["assets"]
    .as_array()
    .unwrap()
    .iter()
    .map(|a| a["target"].as_str().unwrap())
    .collect();
  assert_eq!(targets, vec!["linux-arm64", "linux-amd64", "linux-arm64"]);

  Ok(())
}

#[test]
fn test_plan_rejects_bad_tag() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let (code, stderr) = run_feza_failing(&ws.path, &["plan", "1.2.3", "--name", "foo"])?;
  assert_eq!(code, 3);
  assert!(stderr.contains("Invalid tag format"));
  assert!(!ws.file_exists("dist/feza_manifest.json"));

  Ok(())
}

#[test]
fn test_plan_rejects_bad_target() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let (code, stderr) = run_feza_failing(&ws.path, &["plan", "v1.0.0", "--name", "foo", "--targets", "linux"])?;
  assert_eq!(code, 3);
  assert!(stderr.contains("linux"));
  assert!(!ws.file_exists("dist/feza_manifest.json"));

  Ok(())
}

#[test]
fn test_plan_rejects_dirty_tree() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("src/main.rs", "fn main() {}\n")?;

  let (code, stderr) = run_feza_failing(&ws.path, &["plan", "v1.0.0", "--name", "foo"])?;
  assert_eq!(code, 3);
  assert!(stderr.contains("dirty"));
  assert!(!ws.file_exists("dist/feza_manifest.json"));

  Ok(())
}

#[test]
fn test_plan_outside_git_repo_fails() -> Result<()> {
  let dir = tempfile::TempDir::new()?;

  let (code, _) = run_feza_failing(dir.path(), &["plan", "v1.0.0", "--name", "foo"])?;
  assert_eq!(code, 2);

  Ok(())
}

#[test]
fn test_plan_reads_name_and_targets_from_config() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("feza.toml", "name = \"bar\"\ntargets = [\"linux-amd64\"]\n")?;
  ws.commit("Add feza.toml")?;

  run_feza(&ws.path, &["plan", "v2.0.0"])?;

  let manifest = ws.manifest()?;
  assert_eq!(manifest["name"], "bar");
  assert_eq!(manifest["assets"][0]["filename"], "bar-linux-amd64.tar.gz");
  assert_eq!(manifest["assets"].as_array().unwrap().len(), 1);

  Ok(())
}

#[test]
fn test_plan_without_name_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let (code, stderr) = run_feza_failing(&ws.path, &["plan", "v1.0.0"])?;
  assert_eq!(code, 1);
  assert!(stderr.contains("--name"));

  Ok(())
}

#[test]
fn test_replan_replaces_manifest() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_feza(&ws.path, &["plan", "v1.0.0", "--name", "foo"])?;
  run_feza(&ws.path, &["plan", "v1.0.1", "--name", "foo", "--targets", "linux-amd64"])?;

  let manifest = ws.manifest()?;
  assert_eq!(manifest["tag"], "v1.0.1");
  assert_eq!(manifest["assets"].as_array().unwrap().len(), 1);

  Ok(())
}
