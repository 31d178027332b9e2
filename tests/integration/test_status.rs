//! Integration tests for `feza status`

use crate::helpers::{TestWorkspace, run_feza, run_feza_failing};
use anyhow::Result;

#[test]
fn test_status_without_manifest() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let (code, stderr) = run_feza_failing(&ws.path, &["status"])?;
  assert_eq!(code, 3);
  assert!(stderr.contains("Manifest not found"));
  Ok(())
}

#[test]
fn test_status_json_tracks_phase() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_feza(&ws.path, &["plan", "v1.0.0", "--name", "foo", "--targets", "linux-amd64"])?;

  let output = run_feza(&ws.path, &["status", "--json"])?;
  let status: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(status["phase"], "planned");
  assert_eq!(status["assets"][0]["packaged"], false);

  ws.add_binary("linux-amd64", "foo", "bin")?;
  run_feza(&ws.path, &["build", "v1.0.0", "--repo", "acme/foo"])?;

  let output = run_feza(&ws.path, &["status", "--json"])?;
  let status: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(status["phase"], "packaged");
  assert_eq!(status["assets"][0]["sha256"].as_str().unwrap().len(), 64);
  Ok(())
}

#[test]
fn test_status_does_not_modify_manifest() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_feza(&ws.path, &["plan", "v1.0.0", "--name", "foo"])?;
  let before = ws.read_file("dist/feza_manifest.json")?;

  run_feza(&ws.path, &["status"])?;
  assert_eq!(ws.read_file("dist/feza_manifest.json")?, before);
  Ok(())
}
