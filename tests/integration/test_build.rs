//! Integration tests for `feza build`

use crate::helpers::{TestWorkspace, run_feza, run_feza_failing, run_feza_with_env};
use anyhow::Result;

fn planned(targets: &str) -> Result<TestWorkspace> {
  let ws = TestWorkspace::new()?;
  run_feza(&ws.path, &["plan", "v1.0.0", "--name", "foo", "--targets", targets])?;
  Ok(ws)
}

#[test]
fn test_plan_then_build_end_to_end() -> Result<()> {
  let ws = planned("linux-amd64,macos-arm64")?;
  ws.add_binary("linux-amd64", "foo", "#!/bin/sh\necho linux\n")?;
  ws.add_binary("macos-arm64", "foo", "#!/bin/sh\necho mac\n")?;

  let output = run_feza(&ws.path, &["build", "v1.0.0", "--name", "foo", "--repo", "acme/foo"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("foo-linux-amd64.tar.gz"));

  assert!(ws.file_exists("dist/foo-linux-amd64.tar.gz"));
  assert!(ws.file_exists("dist/foo-darwin-arm64.tar.gz"));

  let manifest = ws.manifest()?;
  for asset in manifest["assets"].as_array().unwrap() {
    let sha = asset["sha256"].as_str().unwrap();
    assert_eq!(sha.len(), 64);
    assert!(sha.chars().all(|c| c.is_ascii_hexdigit()));

    let url = asset["url"].as_str().unwrap();
    let filename = asset["filename"].as_str().unwrap();
    assert_eq!(
      url,
      format!("https://github.com/acme/foo/releases/download/v1.0.0/{}", filename)
    );
  }

  Ok(())
}

#[test]
fn test_build_is_deterministic() -> Result<()> {
  let ws = planned("linux-amd64")?;
  ws.add_binary("linux-amd64", "foo", "same bytes")?;

  run_feza(&ws.path, &["build", "v1.0.0", "--repo", "acme/foo"])?;
  let first = ws.manifest()?["assets"][0]["sha256"].clone();

  std::thread::sleep(std::time::Duration::from_millis(1100));
  run_feza(&ws.path, &["build", "v1.0.0", "--repo", "acme/foo"])?;
  let second = ws.manifest()?["assets"][0]["sha256"].clone();

  assert_eq!(first, second);
  Ok(())
}

#[test]
fn test_build_repo_from_environment() -> Result<()> {
  let ws = planned("linux-amd64")?;
  ws.add_binary("linux-amd64", "foo-x86_64", "bin")?;

  run_feza_with_env(&ws.path, &["build", "v1.0.0"], &[("GITHUB_REPOSITORY", "env-org/foo")])?;

  let url = ws.manifest()?["assets"][0]["url"].as_str().unwrap().to_string();
  assert!(url.starts_with("https://github.com/env-org/foo/releases/download/v1.0.0/"));
  Ok(())
}

#[test]
fn test_build_without_repo_fails() -> Result<()> {
  let ws = planned("linux-amd64")?;
  ws.add_binary("linux-amd64", "foo", "bin")?;

  let (code, stderr) = run_feza_failing(&ws.path, &["build", "v1.0.0"])?;
  assert_eq!(code, 3);
  assert!(stderr.contains("Repository not specified"));
  Ok(())
}

#[test]
fn test_build_missing_binary_leaves_manifest_untouched() -> Result<()> {
  let ws = planned("linux-amd64,macos-arm64")?;
  ws.add_binary("linux-amd64", "foo", "bin")?;
  let before = ws.read_file("dist/feza_manifest.json")?;

  let (code, stderr) = run_feza_failing(&ws.path, &["build", "v1.0.0", "--repo", "acme/foo"])?;
  assert_eq!(code, 1);
  assert!(stderr.contains("macos-arm64"));
  assert_eq!(ws.read_file("dist/feza_manifest.json")?, before);
  Ok(())
}

#[test]
fn test_build_tag_mismatch() -> Result<()> {
  let ws = planned("linux-amd64")?;
  ws.add_binary("linux-amd64", "foo", "bin")?;

  let (code, stderr) = run_feza_failing(&ws.path, &["build", "v1.0.1", "--repo", "acme/foo"])?;
  assert_eq!(code, 3);
  assert!(stderr.contains("does not match"));
  Ok(())
}

#[test]
fn test_build_single_target() -> Result<()> {
  let ws = planned("linux-amd64,macos-arm64")?;
  ws.add_binary("linux-amd64", "foo", "bin")?;

  run_feza(
    &ws.path,
    &["build", "v1.0.0", "--repo", "acme/foo", "--target", "linux-amd64"],
  )?;

  let manifest = ws.manifest()?;
  assert_ne!(manifest["assets"][0]["sha256"], "");
  assert_eq!(manifest["assets"][1]["sha256"], "");

  let output = run_feza(&ws.path, &["status"])?;
  assert!(String::from_utf8_lossy(&output.stdout).contains("1/2 assets packaged"));
  Ok(())
}

#[test]
fn test_build_custom_dirs() -> Result<()> {
  let ws = planned("linux-amd64")?;
  ws.write_file("out/linux-amd64/foo", "bin")?;

  run_feza(
    &ws.path,
    &["build", "v1.0.0", "--repo", "acme/foo", "--artifacts-dir", "out", "--dist", "pkg"],
  )?;

  assert!(ws.file_exists("pkg/foo-linux-amd64.tar.gz"));
  assert!(ws.file_exists("dist/feza_manifest.json"));
  Ok(())
}
