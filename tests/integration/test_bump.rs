//! Integration tests for `feza bump`

use crate::helpers::{TestWorkspace, run_feza, run_feza_failing};
use anyhow::Result;

#[test]
fn test_bump_rewrites_package_version_only() -> Result<()> {
  let ws = TestWorkspace::new()?;

  run_feza(&ws.path, &["bump", "--version", "0.2.0"])?;

  let content = ws.read_file("Cargo.toml")?;
  assert!(content.contains("version = \"0.2.0\""));
  assert!(content.contains("anyhow = { version = \"1.0\" }"));
  Ok(())
}

#[test]
fn test_bump_commit() -> Result<()> {
  let ws = TestWorkspace::new()?;

  run_feza(&ws.path, &["bump", "--version", "0.3.0", "--commit"])?;

  let log = ws.git_log(1)?;
  assert_eq!(log, vec!["Bump version to 0.3.0"]);
  Ok(())
}

#[test]
fn test_bump_push_requires_commit() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let before = ws.read_file("Cargo.toml")?;

  let (code, stderr) = run_feza_failing(&ws.path, &["bump", "--version", "0.2.0", "--push"])?;
  assert_eq!(code, 3);
  assert!(stderr.contains("--push requires --commit"));
  assert_eq!(ws.read_file("Cargo.toml")?, before);
  Ok(())
}

#[test]
fn test_bump_rejects_same_version() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let (code, stderr) = run_feza_failing(&ws.path, &["bump", "--version", "0.1.0"])?;
  assert_eq!(code, 3);
  assert!(stderr.contains("unchanged"));
  Ok(())
}

#[test]
fn test_bump_rejects_prefixed_version() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let (code, _) = run_feza_failing(&ws.path, &["bump", "--version", "v0.2.0"])?;
  assert_eq!(code, 3);
  Ok(())
}

#[test]
fn test_bump_without_version_unattended_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let (code, stderr) = run_feza_failing(&ws.path, &["bump"])?;
  assert_eq!(code, 3);
  assert!(stderr.contains("non-interactive"));
  Ok(())
}

#[test]
fn test_bump_pyproject_file() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file(
    "py/pyproject.toml",
    "[project]\nname = \"foo\"\nversion = \"1.0.0\"\n\n[project.optional-dependencies]\ndev = [\"pytest\"]\n",
  )?;

  run_feza(&ws.path, &["bump", "--version", "1.1.0", "--file", "py/pyproject.toml"])?;

  assert!(ws.read_file("py/pyproject.toml")?.contains("version = \"1.1.0\""));
  assert!(ws.read_file("Cargo.toml")?.contains("version = \"0.1.0\""));
  Ok(())
}
