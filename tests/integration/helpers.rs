//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway git project with a Cargo.toml and ignored build/dist dirs
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a new project with one commit
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(
      path.join("Cargo.toml"),
      r#"[package]
name = "foo"
version = "0.1.0"
edition = "2024"

[dependencies]
anyhow = { version = "1.0" }
"#,
    )?;
    std::fs::write(path.join(".gitignore"), "build/\ndist/\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial project setup"])?;

    Ok(Self { _root: root, path })
  }

  /// Place an executable binary under `build/<target>/<file>`
  pub fn add_binary(&self, target: &str, file: &str, content: &str) -> Result<PathBuf> {
    let dir = self.path.join("build").join(target);
    std::fs::create_dir_all(&dir)?;
    let binary = dir.join(file);
    std::fs::write(&binary, content)?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755))?;
    }

    Ok(binary)
  }

  /// Write a file relative to the project root
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Get git log
  pub fn git_log(&self, n: usize) -> Result<Vec<String>> {
    let output = git(&self.path, &["log", &format!("-{}", n), "--format=%s"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  /// Parsed `dist/feza_manifest.json`
  pub fn manifest(&self) -> Result<serde_json::Value> {
    let content = self.read_file("dist/feza_manifest.json")?;
    serde_json::from_str(&content).context("manifest is not valid JSON")
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

fn feza_command(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Command {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_feza"));
  cmd
    .current_dir(cwd)
    .args(args)
    .env_remove("GITHUB_REPOSITORY")
    .env_remove("FEZA_LOG")
    .env("CI", "true");
  for (key, value) in env {
    cmd.env(key, value);
  }
  cmd
}

/// Run feza and require success
pub fn run_feza(cwd: &Path, args: &[&str]) -> Result<Output> {
  run_feza_with_env(cwd, args, &[])
}

/// Run feza with extra environment and require success
pub fn run_feza_with_env(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let output = feza_command(cwd, args, env).output().context("Failed to run feza")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "feza command failed: feza {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Run feza and require failure; returns the exit code and stderr
pub fn run_feza_failing(cwd: &Path, args: &[&str]) -> Result<(i32, String)> {
  let output = feza_command(cwd, args, &[]).output().context("Failed to run feza")?;

  if output.status.success() {
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!("feza {} unexpectedly succeeded\nstdout: {}", args.join(" "), stdout);
  }

  let code = output.status.code().context("feza was killed by a signal")?;
  Ok((code, String::from_utf8_lossy(&output.stderr).to_string()))
}
