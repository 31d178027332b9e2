//! System git backend
//!
//! Runs the `git` binary with an isolated environment:
//! - Whitelisted environment only (PATH, HOME, credential helpers' variables)
//! - Never prompts for credentials (GIT_TERMINAL_PROMPT=0)
//! - Secrets registered with `redacting` are scrubbed from error output

use super::GitClient;
use crate::core::error::{ExternalToolError, FezaResult, ResultExt};
use std::path::Path;
use std::process::{Command, Output};

/// Environment variables passed through to git
const PASSTHROUGH_ENV: &[&str] = &[
  "PATH",
  "HOME",
  "XDG_CONFIG_HOME",
  "SSH_AUTH_SOCK",
  "GH_TOKEN",
  "GITHUB_TOKEN",
  "GIT_AUTHOR_NAME",
  "GIT_AUTHOR_EMAIL",
  "GIT_COMMITTER_NAME",
  "GIT_COMMITTER_EMAIL",
];

/// Git backend using system git
#[derive(Debug, Default, Clone)]
pub struct SystemGit {
  secrets: Vec<String>,
}

impl SystemGit {
  pub fn new() -> Self {
    Self::default()
  }

  /// Scrub `secret` from any command line or stderr this backend reports
  pub fn redacting(mut self, secret: impl Into<String>) -> Self {
    let secret = secret.into();
    if !secret.is_empty() {
      self.secrets.push(secret);
    }
    self
  }

  fn redact(&self, text: &str) -> String {
    self
      .secrets
      .iter()
      .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), "***"))
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory (when given)
  /// - Clears environment variables, then whitelists `PASSTHROUGH_ENV`
  /// - Adds safe configuration overrides
  fn git_cmd(&self, dir: Option<&Path>) -> Command {
    let mut cmd = Command::new("git");

    if let Some(dir) = dir {
      cmd.arg("-C").arg(dir);
    }

    cmd.env_clear();
    for key in PASSTHROUGH_ENV {
      if let Ok(value) = std::env::var(key) {
        cmd.env(key, value);
      }
    }
    cmd.env("GIT_TERMINAL_PROMPT", "0");

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }

  /// Run git and turn a non-zero exit into `ExternalToolError`
  fn run(&self, dir: Option<&Path>, args: &[&str]) -> FezaResult<Output> {
    let label = self.redact(&format!("git {}", args.join(" ")));
    tracing::debug!(command = %label, dir = ?dir, "running git");

    let output = self
      .git_cmd(dir)
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", label))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(
        ExternalToolError::CommandFailed {
          command: label,
          stderr: self.redact(&stderr),
        }
        .into(),
      );
    }

    Ok(output)
  }
}

impl GitClient for SystemGit {
  fn is_dirty(&self, dir: &Path) -> FezaResult<bool> {
    let output = self.run(Some(dir), &["status", "--porcelain"])?;
    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
  }

  fn init(&self, dir: &Path, branch: &str) -> FezaResult<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let initial = format!("--initial-branch={}", branch);
    self.run(Some(dir), &["init", &initial])?;
    Ok(())
  }

  fn add(&self, dir: &Path, paths: &[&Path]) -> FezaResult<()> {
    let paths: Vec<String> = paths.iter().map(|p| p.to_string_lossy().replace('\\', "/")).collect();
    let mut args = vec!["add", "--"];
    args.extend(paths.iter().map(String::as_str));
    self.run(Some(dir), &args)?;
    Ok(())
  }

  fn commit(&self, dir: &Path, message: &str) -> FezaResult<()> {
    self.run(Some(dir), &["commit", "-m", message])?;
    Ok(())
  }

  fn push(&self, dir: &Path, remote: &str, branch: &str) -> FezaResult<()> {
    self.run(Some(dir), &["push", remote, branch])?;
    Ok(())
  }

  fn clone_shallow(&self, url: &str, dest: &Path) -> FezaResult<()> {
    let dest = dest.to_string_lossy();
    self.run(None, &["clone", "--depth", "1", url, &dest])?;
    Ok(())
  }

  fn checkout_new_branch(&self, dir: &Path, name: &str) -> FezaResult<()> {
    self.run(Some(dir), &["checkout", "-b", name])?;
    Ok(())
  }

  fn current_branch(&self, dir: &Path) -> FezaResult<String> {
    let output = self.run(Some(dir), &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  fn set_remote_url(&self, dir: &Path, remote: &str, url: &str) -> FezaResult<()> {
    self.run(Some(dir), &["remote", "set-url", remote, url])?;
    Ok(())
  }
}
