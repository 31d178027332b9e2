//! GitHub via the `gh` CLI

use super::{ChangeRequest, NewRelease, ReleaseHost, Visibility};
use crate::core::error::{ExternalToolError, FezaResult, ResultExt};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// `gh` CLI backend
#[derive(Debug, Clone)]
pub struct GhCli {
  program: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ReleaseAssets {
  #[serde(default)]
  assets: Vec<AssetName>,
}

#[derive(Debug, Deserialize)]
struct AssetName {
  name: String,
}

impl GhCli {
  /// Locate `gh` on PATH
  pub fn locate() -> FezaResult<Self> {
    let program = which::which("gh").map_err(|_| ExternalToolError::ToolMissing { tool: "gh".to_string() })?;
    tracing::debug!(program = %program.display(), "using gh");
    Ok(Self { program })
  }

  fn gh_cmd(&self) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd.env("GH_PROMPT_DISABLED", "1");
    cmd.env("NO_COLOR", "1");
    cmd
  }

  /// Run gh, returning the output regardless of exit status
  fn output(&self, args: &[&str]) -> FezaResult<Output> {
    tracing::debug!(command = %format!("gh {}", args.join(" ")), "running gh");
    self
      .gh_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute gh {}", args.first().unwrap_or(&"")))
  }

  /// Run gh and turn a non-zero exit into `ExternalToolError`
  fn run(&self, args: &[&str]) -> FezaResult<Output> {
    let output = self.output(args)?;
    if !output.status.success() {
      return Err(
        ExternalToolError::CommandFailed {
          command: format!("gh {}", args.join(" ")),
          stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
        .into(),
      );
    }
    Ok(output)
  }
}

impl ReleaseHost for GhCli {
  fn release_exists(&self, repo: &str, tag: &str) -> FezaResult<bool> {
    Ok(self.output(&["release", "view", tag, "--repo", repo])?.status.success())
  }

  fn create_release(&self, release: &NewRelease<'_>) -> FezaResult<()> {
    let notes = release.notes_file.map(|p| p.to_string_lossy().to_string());
    let mut args = vec![
      "release",
      "create",
      release.tag,
      "--repo",
      release.repo,
      "--title",
      release.title,
    ];
    if release.draft {
      args.push("--draft");
    }

    match &notes {
      Some(path) => args.extend(["--notes-file", path.as_str()]),
      None => args.extend(["--notes", ""]),
    }

    self.run(&args)?;
    Ok(())
  }

  fn upload_asset(&self, repo: &str, tag: &str, path: &Path) -> FezaResult<()> {
    let path = path.to_string_lossy();
    self.run(&["release", "upload", tag, &path, "--repo", repo])?;
    Ok(())
  }

  fn list_asset_names(&self, repo: &str, tag: &str) -> FezaResult<BTreeSet<String>> {
    let output = self.run(&["release", "view", tag, "--repo", repo, "--json", "assets"])?;
    let parsed: ReleaseAssets = serde_json::from_slice(&output.stdout).context("Failed to parse gh release assets")?;
    Ok(parsed.assets.into_iter().map(|a| a.name).collect())
  }

  fn repo_exists(&self, repo: &str) -> FezaResult<bool> {
    Ok(self.output(&["repo", "view", repo, "--json", "name"])?.status.success())
  }

  fn create_repo(&self, repo: &str, visibility: Visibility, description: &str) -> FezaResult<()> {
    let visibility = format!("--{}", visibility);
    self.run(&["repo", "create", repo, &visibility, "--description", description])?;
    Ok(())
  }

  fn open_change_request(&self, request: &ChangeRequest<'_>) -> FezaResult<String> {
    let output = self.run(&[
      "pr",
      "create",
      "--repo",
      request.repo,
      "--base",
      request.base,
      "--head",
      request.head,
      "--title",
      request.title,
      "--body",
      request.body,
    ])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  fn default_branch(&self, repo: &str) -> FezaResult<String> {
    let output = self.run(&[
      "repo",
      "view",
      repo,
      "--json",
      "defaultBranchRef",
      "--jq",
      ".defaultBranchRef.name",
    ])?;
    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if branch.is_empty() { "main".to_string() } else { branch })
  }

  fn session_token(&self) -> Option<String> {
    let output = self.output(&["auth", "token"]).ok()?;
    if !output.status.success() {
      return None;
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
  }
}
