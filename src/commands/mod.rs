//! CLI commands for feza
//!
//! Each command is a thin wrapper: load `feza.toml`, wire the real
//! collaborators (`SystemGit`, `GhCli`, `FileStore`), call the phase in
//! `crate::release`, print the outcome.
//!
//! ## Pipeline
//! - **plan**: write a fresh manifest for a tag
//! - **build**: package binaries and fill in checksums
//! - **github**: publish the release and upload archives
//! - **tap**: push a Homebrew formula to a tap
//!
//! ## Standalone
//! - **bump**: rewrite the project version
//! - **status**: show where the manifest stands

pub mod build;
pub mod bump;
pub mod github;
pub mod plan;
pub mod status;
pub mod tap;

pub use build::{BuildArgs, run_build};
pub use bump::run_bump;
pub use github::{GithubArgs, run_github};
pub use plan::run_plan;
pub use status::run_status;
pub use tap::{TapArgs, run_tap};

use crate::core::config::FezaConfig;
use crate::core::error::{FezaError, FezaResult};
use crate::release::{REPO_ENV, resolve_repo};
use std::env;
use std::path::{Path, PathBuf};

/// Project root (the working directory) and its optional config
pub(crate) fn load_project() -> FezaResult<(PathBuf, FezaConfig)> {
  let root = env::current_dir()?;
  let config = FezaConfig::load(&root)?;
  Ok((root, config))
}

/// Tool name from `--name`, falling back to `name` in feza.toml
pub(crate) fn resolve_name(cli: Option<String>, config: &FezaConfig) -> FezaResult<String> {
  cli
    .or_else(|| config.name.clone())
    .filter(|n| !n.trim().is_empty())
    .ok_or_else(|| FezaError::with_help("Tool name not specified", "Pass --name NAME or set `name` in feza.toml."))
}

/// Later phases take the name from the manifest; a different `--name` is only reported
pub(crate) fn warn_on_name_mismatch(given: &str, manifest_name: &str) {
  if given != manifest_name {
    tracing::warn!(given, manifest = manifest_name, "--name differs from the planned name, using the manifest");
  }
}

/// Repository from `--repo`, `GITHUB_REPOSITORY`, or feza.toml
pub(crate) fn repo_for(cli: Option<&str>, config: &FezaConfig) -> FezaResult<String> {
  resolve_repo(cli, env::var(REPO_ENV).ok(), config.repo.as_deref())
}

/// Resolve a possibly relative path against the project root
pub(crate) fn under_root(root: &Path, path: &Path) -> PathBuf {
  root.join(path)
}

/// First 16 hex chars of a checksum, for terse output
pub(crate) fn short_sha(sha: &str) -> &str {
  sha.get(..16).unwrap_or(sha)
}
