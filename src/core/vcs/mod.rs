//! Version control seam
//!
//! Phases only need a handful of git primitives. They go through `GitClient`
//! so tests can swap in a recording fake.

pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::FezaResult;
use std::path::Path;

/// Git primitives used by the release phases
///
/// Every method takes the working directory explicitly; implementations hold
/// no per-repository state.
pub trait GitClient {
  /// True if `git status --porcelain` reports anything
  fn is_dirty(&self, dir: &Path) -> FezaResult<bool>;

  /// Initialize a repository with the given initial branch
  fn init(&self, dir: &Path, branch: &str) -> FezaResult<()>;

  /// Stage paths (relative to `dir`)
  fn add(&self, dir: &Path, paths: &[&Path]) -> FezaResult<()>;

  fn commit(&self, dir: &Path, message: &str) -> FezaResult<()>;

  /// Push `branch` to a remote name or URL
  fn push(&self, dir: &Path, remote: &str, branch: &str) -> FezaResult<()>;

  /// Clone with `--depth 1` into `dest`
  fn clone_shallow(&self, url: &str, dest: &Path) -> FezaResult<()>;

  fn checkout_new_branch(&self, dir: &Path, name: &str) -> FezaResult<()>;

  fn current_branch(&self, dir: &Path) -> FezaResult<String>;

  fn set_remote_url(&self, dir: &Path, remote: &str, url: &str) -> FezaResult<()>;
}
