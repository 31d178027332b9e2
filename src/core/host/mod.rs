//! Remote release host seam
//!
//! The publisher and distributor talk to the hosting service only through
//! `ReleaseHost`. Existence checks return booleans instead of failing so the
//! caller decides the policy (create, prompt, or abort).

pub mod gh;

pub use gh::GhCli;

use crate::core::error::FezaResult;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Repository visibility for newly created repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
  Public,
  Private,
}

impl fmt::Display for Visibility {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Visibility::Public => write!(f, "public"),
      Visibility::Private => write!(f, "private"),
    }
  }
}

/// Parameters for creating a release object
#[derive(Debug, Clone)]
pub struct NewRelease<'a> {
  pub repo: &'a str,
  pub tag: &'a str,
  pub title: &'a str,
  pub draft: bool,
  pub notes_file: Option<&'a Path>,
}

/// Parameters for opening a pull request
#[derive(Debug, Clone)]
pub struct ChangeRequest<'a> {
  pub repo: &'a str,
  pub base: &'a str,
  pub head: &'a str,
  pub title: &'a str,
  pub body: &'a str,
}

/// Release hosting primitives
pub trait ReleaseHost {
  fn release_exists(&self, repo: &str, tag: &str) -> FezaResult<bool>;

  fn create_release(&self, release: &NewRelease<'_>) -> FezaResult<()>;

  fn upload_asset(&self, repo: &str, tag: &str, path: &Path) -> FezaResult<()>;

  /// Names of assets already attached to the release
  fn list_asset_names(&self, repo: &str, tag: &str) -> FezaResult<BTreeSet<String>>;

  fn repo_exists(&self, repo: &str) -> FezaResult<bool>;

  fn create_repo(&self, repo: &str, visibility: Visibility, description: &str) -> FezaResult<()>;

  /// Open a pull request, returning its URL
  fn open_change_request(&self, request: &ChangeRequest<'_>) -> FezaResult<String>;

  fn default_branch(&self, repo: &str) -> FezaResult<String>;

  /// Token of the host CLI's logged-in session, if any
  fn session_token(&self) -> Option<String>;
}
