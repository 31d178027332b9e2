//! Planner: validate the tag and targets, write a fresh manifest
//!
//! Planning is destructive. Whatever manifest was stored before is replaced,
//! checksums and URLs included.

use crate::core::error::{FezaResult, PreconditionError};
use crate::core::manifest::{ReleaseManifest, ReleaseTag};
use crate::core::store::ManifestStore;
use crate::core::vcs::GitClient;
use std::path::Path;

/// Plan a release for `tag`
///
/// Checks, in order: tag format, clean working tree at `root`, target format.
/// Nothing is written unless all of them pass.
pub fn plan_release<S: AsRef<str>>(
  tag: &str,
  name: &str,
  targets: &[S],
  root: &Path,
  git: &dyn GitClient,
  store: &dyn ManifestStore,
) -> FezaResult<ReleaseManifest> {
  let tag = ReleaseTag::parse(tag)?;

  if git.is_dirty(root)? {
    return Err(PreconditionError::DirtyWorkingTree.into());
  }

  let manifest = ReleaseManifest::plan(&tag, name, targets)?;
  store.save(&manifest)?;

  tracing::info!(tag = %tag, assets = manifest.assets.len(), store = %store.location(), "planned release");
  Ok(manifest)
}
