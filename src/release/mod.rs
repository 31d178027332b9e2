//! Release phases
//!
//! Each phase is a plain function over the manifest and injected collaborators:
//!
//! 1. **plan**: validate the tag and targets, write a fresh manifest
//! 2. **package**: archive and checksum binaries, fill in asset checksums/URLs
//! 3. **publish**: ensure the remote release, upload missing archives
//! 4. **distribute**: render the Homebrew formula, land it on a tap branch
//!
//! **bump** (version rewrite) and **status** (read-only report) stand apart
//! from the pipeline.

pub mod bump;
pub mod distribute;
pub mod package;
pub mod plan;
pub mod publish;
pub mod status;

use crate::core::error::{FezaResult, PreconditionError};
use crate::core::manifest::ReleaseManifest;
use std::collections::BTreeMap;

/// Environment variable naming the repository (`org/repo`)
pub const REPO_ENV: &str = "GITHUB_REPOSITORY";

/// Resolve the repository identity: explicit flag, then environment, then config
pub fn resolve_repo(explicit: Option<&str>, env: Option<String>, config: Option<&str>) -> FezaResult<String> {
  explicit
    .map(str::to_string)
    .or(env)
    .or_else(|| config.map(str::to_string))
    .filter(|repo| !repo.trim().is_empty())
    .ok_or_else(|| PreconditionError::MissingRepo.into())
}

/// `url_by` and `sha_by` lookup tables keyed by target
///
/// With duplicate targets the first asset wins.
pub fn asset_lookups(manifest: &ReleaseManifest) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
  let mut urls = BTreeMap::new();
  let mut shas = BTreeMap::new();
  for asset in &manifest.assets {
    urls.entry(asset.target.clone()).or_insert_with(|| asset.url.clone());
    shas.entry(asset.target.clone()).or_insert_with(|| asset.sha256.clone());
  }
  (urls, shas)
}
