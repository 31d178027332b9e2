//! Read-only manifest report

use crate::core::error::FezaResult;
use crate::core::manifest::{Phase, ReleaseManifest};
use crate::core::store::ManifestStore;
use serde::Serialize;

/// Per-asset state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetStatus {
  pub target: String,
  pub filename: String,
  pub packaged: bool,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub sha256: String,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub url: String,
}

/// Snapshot of where a release stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
  pub tag: String,
  pub version: String,
  pub name: String,
  pub phase: Phase,
  pub manifest: String,
  pub assets: Vec<AssetStatus>,
}

impl StatusReport {
  pub fn from_manifest(manifest: &ReleaseManifest, location: String) -> Self {
    Self {
      tag: manifest.tag.clone(),
      version: manifest.version.clone(),
      name: manifest.name.clone(),
      phase: manifest.phase(),
      manifest: location,
      assets: manifest
        .assets
        .iter()
        .map(|a| AssetStatus {
          target: a.target.clone(),
          filename: a.filename.clone(),
          packaged: a.is_packaged(),
          sha256: a.sha256.clone(),
          url: a.url.clone(),
        })
        .collect(),
    }
  }

  pub fn packaged_count(&self) -> usize {
    self.assets.iter().filter(|a| a.packaged).count()
  }
}

/// Load the manifest and summarize it
pub fn release_status(store: &dyn ManifestStore) -> FezaResult<StatusReport> {
  let manifest = store.load()?;
  Ok(StatusReport::from_manifest(&manifest, store.location()))
}
