//! Manifest persistence
//!
//! Phases read and write the whole manifest through a `ManifestStore`. There
//! is no locking; invocations against one store must be serialized by the caller.

use crate::core::error::{FezaResult, PreconditionError, ResultExt};
use crate::core::manifest::ReleaseManifest;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed manifest location, relative to the project root
pub const MANIFEST_PATH: &str = "dist/feza_manifest.json";

/// Whole-document storage for the release manifest
pub trait ManifestStore {
  /// Read the manifest, failing with `ManifestNotFound` if absent
  fn load(&self) -> FezaResult<ReleaseManifest>;

  /// Replace the stored manifest
  fn save(&self, manifest: &ReleaseManifest) -> FezaResult<()>;

  /// Human-readable location, for messages
  fn location(&self) -> String;
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct FileStore {
  path: PathBuf,
}

impl FileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Store at `<root>/dist/feza_manifest.json`
  pub fn in_project(root: &Path) -> Self {
    Self::new(root.join(MANIFEST_PATH))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl ManifestStore for FileStore {
  fn load(&self) -> FezaResult<ReleaseManifest> {
    if !self.path.exists() {
      return Err(
        PreconditionError::ManifestNotFound {
          path: self.path.display().to_string(),
        }
        .into(),
      );
    }

    let content =
      fs::read_to_string(&self.path).with_context(|| format!("Failed to read manifest {}", self.path.display()))?;
    let manifest: ReleaseManifest =
      serde_json::from_str(&content).with_context(|| format!("Failed to parse manifest {}", self.path.display()))?;

    tracing::debug!(path = %self.path.display(), tag = %manifest.tag, "loaded manifest");
    Ok(manifest)
  }

  fn save(&self, manifest: &ReleaseManifest) -> FezaResult<()> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut content = serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
    content.push('\n');
    fs::write(&self.path, content).with_context(|| format!("Failed to write manifest {}", self.path.display()))?;

    tracing::debug!(path = %self.path.display(), assets = manifest.assets.len(), "saved manifest");
    Ok(())
  }

  fn location(&self) -> String {
    self.path.display().to_string()
  }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
  manifest: std::cell::RefCell<Option<ReleaseManifest>>,
  saves: std::cell::Cell<usize>,
}

#[cfg(test)]
impl MemoryStore {
  pub fn with(manifest: ReleaseManifest) -> Self {
    Self {
      manifest: std::cell::RefCell::new(Some(manifest)),
      saves: std::cell::Cell::new(0),
    }
  }

  pub fn current(&self) -> Option<ReleaseManifest> {
    self.manifest.borrow().clone()
  }

  pub fn save_count(&self) -> usize {
    self.saves.get()
  }
}

#[cfg(test)]
impl ManifestStore for MemoryStore {
  fn load(&self) -> FezaResult<ReleaseManifest> {
    self.manifest.borrow().clone().ok_or_else(|| {
      PreconditionError::ManifestNotFound {
        path: self.location(),
      }
      .into()
    })
  }

  fn save(&self, manifest: &ReleaseManifest) -> FezaResult<()> {
    *self.manifest.borrow_mut() = Some(manifest.clone());
    self.saves.set(self.saves.get() + 1);
    Ok(())
  }

  fn location(&self) -> String {
    "<memory>".to_string()
  }
}
