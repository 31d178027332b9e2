//! Release manifest model
//!
//! The manifest is the only state shared between phases. It is created by
//! `plan`, filled in by `build`, and read by `github` and `tap`.
//!
//! ```text
//! plan ──▶ Planned ──build──▶ Packaged ──github──▶ (remote) ──tap──▶ (tap repo)
//! ```

use crate::core::error::{FezaResult, PreconditionError, ValidationError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Targets planned when none are given
pub const DEFAULT_TARGETS: [&str; 3] = ["macos-arm64", "macos-amd64", "linux-amd64"];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v(\d+\.\d+\.\d+)$").expect("valid tag regex"));

/// A validated `vMAJOR.MINOR.PATCH` tag paired with its version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
  tag: String,
  version: String,
}

impl ReleaseTag {
  /// Validate a tag and derive its version
  pub fn parse(tag: &str) -> FezaResult<Self> {
    let caps = TAG_RE
      .captures(tag)
      .ok_or_else(|| ValidationError::InvalidTagFormat { tag: tag.to_string() })?;

    Ok(Self {
      tag: tag.to_string(),
      version: caps[1].to_string(),
    })
  }

  pub fn as_str(&self) -> &str {
    &self.tag
  }

  /// Version without the leading `v`
  pub fn version(&self) -> &str {
    &self.version
  }
}

impl fmt::Display for ReleaseTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.tag)
  }
}

/// An `<os>-<arch>` packaging target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
  pub os: String,
  pub arch: String,
}

impl Target {
  /// Split a target string into its two parts
  pub fn parse(target: &str) -> FezaResult<Self> {
    let parts: Vec<&str> = target.split('-').collect();
    match parts.as_slice() {
      [os, arch] if !os.is_empty() && !arch.is_empty() => Ok(Self {
        os: (*os).to_string(),
        arch: (*arch).to_string(),
      }),
      _ => Err(
        ValidationError::InvalidTargetFormat {
          target: target.to_string(),
        }
        .into(),
      ),
    }
  }

  /// OS name as it appears in archive filenames (`macos` becomes `darwin`)
  pub fn archive_os(&self) -> &str {
    match self.os.as_str() {
      "macos" => "darwin",
      other => other,
    }
  }

  /// Homebrew platform block (`on_macos` / `on_linux`); `None` for other systems
  pub fn formula_os(&self) -> Option<&'static str> {
    match self.os.as_str() {
      "macos" | "darwin" => Some("macos"),
      "linux" => Some("linux"),
      _ => None,
    }
  }

  /// Homebrew CPU block (`on_arm` / `on_intel`); `None` for other architectures
  pub fn formula_cpu(&self) -> Option<&'static str> {
    match self.arch.as_str() {
      "arm64" | "aarch64" => Some("arm"),
      "amd64" | "x86_64" => Some("intel"),
      _ => None,
    }
  }

  /// Archive filename for this target: `<name>-<os>-<arch>.tar.gz`
  pub fn filename(&self, name: &str) -> String {
    format!("{}-{}-{}.tar.gz", name, self.archive_os(), self.arch)
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.os, self.arch)
  }
}

/// Convert a target string into its archive filename
pub fn target_to_filename(target: &str, name: &str) -> FezaResult<String> {
  Ok(Target::parse(target)?.filename(name))
}

/// Packaged-artifact record for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
  pub target: String,
  pub filename: String,
  #[serde(default)]
  pub sha256: String,
  #[serde(default)]
  pub url: String,
}

impl Asset {
  /// Empty asset, as written by `plan`
  pub fn planned(target: &str, name: &str) -> FezaResult<Self> {
    Ok(Self {
      target: target.to_string(),
      filename: target_to_filename(target, name)?,
      sha256: String::new(),
      url: String::new(),
    })
  }

  /// Packaged iff both checksum and URL are filled in
  pub fn is_packaged(&self) -> bool {
    !self.sha256.is_empty() && !self.url.is_empty()
  }
}

/// How far through the pipeline a manifest is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  /// No asset packaged yet
  Planned,
  /// Some assets packaged (e.g. after `build --target`)
  PartiallyPackaged,
  /// Every asset packaged, ready to publish
  Packaged,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Phase::Planned => write!(f, "planned"),
      Phase::PartiallyPackaged => write!(f, "partially packaged"),
      Phase::Packaged => write!(f, "packaged"),
    }
  }
}

/// The aggregate persisted between phases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
  pub tag: String,
  pub version: String,
  pub name: String,
  pub assets: Vec<Asset>,
}

impl ReleaseManifest {
  /// Build a fresh manifest with one empty asset per target
  ///
  /// Duplicate targets are kept; each one gets its own asset.
  pub fn plan<S: AsRef<str>>(tag: &ReleaseTag, name: &str, targets: &[S]) -> FezaResult<Self> {
    let assets = targets
      .iter()
      .map(|t| Asset::planned(t.as_ref(), name))
      .collect::<FezaResult<Vec<_>>>()?;

    Ok(Self {
      tag: tag.as_str().to_string(),
      version: tag.version().to_string(),
      name: name.to_string(),
      assets,
    })
  }

  /// Refuse to operate on a manifest planned for another tag
  pub fn ensure_tag(&self, tag: &ReleaseTag) -> FezaResult<()> {
    if self.tag != tag.as_str() {
      return Err(
        PreconditionError::TagMismatch {
          manifest: self.tag.clone(),
          given: tag.as_str().to_string(),
        }
        .into(),
      );
    }
    Ok(())
  }

  /// Refuse to publish until every asset carries a checksum
  pub fn ensure_packaged(&self) -> FezaResult<()> {
    if let Some(asset) = self.assets.iter().find(|a| a.sha256.is_empty()) {
      return Err(
        PreconditionError::AssetNotPackaged {
          filename: asset.filename.clone(),
        }
        .into(),
      );
    }
    Ok(())
  }

  /// First asset planned for `target`
  pub fn asset_by_target(&self, target: &str) -> Option<&Asset> {
    self.assets.iter().find(|a| a.target == target)
  }

  pub fn phase(&self) -> Phase {
    let packaged = self.assets.iter().filter(|a| a.is_packaged()).count();
    if packaged == 0 {
      Phase::Planned
    } else if packaged == self.assets.len() {
      Phase::Packaged
    } else {
      Phase::PartiallyPackaged
    }
  }
}

/// Split a comma-separated target list, trimming whitespace
pub fn parse_target_list(raw: &str) -> Vec<String> {
  raw.split(',').map(|t| t.trim().to_string()).collect()
}
