use crate::core::error::{FezaResult, ResultExt};
use crate::core::manifest::DEFAULT_TARGETS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Optional project configuration for feza
/// Searched in order: feza.toml, .feza.toml, .config/feza.toml
///
/// Every key is a default; command-line flags and environment variables win.
///
/// ```toml
/// name = "foo"
/// repo = "acme/foo"
/// targets = ["macos-arm64", "linux-amd64"]
///
/// [github]
/// draft = true
/// release_notes = ".github/release-notes.md"
///
/// [tap]
/// repo = "acme/homebrew-foo"
/// formula = "foo"
/// create = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FezaConfig {
  /// Tool name (fallback for --name)
  #[serde(default)]
  pub name: Option<String>,

  /// Repository identity `org/repo` (fallback after GITHUB_REPOSITORY)
  #[serde(default)]
  pub repo: Option<String>,

  /// Release host for download URLs (default: github.com)
  #[serde(default)]
  pub host: Option<String>,

  /// Targets planned when --targets is omitted
  #[serde(default)]
  pub targets: Option<Vec<String>>,

  /// Root holding `<target>/` binary directories (default: build)
  #[serde(default)]
  pub artifacts_dir: Option<PathBuf>,

  /// Archive output directory (default: dist)
  #[serde(default)]
  pub dist: Option<PathBuf>,

  #[serde(default)]
  pub github: GithubConfig,

  #[serde(default)]
  pub tap: TapConfig,
}

/// `[github]` publishing defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
  /// Create releases as drafts (default: true)
  #[serde(default = "default_draft")]
  pub draft: bool,

  /// Release notes template
  #[serde(default)]
  pub release_notes: Option<PathBuf>,
}

fn default_draft() -> bool {
  true
}

impl Default for GithubConfig {
  fn default() -> Self {
    Self {
      draft: default_draft(),
      release_notes: None,
    }
  }
}

/// `[tap]` distribution defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
  /// Tap repository `org/homebrew-name`
  #[serde(default)]
  pub repo: Option<String>,

  /// Formula name
  #[serde(default)]
  pub formula: Option<String>,

  /// Branch prefix for tap updates (default: "feza", giving `feza/<tag>`)
  #[serde(default = "default_branch_prefix")]
  pub branch_prefix: String,

  /// Formula template path
  #[serde(default)]
  pub template: Option<PathBuf>,

  #[serde(default)]
  pub desc: Option<String>,

  #[serde(default)]
  pub homepage: Option<String>,

  /// Create the tap repository when missing
  #[serde(default)]
  pub create: bool,

  /// Create a missing tap as a private repository
  #[serde(default)]
  pub private: bool,
}

fn default_branch_prefix() -> String {
  "feza".to_string()
}

impl Default for TapConfig {
  fn default() -> Self {
    Self {
      repo: None,
      formula: None,
      branch_prefix: default_branch_prefix(),
      template: None,
      desc: None,
      homepage: None,
      create: false,
      private: false,
    }
  }
}

impl FezaConfig {
  /// Find config file in search order: feza.toml, .feza.toml, .config/feza.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("feza.toml"),
      path.join(".feza.toml"),
      path.join(".config").join("feza.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load(path: &Path) -> FezaResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      tracing::debug!(root = %path.display(), "no feza.toml found, using defaults");
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: FezaConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
  }

  /// Configured targets, or the built-in default set
  pub fn default_targets(&self) -> Vec<String> {
    match &self.targets {
      Some(targets) if !targets.is_empty() => targets.clone(),
      _ => DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect(),
    }
  }

  pub fn host(&self) -> &str {
    self.host.as_deref().unwrap_or("github.com")
  }

  pub fn artifacts_dir(&self) -> PathBuf {
    self.artifacts_dir.clone().unwrap_or_else(|| PathBuf::from("build"))
  }

  pub fn dist_dir(&self) -> PathBuf {
    self.dist.clone().unwrap_or_else(|| PathBuf::from("dist"))
  }
}
