//! Error types for feza with contextual messages and exit codes
//!
//! Every phase error names the violated precondition and the offending value
//! (target, path, tag) so the operator can fix it without digging through logs.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for feza
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (missing files, missing credentials, invalid args)
  User = 1,
  /// System error (git, gh, I/O)
  System = 2,
  /// Validation or precondition failure (bad tag, dirty tree, tag mismatch)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for feza
#[derive(Debug)]
pub enum FezaError {
  /// Malformed tag, version, or target
  Validation(ValidationError),

  /// A phase prerequisite does not hold
  Precondition(PreconditionError),

  /// Missing binary, file, or directory
  NotFound(NotFoundError),

  /// No credential could be resolved
  Auth(AuthError),

  /// An external tool (git, gh) failed
  External(ExternalToolError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl FezaError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    FezaError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    FezaError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Structured errors keep their variant (and exit code); only free-form
  /// messages and I/O errors absorb the context.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      FezaError::Message { message, context, help } => FezaError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      FezaError::Io(e) => FezaError::Message {
        message: format!("{}: {}", ctx_str, e),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      FezaError::Validation(_) | FezaError::Precondition(_) => ExitCode::Validation,
      FezaError::NotFound(_) | FezaError::Auth(_) | FezaError::Message { .. } => ExitCode::User,
      FezaError::External(_) | FezaError::Io(_) => ExitCode::System,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      FezaError::Validation(e) => e.help_message(),
      FezaError::Precondition(e) => e.help_message(),
      FezaError::NotFound(e) => e.help_message(),
      FezaError::Auth(e) => e.help_message(),
      FezaError::External(e) => e.help_message(),
      FezaError::Message { help, .. } => help.clone(),
      FezaError::Io(_) => None,
    }
  }
}

impl fmt::Display for FezaError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FezaError::Validation(e) => write!(f, "{}", e),
      FezaError::Precondition(e) => write!(f, "{}", e),
      FezaError::NotFound(e) => write!(f, "{}", e),
      FezaError::Auth(e) => write!(f, "{}", e),
      FezaError::External(e) => write!(f, "{}", e),
      FezaError::Io(e) => write!(f, "I/O error: {}", e),
      FezaError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for FezaError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      FezaError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for FezaError {
  fn from(err: io::Error) -> Self {
    FezaError::Io(err)
  }
}

impl From<String> for FezaError {
  fn from(msg: String) -> Self {
    FezaError::message(msg)
  }
}

impl From<&str> for FezaError {
  fn from(msg: &str) -> Self {
    FezaError::message(msg)
  }
}

impl From<ValidationError> for FezaError {
  fn from(err: ValidationError) -> Self {
    FezaError::Validation(err)
  }
}

impl From<PreconditionError> for FezaError {
  fn from(err: PreconditionError) -> Self {
    FezaError::Precondition(err)
  }
}

impl From<NotFoundError> for FezaError {
  fn from(err: NotFoundError) -> Self {
    FezaError::NotFound(err)
  }
}

impl From<AuthError> for FezaError {
  fn from(err: AuthError) -> Self {
    FezaError::Auth(err)
  }
}

impl From<ExternalToolError> for FezaError {
  fn from(err: ExternalToolError) -> Self {
    FezaError::External(err)
  }
}

impl From<toml_edit::TomlError> for FezaError {
  fn from(err: toml_edit::TomlError) -> Self {
    FezaError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for FezaError {
  fn from(err: toml_edit::de::Error) -> Self {
    FezaError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for FezaError {
  fn from(err: serde_json::Error) -> Self {
    FezaError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for FezaError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    FezaError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<anyhow::Error> for FezaError {
  fn from(err: anyhow::Error) -> Self {
    FezaError::message(err.to_string())
  }
}

/// Malformed input
#[derive(Debug)]
pub enum ValidationError {
  /// Tag does not match `vMAJOR.MINOR.PATCH`
  InvalidTagFormat { tag: String },

  /// Target is not `<os>-<arch>`
  InvalidTargetFormat { target: String },

  /// Version does not match `MAJOR.MINOR.PATCH`
  InvalidVersionFormat { version: String },

  /// Requested version equals the declared one
  VersionUnchanged { version: String },

  /// `--push` given without `--commit`
  PushRequiresCommit,

  /// A template could not be rendered
  Template { message: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::InvalidTagFormat { .. } => Some("Tags look like v1.2.3".to_string()),
      ValidationError::InvalidTargetFormat { .. } => {
        Some("Targets are <os>-<arch>, e.g. macos-arm64 or linux-amd64".to_string())
      }
      ValidationError::InvalidVersionFormat { .. } => Some("Versions look like 1.2.3 (no leading v)".to_string()),
      ValidationError::PushRequiresCommit => Some("Add --commit, or drop --push".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::InvalidTagFormat { tag } => {
        write!(f, "Invalid tag format: tag must match ^v\\d+\\.\\d+\\.\\d+$ (got: {})", tag)
      }
      ValidationError::InvalidTargetFormat { target } => write!(f, "Invalid target format: {}", target),
      ValidationError::InvalidVersionFormat { version } => {
        write!(f, "Invalid version format: must match ^\\d+\\.\\d+\\.\\d+$ (got: {})", version)
      }
      ValidationError::VersionUnchanged { version } => write!(f, "Version unchanged: already at {}", version),
      ValidationError::PushRequiresCommit => write!(f, "--push requires --commit"),
      ValidationError::Template { message } => write!(f, "Template error: {}", message),
    }
  }
}

/// A phase prerequisite does not hold
#[derive(Debug)]
pub enum PreconditionError {
  /// Working tree has uncommitted changes
  DirtyWorkingTree,

  /// Manifest belongs to another tag
  TagMismatch { manifest: String, given: String },

  /// No manifest on disk
  ManifestNotFound { path: String },

  /// `--target` names a target that was never planned
  TargetNotPlanned { target: String },

  /// Asset has no checksum yet
  AssetNotPackaged { filename: String },

  /// No repository identity for URLs or releases
  MissingRepo,

  /// Tap or formula could not be resolved
  MissingTapSettings { field: String },

  /// Tap repository does not exist and may not be created
  TapRepoMissing { repo: String },

  /// Input needed but the run is unattended
  NonInteractive { needed: String },
}

impl PreconditionError {
  fn help_message(&self) -> Option<String> {
    match self {
      PreconditionError::DirtyWorkingTree => Some("Commit or stash changes before planning.".to_string()),
      PreconditionError::TagMismatch { given, .. } => Some(format!("Re-run `feza plan {}` first.", given)),
      PreconditionError::ManifestNotFound { .. } => Some("Run `feza plan <tag> --name <tool>` first.".to_string()),
      PreconditionError::AssetNotPackaged { .. } => Some("Run `feza build <tag>` before publishing.".to_string()),
      PreconditionError::MissingRepo => {
        Some("Pass --repo ORG/REPO, set GITHUB_REPOSITORY, or add `repo` to feza.toml.".to_string())
      }
      PreconditionError::MissingTapSettings { field } => Some(format!(
        "Pass --{}, set it under [tap] in feza.toml, or use --auto.",
        field
      )),
      PreconditionError::TapRepoMissing { .. } => Some("Pass --create-tap to create it.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for PreconditionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PreconditionError::DirtyWorkingTree => write!(f, "Working tree is dirty"),
      PreconditionError::TagMismatch { manifest, given } => {
        write!(f, "Manifest tag ({}) does not match CLI arg ({})", manifest, given)
      }
      PreconditionError::ManifestNotFound { path } => write!(f, "Manifest not found at {}", path),
      PreconditionError::TargetNotPlanned { target } => write!(f, "Target {} is not in the manifest", target),
      PreconditionError::AssetNotPackaged { filename } => {
        write!(f, "Asset {} missing sha256 in manifest", filename)
      }
      PreconditionError::MissingRepo => write!(f, "Repository not specified"),
      PreconditionError::MissingTapSettings { field } => write!(f, "Missing tap setting: {}", field),
      PreconditionError::TapRepoMissing { repo } => write!(f, "Tap repository {} does not exist", repo),
      PreconditionError::NonInteractive { needed } => {
        write!(f, "Cannot ask for {} in non-interactive mode", needed)
      }
    }
  }
}

/// Missing file system entries or document fields
#[derive(Debug)]
pub enum NotFoundError {
  /// `<artifacts>/<target>` is missing
  ArtifactsDir { path: PathBuf },

  /// No file with the tool-name prefix in the target directory
  Binary { dir: PathBuf, prefix: String },

  /// Packaged archive missing from the dist directory
  AssetFile { path: PathBuf },

  /// No project file to bump
  ProjectFile { path: PathBuf },

  /// The project version field could not be located
  VersionField { path: PathBuf },
}

impl NotFoundError {
  fn help_message(&self) -> Option<String> {
    match self {
      NotFoundError::ArtifactsDir { .. } | NotFoundError::Binary { .. } => {
        Some("Place each binary under <artifacts-dir>/<target>/ (see --artifacts-dir).".to_string())
      }
      NotFoundError::AssetFile { .. } => Some("Re-run `feza build <tag>` with the same --dist.".to_string()),
      NotFoundError::ProjectFile { .. } => Some("Pass --file pointing at Cargo.toml or pyproject.toml.".to_string()),
      NotFoundError::VersionField { .. } => None,
    }
  }
}

impl fmt::Display for NotFoundError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NotFoundError::ArtifactsDir { path } => write!(f, "Artifacts directory not found: {}", path.display()),
      NotFoundError::Binary { dir, prefix } => {
        write!(f, "Binary not found in {} (looking for {}*)", dir.display(), prefix)
      }
      NotFoundError::AssetFile { path } => write!(f, "Asset file not found: {}", path.display()),
      NotFoundError::ProjectFile { path } => write!(f, "Project file not found: {}", path.display()),
      NotFoundError::VersionField { path } => {
        write!(f, "Could not locate the project version field in {}", path.display())
      }
    }
  }
}

/// Credential resolution failures
#[derive(Debug)]
pub enum AuthError {
  /// Every credential source came up empty
  NoCredential { tried: Vec<String> },
}

impl AuthError {
  fn help_message(&self) -> Option<String> {
    match self {
      AuthError::NoCredential { .. } => Some("Run `gh auth login`, or export TAP_PAT or GITHUB_TOKEN.".to_string()),
    }
  }
}

impl fmt::Display for AuthError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AuthError::NoCredential { tried } => write!(f, "No credential found (tried: {})", tried.join(", ")),
    }
  }
}

/// Failures of the external git/gh tools
#[derive(Debug)]
pub enum ExternalToolError {
  /// Command ran and exited non-zero
  CommandFailed { command: String, stderr: String },

  /// Tool binary missing from PATH
  ToolMissing { tool: String },
}

impl ExternalToolError {
  fn help_message(&self) -> Option<String> {
    match self {
      ExternalToolError::CommandFailed { stderr, .. } => {
        if stderr.contains("not a git repository") {
          Some("Run feza from inside a git checkout.".to_string())
        } else if stderr.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Pull first.".to_string())
        } else if stderr.contains("403") || stderr.contains("Permission denied") {
          Some("Check the token's write access to the repository.".to_string())
        } else {
          None
        }
      }
      ExternalToolError::ToolMissing { tool } => Some(format!("Install `{}` and make sure it is on PATH.", tool)),
    }
  }
}

impl fmt::Display for ExternalToolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ExternalToolError::CommandFailed { command, stderr } => {
        write!(f, "Command failed: {}\n{}", command, stderr.trim_end())
      }
      ExternalToolError::ToolMissing { tool } => write!(f, "Required tool not found: {}", tool),
    }
  }
}

/// Result type alias for feza
pub type FezaResult<T> = Result<T, FezaError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> FezaResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> FezaResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<FezaError>,
{
  fn context(self, ctx: impl Into<String>) -> FezaResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> FezaResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &FezaError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
