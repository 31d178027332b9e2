//! Version Bumper: rewrite a project's declared version in place
//!
//! Two strategies, tried in order:
//!
//! 1. structured: `toml_edit` sets `version` in the primary section, keeping
//!    formatting and comments
//! 2. line scan: replace the first `version = "..."` line inside the section's
//!    header-bounded block (covers files `toml_edit` refuses to parse)

use crate::core::error::{FezaResult, NotFoundError, ResultExt, ValidationError};
use crate::core::prompt::Prompter;
use crate::core::vcs::GitClient;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use toml_edit::{DocumentMut, TableLike, Value};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid version regex"));

static VERSION_LINE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"^(\s*version\s*=\s*)(["'])([^"']*)(["'].*)$"#).expect("valid version line regex"));

/// Project file flavors with a version field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
  Cargo,
  Pyproject,
}

impl ProjectKind {
  /// Project files looked for in the working directory, in order
  pub const CANDIDATES: [(&'static str, ProjectKind); 2] =
    [("Cargo.toml", ProjectKind::Cargo), ("pyproject.toml", ProjectKind::Pyproject)];

  /// Kind of an explicitly named file; anything not called pyproject.toml is
  /// treated as a Cargo manifest
  pub fn of(path: &Path) -> Self {
    match path.file_name().and_then(|n| n.to_str()) {
      Some("pyproject.toml") => ProjectKind::Pyproject,
      _ => ProjectKind::Cargo,
    }
  }

  /// Sections that may hold the primary version, most specific first
  fn sections(self) -> &'static [&'static [&'static str]] {
    match self {
      ProjectKind::Cargo => &[&["package"]],
      ProjectKind::Pyproject => &[&["project"], &["tool", "poetry"]],
    }
  }
}

/// Inputs for a bump
#[derive(Debug, Clone, Default)]
pub struct BumpOptions<'a> {
  /// New version; prompted for when absent
  pub version: Option<&'a str>,
  pub commit: bool,
  pub push: bool,
  /// Project file; auto-detected in the root when absent
  pub file: Option<&'a Path>,
}

/// What a bump did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpReport {
  pub file: PathBuf,
  pub previous: String,
  pub version: String,
  pub committed: bool,
  /// Branch pushed to `origin`
  pub pushed: Option<String>,
}

/// Find the project file in `root`: Cargo.toml, then pyproject.toml
pub fn detect_project_file(root: &Path) -> FezaResult<(PathBuf, ProjectKind)> {
  ProjectKind::CANDIDATES
    .iter()
    .map(|(name, kind)| (root.join(name), *kind))
    .find(|(path, _)| path.is_file())
    .ok_or_else(|| {
      NotFoundError::ProjectFile {
        path: root.join("Cargo.toml"),
      }
      .into()
    })
}

fn section<'d>(doc: &'d DocumentMut, path: &[&str]) -> Option<&'d dyn TableLike> {
  let mut table: &dyn TableLike = doc.as_table();
  for key in path {
    table = table.get(key)?.as_table_like()?;
  }
  Some(table)
}

fn section_mut<'d>(doc: &'d mut DocumentMut, path: &[&str]) -> Option<&'d mut dyn TableLike> {
  let mut table: &mut dyn TableLike = doc.as_table_mut();
  for key in path {
    table = table.get_mut(key)?.as_table_like_mut()?;
  }
  Some(table)
}

/// Line range `[start, end)` of a section's body
fn section_lines(lines: &[&str], path: &[&str]) -> Option<(usize, usize)> {
  let header = format!("[{}]", path.join("."));
  let start = lines.iter().position(|l| l.trim() == header)? + 1;
  let end = lines[start..]
    .iter()
    .position(|l| l.trim_start().starts_with('['))
    .map_or(lines.len(), |offset| start + offset);
  Some((start, end))
}

fn scan_version(content: &str, path: &[&str]) -> Option<(usize, String)> {
  let lines: Vec<&str> = content.lines().collect();
  let (start, end) = section_lines(&lines, path)?;
  (start..end).find_map(|i| VERSION_LINE_RE.captures(lines[i]).map(|caps| (i, caps[3].to_string())))
}

/// Declared version of the project, if any
pub fn read_version(content: &str, kind: ProjectKind) -> Option<String> {
  if let Ok(doc) = content.parse::<DocumentMut>() {
    return kind.sections().iter().find_map(|path| {
      section(&doc, path)
        .and_then(|t| t.get("version"))
        .and_then(|item| item.as_str())
        .map(str::to_string)
    });
  }
  kind
    .sections()
    .iter()
    .find_map(|path| scan_version(content, path).map(|(_, v)| v))
}

/// Content with the primary version replaced, or `None` if no field was found
pub fn rewrite_version(content: &str, kind: ProjectKind, version: &str) -> Option<String> {
  if let Ok(mut doc) = content.parse::<DocumentMut>() {
    for path in kind.sections() {
      let Some(value) = section_mut(&mut doc, path)
        .and_then(|t| t.get_mut("version"))
        .and_then(|item| item.as_value_mut())
        .filter(|v| v.is_str())
      else {
        continue;
      };
      let decor = value.decor().clone();
      *value = Value::from(version);
      *value.decor_mut() = decor;
      return Some(doc.to_string());
    }
  }

  for path in kind.sections() {
    if let Some((index, _)) = scan_version(content, path) {
      let mut out: Vec<String> = content.lines().map(str::to_string).collect();
      out[index] = VERSION_LINE_RE
        .replace(&out[index], |caps: &regex::Captures<'_>| {
          format!("{}{}{}{}", &caps[1], &caps[2], version, &caps[4])
        })
        .into_owned();
      let mut rewritten = out.join("\n");
      if content.ends_with('\n') {
        rewritten.push('\n');
      }
      return Some(rewritten);
    }
  }
  None
}

/// Bump the project version, optionally committing and pushing
pub fn bump_version(
  root: &Path,
  git: &dyn GitClient,
  prompter: &dyn Prompter,
  opts: &BumpOptions<'_>,
) -> FezaResult<BumpReport> {
  if opts.push && !opts.commit {
    return Err(ValidationError::PushRequiresCommit.into());
  }

  let (file, kind) = match opts.file {
    Some(path) if path.is_file() => (path.to_path_buf(), ProjectKind::of(path)),
    Some(path) => return Err(NotFoundError::ProjectFile { path: path.to_path_buf() }.into()),
    None => detect_project_file(root)?,
  };

  let content = fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
  let previous =
    read_version(&content, kind).ok_or_else(|| NotFoundError::VersionField { path: file.clone() })?;

  let version = match opts.version {
    Some(v) => v.trim().to_string(),
    None => prompter
      .ask(&format!("New version (current {}):", previous))?
      .trim()
      .to_string(),
  };

  if !VERSION_RE.is_match(&version) {
    return Err(ValidationError::InvalidVersionFormat { version }.into());
  }
  if version == previous {
    return Err(ValidationError::VersionUnchanged { version }.into());
  }
  if let (Ok(old), Ok(new)) = (semver::Version::parse(&previous), semver::Version::parse(&version))
    && new < old
  {
    tracing::warn!(%old, %new, "new version is lower than the current one");
  }

  let rewritten =
    rewrite_version(&content, kind, &version).ok_or_else(|| NotFoundError::VersionField { path: file.clone() })?;
  fs::write(&file, rewritten).with_context(|| format!("Failed to write {}", file.display()))?;
  tracing::info!(file = %file.display(), %previous, %version, "bumped version");

  let mut report = BumpReport {
    file: file.clone(),
    previous,
    version,
    committed: false,
    pushed: None,
  };

  if opts.commit {
    let dir = file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(root);
    let name = file.file_name().map(Path::new).unwrap_or(file.as_path());
    git.add(dir, &[name])?;
    git.commit(dir, &format!("Bump version to {}", report.version))?;
    report.committed = true;

    if opts.push {
      let branch = git.current_branch(dir)?;
      git.push(dir, "origin", &branch)?;
      report.pushed = Some(branch);
    }
  }

  Ok(report)
}
