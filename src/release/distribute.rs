//! Distributor: render the Homebrew formula and land it on a tap branch
//!
//! ```text
//! resolve tap ─▶ render formula ─▶ checkout (clone | create | local scaffold)
//!            ─▶ branch + commit ─▶ push (ambient, then embedded) ─▶ PR
//! ```
//!
//! The checkout lives in a temp directory removed on every exit path.

use crate::core::auth::{Credential, PushStrategy, credential_url, plain_url};
use crate::core::config::TapConfig;
use crate::core::error::{FezaError, FezaResult, PreconditionError, ResultExt};
use crate::core::host::{ChangeRequest, ReleaseHost, Visibility};
use crate::core::manifest::{ReleaseManifest, ReleaseTag, Target};
use crate::core::prompt::Prompter;
use crate::core::template::{self, TemplateContext};
use crate::core::vcs::GitClient;
use crate::release::asset_lookups;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Built-in formula template
pub const DEFAULT_FORMULA_TEMPLATE: &str = include_str!("../../templates/formula.rb.tmpl");

/// Branch every tap repository starts with
const SCAFFOLD_BRANCH: &str = "main";

/// Inputs for a tap update
#[derive(Debug, Clone)]
pub struct TapOptions<'a> {
  pub tag: &'a ReleaseTag,
  /// Tap repository `org/homebrew-name`
  pub tap: &'a str,
  pub formula: &'a str,
  /// Source repository, used for the default homepage
  pub repo: Option<&'a str>,
  /// Git host, e.g. `github.com`
  pub host: &'a str,
  /// Explicit branch; defaults to `<branch_prefix>/<tag>`
  pub branch: Option<&'a str>,
  pub branch_prefix: &'a str,
  pub template: Option<&'a Path>,
  pub desc: Option<&'a str>,
  pub homepage: Option<&'a str>,
  pub open_pr: bool,
  pub dry_run: bool,
  pub create_tap: bool,
  /// Visibility for a newly created tap
  pub private_tap: bool,
}

/// Collaborators the distributor drives
#[derive(Clone, Copy)]
pub struct TapServices<'a> {
  pub git: &'a dyn GitClient,
  pub host: &'a dyn ReleaseHost,
  pub prompter: &'a dyn Prompter,
}

/// What a tap update did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapReport {
  pub tap: String,
  pub branch: String,
  /// Path of the formula inside the tap
  pub formula_path: PathBuf,
  /// Rendered formula text
  pub formula: String,
  /// Strategy that pushed the branch; `None` on dry-run
  pub pushed: Option<PushStrategy>,
  pub pr_url: Option<String>,
  pub created_tap: bool,
}

/// Resolve tap and formula names: flag, then `[tap]` config, then `--auto`
///
/// `--auto` derives the formula from the tool name and the tap from the
/// repository owner: `<org>/homebrew-<name>`.
pub fn resolve_tap_settings(
  tap: Option<&str>,
  formula: Option<&str>,
  config: &TapConfig,
  auto: bool,
  name: &str,
  repo: Option<&str>,
) -> FezaResult<(String, String)> {
  let formula = formula
    .map(str::to_string)
    .or_else(|| config.formula.clone())
    .or_else(|| auto.then(|| name.to_string()))
    .filter(|f| !f.is_empty())
    .ok_or_else(|| PreconditionError::MissingTapSettings {
      field: "formula".to_string(),
    })?;

  let auto_tap = || {
    repo
      .and_then(|r| r.split_once('/'))
      .map(|(org, _)| format!("{}/homebrew-{}", org, name))
  };
  let tap = tap
    .map(str::to_string)
    .or_else(|| config.repo.clone())
    .or_else(|| if auto { auto_tap() } else { None })
    .filter(|t| !t.is_empty())
    .ok_or_else(|| PreconditionError::MissingTapSettings {
      field: "tap".to_string(),
    })?;

  Ok((tap, formula))
}

/// CamelCase class name for a formula: `my-tool` becomes `MyTool`
pub fn formula_class(formula: &str) -> String {
  formula
    .split(['-', '_', '.'])
    .filter(|part| !part.is_empty())
    .map(|part| {
      let mut chars = part.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
      }
    })
    .collect()
}

/// One `on_<cpu>` block of a formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaBuild {
  pub cpu: &'static str,
  pub url: String,
  pub sha256: String,
}

/// One `on_<os>` block of a formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaPlatform {
  pub os: &'static str,
  pub builds: Vec<FormulaBuild>,
}

/// Platform blocks for the packaged assets, in manifest order
///
/// Unpackaged assets, repeated targets and targets Homebrew has no block for
/// are left out, so the formula never carries an empty `url`.
pub fn formula_platforms(manifest: &ReleaseManifest) -> Vec<FormulaPlatform> {
  let mut platforms: Vec<FormulaPlatform> = Vec::new();

  for asset in manifest.assets.iter().filter(|a| a.is_packaged()) {
    let Ok(target) = Target::parse(&asset.target) else {
      continue;
    };
    let (Some(os), Some(cpu)) = (target.formula_os(), target.formula_cpu()) else {
      tracing::debug!(target = %asset.target, "no Homebrew block for target");
      continue;
    };

    let build = FormulaBuild {
      cpu,
      url: asset.url.clone(),
      sha256: asset.sha256.clone(),
    };
    match platforms.iter_mut().find(|p| p.os == os) {
      Some(platform) if platform.builds.iter().any(|b| b.cpu == cpu) => {}
      Some(platform) => platform.builds.push(build),
      None => platforms.push(FormulaPlatform {
        os,
        builds: vec![build],
      }),
    }
  }

  platforms
}

/// Escape text for a double-quoted Ruby string
fn ruby_string(text: &str) -> String {
  text.replace('\\', "\\\\").replace('"', "\\\"").replace("#{", "\\#{")
}

/// Template context for the formula
///
/// `desc` and `homepage` are escaped for Ruby string literals.
pub fn formula_context(manifest: &ReleaseManifest, opts: &TapOptions<'_>) -> TemplateContext {
  let (urls, shas) = asset_lookups(manifest);
  let homepage = opts
    .homepage
    .map(str::to_string)
    .unwrap_or_else(|| format!("https://github.com/{}", opts.repo.unwrap_or("unknown/repo")));

  TemplateContext::new()
    .var("formula_name", opts.formula)
    .var("formula_class", formula_class(opts.formula))
    .var("name", &manifest.name)
    .var("version", &manifest.version)
    .var("tag", &manifest.tag)
    .var("desc", ruby_string(opts.desc.unwrap_or("CLI tool")))
    .var("homepage", ruby_string(&homepage))
    .value("assets", &manifest.assets)
    .value("platforms", &formula_platforms(manifest))
    .lookup("url_by", urls)
    .lookup("sha_by", shas)
}

/// Render the formula from `--formula-template` or the built-in template
pub fn render_formula(manifest: &ReleaseManifest, opts: &TapOptions<'_>) -> FezaResult<String> {
  let ctx = formula_context(manifest, opts);
  match opts.template {
    Some(path) => template::render_file(path, &ctx),
    None => template::render(DEFAULT_FORMULA_TEMPLATE, &ctx),
  }
}

/// `brew tap` name: `org/homebrew-foo` becomes `org/foo`
fn brew_tap_name(tap: &str) -> String {
  match tap.split_once('/') {
    Some((org, repo)) => format!("{}/{}", org, repo.strip_prefix("homebrew-").unwrap_or(repo)),
    None => tap.to_string(),
  }
}

/// Write the initial tap layout into `dir` and commit it
fn write_scaffold(git: &dyn GitClient, dir: &Path, tap: &str, formula: &str, name: &str) -> FezaResult<()> {
  git.init(dir, SCAFFOLD_BRANCH)?;
  fs::create_dir_all(dir.join("Formula"))?;
  fs::write(dir.join("Formula").join(".gitkeep"), "")?;

  let readme = format!(
    "# {tap}\n\nHomebrew tap for {name}.\n\n## Install\n\n```sh\nbrew tap {short}\nbrew install {formula}\n```\n",
    tap = tap,
    name = name,
    short = brew_tap_name(tap),
    formula = formula,
  );
  fs::write(dir.join("README.md"), readme)?;

  git.add(dir, &[Path::new("Formula/.gitkeep"), Path::new("README.md")])?;
  git.commit(dir, &format!("Initialize tap for {}", name))?;
  Ok(())
}

/// Push `branch` trying each strategy in order; the last failure is returned
fn push_with_fallback(
  git: &dyn GitClient,
  dir: &Path,
  host: &str,
  tap: &str,
  credential: &Credential,
  branch: &str,
) -> FezaResult<PushStrategy> {
  let mut last_err: Option<FezaError> = None;
  for strategy in PushStrategy::ORDER {
    match git.push(dir, &strategy.remote(host, tap, credential), branch) {
      Ok(()) => {
        tracing::info!(%strategy, branch, "pushed");
        return Ok(strategy);
      }
      Err(e) => {
        tracing::warn!(%strategy, "push failed, trying next strategy");
        last_err = Some(e);
      }
    }
  }
  Err(last_err.unwrap_or_else(|| FezaError::message("no push strategy available")))
}

/// Clone the tap, falling back to the credential URL
///
/// After an embedded-credential clone `origin` is reset so the token does not
/// stay in `.git/config`.
fn clone_tap(git: &dyn GitClient, dest: &Path, host: &str, tap: &str, credential: &Credential) -> FezaResult<()> {
  let plain = plain_url(host, tap);
  if let Err(e) = git.clone_shallow(&plain, dest) {
    tracing::debug!(error = %e, "plain clone failed, retrying with credential");
    if dest.exists() {
      fs::remove_dir_all(dest)?;
    }
    git
      .clone_shallow(&credential_url(host, tap, credential), dest)
      .with_context(|| format!("Failed to clone {}", tap))?;
    git.set_remote_url(dest, "origin", &plain)?;
  }
  Ok(())
}

/// Whether a missing tap may be created: flag, or operator confirmation
fn may_create_tap(prompter: &dyn Prompter, opts: &TapOptions<'_>) -> FezaResult<bool> {
  if opts.create_tap {
    return Ok(true);
  }
  if prompter.is_interactive() {
    return prompter.confirm(&format!("Tap {} does not exist. Create it?", opts.tap));
  }
  Ok(false)
}

/// Render the formula and land it on a branch of the tap repository
pub fn distribute(
  manifest: &ReleaseManifest,
  credential: &Credential,
  services: TapServices<'_>,
  opts: &TapOptions<'_>,
) -> FezaResult<TapReport> {
  manifest.ensure_tag(opts.tag)?;
  let formula = render_formula(manifest, opts)?;
  let TapServices { git, host, prompter } = services;

  let workdir = TempDir::with_prefix("feza-tap-").context("Failed to create tap checkout directory")?;
  let checkout = workdir.path().join("tap");
  let mut created_tap = false;

  if host.repo_exists(opts.tap)? {
    clone_tap(git, &checkout, opts.host, opts.tap, credential)?;
  } else if !may_create_tap(prompter, opts)? {
    return Err(
      PreconditionError::TapRepoMissing {
        repo: opts.tap.to_string(),
      }
      .into(),
    );
  } else if opts.dry_run {
    tracing::info!(tap = opts.tap, "tap missing, scaffolding locally for dry-run");
    write_scaffold(git, &checkout, opts.tap, opts.formula, &manifest.name)?;
  } else {
    let visibility = if opts.private_tap { Visibility::Private } else { Visibility::Public };
    host.create_repo(opts.tap, visibility, &format!("Homebrew tap for {}", manifest.name))?;
    write_scaffold(git, &checkout, opts.tap, opts.formula, &manifest.name)?;
    push_with_fallback(git, &checkout, opts.host, opts.tap, credential, SCAFFOLD_BRANCH)?;
    created_tap = true;
  }

  let branch = opts
    .branch
    .map(str::to_string)
    .unwrap_or_else(|| format!("{}/{}", opts.branch_prefix, opts.tag));
  git.checkout_new_branch(&checkout, &branch)?;

  let formula_path = PathBuf::from("Formula").join(format!("{}.rb", opts.formula));
  fs::create_dir_all(checkout.join("Formula"))?;
  fs::write(checkout.join(&formula_path), &formula)
    .with_context(|| format!("Failed to write {}", formula_path.display()))?;

  let title = format!("Update {} to {}", opts.formula, opts.tag);
  git.add(&checkout, &[formula_path.as_path()])?;
  git.commit(&checkout, &title)?;

  let mut report = TapReport {
    tap: opts.tap.to_string(),
    branch,
    formula_path,
    formula,
    pushed: None,
    pr_url: None,
    created_tap,
  };

  if opts.dry_run {
    tracing::info!(branch = %report.branch, "dry-run, not pushing");
    return Ok(report);
  }

  report.pushed = Some(push_with_fallback(
    git,
    &checkout,
    opts.host,
    opts.tap,
    credential,
    &report.branch,
  )?);

  if opts.open_pr {
    let base = host.default_branch(opts.tap)?;
    let body = format!("Automated update via feza for {}", opts.tag);
    let url = host.open_change_request(&ChangeRequest {
      repo: opts.tap,
      base: &base,
      head: &report.branch,
      title: &title,
      body: &body,
    })?;
    report.pr_url = Some(url);
  }

  Ok(report)
}
