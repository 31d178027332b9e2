use crate::core::error::FezaResult;
use crate::core::host::GhCli;
use crate::core::manifest::ReleaseTag;
use crate::core::store::{FileStore, ManifestStore};
use crate::release::publish::{PublishOptions, publish_release};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GithubArgs {
  /// Release tag (e.g. v1.2.3)
  pub tag: String,
  /// Tool name (defaults to the planned name)
  #[arg(long)]
  pub name: Option<String>,
  /// Repository ORG/REPO (default: GITHUB_REPOSITORY)
  #[arg(long)]
  pub repo: Option<String>,
  /// Release notes template
  #[arg(long)]
  pub release_notes: Option<PathBuf>,
  /// Create the release as a draft [default: true]
  #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
  pub draft: Option<bool>,
  /// Directory holding the archives [default: dist]
  #[arg(long)]
  pub dist: Option<PathBuf>,
}

/// Run the github command
pub fn run_github(args: GithubArgs) -> FezaResult<()> {
  let (root, config) = super::load_project()?;
  let tag = ReleaseTag::parse(&args.tag)?;
  let store = FileStore::in_project(&root);

  if let Some(name) = args.name.as_deref() {
    super::warn_on_name_mismatch(name, &store.load()?.name);
  }

  let repo = super::repo_for(args.repo.as_deref(), &config)?;
  let dist_dir = super::under_root(&root, &args.dist.unwrap_or_else(|| config.dist_dir()));
  let release_notes = args
    .release_notes
    .or_else(|| config.github.release_notes.clone())
    .map(|p| super::under_root(&root, &p));
  let draft = args.draft.unwrap_or(config.github.draft);

  let host = GhCli::locate()?;
  let opts = PublishOptions {
    tag: &tag,
    repo: &repo,
    dist_dir: &dist_dir,
    draft,
    release_notes: release_notes.as_deref(),
  };
  let report = publish_release(&store, &host, &opts)?;

  if report.created {
    let kind = if draft { "draft release" } else { "release" };
    println!("🚀 Created {}: {}", kind, tag);
  } else {
    println!("🔁 Release {} already exists (updating)", tag);
  }
  for filename in &report.skipped {
    println!("   Asset already uploaded: {}", filename);
  }
  for filename in &report.uploaded {
    println!("   Uploaded: {}", filename);
  }
  println!();
  println!(
    "✅ {} uploaded, {} already present ({})",
    report.uploaded.len(),
    report.skipped.len(),
    repo
  );

  Ok(())
}
