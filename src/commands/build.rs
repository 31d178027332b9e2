use crate::core::error::FezaResult;
use crate::core::manifest::ReleaseTag;
use crate::core::store::{FileStore, ManifestStore};
use crate::release::package::{PackageOptions, package_release};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Release tag (e.g. v1.2.3)
  pub tag: String,
  /// Tool name (defaults to the planned name)
  #[arg(long)]
  pub name: Option<String>,
  /// Directory holding one <target>/ directory per target [default: build]
  #[arg(long)]
  pub artifacts_dir: Option<PathBuf>,
  /// Archive output directory [default: dist]
  #[arg(long)]
  pub dist: Option<PathBuf>,
  /// Repository ORG/REPO for download URLs (default: GITHUB_REPOSITORY)
  #[arg(long)]
  pub repo: Option<String>,
  /// Package only this target
  #[arg(long)]
  pub target: Option<String>,
}

/// Run the build command
pub fn run_build(args: BuildArgs) -> FezaResult<()> {
  let (root, config) = super::load_project()?;
  let tag = ReleaseTag::parse(&args.tag)?;
  let store = FileStore::in_project(&root);

  let repo = super::repo_for(args.repo.as_deref(), &config)?;
  let artifacts_dir = super::under_root(&root, &args.artifacts_dir.unwrap_or_else(|| config.artifacts_dir()));
  let dist_dir = super::under_root(&root, &args.dist.unwrap_or_else(|| config.dist_dir()));

  let opts = PackageOptions {
    tag: &tag,
    artifacts_dir: &artifacts_dir,
    dist_dir: &dist_dir,
    repo: &repo,
    host: config.host(),
    only_target: args.target.as_deref(),
  };

  if let Some(name) = args.name.as_deref() {
    super::warn_on_name_mismatch(name, &store.load()?.name);
  }

  let packaged = package_release(&store, &opts)?;
  for asset in &packaged {
    println!("📦 Packaged: {} (SHA256: {}...)", asset.filename, super::short_sha(&asset.sha256));
  }
  println!();
  println!("✅ Updated manifest: {}", store.path().display());

  Ok(())
}
