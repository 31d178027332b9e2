//! Publisher: ensure the remote release exists and upload missing archives
//!
//! Re-running is safe. Assets already attached to the release are skipped,
//! so a run interrupted mid-upload can simply be repeated.

use crate::core::error::{FezaResult, NotFoundError, ResultExt};
use crate::core::host::{NewRelease, ReleaseHost};
use crate::core::manifest::{ReleaseManifest, ReleaseTag};
use crate::core::store::ManifestStore;
use crate::core::template::{self, TemplateContext};
use crate::release::asset_lookups;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Inputs for a publish run
#[derive(Debug, Clone)]
pub struct PublishOptions<'a> {
  pub tag: &'a ReleaseTag,
  pub repo: &'a str,
  pub dist_dir: &'a Path,
  pub draft: bool,
  /// Notes template; ignored with a warning when the file is missing
  pub release_notes: Option<&'a Path>,
}

/// What a publish run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
  /// The release object was created by this run
  pub created: bool,
  pub uploaded: Vec<String>,
  pub skipped: Vec<String>,
}

/// Markdown bullet list of archives and checksums
fn assets_markdown(manifest: &ReleaseManifest) -> String {
  manifest
    .assets
    .iter()
    .map(|a| format!("- `{}` (sha256: `{}`)", a.filename, a.sha256))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Template context for release notes
///
/// `assets` is the asset list (`filename`, `target`, `sha256`, `url`);
/// `assets_markdown` is the same list pre-rendered as bullets.
pub fn notes_context(manifest: &ReleaseManifest) -> TemplateContext {
  let (urls, shas) = asset_lookups(manifest);
  TemplateContext::new()
    .var("name", &manifest.name)
    .var("version", &manifest.version)
    .var("tag", &manifest.tag)
    .var("date", chrono::Utc::now().format("%Y-%m-%d").to_string())
    .value("assets", &manifest.assets)
    .var("assets_markdown", assets_markdown(manifest))
    .lookup("url_by", urls)
    .lookup("sha_by", shas)
}

/// Render the notes template into a temp file removed on drop
fn render_notes(path: &Path, manifest: &ReleaseManifest) -> FezaResult<NamedTempFile> {
  let body = template::render_file(path, &notes_context(manifest))?;
  let mut file = tempfile::Builder::new()
    .prefix("feza-notes-")
    .suffix(".md")
    .tempfile()
    .context("Failed to create release notes file")?;
  file.write_all(body.as_bytes())?;
  file.flush()?;
  Ok(file)
}

/// Every archive must be on disk before the host is contacted
fn local_archives(manifest: &ReleaseManifest, dist_dir: &Path) -> FezaResult<Vec<PathBuf>> {
  manifest
    .assets
    .iter()
    .map(|asset| {
      let path = dist_dir.join(&asset.filename);
      if path.is_file() {
        Ok(path)
      } else {
        Err(NotFoundError::AssetFile { path }.into())
      }
    })
    .collect()
}

/// Publish the packaged manifest to the host
pub fn publish_release(
  store: &dyn ManifestStore,
  host: &dyn ReleaseHost,
  opts: &PublishOptions<'_>,
) -> FezaResult<PublishReport> {
  let manifest = store.load()?;
  manifest.ensure_tag(opts.tag)?;
  manifest.ensure_packaged()?;
  let archives = local_archives(&manifest, opts.dist_dir)?;

  let mut report = PublishReport::default();
  let tag = manifest.tag.as_str();

  if !host.release_exists(opts.repo, tag)? {
    let notes = match opts.release_notes {
      Some(path) if path.is_file() => Some(render_notes(path, &manifest)?),
      Some(path) => {
        tracing::warn!(path = %path.display(), "release notes file not found, creating release without notes");
        None
      }
      None => None,
    };

    host.create_release(&NewRelease {
      repo: opts.repo,
      tag,
      title: tag,
      draft: opts.draft,
      notes_file: notes.as_ref().map(|f| f.path()),
    })?;
    tracing::info!(repo = opts.repo, tag, draft = opts.draft, "created release");
    report.created = true;
  }

  for (asset, path) in manifest.assets.iter().zip(&archives) {
    let existing = host.list_asset_names(opts.repo, tag)?;
    if existing.contains(&asset.filename) {
      tracing::debug!(asset = %asset.filename, "already uploaded");
      report.skipped.push(asset.filename.clone());
      continue;
    }

    host
      .upload_asset(opts.repo, tag, path)
      .with_context(|| format!("Failed to upload {}", asset.filename))?;
    report.uploaded.push(asset.filename.clone());
  }

  Ok(report)
}
