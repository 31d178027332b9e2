//! Packager: archive binaries, checksum archives, fill in the manifest
//!
//! The manifest is written once, after every selected asset is packaged. A
//! failure part-way leaves the stored manifest untouched (archives already
//! written to the dist directory stay and are overwritten on retry).

use crate::core::error::{FezaResult, NotFoundError, PreconditionError, ResultExt};
use crate::core::manifest::ReleaseTag;
use crate::core::store::ManifestStore;
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Inputs for a packaging run
#[derive(Debug, Clone)]
pub struct PackageOptions<'a> {
  pub tag: &'a ReleaseTag,
  /// Root holding one `<target>/` directory per target
  pub artifacts_dir: &'a Path,
  /// Where archives are written (created if absent)
  pub dist_dir: &'a Path,
  /// `org/repo` used in download URLs
  pub repo: &'a str,
  /// Download host, e.g. `github.com`
  pub host: &'a str,
  /// Package only this target
  pub only_target: Option<&'a str>,
}

/// One archive produced by a packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedAsset {
  pub target: String,
  pub filename: String,
  pub path: PathBuf,
  pub sha256: String,
  pub url: String,
}

/// `https://<host>/<repo>/releases/download/<tag>/<filename>`
pub fn download_url(host: &str, repo: &str, tag: &str, filename: &str) -> String {
  format!("https://{}/{}/releases/download/{}/{}", host, repo, tag, filename)
}

/// Locate the binary for one target
///
/// Takes the first regular file (in directory order) whose name starts with
/// `prefix`. Directory order is filesystem-dependent, so with several matches
/// the choice is not portable; a warning lists them.
pub fn find_binary(dir: &Path, prefix: &str) -> FezaResult<PathBuf> {
  if !dir.is_dir() {
    return Err(NotFoundError::ArtifactsDir { path: dir.to_path_buf() }.into());
  }

  let mut matches = Vec::new();
  for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
    let entry = entry?;
    let path = entry.path();
    if path.is_file() && entry.file_name().to_string_lossy().starts_with(prefix) {
      matches.push(path);
    }
  }
  matches.sort();

  if matches.len() > 1 {
    tracing::warn!(
      dir = %dir.display(),
      candidates = ?matches,
      "several binaries match the tool name; using the first"
    );
  }

  matches.into_iter().next().ok_or_else(|| {
    NotFoundError::Binary {
      dir: dir.to_path_buf(),
      prefix: prefix.to_string(),
    }
    .into()
  })
}

/// Mode stored in the archive: executable or not, nothing else
fn normalized_mode(path: &Path) -> FezaResult<u32> {
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path)?.permissions().mode();
    Ok(if mode & 0o111 != 0 { 0o755 } else { 0o644 })
  }
  #[cfg(not(unix))]
  {
    let _ = path;
    Ok(0o755)
  }
}

/// Write a single-entry tar.gz holding `binary` as `entry_name`
///
/// Ownership, timestamps, and the gzip header are normalized so identical
/// binaries give byte-identical archives.
pub fn write_archive(binary: &Path, entry_name: &str, dest: &Path) -> FezaResult<()> {
  let size = fs::metadata(binary)
    .with_context(|| format!("Failed to stat {}", binary.display()))?
    .len();

  let mut header = tar::Header::new_gnu();
  header.set_size(size);
  header.set_mode(normalized_mode(binary)?);
  header.set_mtime(0);
  header.set_uid(0);
  header.set_gid(0);
  header.set_entry_type(tar::EntryType::Regular);

  let out = File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
  let mut builder = tar::Builder::new(GzEncoder::new(out, Compression::default()));
  let src = File::open(binary).with_context(|| format!("Failed to open {}", binary.display()))?;
  builder
    .append_data(&mut header, entry_name, src)
    .with_context(|| format!("Failed to archive {}", binary.display()))?;

  let encoder = builder.into_inner()?;
  encoder.finish()?.sync_all()?;
  Ok(())
}

/// Hex SHA-256 of a file's bytes
pub fn sha256_file(path: &Path) -> FezaResult<String> {
  let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
  let mut hasher = Sha256::new();
  let mut buf = [0u8; 64 * 1024];
  loop {
    let n = file.read(&mut buf)?;
    if n == 0 {
      break;
    }
    hasher.update(&buf[..n]);
  }
  Ok(format!("{:x}", hasher.finalize()))
}

/// Package every selected asset and persist the manifest once
pub fn package_release(store: &dyn ManifestStore, opts: &PackageOptions<'_>) -> FezaResult<Vec<PackagedAsset>> {
  let mut manifest = store.load()?;
  manifest.ensure_tag(opts.tag)?;

  if let Some(target) = opts.only_target
    && manifest.asset_by_target(target).is_none()
  {
    return Err(
      PreconditionError::TargetNotPlanned {
        target: target.to_string(),
      }
      .into(),
    );
  }

  fs::create_dir_all(opts.dist_dir).with_context(|| format!("Failed to create {}", opts.dist_dir.display()))?;

  let mut packaged = Vec::new();
  for (index, asset) in manifest.assets.iter().enumerate() {
    if opts.only_target.is_some_and(|t| t != asset.target) {
      continue;
    }

    let binary = find_binary(&opts.artifacts_dir.join(&asset.target), &manifest.name)?;
    let path = opts.dist_dir.join(&asset.filename);
    write_archive(&binary, &manifest.name, &path)?;
    let sha256 = sha256_file(&path)?;
    let url = download_url(opts.host, opts.repo, &manifest.tag, &asset.filename);

    tracing::info!(target = %asset.target, binary = %binary.display(), sha256 = %sha256, "packaged");
    packaged.push((
      index,
      PackagedAsset {
        target: asset.target.clone(),
        filename: asset.filename.clone(),
        path,
        sha256,
        url,
      },
    ));
  }

  for (index, result) in &packaged {
    let asset = &mut manifest.assets[*index];
    asset.sha256 = result.sha256.clone();
    asset.url = result.url.clone();
  }
  store.save(&manifest)?;

  Ok(packaged.into_iter().map(|(_, p)| p).collect())
}
