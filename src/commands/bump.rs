use crate::core::error::FezaResult;
use crate::core::prompt;
use crate::core::vcs::SystemGit;
use crate::release::bump::{BumpOptions, bump_version};
use std::path::PathBuf;

/// Run the bump command
pub fn run_bump(version: Option<String>, commit: bool, push: bool, file: Option<PathBuf>) -> FezaResult<()> {
  let (root, _config) = super::load_project()?;
  let file = file.map(|p| super::under_root(&root, &p));
  let prompter = prompt::detect(false);

  let opts = BumpOptions {
    version: version.as_deref(),
    commit,
    push,
    file: file.as_deref(),
  };
  let report = bump_version(&root, &SystemGit::new(), prompter.as_ref(), &opts)?;

  println!(
    "✅ Bumped {} from {} to {}",
    report.file.display(),
    report.previous,
    report.version
  );
  if report.committed {
    println!("📝 Committed: Bump version to {}", report.version);
  }
  if let Some(branch) = &report.pushed {
    println!("🚀 Pushed to origin/{}", branch);
  }

  Ok(())
}
