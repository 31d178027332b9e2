use crate::core::error::FezaResult;
use crate::core::store::FileStore;
use crate::release::status::{StatusReport, release_status};

/// Run the status command
pub fn run_status(json: bool) -> FezaResult<()> {
  let (root, _config) = super::load_project()?;
  let report = release_status(&FileStore::in_project(&root))?;

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_status(&report);
  }

  Ok(())
}

fn print_status(report: &StatusReport) {
  println!("📋 {} {} ({})", report.name, report.tag, report.phase);
  println!("   Manifest: {}", report.manifest);
  println!();

  for asset in &report.assets {
    if asset.packaged {
      println!("   ✅ {:<14} {} ({}...)", asset.target, asset.filename, super::short_sha(&asset.sha256));
    } else {
      println!("   ⏳ {:<14} {}", asset.target, asset.filename);
    }
  }

  println!();
  println!("{}/{} assets packaged", report.packaged_count(), report.assets.len());
}
