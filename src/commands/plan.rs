use crate::core::error::FezaResult;
use crate::core::manifest::parse_target_list;
use crate::core::store::FileStore;
use crate::core::vcs::SystemGit;
use crate::release::plan::plan_release;

/// Run the plan command
pub fn run_plan(tag: String, name: Option<String>, targets: Option<String>) -> FezaResult<()> {
  let (root, config) = super::load_project()?;
  let name = super::resolve_name(name, &config)?;
  let targets = match targets {
    Some(raw) => parse_target_list(&raw),
    None => config.default_targets(),
  };

  let store = FileStore::in_project(&root);
  let manifest = plan_release(&tag, &name, &targets, &root, &SystemGit::new(), &store)?;

  println!("📋 Planned {} {} ({} targets)", manifest.name, manifest.tag, manifest.assets.len());
  for asset in &manifest.assets {
    println!("   {} → {}", asset.target, asset.filename);
  }
  println!();
  println!("✅ Created manifest: {}", store.path().display());

  Ok(())
}
