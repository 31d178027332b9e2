use crate::core::auth::resolve_credential;
use crate::core::error::FezaResult;
use crate::core::host::GhCli;
use crate::core::manifest::ReleaseTag;
use crate::core::prompt;
use crate::core::store::{FileStore, ManifestStore};
use crate::core::vcs::SystemGit;
use crate::release::distribute::{TapOptions, TapServices, distribute, resolve_tap_settings};
use clap::Args;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct TapArgs {
  /// Release tag (e.g. v1.2.3)
  pub tag: String,
  /// Tool name (defaults to the planned name)
  #[arg(long)]
  pub name: Option<String>,
  /// Formula name
  #[arg(long)]
  pub formula: Option<String>,
  /// Homebrew tap repository ORG/homebrew-NAME
  #[arg(long)]
  pub tap: Option<String>,
  /// Source repository ORG/REPO, used for the default homepage
  #[arg(long)]
  pub repo: Option<String>,
  /// Branch to push [default: feza/<tag>]
  #[arg(long)]
  pub branch: Option<String>,
  /// Open a pull request after pushing
  #[arg(long)]
  pub open_pr: bool,
  /// Render and commit locally, but push nothing
  #[arg(long)]
  pub dry_run: bool,
  /// Never prompt
  #[arg(long)]
  pub non_interactive: bool,
  /// Create the tap repository if it does not exist
  #[arg(long)]
  pub create_tap: bool,
  /// Derive missing tap/formula names from the tool and repository
  #[arg(long)]
  pub auto: bool,
  /// Formula template [default: built-in]
  #[arg(long)]
  pub formula_template: Option<PathBuf>,
  /// Formula description
  #[arg(long)]
  pub desc: Option<String>,
  /// Formula homepage
  #[arg(long)]
  pub homepage: Option<String>,
}

/// Run the tap command
pub fn run_tap(args: TapArgs) -> FezaResult<()> {
  let (root, config) = super::load_project()?;
  let tag = ReleaseTag::parse(&args.tag)?;
  let store = FileStore::in_project(&root);
  let manifest = store.load()?;
  manifest.ensure_tag(&tag)?;
  if let Some(name) = args.name.as_deref() {
    super::warn_on_name_mismatch(name, &manifest.name);
  }

  // Optional here: only the homepage and --auto use it
  let repo = super::repo_for(args.repo.as_deref(), &config).ok();
  let (tap, formula) = resolve_tap_settings(
    args.tap.as_deref(),
    args.formula.as_deref(),
    &config.tap,
    args.auto,
    &manifest.name,
    repo.as_deref(),
  )?;

  let host = GhCli::locate()?;
  let prompter = prompt::detect(args.non_interactive);
  let credential = resolve_credential(&host, &|var: &str| env::var(var).ok(), prompter.as_ref())?;
  println!("🔑 Using credential from {}", credential.source);

  let git = SystemGit::new().redacting(credential.token());
  let template = args
    .formula_template
    .or_else(|| config.tap.template.clone())
    .map(|p| super::under_root(&root, &p));
  let desc = args.desc.or_else(|| config.tap.desc.clone());
  let homepage = args.homepage.or_else(|| config.tap.homepage.clone());

  let opts = TapOptions {
    tag: &tag,
    tap: &tap,
    formula: &formula,
    repo: repo.as_deref(),
    host: config.host(),
    branch: args.branch.as_deref(),
    branch_prefix: &config.tap.branch_prefix,
    template: template.as_deref(),
    desc: desc.as_deref(),
    homepage: homepage.as_deref(),
    open_pr: args.open_pr,
    dry_run: args.dry_run,
    create_tap: args.create_tap || config.tap.create,
    private_tap: config.tap.private,
  };
  let services = TapServices {
    git: &git,
    host: &host,
    prompter: prompter.as_ref(),
  };
  let report = distribute(&manifest, &credential, services, &opts)?;

  if report.created_tap {
    println!("🆕 Created tap repository: {}", report.tap);
  }

  match report.pushed {
    Some(strategy) => {
      println!("✅ Pushed branch {} to {} ({})", report.branch, report.tap, strategy);
    }
    None => {
      println!("🔍 Dry run: rendered {} on branch {}", report.formula_path.display(), report.branch);
      println!();
      println!("{}", report.formula);
      println!("Run without --dry-run to push.");
    }
  }

  if let Some(url) = &report.pr_url {
    println!("🔗 Opened PR: {}", url);
  }

  Ok(())
}
