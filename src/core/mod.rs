//! Core engine for feza
//!
//! - **manifest**: release tag, target, asset, and manifest model
//! - **store**: manifest persistence (`ManifestStore`)
//! - **config**: optional feza.toml
//! - **error**: error taxonomy with help messages and exit codes
//! - **vcs**: git seam (`GitClient`, `SystemGit`)
//! - **host**: release host seam (`ReleaseHost`, `GhCli`)
//! - **auth**: credential resolution and push strategies
//! - **prompt**: operator prompts
//! - **template**: `{{ ... }}` substitution

pub mod auth;
pub mod config;
pub mod error;
pub mod host;
pub mod manifest;
pub mod prompt;
pub mod store;
pub mod template;
pub mod vcs;

#[cfg(test)]
pub mod testing;
