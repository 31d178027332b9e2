//! Credential resolution and push strategies
//!
//! Resolution walks an ordered list of sources and stops at the first hit:
//! host CLI session, then `TAP_PAT`, then `GITHUB_TOKEN`, then (attended only)
//! a prompt.

use crate::core::error::{AuthError, FezaResult};
use crate::core::host::ReleaseHost;
use crate::core::prompt::Prompter;
use std::fmt;

/// Environment variables consulted after the CLI session, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["TAP_PAT", "GITHUB_TOKEN"];

/// Where a credential came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
  Session,
  Env(String),
  Prompt,
}

impl fmt::Display for CredentialSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CredentialSource::Session => write!(f, "gh session"),
      CredentialSource::Env(var) => write!(f, "${}", var),
      CredentialSource::Prompt => write!(f, "prompt"),
    }
  }
}

/// A resolved token. `Debug` never prints the secret.
#[derive(Clone)]
pub struct Credential {
  token: String,
  pub source: CredentialSource,
}

impl Credential {
  pub fn token(&self) -> &str {
    &self.token
  }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credential")
      .field("token", &"***")
      .field("source", &self.source)
      .finish()
  }
}

/// Resolve a credential from the ordered source list
///
/// `env` is injected so tests don't depend on the process environment.
pub fn resolve_credential(
  host: &dyn ReleaseHost,
  env: &dyn Fn(&str) -> Option<String>,
  prompter: &dyn Prompter,
) -> FezaResult<Credential> {
  if let Some(token) = host.session_token() {
    tracing::debug!("credential from gh session");
    return Ok(Credential {
      token,
      source: CredentialSource::Session,
    });
  }

  for var in TOKEN_ENV_VARS {
    if let Some(token) = env(var).filter(|t| !t.trim().is_empty()) {
      tracing::debug!(var, "credential from environment");
      return Ok(Credential {
        token: token.trim().to_string(),
        source: CredentialSource::Env(var.to_string()),
      });
    }
  }

  let mut tried = vec!["gh auth token".to_string()];
  tried.extend(TOKEN_ENV_VARS.iter().map(|v| format!("${}", v)));

  if prompter.is_interactive() {
    let token = prompter.ask("GitHub token with write access to the tap:")?;
    if !token.is_empty() {
      return Ok(Credential {
        token,
        source: CredentialSource::Prompt,
      });
    }
    tried.push("prompt".to_string());
  }

  Err(AuthError::NoCredential { tried }.into())
}

/// How a push authenticates, tried in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStrategy {
  /// Whatever git already has (credential helper, SSH agent)
  Ambient,
  /// Token embedded in the remote URL
  EmbeddedCredential,
}

impl PushStrategy {
  pub const ORDER: [PushStrategy; 2] = [PushStrategy::Ambient, PushStrategy::EmbeddedCredential];

  /// Remote to pass to git for this strategy
  pub fn remote(self, host: &str, repo: &str, credential: &Credential) -> String {
    match self {
      PushStrategy::Ambient => plain_url(host, repo),
      PushStrategy::EmbeddedCredential => credential_url(host, repo, credential),
    }
  }
}

impl fmt::Display for PushStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PushStrategy::Ambient => write!(f, "ambient session"),
      PushStrategy::EmbeddedCredential => write!(f, "embedded credential"),
    }
  }
}

/// `https://<host>/<repo>.git`
pub fn plain_url(host: &str, repo: &str) -> String {
  format!("https://{}/{}.git", host, repo)
}

/// `https://x-access-token:<token>@<host>/<repo>.git`
pub fn credential_url(host: &str, repo: &str, credential: &Credential) -> String {
  format!("https://x-access-token:{}@{}/{}.git", credential.token(), host, repo)
}
