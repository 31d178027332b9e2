//! Deterministic fakes for the collaborator traits

use crate::core::error::{ExternalToolError, FezaResult};
use crate::core::host::{ChangeRequest, NewRelease, ReleaseHost, Visibility};
use crate::core::prompt::Prompter;
use crate::core::vcs::GitClient;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

fn failed(command: String) -> crate::core::error::FezaError {
  ExternalToolError::CommandFailed {
    command,
    stderr: "simulated failure".to_string(),
  }
  .into()
}

/// In-memory release host
#[derive(Debug, Default)]
pub struct FakeHost {
  releases: RefCell<BTreeMap<(String, String), BTreeSet<String>>>,
  repos: RefCell<BTreeSet<String>>,
  session: Option<String>,
  fail_upload: Option<String>,
  fail_release: bool,
  notes_files: RefCell<Vec<PathBuf>>,
  calls: RefCell<Vec<String>>,
}

impl FakeHost {
  pub fn with_session_token(mut self, token: &str) -> Self {
    self.session = Some(token.to_string());
    self
  }

  pub fn with_release(self, repo: &str, tag: &str, assets: &[&str]) -> Self {
    self.releases.borrow_mut().insert(
      (repo.to_string(), tag.to_string()),
      assets.iter().map(|a| a.to_string()).collect(),
    );
    self
  }

  pub fn with_repo(self, repo: &str) -> Self {
    self.repos.borrow_mut().insert(repo.to_string());
    self
  }

  /// Make uploading `filename` fail
  pub fn failing_upload(mut self, filename: &str) -> Self {
    self.fail_upload = Some(filename.to_string());
    self
  }

  /// Make creating a release fail (after the notes file was handed over)
  pub fn failing_release(mut self) -> Self {
    self.fail_release = true;
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }

  /// Notes files passed to `create_release`
  pub fn notes_files(&self) -> Vec<PathBuf> {
    self.notes_files.borrow().clone()
  }

  /// Filenames uploaded, in order
  pub fn uploads(&self) -> Vec<String> {
    self
      .calls
      .borrow()
      .iter()
      .filter_map(|c| c.strip_prefix("upload ").map(str::to_string))
      .collect()
  }

  pub fn assets(&self, repo: &str, tag: &str) -> BTreeSet<String> {
    self
      .releases
      .borrow()
      .get(&(repo.to_string(), tag.to_string()))
      .cloned()
      .unwrap_or_default()
  }

  fn record(&self, call: String) {
    self.calls.borrow_mut().push(call);
  }
}

impl ReleaseHost for FakeHost {
  fn release_exists(&self, repo: &str, tag: &str) -> FezaResult<bool> {
    Ok(self.releases.borrow().contains_key(&(repo.to_string(), tag.to_string())))
  }

  fn create_release(&self, release: &NewRelease<'_>) -> FezaResult<()> {
    if let Some(path) = release.notes_file {
      self.notes_files.borrow_mut().push(path.to_path_buf());
    }
    if self.fail_release {
      return Err(failed(format!("release create {}", release.tag)));
    }
    let notes = release
      .notes_file
      .map(|p| std::fs::read_to_string(p).unwrap_or_default())
      .unwrap_or_default();
    self.record(format!(
      "create-release {} draft={} notes={}",
      release.title,
      release.draft,
      notes.trim()
    ));
    self
      .releases
      .borrow_mut()
      .insert((release.repo.to_string(), release.tag.to_string()), BTreeSet::new());
    Ok(())
  }

  fn upload_asset(&self, repo: &str, tag: &str, path: &Path) -> FezaResult<()> {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_default();
    if self.fail_upload.as_deref() == Some(name.as_str()) {
      return Err(failed(format!("upload {}", name)));
    }
    self.record(format!("upload {}", name));
    self
      .releases
      .borrow_mut()
      .entry((repo.to_string(), tag.to_string()))
      .or_default()
      .insert(name);
    Ok(())
  }

  fn list_asset_names(&self, repo: &str, tag: &str) -> FezaResult<BTreeSet<String>> {
    self.record(format!("list {}", tag));
    Ok(self.assets(repo, tag))
  }

  fn repo_exists(&self, repo: &str) -> FezaResult<bool> {
    Ok(self.repos.borrow().contains(repo))
  }

  fn create_repo(&self, repo: &str, visibility: Visibility, description: &str) -> FezaResult<()> {
    self.record(format!("create-repo {} {} {}", repo, visibility, description));
    self.repos.borrow_mut().insert(repo.to_string());
    Ok(())
  }

  fn open_change_request(&self, request: &ChangeRequest<'_>) -> FezaResult<String> {
    self.record(format!("pr {} {}->{} {}", request.repo, request.head, request.base, request.title));
    Ok(format!("https://github.com/{}/pull/1", request.repo))
  }

  fn default_branch(&self, _repo: &str) -> FezaResult<String> {
    Ok("main".to_string())
  }

  fn session_token(&self) -> Option<String> {
    self.session.clone()
  }
}

/// Recording git fake
///
/// `clone_shallow` and `init` create the directory so callers can write into it.
#[derive(Debug, Default)]
pub struct FakeGit {
  dirty: bool,
  /// Remotes/URLs containing any of these substrings fail to clone or push
  reject: Vec<String>,
  /// Like `reject`, for pushes only
  reject_push: Vec<String>,
  workdirs: RefCell<Vec<PathBuf>>,
  calls: RefCell<Vec<String>>,
}

impl FakeGit {
  pub fn dirty() -> Self {
    Self {
      dirty: true,
      ..Self::default()
    }
  }

  /// Fail clone/push whose remote contains `needle`
  pub fn rejecting(mut self, needle: &str) -> Self {
    self.reject.push(needle.to_string());
    self
  }

  /// Fail every push whose remote contains `needle`; clones still succeed
  pub fn rejecting_push(mut self, needle: &str) -> Self {
    self.reject_push.push(needle.to_string());
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }

  /// Directories created by `init` and `clone_shallow`
  pub fn workdirs(&self) -> Vec<PathBuf> {
    self.workdirs.borrow().clone()
  }

  fn record(&self, call: String) {
    self.calls.borrow_mut().push(call);
  }

  fn rejects(&self, remote: &str) -> bool {
    self.reject.iter().any(|needle| remote.contains(needle.as_str()))
  }
}

impl GitClient for FakeGit {
  fn is_dirty(&self, _dir: &Path) -> FezaResult<bool> {
    Ok(self.dirty)
  }

  fn init(&self, dir: &Path, branch: &str) -> FezaResult<()> {
    std::fs::create_dir_all(dir)?;
    self.workdirs.borrow_mut().push(dir.to_path_buf());
    self.record(format!("init {}", branch));
    Ok(())
  }

  fn add(&self, _dir: &Path, paths: &[&Path]) -> FezaResult<()> {
    let paths: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    self.record(format!("add {}", paths.join(" ")));
    Ok(())
  }

  fn commit(&self, _dir: &Path, message: &str) -> FezaResult<()> {
    self.record(format!("commit {}", message));
    Ok(())
  }

  fn push(&self, _dir: &Path, remote: &str, branch: &str) -> FezaResult<()> {
    if self.rejects(remote) || self.reject_push.iter().any(|needle| remote.contains(needle.as_str())) {
      self.record(format!("push-failed {} {}", remote, branch));
      return Err(failed(format!("git push {} {}", remote, branch)));
    }
    self.record(format!("push {} {}", remote, branch));
    Ok(())
  }

  fn clone_shallow(&self, url: &str, dest: &Path) -> FezaResult<()> {
    if self.rejects(url) {
      self.record(format!("clone-failed {}", url));
      return Err(failed(format!("git clone {}", url)));
    }
    std::fs::create_dir_all(dest)?;
    self.workdirs.borrow_mut().push(dest.to_path_buf());
    self.record(format!("clone {}", url));
    Ok(())
  }

  fn checkout_new_branch(&self, _dir: &Path, name: &str) -> FezaResult<()> {
    self.record(format!("checkout -b {}", name));
    Ok(())
  }

  fn current_branch(&self, _dir: &Path) -> FezaResult<String> {
    Ok("main".to_string())
  }

  fn set_remote_url(&self, _dir: &Path, remote: &str, url: &str) -> FezaResult<()> {
    self.record(format!("set-url {} {}", remote, url));
    Ok(())
  }
}

/// Prompter answering from a script; runs out means an error
#[derive(Debug)]
pub struct ScriptedPrompter {
  answers: RefCell<VecDeque<String>>,
  questions: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
  pub fn new(answers: &[&str]) -> Self {
    Self {
      answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
      questions: RefCell::new(Vec::new()),
    }
  }

  pub fn questions(&self) -> Vec<String> {
    self.questions.borrow().clone()
  }
}

impl Prompter for ScriptedPrompter {
  fn is_interactive(&self) -> bool {
    true
  }

  fn ask(&self, question: &str) -> FezaResult<String> {
    self.questions.borrow_mut().push(question.to_string());
    self
      .answers
      .borrow_mut()
      .pop_front()
      .ok_or_else(|| crate::core::error::FezaError::message("prompt script exhausted"))
  }
}
