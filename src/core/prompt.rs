//! Operator prompts
//!
//! Interactive input is a capability handed to the phases. Unattended runs get
//! `NonInteractive`, which refuses every question.

use crate::core::error::{FezaResult, PreconditionError, ResultExt};
use std::io::{BufRead, IsTerminal, Write};

pub trait Prompter {
  /// Whether an operator can answer questions
  fn is_interactive(&self) -> bool;

  /// Ask for a free-form answer (trimmed)
  fn ask(&self, question: &str) -> FezaResult<String>;

  /// Ask a yes/no question; anything but y/yes is "no"
  fn confirm(&self, question: &str) -> FezaResult<bool> {
    let answer = self.ask(&format!("{} [y/N]", question))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
  }
}

/// Reads answers from standard input
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
  fn is_interactive(&self) -> bool {
    true
  }

  fn ask(&self, question: &str) -> FezaResult<String> {
    print!("❓ {} ", question);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin()
      .lock()
      .read_line(&mut input)
      .context("Failed to read input")?;
    Ok(input.trim().to_string())
  }
}

/// Fails closed on every question
#[derive(Debug, Default)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
  fn is_interactive(&self) -> bool {
    false
  }

  fn ask(&self, question: &str) -> FezaResult<String> {
    Err(
      PreconditionError::NonInteractive {
        needed: question.to_string(),
      }
      .into(),
    )
  }
}

/// Pick a prompter for this process
///
/// Attended means: stdin is a terminal, `--non-interactive` was not given, and
/// `CI` is unset.
pub fn detect(non_interactive: bool) -> Box<dyn Prompter> {
  let ci = std::env::var_os("CI").is_some_and(|v| !v.is_empty() && v != "false" && v != "0");
  if non_interactive || ci || !std::io::stdin().is_terminal() {
    tracing::debug!(non_interactive, ci, "running unattended");
    Box::new(NonInteractive)
  } else {
    Box::new(StdinPrompter)
  }
}
