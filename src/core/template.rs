//! Jinja templates for formulas and release notes
//!
//! Rendering uses `minijinja` with strict undefined handling: printing or
//! testing an unknown variable is an error, as is calling an unknown function.
//! Lookup tables are exposed as functions (`{{ url_by("macos-arm64") }}`); an
//! unknown key inside a known lookup renders as an empty string.

use crate::core::error::{FezaError, FezaResult, ResultExt, ValidationError};
use minijinja::{Environment, UndefinedBehavior, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Variables and lookup functions available to a template
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
  vars: BTreeMap<String, Value>,
  lookups: BTreeMap<String, BTreeMap<String, String>>,
}

impl TemplateContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.vars.insert(name.into(), Value::from(value.into()));
    self
  }

  /// Structured variable (lists, maps) usable in `{% for %}` and attribute access
  pub fn value<T: Serialize>(mut self, name: impl Into<String>, value: &T) -> Self {
    self.vars.insert(name.into(), Value::from_serialize(value));
    self
  }

  /// Register a `name("key")` lookup function
  pub fn lookup(mut self, name: impl Into<String>, table: BTreeMap<String, String>) -> Self {
    self.lookups.insert(name.into(), table);
    self
  }
}

fn environment<'s>(ctx: &TemplateContext) -> Environment<'s> {
  let mut env = Environment::new();
  env.set_undefined_behavior(UndefinedBehavior::Strict);
  env.set_keep_trailing_newline(true);
  for (name, table) in &ctx.lookups {
    let table = table.clone();
    env.add_function(name.clone(), move |key: String| -> String {
      table.get(&key).cloned().unwrap_or_default()
    });
  }
  env
}

/// Map a render failure to a validation error quoting the offending line
fn template_error(err: minijinja::Error, source: &str) -> FezaError {
  let near = err
    .line()
    .and_then(|n| source.lines().nth(n.saturating_sub(1)))
    .map(|line| format!(" near `{}`", line.trim()))
    .unwrap_or_default();
  ValidationError::Template {
    message: format!("{}{}", err, near),
  }
  .into()
}

fn render_named(name: &str, template: &str, ctx: &TemplateContext) -> FezaResult<String> {
  let env = environment(ctx);
  env
    .template_from_named_str(name, template)
    .and_then(|t| t.render(&ctx.vars))
    .map_err(|e| template_error(e, template))
}

/// Render template text against a context
pub fn render(template: &str, ctx: &TemplateContext) -> FezaResult<String> {
  render_named("<string>", template, ctx)
}

/// Read and render a template file
///
/// Errors name the file. Autoescaping follows the file extension
/// (`.html`/`.xml` only).
pub fn render_file(path: &Path, ctx: &TemplateContext) -> FezaResult<String> {
  let template =
    std::fs::read_to_string(path).with_context(|| format!("Failed to read template {}", path.display()))?;
  let name = path.display().to_string();
  render_named(&name, &template, ctx)
}
