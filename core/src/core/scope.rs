// composable_operations/src/core/scope.rs

//! Defines `Scope`, the per-instance state an operation's hooks and execute
//! body work against, and the `Hook` / `ExecuteFn` closure types.

use crate::core::control::{fail, Flow, Outcome, Phase};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Named options of an operation instance.
pub type Options = Map<String, Value>;

/// Converts a JSON object into `Options`. Any other value yields no options.
///
/// ```
/// use composable_operations::options;
/// use serde_json::json;
///
/// let opts = options(json!({ "multiplier": 5 }));
/// assert_eq!(opts["multiplier"], 5);
/// ```
pub fn options(value: Value) -> Options {
  match value {
    Value::Object(map) => map,
    _ => Options::new(),
  }
}

/// A preparator or finalizer. Evaluated against the operation's own scope.
pub type Hook = Arc<dyn Fn(&mut Scope) -> Flow + Send + Sync>;

/// The body of a plain (non-composed) operation.
pub type ExecuteFn = Arc<dyn Fn(&mut Scope) -> Flow<Value> + Send + Sync>;

/// Per-instance state of an operation.
///
/// Holds the immutable input and options, a `locals` map that plays the role
/// of instance variables (it survives across `perform` calls on the same
/// instance), and the outcome of the current run once execute has finished.
#[derive(Debug, Clone)]
pub struct Scope {
  name: Arc<str>,
  input: Value,
  spread: bool,
  options: Options,
  locals: Options,
  phase: Phase,
  outcome: Option<Outcome>,
}

impl Scope {
  pub(crate) fn new(name: Arc<str>, input: Value, spread: bool, options: Options) -> Self {
    Self {
      name,
      input,
      spread,
      options,
      locals: Options::new(),
      phase: Phase::Created,
      outcome: None,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// The value the operation was constructed with. For an operation built from
  /// positional arguments this is the array of those arguments.
  pub fn input(&self) -> &Value {
    &self.input
  }

  /// Positional arguments. A single-input operation has exactly one.
  pub fn args(&self) -> &[Value] {
    match (&self.input, self.spread) {
      (Value::Array(items), true) => items,
      (value, _) => std::slice::from_ref(value),
    }
  }

  pub fn arg(&self, index: usize) -> Option<&Value> {
    self.args().get(index)
  }

  pub fn options(&self) -> &Options {
    &self.options
  }

  pub fn option(&self, name: &str) -> Option<&Value> {
    self.options.get(name)
  }

  /// Reads an option as `T`. A missing or mistyped option fails the operation.
  pub fn option_as<T: DeserializeOwned>(&self, name: &str) -> Flow<T> {
    match self.options.get(name) {
      Some(value) => Ok(serde_json::from_value(value.clone())?),
      None => fail(format!("Missing option '{}' for operation '{}'", name, self.name)),
    }
  }

  pub fn local(&self, key: &str) -> Option<&Value> {
    self.locals.get(key)
  }

  pub fn set_local(&mut self, key: impl Into<String>, value: impl Into<Value>) {
    self.locals.insert(key.into(), value.into());
  }

  /// Appends to the array stored under `key`, creating it if needed.
  pub fn push_local(&mut self, key: &str, value: impl Into<Value>) {
    let slot = self
      .locals
      .entry(key.to_string())
      .or_insert_with(|| Value::Array(Vec::new()));
    match slot {
      Value::Array(items) => items.push(value.into()),
      other => *other = Value::Array(vec![other.take(), value.into()]),
    }
  }

  pub fn locals(&self) -> &Options {
    &self.locals
  }

  pub fn locals_mut(&mut self) -> &mut Options {
    &mut self.locals
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// Outcome recorded so far in this run. Empty while preparing and executing;
  /// finalizers see the candidate outcome they may still override.
  pub fn outcome(&self) -> Option<&Outcome> {
    self.outcome.as_ref()
  }

  pub fn result(&self) -> Option<&Value> {
    self.outcome.as_ref().and_then(Outcome::result)
  }

  pub fn message(&self) -> Option<&str> {
    self.outcome.as_ref().and_then(Outcome::message)
  }

  pub(crate) fn set_phase(&mut self, phase: Phase) {
    self.phase = phase;
  }

  pub(crate) fn set_outcome(&mut self, outcome: Option<Outcome>) {
    self.outcome = outcome;
  }

  pub(crate) fn take_outcome(&mut self) -> Option<Outcome> {
    self.outcome.take()
  }
}
