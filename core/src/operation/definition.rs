// composable_operations/src/operation/definition.rs

//! Contains `OperationDef`, the immutable, shareable definition of an operation
//! (its hooks, body, option defaults and error kind), and `OperationBuilder`,
//! which constructs definitions and extends existing ones.

use crate::composed::factory::OperationFactory;
use crate::core::observer::{event_name, Observer};
use crate::core::scope::{ExecuteFn, Hook, Options, Scope};
use crate::core::control::Flow;
use serde_json::Value;
use std::sync::Arc;
use tracing::{event, Level};

/// Builds the error raised by a one-shot `perform` that ended in Failed.
pub type RaiseFn = Arc<dyn Fn(String) -> anyhow::Error + Send + Sync>;

/// What `execute` does for a definition.
#[derive(Clone)]
pub(crate) enum Body {
  /// No execute body declared. Performing it is an error.
  Abstract,
  Execute(ExecuteFn),
  /// Ordered pipeline steps of a composed operation.
  Pipeline(Arc<[OperationFactory]>),
}

/// A reusable operation definition.
///
/// Definitions are immutable once built and are shared behind `Arc`. Hooks are
/// stored already resolved: `preparators` run ancestor-first, `finalizers` run
/// own-first, so `perform` never walks an extension chain.
pub struct OperationDef {
  pub(crate) name: Arc<str>,
  pub(crate) event: String,
  pub(crate) defaults: Options,
  pub(crate) preparators: Vec<Hook>,
  pub(crate) finalizers: Vec<Hook>,
  pub(crate) body: Body,
  pub(crate) raises: Option<RaiseFn>,
  pub(crate) observers: Vec<Arc<dyn Observer>>,
}

impl OperationDef {
  /// Starts a new definition with no hooks, no defaults and no body.
  pub fn builder(name: impl Into<String>) -> OperationBuilder {
    OperationBuilder::new(name.into())
  }

  /// Starts a definition that inherits everything from `self`.
  ///
  /// Hooks registered on the returned builder nest inside the inherited ones:
  /// new preparators run after the inherited preparators, new finalizers run
  /// before the inherited finalizers.
  pub fn extend(self: &Arc<Self>, name: impl Into<String>) -> OperationBuilder {
    let name = name.into();
    event!(Level::DEBUG, parent = %self.name, operation = %name, "Extending operation definition.");
    OperationBuilder {
      name,
      defaults: self.defaults.clone(),
      inherited_preparators: self.preparators.clone(),
      before: Vec::new(),
      after: Vec::new(),
      inherited_finalizers: self.finalizers.clone(),
      body: self.body.clone(),
      raises: self.raises.clone(),
      observers: self.observers.clone(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Instrumentation event name passed to observers.
  pub fn event_name(&self) -> &str {
    &self.event
  }

  pub fn defaults(&self) -> &Options {
    &self.defaults
  }

  pub fn preparator_count(&self) -> usize {
    self.preparators.len()
  }

  pub fn finalizer_count(&self) -> usize {
    self.finalizers.len()
  }

  pub fn is_composed(&self) -> bool {
    matches!(self.body, Body::Pipeline(_))
  }

  /// Pipeline steps in execution order. Empty for plain operations.
  pub fn steps(&self) -> &[OperationFactory] {
    match &self.body {
      Body::Pipeline(steps) => steps,
      _ => &[],
    }
  }

  /// Merges caller options over the declared defaults.
  pub(crate) fn merge_options(&self, options: Options) -> Options {
    let mut merged = self.defaults.clone();
    merged.extend(options);
    merged
  }
}

impl std::fmt::Debug for OperationDef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OperationDef")
      .field("name", &self.name)
      .field("defaults", &self.defaults)
      .field("preparators", &self.preparators.len())
      .field("finalizers", &self.finalizers.len())
      .field("steps", &self.steps().len())
      .field("raises_custom_error", &self.raises.is_some())
      .field("observers", &self.observers.len())
      .finish()
  }
}

/// Fluent builder for `OperationDef`.
pub struct OperationBuilder {
  pub(crate) name: String,
  pub(crate) defaults: Options,
  pub(crate) inherited_preparators: Vec<Hook>,
  pub(crate) before: Vec<Hook>,
  pub(crate) after: Vec<Hook>,
  pub(crate) inherited_finalizers: Vec<Hook>,
  pub(crate) body: Body,
  pub(crate) raises: Option<RaiseFn>,
  pub(crate) observers: Vec<Arc<dyn Observer>>,
}

impl OperationBuilder {
  fn new(name: String) -> Self {
    Self {
      name,
      defaults: Options::new(),
      inherited_preparators: Vec::new(),
      before: Vec::new(),
      after: Vec::new(),
      inherited_finalizers: Vec::new(),
      body: Body::Abstract,
      raises: None,
      observers: Vec::new(),
    }
  }

  /// Declares a named option with a default value. Callers may override it per invocation.
  pub fn option(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
    self.defaults.insert(name.into(), default.into());
    self
  }

  /// Sets the execute body, replacing any inherited one.
  pub fn execute(mut self, body: impl Fn(&mut Scope) -> Flow<Value> + Send + Sync + 'static) -> Self {
    self.body = Body::Execute(Arc::new(body));
    self
  }

  /// Selects the error raised when a one-shot `perform` fails.
  /// The constructor receives the failure message.
  pub fn raises<E, F>(mut self, make_error: F) -> Self
  where
    F: Fn(String) -> E + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
  {
    self.raises = Some(Arc::new(move |message| anyhow::Error::new(make_error(message))));
    self
  }

  /// Adds an observer notified around every `perform` of this definition.
  pub fn observe(mut self, observer: Arc<dyn Observer>) -> Self {
    self.observers.push(observer);
    self
  }

  pub(crate) fn pipeline(mut self, steps: Vec<OperationFactory>) -> Self {
    self.body = Body::Pipeline(steps.into());
    self
  }

  pub fn build(self) -> Arc<OperationDef> {
    let (preparators, finalizers) = self.resolve_hooks();
    let event = event_name(&self.name);
    event!(
      Level::DEBUG,
      operation = %self.name,
      preparators = preparators.len(),
      finalizers = finalizers.len(),
      "Operation definition built."
    );
    Arc::new(OperationDef {
      name: self.name.into(),
      event,
      defaults: self.defaults,
      preparators,
      finalizers,
      body: self.body,
      raises: self.raises,
      observers: self.observers,
    })
  }
}
