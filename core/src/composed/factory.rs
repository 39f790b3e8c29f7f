// composable_operations/src/composed/factory.rs

//! Defines `OperationFactory`, which binds an operation definition to the
//! per-step configuration of a pipeline and creates one instance per run.

use crate::core::control::{fail, Flow};
use crate::core::scope::{Options, Scope};
use crate::operation::{Operation, OperationDef};
use serde_json::Value;
use std::sync::Arc;
use tracing::{event, Level};

/// Computes an option from the scope of the operation running the pipeline.
pub type DeferredFn = Arc<dyn Fn(&Scope) -> Value + Send + Sync>;

/// A step option: either fixed at definition time or computed when the step is created.
#[derive(Clone)]
pub enum OptionValue {
  Literal(Value),
  Deferred(DeferredFn),
}

impl OptionValue {
  pub fn resolve(&self, context: &Scope) -> Value {
    match self {
      OptionValue::Literal(value) => value.clone(),
      OptionValue::Deferred(compute) => compute(context),
    }
  }
}

impl std::fmt::Debug for OptionValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      OptionValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
      OptionValue::Deferred(_) => f.write_str("Deferred(..)"),
    }
  }
}

/// How a step receives the running value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arity {
  /// The running value is the step's single input.
  #[default]
  Single,
  /// The running value must be an array; its elements become positional arguments.
  Spread,
}

/// A pipeline step: an operation definition plus its option spec and arity.
#[derive(Clone)]
pub struct OperationFactory {
  template: Arc<OperationDef>,
  option_spec: Vec<(String, OptionValue)>,
  arity: Arity,
}

impl OperationFactory {
  pub fn new(template: &Arc<OperationDef>) -> Self {
    Self {
      template: Arc::clone(template),
      option_spec: Vec::new(),
      arity: Arity::Single,
    }
  }

  /// Adds a literal option, passed unchanged to every created instance.
  pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.option_spec.push((name.into(), OptionValue::Literal(value.into())));
    self
  }

  /// Adds an option computed from the invoking operation's scope each time
  /// the step is created, i.e. while the pipeline is running.
  pub fn deferred(mut self, name: impl Into<String>, compute: impl Fn(&Scope) -> Value + Send + Sync + 'static) -> Self {
    self
      .option_spec
      .push((name.into(), OptionValue::Deferred(Arc::new(compute))));
    self
  }

  /// Declares that this step takes the running value as positional arguments.
  pub fn spread(mut self) -> Self {
    self.arity = Arity::Spread;
    self
  }

  pub fn template(&self) -> &Arc<OperationDef> {
    &self.template
  }

  pub fn arity(&self) -> Arity {
    self.arity
  }

  pub fn option_spec(&self) -> &[(String, OptionValue)] {
    &self.option_spec
  }

  /// Evaluates the option spec against `context`.
  pub fn resolve_options(&self, context: &Scope) -> Options {
    self
      .option_spec
      .iter()
      .map(|(name, value)| (name.clone(), value.resolve(context)))
      .collect()
  }

  /// Creates an instance bound to `input`, evaluating deferred options now.
  ///
  /// A `Spread` step given a non-array value fails.
  pub fn create(&self, context: &Scope, input: Value) -> Flow<Operation> {
    let options = self.resolve_options(context);
    event!(Level::TRACE, step = %self.template.name(), arity = ?self.arity, "Creating step operation.");
    match (self.arity, input) {
      (Arity::Single, input) => Ok(Operation::new(&self.template, input, options)),
      (Arity::Spread, Value::Array(args)) => Ok(Operation::with_args(&self.template, args, options)),
      (Arity::Spread, other) => fail(format!(
        "Step '{}' expects positional arguments but received {}",
        self.template.name(),
        other
      )),
    }
  }
}

impl std::fmt::Debug for OperationFactory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OperationFactory")
      .field("template", &self.template.name())
      .field("option_spec", &self.option_spec)
      .field("arity", &self.arity)
      .finish()
  }
}

impl From<&Arc<OperationDef>> for OperationFactory {
  fn from(template: &Arc<OperationDef>) -> Self {
    OperationFactory::new(template)
  }
}
