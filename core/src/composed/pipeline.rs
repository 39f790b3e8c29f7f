// composable_operations/src/composed/pipeline.rs

//! Contains `ComposedOperation`, the builder for operations whose execute
//! phase is an ordered pipeline of other operations, and `run_steps`, which
//! folds the running value through those steps.

use crate::composed::factory::OperationFactory;
use crate::core::{Flow, Interrupt, Observer, Outcome, Scope};
use crate::error::{OperationError, OperationResult};
use crate::operation::definition::{OperationBuilder, OperationDef};
use serde_json::Value;
use std::sync::Arc;
use tracing::{event, span, Level};

/// Builder for a composed operation.
///
/// Steps run in declaration order. A definition created with `extend` runs the
/// parent's steps first, then its own.
pub struct ComposedOperation {
  builder: OperationBuilder,
  steps: Vec<OperationFactory>,
}

impl ComposedOperation {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      builder: OperationDef::builder(name),
      steps: Vec::new(),
    }
  }

  /// Extends `parent`, inheriting its hooks, options and (if it is composed) its steps.
  pub fn extend(parent: &Arc<OperationDef>, name: impl Into<String>) -> Self {
    Self {
      builder: parent.extend(name),
      steps: parent.steps().to_vec(),
    }
  }

  /// Builds a pipeline from an ordered list of operations with no step options.
  ///
  /// An empty list is rejected.
  pub fn compose<I>(name: impl Into<String>, operations: I) -> OperationResult<Arc<OperationDef>>
  where
    I: IntoIterator<Item = Arc<OperationDef>>,
  {
    let name = name.into();
    let mut composed = ComposedOperation::new(name.clone());
    for operation in operations {
      composed = composed.use_operation(&operation);
    }
    if composed.steps.is_empty() {
      return Err(OperationError::Configuration {
        operation: name,
        message: "a composed operation needs at least one step".to_string(),
      });
    }
    Ok(composed.build())
  }

  /// Appends a step that runs `operation` with the running value as its input.
  pub fn use_operation(self, operation: &Arc<OperationDef>) -> Self {
    self.use_factory(OperationFactory::new(operation))
  }

  /// Appends a configured step.
  pub fn use_factory(mut self, factory: impl Into<OperationFactory>) -> Self {
    self.steps.push(factory.into());
    self
  }

  pub fn before(mut self, hook: impl Fn(&mut Scope) -> Flow + Send + Sync + 'static) -> Self {
    self.builder = self.builder.before(hook);
    self
  }

  pub fn after(mut self, hook: impl Fn(&mut Scope) -> Flow + Send + Sync + 'static) -> Self {
    self.builder = self.builder.after(hook);
    self
  }

  pub fn option(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
    self.builder = self.builder.option(name, default);
    self
  }

  pub fn raises<E, F>(mut self, make_error: F) -> Self
  where
    F: Fn(String) -> E + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
  {
    self.builder = self.builder.raises(make_error);
    self
  }

  pub fn observe(mut self, observer: Arc<dyn Observer>) -> Self {
    self.builder = self.builder.observe(observer);
    self
  }

  pub fn build(self) -> Arc<OperationDef> {
    self.builder.pipeline(self.steps).build()
  }
}

/// Folds the running value through `steps`, starting from the scope's input.
///
/// A failed step fails the composed operation with the step's message; a halted
/// step halts it with the step's message and result. Later steps are never
/// created. Misuse errors from a step propagate as `Err`.
pub(crate) fn run_steps(steps: &[OperationFactory], scope: &mut Scope) -> OperationResult<Flow<Value>> {
  let mut running = scope.input().clone();

  for (step_idx, factory) in steps.iter().enumerate() {
    let step_span = span!(
      Level::DEBUG,
      "pipeline_step",
      step_index = step_idx,
      step = %factory.template().name()
    );
    let _step_span_guard = step_span.enter();

    let mut operation = match factory.create(scope, running) {
      Ok(operation) => operation,
      Err(signal) => return Ok(Err(signal)),
    };
    operation.perform()?;

    running = match operation.into_outcome() {
      Some(Outcome::Success(value)) => value,
      Some(Outcome::Failed { message }) => {
        event!(Level::INFO, reason = %message, "Step failed, failing the composed operation.");
        return Ok(Err(Interrupt::Fail { message }));
      }
      Some(Outcome::Halted { message, value }) => {
        event!(Level::INFO, reason = %message, "Step halted, halting the composed operation.");
        return Ok(Err(Interrupt::Halt { message, value }));
      }
      None => {
        return Err(OperationError::Internal(format!(
          "Step '{}' finished without an outcome",
          factory.template().name()
        )))
      }
    };
    event!(Level::TRACE, "Step succeeded.");
  }

  Ok(Ok(running))
}
