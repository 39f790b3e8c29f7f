// composable_operations/src/operation/execution.rs

//! Contains `Operation`, a single input-bound instance of an `OperationDef`,
//! and the `perform` driver that runs prepare → execute → finalize.

use crate::composed::pipeline::run_steps;
use crate::core::control::{Flow, Interrupt, Outcome, Phase, State};
use crate::core::scope::{Options, Scope};
use crate::error::{OperationError, OperationResult};
use crate::operation::definition::{Body, OperationDef};
use serde_json::Value;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// An operation instance: a definition bound to one input and one set of options.
///
/// Instances are meant to be performed once. Performing again re-runs every
/// hook from scratch and overwrites the previous result and message; the
/// scope's `locals` are kept.
pub struct Operation {
  def: Arc<OperationDef>,
  scope: Scope,
}

impl Operation {
  /// Binds `def` to a single input value.
  pub fn new(def: &Arc<OperationDef>, input: impl Into<Value>, options: Options) -> Self {
    Self::build(def, input.into(), false, options)
  }

  /// Binds `def` to positional arguments. `Scope::input` is the array of all arguments.
  pub fn with_args(def: &Arc<OperationDef>, args: Vec<Value>, options: Options) -> Self {
    Self::build(def, Value::Array(args), true, options)
  }

  fn build(def: &Arc<OperationDef>, input: Value, spread: bool, options: Options) -> Self {
    let options = def.merge_options(options);
    Self {
      scope: Scope::new(Arc::clone(&def.name), input, spread, options),
      def: Arc::clone(def),
    }
  }

  pub fn definition(&self) -> &Arc<OperationDef> {
    &self.def
  }

  pub fn name(&self) -> &str {
    self.def.name()
  }

  pub fn scope(&self) -> &Scope {
    &self.scope
  }

  pub fn input(&self) -> &Value {
    self.scope.input()
  }

  pub fn outcome(&self) -> Option<&Outcome> {
    self.scope.outcome()
  }

  pub fn state(&self) -> State {
    self.scope.outcome().map_or(State::NotRun, Outcome::state)
  }

  pub fn result(&self) -> Option<&Value> {
    self.scope.result()
  }

  pub fn message(&self) -> Option<&str> {
    self.scope.message()
  }

  pub fn is_successful(&self) -> bool {
    self.state() == State::Succeeded
  }

  pub fn is_halted(&self) -> bool {
    self.state() == State::Halted
  }

  pub fn is_failed(&self) -> bool {
    self.state() == State::Failed
  }

  /// Runs the full lifecycle and returns the result.
  ///
  /// A fail is reported through `state`/`message`, not as an `Err`. `Err` is
  /// reserved for misuse: a second fail/halt in the same run, or performing a
  /// definition without an execute body. After an `Err` the instance reports
  /// `State::NotRun`.
  #[instrument(
    name = "operation.perform",
    skip_all,
    fields(operation = %self.def.name, event_name = %self.def.event)
  )]
  pub fn perform(&mut self) -> OperationResult<Option<&Value>> {
    let def = Arc::clone(&self.def);
    self.scope.set_outcome(None);
    self.scope.set_phase(Phase::Created);

    for observer in &def.observers {
      observer.on_start(&def.event, &self.scope);
    }

    let outcome = match self.run_lifecycle(&def) {
      Ok(outcome) => outcome,
      Err(error) => {
        // An aborted run leaves no outcome behind.
        self.scope.set_outcome(None);
        self.scope.set_phase(Phase::Done);
        for observer in &def.observers {
          observer.on_error(&def.event, &self.scope, &error);
        }
        return Err(error);
      }
    };
    event!(Level::DEBUG, state = %outcome.state(), "Operation finished.");
    self.scope.set_outcome(Some(outcome));
    self.scope.set_phase(Phase::Done);

    if let Some(outcome) = self.scope.outcome() {
      for observer in &def.observers {
        observer.on_finish(&def.event, &self.scope, outcome);
      }
    }
    Ok(self.scope.result())
  }

  fn run_lifecycle(&mut self, def: &OperationDef) -> OperationResult<Outcome> {
    // PREPARE
    self.scope.set_phase(Phase::Preparing);
    let mut interrupt: Option<Interrupt> = None;
    for (hook_idx, hook) in def.preparators.iter().enumerate() {
      if let Err(signal) = hook(&mut self.scope) {
        event!(Level::INFO, hook_index = hook_idx, kind = signal.kind(), reason = signal.message(), "Preparator interrupted the operation.");
        interrupt = Some(signal);
        break;
      }
    }

    // EXECUTE
    let candidate = match interrupt {
      Some(signal) => Err(signal),
      None => {
        self.scope.set_phase(Phase::Executing);
        event!(Level::TRACE, "Executing operation body.");
        let flow = self.execute_body(def)?;
        if let Err(signal) = &flow {
          event!(Level::INFO, kind = signal.kind(), reason = signal.message(), "Execute interrupted the operation.");
        }
        flow
      }
    };
    let first_signal = candidate.as_ref().err().map(Interrupt::kind);
    let candidate = match candidate {
      Ok(value) => Outcome::Success(value),
      Err(signal) => signal.into_outcome(),
    };

    // FINALIZE
    self.scope.set_outcome(Some(candidate));
    self.scope.set_phase(Phase::Finalizing);
    for (hook_idx, hook) in def.finalizers.iter().enumerate() {
      if let Err(signal) = hook(&mut self.scope) {
        if let Some(first) = first_signal {
          event!(Level::ERROR, hook_index = hook_idx, first, second = signal.kind(), "Finalizer interrupted an already interrupted run.");
          return Err(OperationError::DoubleInterrupt {
            operation: def.name.to_string(),
            first,
            second: signal.kind(),
          });
        }
        event!(Level::INFO, hook_index = hook_idx, kind = signal.kind(), reason = signal.message(), "Finalizer interrupted the operation.");
        self.scope.set_outcome(Some(signal.into_outcome()));
        break;
      }
    }

    self
      .scope
      .take_outcome()
      .ok_or_else(|| OperationError::Internal(format!("Operation '{}' lost its outcome during finalize", def.name)))
  }

  fn execute_body(&mut self, def: &OperationDef) -> OperationResult<Flow<Value>> {
    match &def.body {
      Body::Execute(body) => Ok(body(&mut self.scope)),
      Body::Pipeline(steps) => run_steps(steps, &mut self.scope),
      Body::Abstract => {
        event!(Level::ERROR, "Operation has no execute body.");
        Err(OperationError::NotImplemented {
          operation: def.name.to_string(),
        })
      }
    }
  }

  pub fn into_outcome(self) -> Option<Outcome> {
    let Operation { mut scope, .. } = self;
    scope.take_outcome()
  }

  /// Consumes a performed instance into the one-shot result: Failed becomes
  /// the definition's error kind, Halted and Succeeded return their result.
  pub fn into_result(self) -> OperationResult<Option<Value>> {
    let Operation { def, mut scope } = self;
    match scope.take_outcome() {
      Some(Outcome::Failed { message }) => Err(def.raise(message)),
      Some(outcome) => Ok(outcome.into_result()),
      None => Err(OperationError::Internal(format!(
        "Operation '{}' has not been performed",
        def.name
      ))),
    }
  }
}

impl std::fmt::Debug for Operation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Operation")
      .field("name", &self.def.name)
      .field("input", self.scope.input())
      .field("state", &self.state())
      .field("phase", &self.scope.phase())
      .finish()
  }
}

impl OperationDef {
  /// Constructs an instance and performs it in one call.
  ///
  /// A Failed outcome is returned as `Err`, using the error kind selected with
  /// `raises` or `OperationError::Failed` by default. A Halted outcome is
  /// returned as `Ok` with the halt's result.
  pub fn perform(self: &Arc<Self>, input: impl Into<Value>, options: Options) -> OperationResult<Option<Value>> {
    let mut operation = Operation::new(self, input, options);
    operation.perform()?;
    operation.into_result()
  }

  /// One-shot `perform` for an operation taking positional arguments.
  pub fn perform_with_args(self: &Arc<Self>, args: Vec<Value>, options: Options) -> OperationResult<Option<Value>> {
    let mut operation = Operation::with_args(self, args, options);
    operation.perform()?;
    operation.into_result()
  }

  pub(crate) fn raise(&self, message: String) -> OperationError {
    match &self.raises {
      Some(make_error) => OperationError::Raised(make_error(message)),
      None => OperationError::Failed {
        operation: self.name.to_string(),
        message,
      },
    }
  }
}
