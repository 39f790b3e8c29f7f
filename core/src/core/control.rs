// composable_operations/src/core/control.rs

//! Defines the signals an operation uses to leave a lifecycle phase early
//! (`Interrupt`), and the outcome of a full operation run (`Outcome`).

use serde_json::Value;
use std::fmt;

/// Signal raised from a hook or an execute body to end the current phase early.
///
/// Returning `Err(Interrupt)` from a preparator, execute body or finalizer skips
/// the remaining work of that phase. The `perform` driver records the interrupt
/// as the operation's outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Interrupt {
  /// Unrecoverable error for this run.
  Fail { message: String },
  /// Early, successful termination carrying an optional partial result.
  Halt { message: String, value: Option<Value> },
}

impl Interrupt {
  pub fn fail(message: impl Into<String>) -> Self {
    Interrupt::Fail {
      message: message.into(),
    }
  }

  pub fn halt(message: impl Into<String>, value: impl Into<Option<Value>>) -> Self {
    Interrupt::Halt {
      message: message.into(),
      value: value.into(),
    }
  }

  /// Builds a `Fail` from anything displayable, e.g. an `anyhow::Error`.
  pub fn failure(err: impl fmt::Display) -> Self {
    Interrupt::Fail {
      message: err.to_string(),
    }
  }

  pub fn message(&self) -> &str {
    match self {
      Interrupt::Fail { message } | Interrupt::Halt { message, .. } => message,
    }
  }

  /// Short name used in logs and misuse errors.
  pub fn kind(&self) -> &'static str {
    match self {
      Interrupt::Fail { .. } => "fail",
      Interrupt::Halt { .. } => "halt",
    }
  }

  pub(crate) fn into_outcome(self) -> Outcome {
    match self {
      Interrupt::Fail { message } => Outcome::Failed { message },
      Interrupt::Halt { message, value } => Outcome::Halted { message, value },
    }
  }
}

// `?` on any error inside a hook or execute body fails the operation with the
// error's message.
impl<E> From<E> for Interrupt
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(err: E) -> Self {
    Interrupt::failure(err)
  }
}

/// Return type of hooks and execute bodies.
pub type Flow<T = ()> = Result<T, Interrupt>;

/// Fails the running operation. Use as `return fail("reason");`.
pub fn fail<T>(message: impl Into<String>) -> Flow<T> {
  Err(Interrupt::fail(message))
}

/// Halts the running operation with an optional partial result.
pub fn halt<T>(message: impl Into<String>, value: impl Into<Option<Value>>) -> Flow<T> {
  Err(Interrupt::halt(message, value))
}

/// Outcome of a full operation run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  /// Execute returned normally and no finalizer interrupted.
  Success(Value),
  /// The run was halted. Not an error.
  Halted { message: String, value: Option<Value> },
  /// The run failed. The result is always absent.
  Failed { message: String },
}

impl Outcome {
  pub fn result(&self) -> Option<&Value> {
    match self {
      Outcome::Success(value) => Some(value),
      Outcome::Halted { value, .. } => value.as_ref(),
      Outcome::Failed { .. } => None,
    }
  }

  pub fn into_result(self) -> Option<Value> {
    match self {
      Outcome::Success(value) => Some(value),
      Outcome::Halted { value, .. } => value,
      Outcome::Failed { .. } => None,
    }
  }

  pub fn message(&self) -> Option<&str> {
    match self {
      Outcome::Success(_) => None,
      Outcome::Halted { message, .. } | Outcome::Failed { message } => Some(message),
    }
  }

  pub fn state(&self) -> State {
    match self {
      Outcome::Success(_) => State::Succeeded,
      Outcome::Halted { .. } => State::Halted,
      Outcome::Failed { .. } => State::Failed,
    }
  }

  pub fn is_successful(&self) -> bool {
    matches!(self, Outcome::Success(_))
  }

  pub fn is_halted(&self) -> bool {
    matches!(self, Outcome::Halted { .. })
  }

  pub fn is_failed(&self) -> bool {
    matches!(self, Outcome::Failed { .. })
  }
}

/// State of an operation instance, derived from its recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  NotRun,
  Succeeded,
  Halted,
  Failed,
}

impl fmt::Display for State {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      State::NotRun => "not_run",
      State::Succeeded => "succeeded",
      State::Halted => "halted",
      State::Failed => "failed",
    };
    f.write_str(s)
  }
}

/// Lifecycle phase an operation instance is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Created,
  Preparing,
  Executing,
  Finalizing,
  Done,
}
