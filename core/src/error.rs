// composable_operations/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
  /// A one-shot `perform` ended in the Failed state. Displays as the failure message.
  #[error("{message}")]
  Failed { operation: String, message: String },

  /// A one-shot `perform` failed and the definition selected its own error kind via `raises`.
  #[error(transparent)]
  Raised(AnyhowError),

  #[error("Operation '{operation}' signalled {second} after it had already signalled {first} in the same run")]
  DoubleInterrupt {
    operation: String,
    first: &'static str,
    second: &'static str,
  },

  #[error("Operation '{operation}' does not implement execute")]
  NotImplemented { operation: String },

  #[error("Internal error: {0}")]
  Internal(String),

  #[error("Configuration error for operation '{operation}': {message}")]
  Configuration { operation: String, message: String },
}

impl OperationError {
  /// The failure message for `Failed`, or the display text of any other variant.
  pub fn message(&self) -> String {
    match self {
      OperationError::Failed { message, .. } => message.clone(),
      other => other.to_string(),
    }
  }

  /// Downcasts a caller-selected error kind.
  pub fn downcast_ref<E>(&self) -> Option<&E>
  where
    E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
  {
    match self {
      OperationError::Raised(source) => source.downcast_ref::<E>(),
      _ => None,
    }
  }
}

pub type OperationResult<T, E = OperationError> = std::result::Result<T, E>;
