// src/lib.rs

//! Composable operations: units of work with a fixed
//! prepare → execute → finalize lifecycle, and pipelines built from them.
//!
//! An operation ends in exactly one of three states:
//!  - succeeded, with the value its execute body returned,
//!  - halted, an early but successful stop carrying a message and an optional partial result,
//!  - failed, carrying a message and no result.
//!
//! Hooks and execute bodies signal fail/halt by returning `Err(Interrupt)`,
//! usually via the `fail(..)` and `halt(..)` helpers. The interrupt ends the
//! current phase; finalizers still run.
//!
//! A `ComposedOperation` is an operation whose execute phase feeds its input
//! through an ordered list of steps. A failing or halting step fails or halts
//! the whole pipeline with the same message.
//!
//! ```
//! use composable_operations::{fail, options, ComposedOperation, OperationDef};
//! use serde_json::{json, Value};
//!
//! let double = OperationDef::builder("Double")
//!   .execute(|scope| Ok(json!(scope.input().as_i64().unwrap_or(0) * 2)))
//!   .build();
//! let positive = OperationDef::builder("RequirePositive")
//!   .execute(|scope| match scope.input().as_i64() {
//!     Some(n) if n > 0 => Ok(Value::from(n)),
//!     _ => fail("not positive"),
//!   })
//!   .build();
//!
//! let pipeline = ComposedOperation::compose("DoubleThenCheck", [double, positive]).unwrap();
//! assert_eq!(pipeline.perform(21, options(json!({}))).unwrap(), Some(json!(42)));
//! assert_eq!(pipeline.perform(-1, options(json!({}))).unwrap_err().to_string(), "not positive");
//! ```

pub mod composed;
pub mod core;
pub mod error;
pub mod operation;

// --- Re-exports for the Public API ---

pub use crate::core::control::{fail, halt, Flow, Interrupt, Outcome, Phase, State};
pub use crate::core::observer::{event_name, EventLog, Observer, RecordedEvent};
pub use crate::core::scope::{options, Options, Scope};

pub use crate::operation::{Operation, OperationBuilder, OperationDef};

pub use crate::composed::{Arity, ComposedOperation, OperationFactory, OptionValue};

pub use crate::error::{OperationError, OperationResult};
