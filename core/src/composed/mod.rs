// composable_operations/src/composed/mod.rs

//! Pipelines of operations: step factories and the composed-operation builder.

pub mod factory;
pub mod pipeline;

pub use factory::{Arity, DeferredFn, OperationFactory, OptionValue};
pub use pipeline::ComposedOperation;
