// composable_operations/src/operation/mod.rs

//! Defines `OperationDef` (the reusable definition), its builder and hook
//! registration, and `Operation` (an instance) with its `perform` lifecycle.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::{OperationBuilder, OperationDef, RaiseFn};
pub use execution::Operation;
