// composable_operations/src/operation/hooks.rs

//! Contains the `before` / `after` hook registration on `OperationBuilder` and
//! the rule that nests own hooks inside inherited ones.

use crate::core::control::Flow;
use crate::core::scope::{Hook, Scope};
use crate::operation::definition::OperationBuilder;
use std::sync::Arc;

impl OperationBuilder {
  /// Registers a preparator.
  ///
  /// Preparators run before execute, ancestor-first. Within one definition
  /// they run in registration order. A fail or halt skips the remaining
  /// preparators and execute; finalizers still run.
  pub fn before(mut self, hook: impl Fn(&mut Scope) -> Flow + Send + Sync + 'static) -> Self {
    self.before.push(Arc::new(hook));
    self
  }

  /// Registers a finalizer.
  ///
  /// Finalizers run after execute, own-first, so inherited cleanup always runs
  /// last. Within one definition they run in registration order. A fail or
  /// halt overrides the outcome and skips the remaining finalizers.
  pub fn after(mut self, hook: impl Fn(&mut Scope) -> Flow + Send + Sync + 'static) -> Self {
    self.after.push(Arc::new(hook));
    self
  }

  /// Flattens inherited and own hooks into the two ordered lists a definition runs.
  pub(crate) fn resolve_hooks(&self) -> (Vec<Hook>, Vec<Hook>) {
    let preparators = self
      .inherited_preparators
      .iter()
      .chain(self.before.iter())
      .cloned()
      .collect();
    let finalizers = self
      .after
      .iter()
      .chain(self.inherited_finalizers.iter())
      .cloned()
      .collect();
    (preparators, finalizers)
  }
}
