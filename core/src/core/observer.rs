// composable_operations/src/core/observer.rs

//! Instrumentation around `perform`. An `Observer` is injected per definition
//! and sees every run of that definition (and of definitions extending it).

use crate::core::control::{Outcome, State};
use crate::core::scope::Scope;
use crate::error::OperationError;
use parking_lot::Mutex;
use serde_json::Value;

/// Receives a notification before the lifecycle starts and after it ends.
///
/// Every `on_start` is paired with exactly one `on_finish` or `on_error`.
/// All callbacks see the operation's scope. Observers cannot change the outcome.
pub trait Observer: Send + Sync {
  fn on_start(&self, _event: &str, _scope: &Scope) {}

  fn on_finish(&self, _event: &str, _scope: &Scope, _outcome: &Outcome) {}

  /// Called instead of `on_finish` when `perform` returns `Err`.
  fn on_error(&self, _event: &str, _scope: &Scope, _error: &OperationError) {}
}

/// One finished run as captured by `EventLog`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
  pub event: String,
  pub operation: String,
  pub input: Value,
  pub state: State,
  pub message: Option<String>,
}

/// In-memory observer that records every finished run.
#[derive(Debug, Default)]
pub struct EventLog {
  started: Mutex<Vec<String>>,
  finished: Mutex<Vec<RecordedEvent>>,
}

impl EventLog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Event names in the order runs started.
  pub fn started(&self) -> Vec<String> {
    self.started.lock().clone()
  }

  /// Finished runs in completion order, including runs that ended in an error. Nested operations finish before their parents.
  pub fn finished(&self) -> Vec<RecordedEvent> {
    self.finished.lock().clone()
  }

  pub fn clear(&self) {
    self.started.lock().clear();
    self.finished.lock().clear();
  }
}

impl Observer for EventLog {
  fn on_start(&self, event: &str, _scope: &Scope) {
    self.started.lock().push(event.to_string());
  }

  fn on_finish(&self, event: &str, scope: &Scope, outcome: &Outcome) {
    self.finished.lock().push(RecordedEvent {
      event: event.to_string(),
      operation: scope.name().to_string(),
      input: scope.input().clone(),
      state: outcome.state(),
      message: outcome.message().map(str::to_string),
    });
  }

  fn on_error(&self, event: &str, scope: &Scope, error: &OperationError) {
    self.finished.lock().push(RecordedEvent {
      event: event.to_string(),
      operation: scope.name().to_string(),
      input: scope.input().clone(),
      state: State::NotRun,
      message: Some(error.to_string()),
    });
  }
}

/// Derives the instrumentation event name from an operation name.
///
/// `Billing::ChargeCard` becomes `charge_card.billing.operation`.
pub fn event_name(operation_name: &str) -> String {
  let mut parts: Vec<String> = vec!["operation".to_string()];
  parts.extend(
    operation_name
      .split("::")
      .filter(|segment| !segment.is_empty())
      .map(underscore),
  );
  parts.reverse();
  parts.join(".")
}

fn underscore(segment: &str) -> String {
  let mut out = String::with_capacity(segment.len() + 4);
  let chars: Vec<char> = segment.chars().collect();
  for (i, c) in chars.iter().enumerate() {
    if c.is_uppercase() {
      let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
      let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
      let prev_upper = i > 0 && chars[i - 1].is_uppercase();
      if prev_lower || (prev_upper && next_lower) {
        out.push('_');
      }
      out.extend(c.to_lowercase());
    } else if *c == '-' || c.is_whitespace() {
      out.push('_');
    } else {
      out.push(*c);
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn event_names_follow_namespace_in_reverse() {
    assert_eq!(event_name("Billing::ChargeCard"), "charge_card.billing.operation");
    assert_eq!(event_name("StringMultiplier"), "string_multiplier.operation");
    assert_eq!(event_name("HTTPFetch"), "http_fetch.operation");
    assert_eq!(event_name(""), "operation");
  }
}
