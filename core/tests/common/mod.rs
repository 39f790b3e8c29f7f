// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use composable_operations::{fail, halt, Flow, Operation, OperationDef, Options, Scope};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counter for checking how often pipeline steps get created ---
pub static STEP_CONSTRUCTIONS: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  STEP_CONSTRUCTIONS.store(0, Ordering::SeqCst);
}

pub fn step_constructions() -> usize {
  STEP_CONSTRUCTIONS.load(Ordering::SeqCst)
}

pub fn no_options() -> Options {
  Options::new()
}

/// Reads the `trace` local of an operation as strings.
pub fn trace_of(operation: &Operation) -> Vec<String> {
  trace_in(operation.scope())
}

pub fn trace_in(scope: &Scope) -> Vec<String> {
  match scope.local("trace") {
    Some(Value::Array(items)) => items
      .iter()
      .filter_map(|item| item.as_str().map(str::to_string))
      .collect(),
    _ => Vec::new(),
  }
}

// --- Control-flow test operation ---

/// Fails or halts at `point` when the input array asks for it,
/// e.g. `["fail_in_inner_after"]`.
fn flow_control(scope: &Scope, point: &str) -> Flow {
  let wants = |flag: String| {
    scope
      .input()
      .as_array()
      .is_some_and(|flags| flags.iter().any(|f| f.as_str() == Some(flag.as_str())))
  };
  let label = point.replace('_', " ");
  if wants(format!("fail_in_{}", point)) {
    return fail(format!("Fail in {}", label));
  }
  if wants(format!("halt_in_{}", point)) {
    return halt(format!("Halt in {}", label), None);
  }
  Ok(())
}

/// An operation with two preparators and two finalizers that records every
/// phase it enters in its `trace` local.
pub fn flow_control_operation() -> Arc<OperationDef> {
  OperationDef::builder("FlowControl")
    .before(|scope| {
      scope.push_local("trace", "outer_before");
      flow_control(scope, "outer_before")
    })
    .before(|scope| {
      scope.push_local("trace", "inner_before");
      flow_control(scope, "inner_before")
    })
    .after(|scope| {
      scope.push_local("trace", "inner_after");
      flow_control(scope, "inner_after")
    })
    .after(|scope| {
      scope.push_local("trace", "outer_after");
      flow_control(scope, "outer_after")
    })
    .execute(|scope| {
      scope.push_local("trace", "execute_start");
      flow_control(scope, "execute")?;
      scope.push_local("trace", "execute_stop");
      Ok(json!("final_result"))
    })
    .build()
}

// --- Arithmetic steps used by the pipeline tests ---

fn integer_input(scope: &Scope) -> Flow<i64> {
  match scope.input().as_i64() {
    Some(n) => Ok(n),
    None => fail(format!("{} expects an integer, got {}", scope.name(), scope.input())),
  }
}

pub fn double_value() -> Arc<OperationDef> {
  OperationDef::builder("DoubleValue")
    .execute(|scope| Ok(json!(integer_input(scope)? * 2)))
    .build()
}

pub fn halt_if_negative() -> Arc<OperationDef> {
  OperationDef::builder("HaltIfNegative")
    .execute(|scope| {
      let n = integer_input(scope)?;
      if n < 0 {
        return halt("negative", json!(n));
      }
      Ok(json!(n))
    })
    .build()
}

pub fn fail_if_negative() -> Arc<OperationDef> {
  OperationDef::builder("FailIfNegative")
    .execute(|scope| {
      let n = integer_input(scope)?;
      if n < 0 {
        return fail("negative input");
      }
      Ok(json!(n))
    })
    .build()
}

pub fn increment_value() -> Arc<OperationDef> {
  OperationDef::builder("IncrementValue")
    .execute(|scope| Ok(json!(integer_input(scope)? + 1)))
    .build()
}

/// Adds its `offset` option to the input.
pub fn add_offset() -> Arc<OperationDef> {
  OperationDef::builder("AddOffset")
    .option("offset", 0)
    .execute(|scope| {
      let offset: i64 = scope.option_as("offset")?;
      Ok(json!(integer_input(scope)? + offset))
    })
    .build()
}

/// Repeats the input string `multiplier` times (default 3).
pub fn string_multiplier() -> Arc<OperationDef> {
  OperationDef::builder("StringMultiplier")
    .option("multiplier", 3)
    .execute(|scope| {
      let multiplier: usize = scope.option_as("multiplier")?;
      let text = scope.input().as_str().unwrap_or_default().to_string();
      Ok(json!(text.repeat(multiplier)))
    })
    .build()
}

/// Takes `(string, multiplier)` as positional arguments.
pub fn positional_multiplier() -> Arc<OperationDef> {
  OperationDef::builder("PositionalMultiplier")
    .execute(|scope| {
      let text = scope.arg(0).and_then(Value::as_str).unwrap_or_default().to_string();
      let times = scope.arg(1).and_then(Value::as_u64).unwrap_or(1) as usize;
      Ok(json!(text.repeat(times)))
    })
    .build()
}
