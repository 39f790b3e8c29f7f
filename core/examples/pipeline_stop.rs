// composable_operations/examples/pipeline_stop.rs

use composable_operations::{halt, ComposedOperation, Operation, OperationDef, OperationError, Options};
use serde_json::json;
use tracing::{error, info};

fn main() -> Result<(), OperationError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Pipeline Halt Example ---");

  // 1. A step that halts on cached input, returning the cached value
  let lookup_cache = OperationDef::builder("LookupCache")
    .execute(|scope| {
      if scope.input() == &json!("cached") {
        return halt("served from cache", json!("cached-value"));
      }
      Ok(scope.input().clone())
    })
    .build();

  let expensive = OperationDef::builder("ExpensiveComputation")
    .execute(|scope| {
      info!("Computing for {}", scope.input());
      Ok(json!(format!("computed:{}", scope.input().as_str().unwrap_or_default())))
    })
    .build();

  let pipeline = ComposedOperation::compose("CachedComputation", [lookup_cache, expensive])?;

  // 2. A cache hit halts the pipeline; the expensive step never runs
  let mut hit = Operation::new(&pipeline, "cached", Options::new());
  hit.perform()?;
  if hit.is_halted() {
    info!("Halted: {:?} with result {:?}", hit.message(), hit.result());
  } else {
    error!("Pipeline should have halted on a cache hit.");
  }

  // 3. A cache miss runs every step
  let mut miss = Operation::new(&pipeline, "fresh", Options::new());
  miss.perform()?;
  info!("Completed with result {:?}", miss.result());

  Ok(())
}
