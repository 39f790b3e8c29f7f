// composable_operations/examples/error_handling.rs

use composable_operations::{fail, Operation, OperationDef, Options};
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
#[error("payment declined: {0}")]
struct PaymentDeclined(String);

fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Error Handling Example ---");

  // 1. An operation that fails for large amounts and raises its own error kind
  let charge = OperationDef::builder("Payments::Charge")
    .raises(PaymentDeclined)
    .execute(|scope| {
      let amount = scope.input().as_u64().unwrap_or(0);
      if amount > 100 {
        return fail(format!("amount {} exceeds limit", amount));
      }
      Ok(json!({ "charged": amount }))
    })
    .after(|scope| {
      info!(state = ?scope.outcome().map(|o| o.state()), "Charge attempt finished.");
      Ok(())
    })
    .build();

  // 2. Instance API: failures are reported through state, never raised
  let mut operation = Operation::new(&charge, 500, Options::new());
  if operation.perform().is_ok() && operation.is_failed() {
    warn!("Instance reported failure: {:?}", operation.message());
  }

  // 3. One-shot API: failures are raised as the selected error kind
  match charge.perform(Value::from(500), Options::new()) {
    Ok(result) => info!("Charged: {:?}", result),
    Err(err) => match err.downcast_ref::<PaymentDeclined>() {
      Some(declined) => warn!("Raised custom error: {}", declined),
      None => warn!("Raised: {}", err),
    },
  }

  match charge.perform(Value::from(40), Options::new()) {
    Ok(result) => info!("Charged: {:?}", result),
    Err(err) => warn!("Unexpected failure: {}", err),
  }
}
