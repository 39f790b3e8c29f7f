// composable_operations/examples/basic_pipeline.rs

use composable_operations::{options, ComposedOperation, Operation, OperationDef, OperationError, OperationFactory};
use serde_json::json;
use tracing::info;

fn main() -> Result<(), OperationError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 1. Define the steps
  let double = OperationDef::builder("Double")
    .execute(|scope| Ok(json!(scope.input().as_i64().unwrap_or(0) * 2)))
    .build();

  let add = OperationDef::builder("Add")
    .option("amount", 1)
    .execute(|scope| {
      let amount: i64 = scope.option_as("amount")?;
      Ok(json!(scope.input().as_i64().unwrap_or(0) + amount))
    })
    .build();

  // 2. Compose them. The last step's amount is computed from the pipeline's
  //    own input when that step is created.
  let pipeline = ComposedOperation::new("DoubleAddAdd")
    .before(|scope| {
      info!(input = %scope.input(), "Pipeline starting.");
      Ok(())
    })
    .use_operation(&double)
    .use_factory(OperationFactory::new(&add).option("amount", 10))
    .use_factory(OperationFactory::new(&add).deferred("amount", |ctx| ctx.input().clone()))
    .after(|scope| {
      info!(result = ?scope.result(), "Pipeline finished.");
      Ok(())
    })
    .build();

  // 3. Run it once through the one-shot form...
  let result = pipeline.perform(5, options(json!({})))?;
  info!("One-shot result: {:?}", result); // (5 * 2) + 10 + 5 = 25

  // 4. ...and once through an instance, inspecting its state afterwards.
  let mut operation = Operation::new(&pipeline, 7, options(json!({})));
  operation.perform()?;
  info!(
    "Instance result: {:?}, state: {}",
    operation.result(),
    operation.state()
  ); // (7 * 2) + 10 + 7 = 31

  Ok(())
}
