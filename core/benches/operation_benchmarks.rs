use composable_operations::{ComposedOperation, Operation, OperationDef, OperationFactory, Options};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use std::sync::Arc;

// --- Helper: increment step with a configurable number of no-op hooks ---
fn increment_with_hooks(hooks: usize) -> Arc<OperationDef> {
  let mut builder = OperationDef::builder("Increment")
    .execute(|scope| Ok(json!(scope.input().as_i64().unwrap_or(0) + 1)));
  for _ in 0..hooks {
    builder = builder.before(|_scope| Ok(())).after(|_scope| Ok(()));
  }
  builder.build()
}

fn bench_single_operation(c: &mut Criterion) {
  let mut group = c.benchmark_group("SingleOperation");

  for hooks in [0usize, 2, 8].iter() {
    let def = increment_with_hooks(*hooks);
    group.bench_with_input(BenchmarkId::new("hooks", hooks), hooks, |b, _| {
      b.iter(|| {
        let mut operation = Operation::new(&def, 1, Options::new());
        operation.perform().unwrap().cloned()
      })
    });
  }
  group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
  let mut group = c.benchmark_group("ComposedPipeline");

  for num_steps in [1usize, 5, 20].iter() {
    let step = increment_with_hooks(1);
    let pipeline = (0..*num_steps)
      .fold(ComposedOperation::new("Chain"), |composed, _| composed.use_operation(&step))
      .build();
    group.bench_with_input(BenchmarkId::new("steps", num_steps), num_steps, |b, _| {
      b.iter(|| pipeline.perform(0, Options::new()).unwrap())
    });
  }
  group.finish();
}

fn bench_deferred_options(c: &mut Criterion) {
  let mut group = c.benchmark_group("DeferredOptions");

  let add = OperationDef::builder("Add")
    .option("offset", 0)
    .execute(|scope| {
      let offset: i64 = scope.option_as("offset")?;
      Ok(json!(scope.input().as_i64().unwrap_or(0) + offset))
    })
    .build();
  let pipeline = ComposedOperation::new("DeferredChain")
    .use_factory(OperationFactory::new(&add).deferred("offset", |ctx| ctx.input().clone()))
    .use_factory(OperationFactory::new(&add).option("offset", 10))
    .build();

  group.bench_function("two_steps", |b| {
    b.iter(|| pipeline.perform(Value::from(5), Options::new()).unwrap())
  });
  group.finish();
}

criterion_group!(benches, bench_single_operation, bench_pipeline, bench_deferred_options);
criterion_main!(benches);
