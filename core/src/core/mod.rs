pub mod control;
pub mod observer;
pub mod scope;

// Re-export key types for easier access from other modules (and lib.rs)
pub use control::{fail, halt, Flow, Interrupt, Outcome, Phase, State};
pub use observer::{EventLog, Observer, RecordedEvent};
pub use scope::{options, ExecuteFn, Hook, Options, Scope};
