//! Pipeline execution engine

pub mod engine;
pub mod executor;
pub mod resolver;

pub use engine::{EventHandler, ExecutionEngine, ExecutionEvent};
pub use executor::{EventSink, TaskExecutor, TaskFailure};
pub use resolver::VolumeResolver;
