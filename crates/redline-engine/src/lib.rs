pub mod error;
pub mod pipeline;
pub mod report;

pub use error::{EngineError, Result};
pub use pipeline::{NoopObserver, Pipeline, PipelineObserver, ScanSettings};
pub use report::{RedactionSummary, ScanReport, Step, StepOutput, StepRecord};
