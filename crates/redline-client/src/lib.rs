//! Async client for the redline redaction service
//!
//! Every call the scan workflow makes goes through [`RedactionClient`];
//! entity recognition is layered on top as an ordered [`NerChain`].

pub mod api;
pub mod error;
pub mod ner;

pub use api::{DetectOptions, RedactRequest, RedactionClient, Upload};
pub use error::{ClientError, Result};
pub use ner::{DedicatedNer, DetectNer, NerChain, NerOutcome, NerStrategy};
