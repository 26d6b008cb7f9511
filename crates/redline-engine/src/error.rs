//! Error types for redline-engine

use redline_client::ClientError;
use redline_core::CoreError;
use thiserror::Error;

use crate::report::Step;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The session was not in a state that allows the requested action
    #[error(transparent)]
    Session(#[from] CoreError),

    #[error("{step} failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: ClientError,
    },
}

impl EngineError {
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Step { step, .. } => Some(*step),
            Self::Session(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Step { source, .. } => source.status(),
            Self::Session(_) => None,
        }
    }
}
