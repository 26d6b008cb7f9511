//! Named-entity recognition with ordered fallback.
//!
//! Strategies are tried in order. The first one that answers with at least
//! one entity wins; a failure or an empty answer hands over to the next.

use async_trait::async_trait;
use redline_core::{NerItem, normalize_entities, parse_entities};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::{DetectOptions, RedactionClient};
use crate::{ClientError, Result};

/// One way of asking the server for entities
#[async_trait]
pub trait NerStrategy: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Raw entity payload for `text`
    async fn recognize(&self, client: &RedactionClient, text: &str) -> Result<Value>;
}

/// `POST /text/ner`
pub struct DedicatedNer;

#[async_trait]
impl NerStrategy for DedicatedNer {
    fn name(&self) -> &'static str {
        "ner"
    }

    async fn recognize(&self, client: &RedactionClient, text: &str) -> Result<Value> {
        client.ner(text).await
    }
}

/// `POST /text/detect` with regex matching switched off
pub struct DetectNer;

#[async_trait]
impl NerStrategy for DetectNer {
    fn name(&self) -> &'static str {
        "detect"
    }

    async fn recognize(&self, client: &RedactionClient, text: &str) -> Result<Value> {
        client.detect(text, DetectOptions::ner_only()).await
    }
}

/// Entities plus the strategy that produced them
#[derive(Debug, Clone, Default, Serialize)]
pub struct NerOutcome {
    pub items: Vec<NerItem>,
    pub strategy: Option<&'static str>,
}

pub struct NerChain {
    strategies: Vec<Box<dyn NerStrategy>>,
}

impl NerChain {
    pub fn new(strategies: Vec<Box<dyn NerStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the strategies in order.
    ///
    /// Returns the last error only when every strategy failed; if at least
    /// one answered (with nothing), the outcome is empty.
    pub async fn run(&self, client: &RedactionClient, text: &str) -> Result<NerOutcome> {
        let mut answered = false;
        let mut last_error: Option<ClientError> = None;

        for strategy in &self.strategies {
            let items = match strategy.recognize(client, text).await {
                Ok(payload) => parse_entities(payload)
                    .map_err(|e| ClientError::Decode(format!("{}: {}", strategy.name(), e))),
                Err(e) => Err(e),
            };

            match items {
                Ok(items) => {
                    answered = true;
                    let items = normalize_entities(text, items);
                    if !items.is_empty() {
                        info!("NER via {}: {} entities", strategy.name(), items.len());
                        return Ok(NerOutcome {
                            items,
                            strategy: Some(strategy.name()),
                        });
                    }
                    warn!("NER strategy '{}' returned no entities", strategy.name());
                }
                Err(e) => {
                    warn!("NER strategy '{}' failed: {}", strategy.name(), e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !answered => Err(e),
            _ => Ok(NerOutcome::default()),
        }
    }
}

impl Default for NerChain {
    fn default() -> Self {
        Self::new(vec![Box::new(DedicatedNer), Box::new(DetectNer)])
    }
}
