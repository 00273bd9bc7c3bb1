//! Host-facing step executor
//!
//! The host decodes a step with [`Executor::decode`] and runs it with
//! [`Executor::run`]. Fatal configuration and connection problems come back as
//! `Err`; per-message publish failures are reported inside the returned
//! [`StepOutput`] so the host's assertions can inspect them.

use crate::config::{ClientMode, StepConfig};
use crate::error::{StepError, StepResult};
use crate::publisher::Publisher;
use crate::result::StepOutput;
use crate::transport::{BrokerConnector, Connector};
use async_trait::async_trait;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

/// Name under which hosts usually register this executor
pub const EXECUTOR_NAME: &str = "nats";

/// Narrow capability a test host needs from a step implementation
#[async_trait]
pub trait Executor: Send + Sync {
    type Config: Send;

    /// Turn the host's untyped step record into typed configuration
    fn decode(&self, step: serde_json::Value) -> StepResult<Self::Config>;

    /// Execute one run
    async fn run(&self, ctx: &CancellationToken, config: Self::Config) -> StepResult<StepOutput>;

    /// Decode then run
    async fn execute(
        &self,
        ctx: &CancellationToken,
        step: serde_json::Value,
    ) -> StepResult<StepOutput> {
        let config = self.decode(step)?;
        self.run(ctx, config).await
    }
}

/// Publish-mode executor
#[derive(Debug, Clone, Default)]
pub struct PublishExecutor<C = BrokerConnector> {
    publisher: Publisher<C>,
}

impl PublishExecutor<BrokerConnector> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Connector> PublishExecutor<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            publisher: Publisher::with_connector(connector),
        }
    }

    async fn dispatch(
        &self,
        ctx: &CancellationToken,
        config: &StepConfig,
    ) -> StepResult<StepOutput> {
        let start = Instant::now();
        let mut output = StepOutput::default();

        if config.addr.is_empty() {
            return Err(StepError::MissingAddress);
        }

        match config.client_type.parse::<ClientMode>()? {
            ClientMode::Publisher => {
                let outcome = self
                    .publisher
                    .publish_messages(&config.addr, &config.messages, ctx)
                    .await?;

                debug!(sent = outcome.sent, "Publish pass finished");
                if let Some(error) = outcome.error {
                    output.err = error.to_string();
                }
            }
        }

        output.time_seconds = start.elapsed().as_secs_f64();
        Ok(output)
    }
}

#[async_trait]
impl<C: Connector> Executor for PublishExecutor<C> {
    type Config = StepConfig;

    fn decode(&self, step: serde_json::Value) -> StepResult<StepConfig> {
        Ok(StepConfig::from_value(step)?)
    }

    async fn run(&self, ctx: &CancellationToken, config: StepConfig) -> StepResult<StepOutput> {
        let span = crate::publish_span!(
            address = %config.addr,
            client_type = %config.client_type,
            messages = config.messages.len()
        );

        self.dispatch(ctx, &config).instrument(span).await
    }
}
