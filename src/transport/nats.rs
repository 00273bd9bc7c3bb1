//! NATS transport backed by async-nats
//!
//! Core NATS publishing is fire-and-forget: `publish` only queues the message
//! on the client's write buffer. `close` flushes that buffer before the
//! client is dropped.

use super::{BrokerKind, OutboundMessage, Transport, TransportError};
use crate::config::Headers;
use async_nats::HeaderMap;
use async_trait::async_trait;
use tracing::debug;

pub struct NatsTransport {
    client: Option<async_nats::Client>,
}

impl NatsTransport {
    /// Connect using the client's default options
    pub async fn connect(address: &str) -> Result<Self, TransportError> {
        debug!(address = %address, "Connecting to NATS");

        let client = async_nats::ConnectOptions::new()
            .connect(address)
            .await
            .map_err(|e| TransportError::ConnectionFailed(Box::new(e)))?;

        debug!(address = %address, "NATS connection established");
        Ok(Self {
            client: Some(client),
        })
    }

    /// Build a NATS header map, one entry per value in configured order
    pub fn header_map(headers: &Headers) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, values) in headers {
            for value in values {
                map.append(name.as_str(), value.as_str());
            }
        }
        map
    }
}

#[async_trait]
impl Transport for NatsTransport {
    async fn publish(&self, message: OutboundMessage) -> Result<(), TransportError> {
        let client = self.client.as_ref().ok_or(TransportError::Closed)?;

        let result = if message.headers.is_empty() {
            client.publish(message.subject, message.payload).await
        } else {
            let headers = Self::header_map(&message.headers);
            client
                .publish_with_headers(message.subject, headers, message.payload)
                .await
        };

        result.map_err(|e| TransportError::PublishFailed(Box::new(e)))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };

        debug!("Flushing and closing NATS connection");
        client
            .flush()
            .await
            .map_err(|e| TransportError::PublishFailed(Box::new(e)))
    }

    fn kind(&self) -> BrokerKind {
        BrokerKind::Nats
    }
}
