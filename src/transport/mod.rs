//! Transport layer for broker publishing
//!
//! This module provides the connection abstraction used by the publisher and
//! the NATS and MQTT implementations behind it. The broker is chosen from the
//! address scheme.

use crate::config::{Headers, Message};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod mqtt;
pub mod nats;

pub use mqtt::MqttTransport;
pub use nats::NatsTransport;

/// Broker transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid broker address: {0}")]
    InvalidAddress(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Publishing failed: {0}")]
    PublishFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Connection already closed")]
    Closed,
}

/// Wire-level message handed to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub subject: String,
    pub payload: Bytes,
    pub headers: Headers,
}

impl From<&Message> for OutboundMessage {
    fn from(message: &Message) -> Self {
        Self {
            subject: message.subject.clone(),
            payload: Bytes::from(message.payload.clone().into_bytes()),
            headers: message.headers.clone(),
        }
    }
}

/// Supported broker protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerKind {
    Nats,
    Mqtt,
}

impl BrokerKind {
    /// Pick the broker protocol from an address
    ///
    /// Addresses without a scheme (`localhost:4222`) are NATS, matching the
    /// NATS client's own default.
    pub fn from_address(address: &str) -> Result<Self, TransportError> {
        let Some((scheme, _)) = address.split_once("://") else {
            return Ok(BrokerKind::Nats);
        };

        match scheme.to_ascii_lowercase().as_str() {
            "nats" | "tls" | "ws" | "wss" => Ok(BrokerKind::Nats),
            "mqtt" | "mqtts" => Ok(BrokerKind::Mqtt),
            _ => Err(TransportError::InvalidAddress(address.to_string())),
        }
    }
}

/// An open, exclusively owned broker connection
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit a message for delivery
    ///
    /// Returns once the client has accepted the message for transmission. No
    /// broker acknowledgment is awaited.
    async fn publish(&self, message: OutboundMessage) -> Result<(), TransportError>;

    /// Flush pending writes and release the connection
    async fn close(&mut self) -> Result<(), TransportError>;

    fn kind(&self) -> BrokerKind;
}

/// Opens broker connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, address: &str) -> Result<Box<dyn Transport>, TransportError>;
}

/// Default connector dispatching on the address scheme
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokerConnector;

#[async_trait]
impl Connector for BrokerConnector {
    async fn connect(&self, address: &str) -> Result<Box<dyn Transport>, TransportError> {
        match BrokerKind::from_address(address)? {
            BrokerKind::Nats => Ok(Box::new(NatsTransport::connect(address).await?)),
            BrokerKind::Mqtt => Ok(Box::new(MqttTransport::connect(address).await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_kind_from_scheme() {
        assert_eq!(
            BrokerKind::from_address("nats://localhost:4222").unwrap(),
            BrokerKind::Nats
        );
        assert_eq!(
            BrokerKind::from_address("tls://demo.nats.io:4443").unwrap(),
            BrokerKind::Nats
        );
        assert_eq!(
            BrokerKind::from_address("MQTT://localhost:1883").unwrap(),
            BrokerKind::Mqtt
        );
        assert_eq!(
            BrokerKind::from_address("mqtts://broker.example.com").unwrap(),
            BrokerKind::Mqtt
        );
    }

    #[test]
    fn test_broker_kind_without_scheme_is_nats() {
        assert_eq!(
            BrokerKind::from_address("localhost:4222").unwrap(),
            BrokerKind::Nats
        );
    }

    #[test]
    fn test_broker_kind_rejects_unknown_scheme() {
        let result = BrokerKind::from_address("amqp://localhost:5672");
        assert!(matches!(result, Err(TransportError::InvalidAddress(ref a)) if a == "amqp://localhost:5672"));
    }

    #[test]
    fn test_outbound_message_from_config_message() {
        let mut headers = Headers::new();
        headers.insert("X-Trace".to_string(), vec!["abc".to_string(), "abc".to_string()]);
        let message = Message {
            subject: "orders.created".to_string(),
            payload: "{}".to_string(),
            headers: headers.clone(),
        };

        let outbound = OutboundMessage::from(&message);
        assert_eq!(outbound.subject, "orders.created");
        assert_eq!(outbound.payload, Bytes::from_static(b"{}"));
        assert_eq!(outbound.headers, headers);
    }

    #[test]
    fn test_transport_error_display_includes_cause() {
        let error = TransportError::ConnectionFailed("connection refused".into());
        assert_eq!(error.to_string(), "Connection failed: connection refused");
        assert_eq!(
            TransportError::Closed.to_string(),
            "Connection already closed"
        );
    }
}
