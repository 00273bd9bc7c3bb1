//! Mock implementations for testing
//!
//! Provides mock Connector and Transport implementations so the publish path
//! can be exercised without a running broker.

use crate::transport::{BrokerKind, Connector, OutboundMessage, Transport, TransportError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mock transport recording every accepted message
///
/// Clones share their recorded state, so a test can keep one handle while
/// the publisher owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    pub published_messages: Arc<Mutex<Vec<OutboundMessage>>>,
    pub publish_attempts: Arc<AtomicUsize>,
    pub closed: Arc<AtomicBool>,
    /// Zero-based attempt that fails with a publish error
    pub fail_at: Option<usize>,
    /// Simulated per-message submission latency
    pub latency: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Default::default()
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Default::default()
        }
    }

    pub async fn get_published_messages(&self) -> Vec<OutboundMessage> {
        self.published_messages.lock().await.clone()
    }

    /// Number of publish calls, including the failing one
    pub fn attempts(&self) -> usize {
        self.publish_attempts.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn publish(&self, message: OutboundMessage) -> Result<(), TransportError> {
        let attempt = self.publish_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.fail_at == Some(attempt) {
            return Err(TransportError::PublishFailed("Mock publish failure".into()));
        }

        self.published_messages.lock().await.push(message);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn kind(&self) -> BrokerKind {
        BrokerKind::Nats
    }
}

/// Mock connector handing out clones of one [`MockTransport`]
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    pub transport: MockTransport,
    pub should_fail: bool,
    pub connect_attempts: Arc<AtomicUsize>,
    pub addresses: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub fn new(transport: MockTransport) -> Self {
        Self {
            transport,
            ..Default::default()
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    pub async fn get_addresses(&self) -> Vec<String> {
        self.addresses.lock().await.clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, address: &str) -> Result<Box<dyn Transport>, TransportError> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        self.addresses.lock().await.push(address.to_string());

        if self.should_fail {
            return Err(TransportError::ConnectionFailed(
                "Mock connection failure".into(),
            ));
        }

        Ok(Box::new(self.transport.clone()))
    }
}
