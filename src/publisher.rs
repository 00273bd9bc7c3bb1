//! Ordered, fail-fast message publishing over one broker session
//!
//! A [`Session`] owns the run's connection exclusively. [`Publisher`] opens
//! it, walks the message list in order and closes it again whatever the
//! loop's outcome was.

use crate::config::Message;
use crate::error::{PublishError, StepError, StepResult};
use crate::transport::{BrokerConnector, Connector, OutboundMessage, Transport, TransportError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Exclusively owned broker connection for a single run
///
/// Call [`Session::close`] to flush and release the connection. A session
/// that is dropped without closing still releases it, but pending writes may
/// be lost.
pub struct Session {
    transport: Option<Box<dyn Transport>>,
}

impl Session {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    /// Hand one message to the transport
    pub async fn submit(&self, message: OutboundMessage) -> Result<(), TransportError> {
        match &self.transport {
            Some(transport) => transport.publish(message).await,
            None => Err(TransportError::Closed),
        }
    }

    /// Flush and release the connection
    ///
    /// Close failures are logged, not returned: by this point every message
    /// has already been accepted or the run has already failed.
    pub async fn close(mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!(error = %e, "Failed to close broker connection cleanly");
            }
            debug!("Broker connection closed");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.transport.is_some() {
            debug!("Session dropped without close, releasing broker connection");
        }
    }
}

/// Result of a publish pass over an open session
#[derive(Debug)]
pub struct PublishOutcome {
    /// Messages accepted by the transport before the loop ended
    pub sent: usize,
    /// First failure, if any; later messages were not attempted
    pub error: Option<PublishError>,
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Publishes message lists through connections obtained from a [`Connector`]
#[derive(Debug, Clone, Default)]
pub struct Publisher<C = BrokerConnector> {
    connector: C,
}

impl Publisher<BrokerConnector> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Connector> Publisher<C> {
    pub fn with_connector(connector: C) -> Self {
        Self { connector }
    }

    /// Open a new session to `address`
    ///
    /// No retries. Cancellation is honored while the connection is being
    /// established.
    pub async fn session(&self, address: &str, cancel: &CancellationToken) -> StepResult<Session> {
        debug!(address = %address, "Creating session");

        let transport = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StepError::Cancelled),
            connected = self.connector.connect(address) => connected?,
        };

        debug!(broker = ?transport.kind(), "Connection setup complete");
        Ok(Session::new(transport))
    }

    /// Publish `messages` in order, stopping at the first failure
    pub async fn publish_all(
        &self,
        session: &Session,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> PublishOutcome {
        for (index, message) in messages.iter().enumerate() {
            if let Err(error) = Self::publish_one(session, index, message, cancel).await {
                debug!(index, error = %error, "Message publish failed");
                return PublishOutcome {
                    sent: index,
                    error: Some(error),
                };
            }
        }

        PublishOutcome {
            sent: messages.len(),
            error: None,
        }
    }

    async fn publish_one(
        session: &Session,
        index: usize,
        message: &Message,
        cancel: &CancellationToken,
    ) -> Result<(), PublishError> {
        if message.subject.is_empty() {
            return Err(PublishError::EmptySubject {
                index,
                message: message.clone(),
            });
        }

        let submitted = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PublishError::Cancelled { index }),
            submitted = session.submit(OutboundMessage::from(message)) => submitted,
        };

        submitted.map_err(|source| PublishError::Submit {
            index,
            message: message.clone(),
            source,
        })?;

        trace!(index, subject = %message.subject, "Message submitted");
        Ok(())
    }

    /// Connect, publish every message, then close the session
    ///
    /// Connection failures are fatal and returned as `Err`. Publish failures
    /// end up in the returned outcome.
    pub async fn publish_messages(
        &self,
        address: &str,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> StepResult<PublishOutcome> {
        let session = self.session(address, cancel).await?;
        let outcome = self.publish_all(&session, messages, cancel).await;
        session.close().await;
        Ok(outcome)
    }
}
