//! Impure I/O operations for the MQTT transport
//!
//! Handles the network side of an MQTT publish session: waiting for the
//! broker's ConnAck, driving the rumqttc event loop in the background and
//! shutting it down cleanly.

use super::connection::{configure_mqtt_options, user_properties};
use crate::transport::{BrokerKind, OutboundMessage, Transport, TransportError};
use async_trait::async_trait;
use rumqttc::v5::mqttbytes::v5::{Packet, PublishProperties};
use rumqttc::v5::{mqttbytes::QoS, AsyncClient, Event, EventLoop};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Request channel capacity between the client handle and the event loop
const REQUEST_CAPACITY: usize = 10;

/// How long the event loop may take to write DISCONNECT before it is aborted
const DISCONNECT_GRACE: Duration = Duration::from_secs(1);

/// MQTT v5 publish session
pub struct MqttTransport {
    client: Option<AsyncClient>,
    event_loop_handle: Option<JoinHandle<()>>,
}

impl MqttTransport {
    /// Connect and wait for the broker's ConnAck
    ///
    /// Uses rumqttc's default connection timeout; no reconnection is attempted.
    pub async fn connect(address: &str) -> Result<Self, TransportError> {
        let mqtt_options = configure_mqtt_options(address)?;
        debug!(address = %address, client_id = %mqtt_options.client_id(), "Connecting to MQTT broker");

        let (client, mut event_loop) = AsyncClient::new(mqtt_options, REQUEST_CAPACITY);
        Self::wait_for_connection_confirmation(&mut event_loop).await?;

        debug!(address = %address, "MQTT connection established");
        let handle = tokio::spawn(Self::drive_event_loop(event_loop));

        Ok(Self {
            client: Some(client),
            event_loop_handle: Some(handle),
        })
    }

    /// Poll until ConnAck; any connection error is returned as is
    async fn wait_for_connection_confirmation(
        event_loop: &mut EventLoop,
    ) -> Result<(), TransportError> {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => return Ok(()),
                Ok(_) => continue,
                Err(e) => return Err(TransportError::ConnectionFailed(Box::new(e))),
            }
        }
    }

    /// Run the event loop until the connection ends
    ///
    /// Queued publishes are written in order ahead of the DISCONNECT request.
    /// The loop stops on the first network error, including the broker
    /// closing the socket.
    async fn drive_event_loop(mut event_loop: EventLoop) {
        loop {
            if let Err(e) = event_loop.poll().await {
                debug!(error = %e, "MQTT event loop stopped");
                break;
            }
        }
    }
}

#[async_trait]
impl Transport for MqttTransport {
    async fn publish(&self, message: OutboundMessage) -> Result<(), TransportError> {
        let client = self.client.as_ref().ok_or(TransportError::Closed)?;

        let properties = PublishProperties {
            user_properties: user_properties(&message.headers),
            ..Default::default()
        };

        client
            .publish_with_properties(
                message.subject,
                QoS::AtMostOnce,
                false,
                message.payload,
                properties,
            )
            .await
            .map_err(|e| TransportError::PublishFailed(Box::new(e)))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };

        debug!("Disconnecting from MQTT broker");
        let result = client
            .disconnect()
            .await
            .map_err(|e| TransportError::PublishFailed(Box::new(e)));

        drop(client);
        if let Some(mut handle) = self.event_loop_handle.take() {
            // The broker closes the socket after DISCONNECT, which ends the loop
            match tokio::time::timeout(DISCONNECT_GRACE, &mut handle).await {
                Ok(Err(e)) => debug!(error = %e, "MQTT event loop task ended abnormally"),
                Ok(Ok(())) => {}
                Err(_) => handle.abort(),
            }
        }

        result
    }

    fn kind(&self) -> BrokerKind {
        BrokerKind::Mqtt
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        if let Some(handle) = self.event_loop_handle.take() {
            handle.abort();
        }
    }
}
