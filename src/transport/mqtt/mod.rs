//! MQTT v5 transport
//!
//! Split the same way as the rest of the transport layer:
//!
//! - [`connection`] - Pure option building and header mapping
//! - [`client`] - Impure I/O: ConnAck wait, event loop, publish, disconnect
//!
//! Messages are published at QoS 0 with headers carried as user properties.
//!
//! ```rust,no_run
//! use pubsub_step::transport::{MqttTransport, OutboundMessage, Transport};
//!
//! # tokio_test::block_on(async {
//! let mut transport = MqttTransport::connect("mqtt://localhost:1883").await?;
//! transport
//!     .publish(OutboundMessage {
//!         subject: "sensors/temperature".to_string(),
//!         payload: "21.5".into(),
//!         headers: Default::default(),
//!     })
//!     .await?;
//! transport.close().await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

pub mod client;
pub mod connection;

pub use client::MqttTransport;
pub use connection::{configure_mqtt_options, user_properties};
