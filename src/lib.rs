//! Broker publish step
//!
//! A test-step executor that opens one connection to a NATS or MQTT broker,
//! publishes an ordered list of messages and reports the outcome to the
//! test host.
//!
//! # Overview
//!
//! - [`config`] - Decoding of the host's untyped step record
//! - [`publisher`] - Session handling and the ordered, fail-fast publish loop
//! - [`executor`] - The host-facing `decode`/`run` capability
//! - [`transport`] - NATS and MQTT connections behind one trait
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pubsub_step::{Executor, PublishExecutor};
//! use serde_json::json;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let executor = PublishExecutor::new();
//! let output = executor
//!     .execute(
//!         &CancellationToken::new(),
//!         json!({
//!             "addr": "nats://localhost:4222",
//!             "client_type": "publisher",
//!             "messages": [{ "subject": "orders.created", "payload": "{}" }]
//!         }),
//!     )
//!     .await?;
//!
//! assert!(output.err.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod observability;
pub mod publisher;
pub mod result;
pub mod testing;
pub mod transport;

pub use config::{ClientMode, Headers, Message, StepConfig};
pub use error::{PublishError, StepError, StepResult};
pub use executor::{Executor, PublishExecutor, EXECUTOR_NAME};
pub use publisher::{PublishOutcome, Publisher, Session};
pub use result::StepOutput;
pub use transport::{BrokerConnector, BrokerKind, Connector, Transport, TransportError};
