//! Testing utilities and mock implementations
//!
//! Mock broker connections for exercising the publish step without a NATS
//! or MQTT server.

pub mod mocks;

pub use mocks::*;
