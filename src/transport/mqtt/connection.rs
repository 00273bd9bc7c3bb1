//! Pure MQTT connection configuration
//!
//! Turns a broker address into rumqttc options. Kept free of I/O so the
//! address handling can be tested without a broker.

use crate::config::Headers;
use crate::transport::TransportError;
use rumqttc::v5::MqttOptions;
use rumqttc::Transport as RumqttcTransport;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Default plain-text MQTT port
pub const DEFAULT_PORT: u16 = 1883;
/// Default MQTT over TLS port
pub const DEFAULT_TLS_PORT: u16 = 8883;

/// Build MQTT v5 options from an `mqtt://` or `mqtts://` address
///
/// Credentials may be given in the URL userinfo. Every call produces a fresh
/// client ID so concurrent runs never take over each other's session.
pub fn configure_mqtt_options(address: &str) -> Result<MqttOptions, TransportError> {
    let url = Url::parse(address).map_err(|_| TransportError::InvalidAddress(address.to_string()))?;

    let tls = match url.scheme() {
        "mqtt" => false,
        "mqtts" => true,
        _ => return Err(TransportError::InvalidAddress(address.to_string())),
    };

    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| TransportError::InvalidAddress(address.to_string()))?;
    let port = url
        .port()
        .unwrap_or(if tls { DEFAULT_TLS_PORT } else { DEFAULT_PORT });

    let client_id = format!("pubsub-step-{}", Uuid::new_v4().simple());
    let mut mqtt_options = MqttOptions::new(client_id, host, port);

    if tls {
        mqtt_options.set_transport(RumqttcTransport::tls_with_default_config());
    }

    if !url.username().is_empty() {
        mqtt_options.set_credentials(url.username(), url.password().unwrap_or_default());
    }

    mqtt_options.set_keep_alive(Duration::from_secs(60));
    mqtt_options.set_clean_start(true);

    // Large payloads are common in test fixtures
    mqtt_options.set_max_packet_size(Some(256 * 1024));

    Ok(mqtt_options)
}

/// Flatten multi-valued headers into MQTT v5 user properties
///
/// One property per value, in configured order. Names are not normalized and
/// repeated values are kept.
pub fn user_properties(headers: &Headers) -> Vec<(String, String)> {
    headers
        .iter()
        .flat_map(|(name, values)| {
            values
                .iter()
                .map(move |value| (name.clone(), value.clone()))
        })
        .collect()
}
