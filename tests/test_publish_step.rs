//! Publish step behavior tests
//!
//! Exercise the executor end to end against a mock broker: configuration
//! gating, ordering, fail-fast handling, header pass-through and timing.

use pubsub_step::config::Headers;
use pubsub_step::testing::{MockConnector, MockTransport};
use pubsub_step::{Executor, PublishExecutor, StepError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use test_helpers::{message, mock_executor, publisher_config, MOCK_ADDR};

#[tokio::test]
async fn test_missing_address_fails_before_connecting() {
    let (executor, connector, _) = mock_executor(MockTransport::new());
    let mut config = publisher_config(vec![message("orders.created", "{}")]);
    config.addr = String::new();

    let result = executor.run(&CancellationToken::new(), config).await;

    assert!(matches!(result, Err(StepError::MissingAddress)));
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn test_missing_address_checked_before_client_type() {
    let (executor, _, _) = mock_executor(MockTransport::new());
    let mut config = publisher_config(vec![]);
    config.addr = String::new();
    config.client_type = "subscriber".to_string();

    let result = executor.run(&CancellationToken::new(), config).await;

    assert!(matches!(result, Err(StepError::MissingAddress)));
}

#[tokio::test]
async fn test_unsupported_client_type_names_value() {
    let (executor, connector, _) = mock_executor(MockTransport::new());
    let mut config = publisher_config(vec![message("orders.created", "{}")]);
    config.client_type = "subscriber".to_string();

    let error = executor
        .run(&CancellationToken::new(), config)
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), r#"clientType "subscriber" must be publisher"#);
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn test_missing_client_type_is_rejected() {
    let (executor, connector, _) = mock_executor(MockTransport::new());
    let mut config = publisher_config(vec![]);
    config.client_type = String::new();

    let result = executor.run(&CancellationToken::new(), config).await;

    assert!(matches!(result, Err(StepError::UnsupportedClientType(ref v)) if v.is_empty()));
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn test_stops_at_first_empty_subject() {
    let (executor, _, transport) = mock_executor(MockTransport::new());
    let config = publisher_config(vec![
        message("orders.created", "0"),
        message("", "1"),
        message("orders.deleted", "2"),
    ]);

    let output = executor
        .run(&CancellationToken::new(), config)
        .await
        .unwrap();

    assert!(output.err.contains("Messages[1]"));
    assert!(output.err.contains("mandatory field Subject was empty"));
    let published = transport.get_published_messages().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].subject, "orders.created");
    assert_eq!(transport.attempts(), 1);
    assert!(transport.is_closed());
}

#[tokio::test]
async fn test_stops_at_first_submit_failure() {
    let (executor, _, transport) = mock_executor(MockTransport::failing_at(1));
    let config = publisher_config(vec![
        message("a", "0"),
        message("b", "1"),
        message("c", "2"),
    ]);

    let output = executor
        .run(&CancellationToken::new(), config)
        .await
        .unwrap();

    assert!(output.err.starts_with("Message publish failed: Messages[1]("));
    assert!(output.err.contains(r#"subject="b""#));
    assert!(output.err.contains("Mock publish failure"));
    assert_eq!(transport.attempts(), 2);
    assert!(transport.is_closed());
}

#[tokio::test]
async fn test_empty_message_list_succeeds() {
    let (executor, connector, transport) = mock_executor(MockTransport::new());

    let output = executor
        .run(&CancellationToken::new(), publisher_config(vec![]))
        .await
        .unwrap();

    assert_eq!(output.err, "");
    assert!(output.time_seconds >= 0.0);
    assert_eq!(connector.connect_count(), 1);
    assert_eq!(transport.attempts(), 0);
    assert!(transport.is_closed());
}

#[tokio::test]
async fn test_elapsed_time_grows_with_publish_latency() {
    let (fast, _, _) = mock_executor(MockTransport::new());
    let (slow, _, _) = mock_executor(MockTransport::with_latency(Duration::from_millis(50)));
    let messages = vec![message("a", ""), message("b", "")];

    let fast_output = fast
        .run(&CancellationToken::new(), publisher_config(messages.clone()))
        .await
        .unwrap();
    let slow_output = slow
        .run(&CancellationToken::new(), publisher_config(messages))
        .await
        .unwrap();

    assert!(fast_output.time_seconds >= 0.0);
    assert!(slow_output.time_seconds >= 0.1);
    assert!(slow_output.time_seconds > fast_output.time_seconds);
}

#[tokio::test]
async fn test_headers_pass_through_unchanged() {
    let (executor, _, transport) = mock_executor(MockTransport::new());
    let mut headers = Headers::new();
    headers.insert("X-Trace".to_string(), vec!["abc".to_string()]);
    headers.insert(
        "x-trace".to_string(),
        vec!["one".to_string(), "one".to_string()],
    );
    let mut traced = message("orders.created", "{}");
    traced.headers = headers.clone();

    executor
        .run(&CancellationToken::new(), publisher_config(vec![traced]))
        .await
        .unwrap();

    let published = transport.get_published_messages().await;
    assert_eq!(published[0].headers, headers);
}

#[tokio::test]
async fn test_single_message_scenario() {
    let (executor, connector, transport) = mock_executor(MockTransport::new());

    let output = executor
        .run(
            &CancellationToken::new(),
            publisher_config(vec![message("orders.created", "{}")]),
        )
        .await
        .unwrap();

    assert_eq!(output.err, "");
    assert!(output.time_seconds > 0.0);
    assert!(output.subjects.is_empty());
    assert_eq!(connector.get_addresses().await, vec![MOCK_ADDR]);

    let published = transport.get_published_messages().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].subject, "orders.created");
    assert_eq!(&published[0].payload[..], b"{}");
}

#[tokio::test]
async fn test_single_empty_subject_scenario() {
    let (executor, _, transport) = mock_executor(MockTransport::new());

    let output = executor
        .run(
            &CancellationToken::new(),
            publisher_config(vec![message("", "{}")]),
        )
        .await
        .unwrap();

    assert!(output.err.contains("Messages[0]"));
    assert!(output.err.contains("mandatory field Subject was empty"));
    assert!(transport.get_published_messages().await.is_empty());
}

#[tokio::test]
async fn test_connection_failure_produces_no_output() {
    let executor = PublishExecutor::with_connector(MockConnector::with_failure());

    let result = executor
        .run(
            &CancellationToken::new(),
            publisher_config(vec![message("orders.created", "{}")]),
        )
        .await;

    assert!(matches!(result, Err(StepError::Connection(_))));
}

#[tokio::test]
async fn test_cancelled_run_never_connects() {
    let (executor, connector, _) = mock_executor(MockTransport::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = executor
        .run(&cancel, publisher_config(vec![message("a", "")]))
        .await;

    assert!(matches!(result, Err(StepError::Cancelled)));
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_runs_execute_concurrently() {
    let mut handles = Vec::new();

    for run in 0..8 {
        handles.push(tokio::spawn(async move {
            let (executor, _, transport) = mock_executor(MockTransport::new());
            let messages = (0..5)
                .map(|i| message(&format!("run{run}.msg{i}"), ""))
                .collect();

            let output = executor
                .run(&CancellationToken::new(), publisher_config(messages))
                .await
                .unwrap();

            (run, output, transport.get_published_messages().await)
        }));
    }

    for handle in handles {
        let (run, output, published) = handle.await.unwrap();
        assert!(output.is_success());
        let subjects: Vec<String> = published.into_iter().map(|m| m.subject).collect();
        let expected: Vec<String> = (0..5).map(|i| format!("run{run}.msg{i}")).collect();
        assert_eq!(subjects, expected);
    }
}
