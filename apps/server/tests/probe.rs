use lvai_server::healthcheck::{ContainerHealth, ProbeOutcome, ProbePolicy, ProbeTracker, probe_once};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

fn health_url(server: &MockServer) -> String {
    format!("{}/health", server.uri())
}

#[tokio::test]
async fn any_non_error_status_is_healthy() {
    for status in [200, 204] {
        let server = server(status).await;
        assert_eq!(probe_once(&health_url(&server), Duration::from_secs(2)).await, ProbeOutcome::Healthy);
    }
}

#[tokio::test]
async fn client_and_server_errors_are_unhealthy() {
    for status in [404, 500, 503] {
        let server = server(status).await;
        let outcome = probe_once(&health_url(&server), Duration::from_secs(2)).await;
        let ProbeOutcome::Unhealthy(reason) = outcome else { panic!("{status} must be unhealthy") };
        assert!(reason.contains(&status.to_string()), "{reason}");
    }
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let outcome = probe_once(&health_url(&server), Duration::from_millis(200)).await;
    assert!(!outcome.is_healthy());
}

#[tokio::test]
async fn unreachable_servers_are_unhealthy() {
    let url = {
        let server = MockServer::start().await;
        health_url(&server)
    };
    assert!(!probe_once(&url, Duration::from_secs(1)).await.is_healthy());
}

#[tokio::test]
async fn a_failing_server_is_marked_unhealthy_after_the_grace_period() {
    let server = server(500).await;
    let policy = ProbePolicy { url: health_url(&server), ..ProbePolicy::default() };
    let mut tracker = ProbeTracker::new(policy.clone());

    let mut states = Vec::new();
    for tick in 0..5 {
        let outcome = probe_once(&policy.url, policy.timeout).await;
        states.push(tracker.record(&outcome, policy.interval * tick));
    }

    // probes at 0s and 30s fall inside the 40s start period
    assert_eq!(
        states,
        [
            ContainerHealth::Starting,
            ContainerHealth::Starting,
            ContainerHealth::Starting,
            ContainerHealth::Starting,
            ContainerHealth::Unhealthy,
        ]
    );
}
