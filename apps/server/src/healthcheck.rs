//! Container liveness probe.
//!
//! `lvai-server healthcheck` performs a single [`probe_once`] and maps the outcome to the
//! exit status Docker's `HEALTHCHECK` expects. [`ProbeTracker`] models how the orchestrator
//! turns a series of probes into a container state.

use std::time::Duration;
use tracing::debug;

pub const DEFAULT_URL: &str = "http://localhost:8000/health";

/// Schedule and tolerance of the liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbePolicy {
    pub interval: Duration,
    pub timeout: Duration,
    /// Failures inside this window after start never count.
    pub start_period: Duration,
    /// Consecutive post-grace failures before the container is unhealthy.
    pub retries: u32,
    pub url: String,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(10),
            start_period: Duration::from_secs(40),
            retries: 3,
            url: DEFAULT_URL.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Unhealthy(String),
}

impl ProbeOutcome {
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContainerHealth {
    #[default]
    Starting,
    Healthy,
    Unhealthy,
}

/// One HTTP GET against `url`. Any response below 400 that arrives within `timeout` is healthy.
pub async fn probe_once(url: &str, timeout: Duration) -> ProbeOutcome {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(err) => return ProbeOutcome::Unhealthy(format!("Failed to create HTTP client: {err}")),
    };

    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            debug!(%status, url, "Probe answered");
            if status.is_client_error() || status.is_server_error() {
                ProbeOutcome::Unhealthy(format!("{url} returned {status}"))
            } else {
                ProbeOutcome::Healthy
            }
        },
        Err(err) if err.is_timeout() => {
            ProbeOutcome::Unhealthy(format!("{url} timed out after {}s", timeout.as_secs()))
        },
        Err(err) => ProbeOutcome::Unhealthy(format!("{url} unreachable: {err}")),
    }
}

/// Folds probe outcomes into a container state the way Docker does.
#[derive(Debug, Clone)]
pub struct ProbeTracker {
    policy: ProbePolicy,
    failures: u32,
    state: ContainerHealth,
}

impl ProbeTracker {
    #[must_use]
    pub const fn new(policy: ProbePolicy) -> Self {
        Self { policy, failures: 0, state: ContainerHealth::Starting }
    }

    #[must_use]
    pub const fn state(&self) -> ContainerHealth {
        self.state
    }

    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }

    /// Records a probe taken `elapsed` after the container started.
    pub fn record(&mut self, outcome: &ProbeOutcome, elapsed: Duration) -> ContainerHealth {
        match outcome {
            ProbeOutcome::Healthy => {
                self.failures = 0;
                self.state = ContainerHealth::Healthy;
            },
            ProbeOutcome::Unhealthy(_) if elapsed < self.policy.start_period => {},
            ProbeOutcome::Unhealthy(_) => {
                self.failures = self.failures.saturating_add(1);
                if self.failures >= self.policy.retries {
                    self.state = ContainerHealth::Unhealthy;
                }
            },
        }
        self.state
    }
}

impl Default for ProbeTracker {
    fn default() -> Self {
        Self::new(ProbePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed() -> ProbeOutcome {
        ProbeOutcome::Unhealthy("connection refused".to_owned())
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn default_policy_matches_the_image() {
        let policy = ProbePolicy::default();
        assert_eq!(policy.interval, secs(30));
        assert_eq!(policy.timeout, secs(10));
        assert_eq!(policy.start_period, secs(40));
        assert_eq!(policy.retries, 3);
        assert_eq!(policy.url, "http://localhost:8000/health");
    }

    #[test]
    fn failures_inside_the_start_period_are_ignored() {
        let mut tracker = ProbeTracker::default();
        for at in [0, 10, 20, 30, 39] {
            assert_eq!(tracker.record(&failed(), secs(at)), ContainerHealth::Starting);
        }
        assert_eq!(tracker.failures(), 0);
    }

    #[test]
    fn three_consecutive_failures_after_grace_mark_unhealthy() {
        let mut tracker = ProbeTracker::default();
        assert_eq!(tracker.record(&ProbeOutcome::Healthy, secs(5)), ContainerHealth::Healthy);

        assert_eq!(tracker.record(&failed(), secs(40)), ContainerHealth::Healthy);
        assert_eq!(tracker.record(&failed(), secs(70)), ContainerHealth::Healthy);
        assert_eq!(tracker.record(&failed(), secs(100)), ContainerHealth::Unhealthy);
        assert_eq!(tracker.failures(), 3);
    }

    #[test]
    fn a_success_resets_the_streak() {
        let mut tracker = ProbeTracker::default();
        tracker.record(&failed(), secs(45));
        tracker.record(&failed(), secs(75));
        assert_eq!(tracker.record(&ProbeOutcome::Healthy, secs(105)), ContainerHealth::Healthy);
        assert_eq!(tracker.failures(), 0);

        tracker.record(&failed(), secs(135));
        assert_eq!(tracker.record(&failed(), secs(165)), ContainerHealth::Healthy);
        assert_eq!(tracker.record(&failed(), secs(195)), ContainerHealth::Unhealthy);

        assert_eq!(tracker.record(&ProbeOutcome::Healthy, secs(225)), ContainerHealth::Healthy);
    }

    #[test]
    fn starting_containers_can_turn_unhealthy_without_a_success() {
        let mut tracker = ProbeTracker::new(ProbePolicy { retries: 1, ..ProbePolicy::default() });
        assert_eq!(tracker.record(&failed(), secs(39)), ContainerHealth::Starting);
        assert_eq!(tracker.record(&failed(), secs(41)), ContainerHealth::Unhealthy);
    }
}
