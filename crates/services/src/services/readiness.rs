use std::time::Duration;

use reqwest::{Client, StatusCode};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(3000);
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    pub max_attempts: u32,
    /// Budget for a single probe; a hung request is aborted at this point so
    /// it cannot stall the loop.
    pub attempt_timeout: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

/// Delay inserted after `attempts_completed` failed probes. Grows linearly
/// with the attempt count, capped at `max_delay`.
pub fn backoff_delay(attempts_completed: u32, config: &ReadinessConfig) -> Duration {
    (config.base_delay * attempts_completed).min(config.max_delay)
}

/// Probes `url` until it answers HTTP 200 or the attempt budget runs out.
/// Connection errors, timeouts and non-200 statuses all count as failed
/// attempts; the outcome is only ever reported through the returned flag.
pub async fn wait_until_ready(client: &Client, url: &str, config: &ReadinessConfig) -> bool {
    tracing::info!(
        "checking server readiness at {url}, will try {} times",
        config.max_attempts
    );

    for attempt in 1..=config.max_attempts {
        match client
            .get(url)
            .timeout(config.attempt_timeout)
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::info!("server ready at {url} after {attempt} attempts");
                return true;
            }
            Ok(response) => {
                tracing::debug!(
                    "server not ready yet (attempt {attempt}), status: {}",
                    response.status()
                );
            }
            Err(err) => {
                tracing::debug!("server connection failed (attempt {attempt}): {err}");
            }
        }

        if attempt < config.max_attempts {
            tokio::time::sleep(backoff_delay(attempt, config)).await;
        }
    }

    tracing::warn!(
        "server failed to become ready after {} attempts",
        config.max_attempts
    );
    false
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{Router, http::StatusCode, routing::get};

    use super::*;

    fn fast_config(max_attempts: u32) -> ReadinessConfig {
        ReadinessConfig {
            max_attempts,
            attempt_timeout: Duration::from_millis(250),
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
        }
    }

    /// Serves `failures` non-200 responses, then 200s, counting every probe.
    async fn spawn_probe_target(failures: usize) -> (SocketAddr, Arc<AtomicUsize>) {
        let probes = Arc::new(AtomicUsize::new(0));
        let counter = probes.clone();
        let app = Router::new().route(
            "/",
            get(move || {
                let counter = counter.clone();
                async move {
                    let seen = counter.fetch_add(1, Ordering::SeqCst);
                    if seen < failures {
                        StatusCode::SERVICE_UNAVAILABLE
                    } else {
                        StatusCode::OK
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, probes)
    }

    #[test]
    fn backoff_grows_linearly_to_the_cap() {
        let config = ReadinessConfig::default();
        assert_eq!(backoff_delay(1, &config), Duration::from_millis(1000));
        assert_eq!(backoff_delay(2, &config), Duration::from_millis(2000));
        assert_eq!(backoff_delay(4, &config), Duration::from_millis(4000));
        assert_eq!(backoff_delay(5, &config), Duration::from_millis(5000));
        assert_eq!(backoff_delay(6, &config), Duration::from_millis(5000));
        assert_eq!(backoff_delay(20, &config), Duration::from_millis(5000));
    }

    #[test]
    fn backoff_is_monotonically_non_decreasing() {
        let config = ReadinessConfig::default();
        let mut previous = Duration::ZERO;
        for attempt in 1..=config.max_attempts {
            let delay = backoff_delay(attempt, &config);
            assert!(delay >= previous);
            previous = delay;
        }
    }

    #[tokio::test]
    async fn immediate_200_stops_after_one_probe() {
        let (addr, probes) = spawn_probe_target(0).await;
        let client = Client::new();
        let ready = wait_until_ready(&client, &format!("http://{addr}/"), &fast_config(5)).await;
        assert!(ready);
        assert_eq!(probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt_after_two_503s() {
        let (addr, probes) = spawn_probe_target(2).await;
        let client = Client::new();
        let ready = wait_until_ready(&client, &format!("http://{addr}/"), &fast_config(3)).await;
        assert!(ready);
        assert_eq!(probes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_budget_on_persistent_500s() {
        let (addr, probes) = spawn_probe_target(usize::MAX).await;
        let client = Client::new();
        let ready = wait_until_ready(&client, &format!("http://{addr}/"), &fast_config(4)).await;
        assert!(!ready);
        assert_eq!(probes.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn connection_refused_counts_as_failed_attempts() {
        // Bind then drop so the port is known-dead.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::new();
        let ready = wait_until_ready(&client, &format!("http://{addr}/"), &fast_config(2)).await;
        assert!(!ready);
    }
}
