//! WebSocket event source.
//!
//! Receives JSON-encoded spec documents from the event stream and
//! reconnects on its own: exponential backoff with jitter, plus a circuit
//! breaker that pauses attempts after repeated failures. The consumer only
//! sees parsed events and disconnect notices.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use rand::Rng;
use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};

use crate::config::ReconnectPolicy;
use crate::consumer::{EventSource, StreamEvent};
use crate::domain::AppSpec;
use crate::error::Result;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WsEventSource {
    url: String,
    policy: ReconnectPolicy,
    stream: Option<WsStream>,
    consecutive_failures: u32,
    current_delay_ms: u64,
    circuit_open_until: Option<Instant>,
}

impl WsEventSource {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        let initial_delay = policy.initial_delay_ms;
        Self {
            url: url.into(),
            policy,
            stream: None,
            consecutive_failures: 0,
            current_delay_ms: initial_delay,
            circuit_open_until: None,
        }
    }

    /// Reset backoff state after a successful connection.
    fn reset_backoff(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay_ms = self.policy.initial_delay_ms;
        self.circuit_open_until = None;
    }

    /// Current delay plus jitter; advances the exponential backoff.
    fn next_delay(&mut self) -> Duration {
        let base = Duration::from_millis(self.current_delay_ms);
        let jitter_range_ms = self.current_delay_ms / 5;
        let jitter_ms = if jitter_range_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_range_ms)
        };

        let next = (self.current_delay_ms as f64 * self.policy.backoff_multiplier) as u64;
        self.current_delay_ms = next.min(self.policy.max_delay_ms);

        base + Duration::from_millis(jitter_ms)
    }

    /// Record a failure and possibly trip the circuit breaker.
    fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.policy.max_consecutive_failures {
            let cooldown = Duration::from_millis(self.policy.circuit_breaker_cooldown_ms);
            self.circuit_open_until = Some(Instant::now() + cooldown);
            warn!(
                failures = self.consecutive_failures,
                cooldown_secs = cooldown.as_secs(),
                "Circuit breaker tripped, pausing reconnection attempts"
            );
        }
    }

    async fn establish(&mut self) -> Result<()> {
        let (stream, _) = connect_async(self.url.as_str()).await?;
        self.stream = Some(stream);
        Ok(())
    }

    /// Reconnect with backoff until the stream is up again.
    async fn reconnect(&mut self) {
        loop {
            if let Some(until) = self.circuit_open_until {
                let remaining = until.saturating_duration_since(Instant::now());
                if !remaining.is_zero() {
                    warn!(
                        remaining_secs = remaining.as_secs(),
                        "Circuit breaker open, waiting for cooldown"
                    );
                    sleep(remaining).await;
                }
                self.circuit_open_until = None;
                self.reset_backoff();
            }

            let delay = self.next_delay();
            info!(
                delay_ms = delay.as_millis() as u64,
                attempt = self.consecutive_failures + 1,
                "Reconnecting after delay"
            );
            sleep(delay).await;

            match self.establish().await {
                Ok(()) => {
                    info!("Reconnected to event stream");
                    self.reset_backoff();
                    return;
                }
                Err(err) => {
                    warn!(error = %err, "Reconnect attempt failed");
                    self.record_failure();
                }
            }
        }
    }
}

#[async_trait]
impl EventSource for WsEventSource {
    async fn connect(&mut self) -> Result<()> {
        self.establish().await?;
        self.reset_backoff();
        Ok(())
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            if self.stream.is_none() {
                self.reconnect().await;
            }
            let stream = self.stream.as_mut()?;

            match stream.next().await {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<AppSpec>(&text) {
                    Ok(spec) => return Some(StreamEvent::Spec(Box::new(spec))),
                    Err(err) => {
                        warn!(error = %err, "Discarding unparseable event");
                    }
                },
                Some(Ok(Message::Close(_))) => {
                    self.stream = None;
                    self.record_failure();
                    return Some(StreamEvent::Disconnected {
                        reason: "closed by server".to_string(),
                    });
                }
                Some(Ok(_)) => {
                    // Ping/pong/binary frames carry no spec payloads.
                }
                Some(Err(err)) => {
                    self.stream = None;
                    self.record_failure();
                    return Some(StreamEvent::Disconnected {
                        reason: err.to_string(),
                    });
                }
                None => {
                    self.stream = None;
                    self.record_failure();
                    return Some(StreamEvent::Disconnected {
                        reason: "stream ended".to_string(),
                    });
                }
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "websocket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay_ms: 100,
            max_delay_ms: 400,
            backoff_multiplier: 2.0,
            max_consecutive_failures: 3,
            circuit_breaker_cooldown_ms: 1_000,
        }
    }

    #[test]
    fn delay_grows_exponentially_up_to_cap() {
        let mut source = WsEventSource::new("wss://example.com", policy());
        let first = source.next_delay();
        assert!(first >= Duration::from_millis(100));
        assert!(first <= Duration::from_millis(120));
        assert_eq!(source.current_delay_ms, 200);

        source.next_delay();
        source.next_delay();
        assert_eq!(source.current_delay_ms, 400, "capped at max_delay_ms");
    }

    #[test]
    fn circuit_trips_after_max_failures() {
        let mut source = WsEventSource::new("wss://example.com", policy());
        source.record_failure();
        source.record_failure();
        assert!(source.circuit_open_until.is_none());
        source.record_failure();
        assert!(source.circuit_open_until.is_some());
    }

    #[test]
    fn reset_clears_failures_and_delay() {
        let mut source = WsEventSource::new("wss://example.com", policy());
        source.record_failure();
        source.next_delay();
        source.reset_backoff();
        assert_eq!(source.consecutive_failures, 0);
        assert_eq!(source.current_delay_ms, 100);
    }
}
