//! EventGenerator processor.
//!
//! The EventGenerator is responsible for:
//! - Sampling every registered poll source once per tick, in registration order
//! - Pushing the resulting events onto the event queue in the order they were
//!   produced
//! - Stopping cleanly when asked, so no sampling happens after `stop()` returns
//!
//! It is the only producer of the event queue. The vending state machine is
//! the only consumer.

use crate::events::{Event, EventReceiver, EventSender, event_channel};
use crate::sources::PollSource;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Fixed-interval sampling loop over a set of poll sources.
pub struct EventGenerator {
    sources: Vec<PollSource>,
    poll_interval: Duration,
}

/// Control handle for a started [`EventGenerator`].
pub struct GeneratorHandle {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl EventGenerator {
    /// Create a generator with no sources.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            sources: Vec::new(),
            poll_interval,
        }
    }

    /// Register a source. Sources are sampled in registration order.
    pub fn register(&mut self, source: impl Into<PollSource>) {
        let source = source.into();
        debug!(source = source.label(), "Registered poll source");
        self.sources.push(source);
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Sample every source once at `now` and collect the events of this tick.
    pub fn poll(&mut self, now: Instant) -> Vec<Event> {
        self.sources
            .iter_mut()
            .filter_map(|source| source.sample(now))
            .collect()
    }

    /// Spawn the sampling loop.
    ///
    /// Returns the handle used to stop it and the receiving end of the event
    /// queue.
    pub fn start(self) -> (GeneratorHandle, EventReceiver) {
        let (event_tx, event_rx) = event_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(self.run(event_tx, shutdown_rx));
        (
            GeneratorHandle {
                shutdown_tx,
                handle,
            },
            event_rx,
        )
    }

    async fn run(mut self, event_tx: EventSender, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            sources = self.sources.len(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "EventGenerator started"
        );

        'ticks: loop {
            if *shutdown_rx.borrow() {
                info!("EventGenerator received shutdown signal");
                break;
            }

            for event in self.poll(Instant::now()) {
                debug!(event = ?event, "Publishing event");
                if event_tx.send(event).is_err() {
                    warn!("Event queue closed, receiver dropped");
                    break 'ticks;
                }
            }

            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        info!("GeneratorHandle dropped");
                        break;
                    }
                }

                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!("EventGenerator shutdown complete");
    }
}

impl GeneratorHandle {
    /// Signal the sampling loop to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "EventGenerator task did not finish cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::testing::{SharedLine, scripted};
    use crate::sources::{EdgeDetector, PulseCounter, TimeoutWatch};

    const RECV_TIMEOUT: Duration = Duration::from_secs(2);

    #[test]
    fn test_poll_preserves_registration_order() {
        let mut generator = EventGenerator::new(Duration::from_millis(10));
        generator.register(EdgeDetector::new("black", scripted(&[true, false], true)));
        generator.register(EdgeDetector::new("white", scripted(&[true, true], true)));
        generator.register(EdgeDetector::new("green", scripted(&[true, false], true)));
        let (watch, timeout) = TimeoutWatch::new();
        generator.register(watch);

        let start = Instant::now();
        timeout.arm_at(start);
        assert!(generator.poll(start).is_empty());

        let events = generator.poll(start + Duration::from_millis(10));
        let labels: Vec<String> = events
            .iter()
            .map(|event| match event {
                Event::Input(input) => input.source.to_string(),
                Event::Timeout(_) => "timeout".to_string(),
            })
            .collect();
        assert_eq!(labels, vec!["black", "green", "timeout"]);
    }

    #[tokio::test]
    async fn test_started_generator_publishes_edges() {
        let line = SharedLine::new(true);
        let mut generator = EventGenerator::new(Duration::from_millis(5));
        generator.register(EdgeDetector::new("green", line.clone()));
        let (handle, mut events) = generator.start();

        // Give the loop a tick to record the initial level.
        tokio::time::sleep(Duration::from_millis(30)).await;
        line.set(false);

        let event = tokio::time::timeout(RECV_TIMEOUT, events.recv())
            .await
            .expect("no event within timeout")
            .expect("queue closed");
        match event {
            Event::Input(input) => {
                assert_eq!(input.source, "green");
                assert_eq!(input.state, 0);
            }
            other => panic!("unexpected event {other:?}"),
        }

        line.set(true);
        let event = tokio::time::timeout(RECV_TIMEOUT, events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, Event::Input(ref input) if input.state == 1));

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_joins_and_closes_queue() {
        let mut generator = EventGenerator::new(Duration::from_millis(5));
        generator.register(PulseCounter::new(
            "coin",
            SharedLine::new(true),
            true,
            Duration::from_millis(100),
        ));
        let (handle, mut events) = generator.start();
        tokio::time::sleep(Duration::from_millis(20)).await;

        handle.stop().await;

        // The task owned the only sender; once joined the queue drains to None.
        let closed = tokio::time::timeout(RECV_TIMEOUT, events.recv()).await.unwrap();
        assert!(closed.is_none());
    }

    #[tokio::test]
    async fn test_generator_exits_when_receiver_dropped() {
        let line = SharedLine::new(true);
        let mut generator = EventGenerator::new(Duration::from_millis(5));
        generator.register(EdgeDetector::new("red", line.clone()));
        let (handle, events) = generator.start();
        drop(events);

        tokio::time::sleep(Duration::from_millis(20)).await;
        line.set(false);

        tokio::time::timeout(RECV_TIMEOUT, handle.stop())
            .await
            .expect("generator did not stop");
    }
}
