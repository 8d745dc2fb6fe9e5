use crate::events::TimeoutEvent;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

/// Fires a single [`TimeoutEvent`] once an armed deadline has passed.
///
/// The deadline is set from the consumer side through a [`TimeoutHandle`];
/// the watch itself lives on the generator task.
pub struct TimeoutWatch {
    deadline: Option<Instant>,
    arm_rx: watch::Receiver<Option<Instant>>,
}

/// Arms or disarms a [`TimeoutWatch`] from another task.
pub struct TimeoutHandle {
    arm_tx: watch::Sender<Option<Instant>>,
}

impl TimeoutWatch {
    /// Create a disarmed watch and the handle that controls it.
    pub fn new() -> (Self, TimeoutHandle) {
        let (arm_tx, arm_rx) = watch::channel(None);
        (
            Self {
                deadline: None,
                arm_rx,
            },
            TimeoutHandle { arm_tx },
        )
    }

    pub fn sample(&mut self, now: Instant) -> Option<TimeoutEvent> {
        // A dropped handle leaves the current deadline in place.
        if self.arm_rx.has_changed().unwrap_or(false) {
            self.deadline = *self.arm_rx.borrow_and_update();
        }

        match self.deadline {
            Some(deadline) if now > deadline => {
                self.deadline = None;
                debug!("Timeout fired");
                Some(TimeoutEvent { at: now })
            }
            _ => None,
        }
    }
}

impl TimeoutHandle {
    /// (Re)arm the watch to fire `delay` from now.
    pub fn arm(&self, delay: Duration) {
        self.arm_at(Instant::now() + delay);
    }

    /// (Re)arm the watch to fire once `deadline` has passed.
    pub fn arm_at(&self, deadline: Instant) {
        self.arm_tx.send_replace(Some(deadline));
    }

    pub fn disarm(&self) {
        self.arm_tx.send_replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disarmed_watch_is_silent() {
        let (mut watch, _handle) = TimeoutWatch::new();
        let now = Instant::now();
        assert!(watch.sample(now + Duration::from_secs(3600)).is_none());
    }

    #[test]
    fn test_fires_once_per_arm() {
        let (mut watch, handle) = TimeoutWatch::new();
        let start = Instant::now();
        handle.arm(Duration::from_secs(10));

        assert!(watch.sample(start).is_none());
        assert!(watch.sample(start + Duration::from_secs(5)).is_none());

        let fired = watch.sample(start + Duration::from_secs(11)).unwrap();
        assert_eq!(fired.at, start + Duration::from_secs(11));

        assert!(watch.sample(start + Duration::from_secs(12)).is_none());
        assert!(watch.sample(start + Duration::from_secs(60)).is_none());

        handle.arm(Duration::from_secs(10));
        assert!(watch.sample(Instant::now() + Duration::from_secs(11)).is_some());
        assert!(watch.sample(Instant::now() + Duration::from_secs(12)).is_none());
    }

    #[test]
    fn test_rearm_pushes_deadline_back() {
        let (mut watch, handle) = TimeoutWatch::new();
        let start = Instant::now();
        handle.arm_at(start + Duration::from_secs(10));
        assert!(watch.sample(start + Duration::from_secs(5)).is_none());

        handle.arm_at(start + Duration::from_secs(15));
        assert!(watch.sample(start + Duration::from_secs(11)).is_none());
        assert!(watch.sample(start + Duration::from_secs(16)).is_some());
    }

    #[test]
    fn test_disarm_cancels_pending_deadline() {
        let (mut watch, handle) = TimeoutWatch::new();
        let start = Instant::now();
        handle.arm_at(start + Duration::from_secs(1));
        assert!(watch.sample(start).is_none());
        handle.disarm();
        assert!(watch.sample(start + Duration::from_secs(2)).is_none());
    }

    #[test]
    fn test_deadline_is_exclusive() {
        let (mut watch, handle) = TimeoutWatch::new();
        let deadline = Instant::now() + Duration::from_secs(1);
        handle.arm_at(deadline);
        assert!(watch.sample(deadline).is_none());
        assert!(watch.sample(deadline + Duration::from_millis(1)).is_some());
    }
}
