use crate::events::InputEvent;
use compact_str::CompactString;
use kiosk_sdk::devices::InputLine;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Pulse,
    Waiting,
}

/// Coalesces a train of pulses into one event carrying the pulse count.
///
/// A burst ends once the line has rested for longer than
/// `interpulse_delay`, so the pulse width itself does not matter.
pub struct PulseCounter {
    label: CompactString,
    line: Box<dyn InputLine>,
    rest_level: bool,
    interpulse_delay: Duration,
    phase: Phase,
    pulse_count: u32,
    last_transition: Instant,
}

impl PulseCounter {
    pub fn new(
        label: impl Into<CompactString>,
        line: impl InputLine,
        rest_level: bool,
        interpulse_delay: Duration,
    ) -> Self {
        Self {
            label: label.into(),
            line: Box::new(line),
            rest_level,
            interpulse_delay,
            phase: Phase::Idle,
            pulse_count: 0,
            last_transition: Instant::now(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sample(&mut self, now: Instant) -> Option<InputEvent> {
        let active = self.line.read() != self.rest_level;
        match self.phase {
            Phase::Idle if active => {
                self.phase = Phase::Pulse;
                self.pulse_count = 1;
                self.last_transition = now;
            }
            Phase::Pulse if !active => {
                self.phase = Phase::Waiting;
                self.last_transition = now;
            }
            Phase::Waiting if active => {
                self.phase = Phase::Pulse;
                self.pulse_count += 1;
                self.last_transition = now;
                trace!(source = %self.label, pulses = self.pulse_count, "Pulse");
            }
            Phase::Waiting if now > self.last_transition + self.interpulse_delay => {
                self.phase = Phase::Idle;
                self.last_transition = now;
                return Some(InputEvent {
                    at: now,
                    state: self.pulse_count,
                    source: self.label.clone(),
                });
            }
            _ => {}
        }
        None
    }
}
