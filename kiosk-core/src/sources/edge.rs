use crate::events::InputEvent;
use compact_str::CompactString;
use kiosk_sdk::devices::InputLine;
use tokio::time::Instant;

/// Emits an event whenever the level of a line changes.
///
/// Pure edge triggering: no debounce beyond what the signal itself provides.
pub struct EdgeDetector {
    label: CompactString,
    line: Box<dyn InputLine>,
    current: Option<bool>,
}

impl EdgeDetector {
    pub fn new(label: impl Into<CompactString>, line: impl InputLine) -> Self {
        Self {
            label: label.into(),
            line: Box::new(line),
            current: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The first sample only records the level.
    pub fn sample(&mut self, now: Instant) -> Option<InputEvent> {
        let level = self.line.read();
        match self.current.replace(level) {
            Some(previous) if previous != level => Some(InputEvent {
                at: now,
                state: u32::from(level),
                source: self.label.clone(),
            }),
            _ => None,
        }
    }
}
