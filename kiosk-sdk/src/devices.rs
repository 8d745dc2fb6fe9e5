//! Collaborator traits for the kiosk hardware.
//!
//! The core never talks to pins, buses or serial ports directly. Everything it
//! needs from the outside world goes through one of these traits, so the
//! daemon can plug in real adapters and tests can plug in recorders.

use std::io;

/// Character ROM glyphs of HD44780-style displays.
///
/// Text passed to a [`TextDisplay`] is ordinary Unicode. Code points in
/// `U+E000..=U+E0FF` are reserved for addressing the display's character ROM
/// directly: `U+E000 + n` is ROM code `n`. Adapters translate them to their
/// own rendering.
pub mod glyph {
    /// Right-pointing arrow (ROM 0x7E).
    pub const ARROW_RIGHT: char = '\u{e07e}';
    /// Left-pointing arrow (ROM 0x7F).
    pub const ARROW_LEFT: char = '\u{e07f}';
    /// "More options above" marker (ROM 0xA2).
    pub const MENU_UP: char = '\u{e0a2}';
    /// "More options below" marker (ROM 0xA3).
    pub const MENU_DOWN: char = '\u{e0a3}';

    /// ROM code addressed by `c`, if it is a ROM glyph.
    pub fn rom_code(c: char) -> Option<u8> {
        u32::from(c)
            .checked_sub(0xe000)
            .and_then(|code| u8::try_from(code).ok())
    }
}

/// A character display with a controllable backlight.
///
/// All calls are fire-and-forget: drivers are expected to swallow and log
/// their own bus errors.
pub trait TextDisplay: Send {
    /// Clear the display and move the cursor to the origin.
    fn clear(&mut self);

    /// Write text at the current cursor position. ROM glyphs are given as
    /// [`glyph`] code points.
    fn write_text(&mut self, text: &str);

    /// Move the cursor to the given column and row (both zero-based).
    fn set_cursor(&mut self, col: u8, row: u8);

    fn backlight_on(&mut self);

    fn backlight_off(&mut self);
}

/// A line printer.
///
/// `lines` are pre-formatted and newline terminated. The order in which they
/// physically appear on paper is the printer's business.
pub trait Printer: Send {
    fn emit(&mut self, lines: &[String]) -> io::Result<()>;
}

/// A single digital input line (button or coin acceptor pulse output).
pub trait InputLine: Send + 'static {
    /// Sample the current level of the line.
    fn read(&mut self) -> bool;
}

impl<F> InputLine for F
where
    F: FnMut() -> bool + Send + 'static,
{
    fn read(&mut self) -> bool {
        self()
    }
}
