//! A 16x2 character display rendered to a terminal.

use kiosk_sdk::devices::TextDisplay;
use kiosk_sdk::devices::glyph::{self, ARROW_LEFT, ARROW_RIGHT, MENU_DOWN, MENU_UP};
use std::io::{self, Stdout, Write};

const COLS: usize = 16;
const ROWS: usize = 2;

/// Map character ROM glyphs to something a terminal can show.
fn render_glyph(c: char) -> char {
    match c {
        ARROW_RIGHT => '→',
        ARROW_LEFT => '←',
        MENU_UP => '▲',
        MENU_DOWN => '▼',
        c if glyph::rom_code(c).is_some() => '?',
        c => c,
    }
}

/// Console stand-in for the LCD.
///
/// Keeps a character buffer the size of the real panel and redraws it after
/// every write or backlight change.
pub struct ConsoleDisplay<W = Stdout> {
    out: W,
    cells: [[char; COLS]; ROWS],
    col: usize,
    row: usize,
    backlight: bool,
}

impl ConsoleDisplay<Stdout> {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write + Send> ConsoleDisplay<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            cells: [[' '; COLS]; ROWS],
            col: 0,
            row: 0,
            backlight: true,
        }
    }

    pub fn rows(&self) -> Vec<String> {
        self.cells.iter().map(|row| row.iter().collect()).collect()
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    fn render(&mut self) {
        let border = if self.backlight { '-' } else { '.' };
        let edge: String = std::iter::repeat_n(border, COLS).collect();
        let mut frame = format!("+{edge}+\n");
        for row in self.rows() {
            frame.push_str(&format!("|{row}|\n"));
        }
        frame.push_str(&format!("+{edge}+\n"));

        // Display errors are not reported to the caller.
        let _ = self
            .out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush());
    }
}

impl<W: Write + Send> TextDisplay for ConsoleDisplay<W> {
    fn clear(&mut self) {
        self.cells = [[' '; COLS]; ROWS];
        self.col = 0;
        self.row = 0;
    }

    fn write_text(&mut self, text: &str) {
        for c in text.chars() {
            if self.col >= COLS {
                break;
            }
            self.cells[self.row][self.col] = render_glyph(c);
            self.col += 1;
        }
        self.render();
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.col = usize::from(col).min(COLS);
        self.row = usize::from(row).min(ROWS - 1);
    }

    fn backlight_on(&mut self) {
        if !self.backlight {
            self.backlight = true;
            self.render();
        }
    }

    fn backlight_off(&mut self) {
        if self.backlight {
            self.backlight = false;
            self.render();
        }
    }
}
