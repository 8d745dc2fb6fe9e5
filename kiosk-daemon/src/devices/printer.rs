//! Printer adapters.

use kiosk_sdk::devices::Printer;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

/// Encode text for the printer's code page 437 character set.
///
/// ASCII passes through; characters with no code point on the printer
/// become `?`.
pub fn encode_cp437(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            c if c.is_ascii() => c as u8,
            '£' => 0x9c,
            '¢' => 0x9b,
            '¥' => 0x9d,
            'é' => 0x82,
            'ü' => 0x81,
            _ => b'?',
        })
        .collect()
}

/// Thermal printer on a serial line, mounted upside down.
///
/// Paper comes out bottom edge first, so the lines of a job are sent last
/// line first.
pub struct TtyPrinter<W = File> {
    out: W,
}

impl TtyPrinter<File> {
    /// Open the serial device and send `init`.
    pub fn open(path: &Path, init: &str) -> io::Result<Self> {
        let device = OpenOptions::new().write(true).open(path)?;
        info!(device = %path.display(), "Printer opened");
        Self::with_writer(device, init)
    }
}

impl<W: Write + Send> TtyPrinter<W> {
    pub fn with_writer(mut out: W, init: &str) -> io::Result<Self> {
        out.write_all(&encode_cp437(init))?;
        out.flush()?;
        Ok(Self { out })
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Printer for TtyPrinter<W> {
    fn emit(&mut self, lines: &[String]) -> io::Result<()> {
        let job: Vec<u8> = lines
            .iter()
            .rev()
            .flat_map(|line| encode_cp437(line))
            .collect();
        self.out.write_all(&job)?;
        self.out.flush()
    }
}

/// Prints jobs to stdout in reading order.
#[derive(Debug, Default)]
pub struct StdoutPrinter;

impl Printer for StdoutPrinter {
    fn emit(&mut self, lines: &[String]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        for line in lines {
            out.write_all(line.as_bytes())?;
        }
        out.flush()
    }
}
