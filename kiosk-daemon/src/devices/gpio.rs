//! Input lines backed by the Linux sysfs GPIO interface.

use kiosk_sdk::devices::InputLine;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{info, warn};

/// One exported GPIO configured as an input.
///
/// Pull-ups are not configurable through sysfs and must be set up by the
/// device tree.
pub struct GpioLine {
    gpio: u32,
    value: File,
    last: bool,
    failing: bool,
}

impl GpioLine {
    /// Export `gpio` under `root` if needed, make it an input and open its
    /// value file.
    pub fn open(root: &Path, gpio: u32) -> io::Result<Self> {
        let dir = root.join(format!("gpio{gpio}"));
        if !dir.exists() {
            std::fs::write(root.join("export"), gpio.to_string())?;
            info!(gpio, "Exported GPIO");
        }
        std::fs::write(dir.join("direction"), "in")?;

        let mut line = Self {
            gpio,
            value: File::open(dir.join("value"))?,
            last: false,
            failing: false,
        };
        line.last = line.read_level()?;
        Ok(line)
    }

    // sysfs value reads return immediately, so sampling stays on the generator task.
    fn read_level(&mut self) -> io::Result<bool> {
        let mut raw = [0u8; 1];
        self.value.seek(SeekFrom::Start(0))?;
        self.value.read_exact(&mut raw)?;
        Ok(raw[0] == b'1')
    }
}

impl InputLine for GpioLine {
    /// A failed read holds the last good level.
    fn read(&mut self) -> bool {
        match self.read_level() {
            Ok(level) => {
                if self.failing {
                    info!(gpio = self.gpio, "GPIO readable again");
                    self.failing = false;
                }
                self.last = level;
            }
            Err(e) => {
                if !self.failing {
                    warn!(gpio = self.gpio, error = %e, "GPIO read failed");
                    self.failing = true;
                }
            }
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fake_sysfs(tag: &str, gpio: u32, level: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("kiosk-gpio-{tag}-{}", std::process::id()));
        let dir = root.join(format!("gpio{gpio}"));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("value"), level).unwrap();
        root
    }

    #[test]
    fn test_reads_level_changes() {
        let root = fake_sysfs("levels", 23, "1\n");
        let mut line = GpioLine::open(&root, 23).unwrap();
        assert!(line.read());

        std::fs::write(root.join("gpio23/value"), "0\n").unwrap();
        assert!(!line.read());
        assert_eq!(
            std::fs::read_to_string(root.join("gpio23/direction")).unwrap(),
            "in"
        );
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_failed_read_holds_last_level() {
        let root = fake_sysfs("hold", 7, "1\n");
        let mut line = GpioLine::open(&root, 7).unwrap();

        // An empty value file makes the read fail.
        std::fs::write(root.join("gpio7/value"), "").unwrap();
        assert!(line.read());
        assert!(line.failing);

        std::fs::write(root.join("gpio7/value"), "0").unwrap();
        assert!(!line.read());
        assert!(!line.failing);
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_missing_gpio_fails_to_open() {
        let root = std::env::temp_dir().join(format!("kiosk-gpio-missing-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        // Writing "export" succeeds on a plain directory, but no gpio dir appears.
        assert!(GpioLine::open(&root, 99).is_err());
        std::fs::remove_dir_all(&root).unwrap();
    }
}
