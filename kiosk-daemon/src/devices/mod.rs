//! Device adapters behind the kiosk's collaborator traits.

pub mod console;
pub mod gpio;
pub mod panel;
pub mod printer;

pub use console::ConsoleDisplay;
pub use gpio::GpioLine;
pub use panel::{Panel, PanelTiming};
pub use printer::{StdoutPrinter, TtyPrinter};
