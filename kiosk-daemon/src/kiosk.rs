//! Wiring of configuration, devices and processors into a running kiosk.

use crate::config::FileConfig;
use crate::devices::{ConsoleDisplay, GpioLine, Panel, PanelTiming, StdoutPrinter, TtyPrinter};
use anyhow::Context;
use kiosk_core::fortunes::FortuneStore;
use kiosk_core::processors::{EventGenerator, VendingMachine};
use kiosk_core::sources::{EdgeDetector, PulseCounter};
use kiosk_core::wisdom::WisdomGenerator;
use kiosk_sdk::devices::Printer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Where input lines come from.
pub enum InputMode {
    Gpio,
    Simulated,
}

/// Run the kiosk until `shutdown_tx` is set.
pub async fn run_kiosk(
    config: FileConfig,
    mode: InputMode,
    shutdown_tx: Arc<watch::Sender<bool>>,
) -> anyhow::Result<()> {
    let store = FortuneStore::open(&config.fortunes).context("failed to open fortune databases")?;
    let wisdom = WisdomGenerator::new(store, &config.fortunes);

    let poll_interval = Duration::from_millis(config.inputs.poll_interval_ms);
    let mut generator = EventGenerator::new(poll_interval);
    let printer: Box<dyn Printer> = match mode {
        InputMode::Gpio => {
            register_gpio_inputs(&mut generator, &config)?;
            open_printer(&config)?
        }
        InputMode::Simulated => {
            let panel = simulated_panel(&config, poll_interval);
            register_panel_inputs(&mut generator, &config, &panel);
            panel.spawn(shutdown_tx.clone());
            Box::new(StdoutPrinter)
        }
    };

    let display = Box::new(ConsoleDisplay::stdout());
    let machine = VendingMachine::new(config.vending, display, printer, wisdom, &mut generator);
    machine
        .run(generator, shutdown_tx.subscribe())
        .await
        .context("vending machine stopped")
}

fn register_gpio_inputs(generator: &mut EventGenerator, config: &FileConfig) -> anyhow::Result<()> {
    let inputs = &config.inputs;
    for button in &inputs.buttons {
        let line = GpioLine::open(&inputs.gpio_root, button.gpio)
            .with_context(|| format!("failed to open GPIO {} for {}", button.gpio, button.name))?;
        generator.register(EdgeDetector::new(button.name.as_str(), line));
    }

    let coin = GpioLine::open(&inputs.gpio_root, inputs.coin.gpio)
        .with_context(|| format!("failed to open coin GPIO {}", inputs.coin.gpio))?;
    generator.register(PulseCounter::new(
        config.vending.controls.coin.clone(),
        coin,
        inputs.coin.rest_level,
        Duration::from_millis(inputs.coin.interpulse_delay_ms),
    ));
    Ok(())
}

fn simulated_panel(config: &FileConfig, poll_interval: Duration) -> Panel {
    let interpulse_delay = Duration::from_millis(config.inputs.coin.interpulse_delay_ms);
    let timing = PanelTiming {
        press_hold: (poll_interval * 5).max(Duration::from_millis(50)),
        pulse_width: (interpulse_delay / 3).max(poll_interval * 2),
    };
    Panel::new(
        &config.inputs.buttons,
        config.vending.controls.pressed_level,
        config.inputs.coin.rest_level,
        timing,
    )
}

fn register_panel_inputs(generator: &mut EventGenerator, config: &FileConfig, panel: &Panel) {
    for button in &config.inputs.buttons {
        if let Some(line) = panel.button_line(&button.name) {
            generator.register(EdgeDetector::new(button.name.as_str(), line));
        }
    }
    generator.register(PulseCounter::new(
        config.vending.controls.coin.clone(),
        panel.coin_line(),
        config.inputs.coin.rest_level,
        Duration::from_millis(config.inputs.coin.interpulse_delay_ms),
    ));
}

fn open_printer(config: &FileConfig) -> anyhow::Result<Box<dyn Printer>> {
    match &config.printer.device {
        Some(device) => {
            let printer = TtyPrinter::open(device, &config.printer.init_sequence)
                .with_context(|| format!("failed to open printer {}", device.display()))?;
            Ok(Box::new(printer))
        }
        None => {
            tracing::warn!("No printer device configured, printing to stdout");
            Ok(Box::new(StdoutPrinter))
        }
    }
}
