//! Statusboard Firmware: Main Entry Point
//!
//! Hexagonal architecture: the rotation core only sees port traits; this
//! file picks the adapters for the target and wires the threads.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Hd44780 / ConsoleDisplay   TriColorLed / SimIndicator         │
//! │  (DisplayPort)              (IndicatorPort)                    │
//! │  Aht20 / SimSensor          SystemClock      LogEventSink      │
//! │  (SensorPort)               (ClockPort)      (EventSink)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  DisplayService · RotationController (main thread)     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │        ▲ shared RotationState                                  │
//! │  ButtonEventRouter ("buttons") ◀── button poller ◀── GPIO ISR  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use statusboard::adapters::clock::SystemClock;
use statusboard::adapters::log_sink::LogEventSink;
use statusboard::adapters::time::StdDelay;
use statusboard::app::messages::{TemperatureMessage, standard_catalog};
use statusboard::app::ports::{DisplayPort, IndicatorPort, SensorPort};
use statusboard::app::rotation::RotationController;
use statusboard::app::router::{Button, ButtonEventRouter};
use statusboard::app::service::{DisplayService, HardwareGuard};
use statusboard::config::DisplayConfig;
use statusboard::drivers::button::{ButtonLine, RearmHook, spawn_poller};
use statusboard::pins;

/// Peripherals for one target, ready to be wired.
struct Board<D, I, S> {
    display: D,
    indicator: I,
    sensor: S,
    buttons: [ButtonLine; 3],
    rearm: Option<RearmHook>,
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Statusboard v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = DisplayConfig::default();
    config.validate().context("invalid display configuration")?;

    let board = target::bring_up(&config)?;
    let cycles = run(board, &config)?;
    info!("Shut down cleanly after {} cycles", cycles);
    Ok(())
}

fn run<D, I, S>(board: Board<D, I, S>, config: &DisplayConfig) -> Result<u64>
where
    D: DisplayPort,
    I: IndicatorPort + Send + 'static,
    S: SensorPort + Send + 'static,
{
    let Board {
        display,
        indicator,
        sensor,
        mut buttons,
        rearm,
    } = board;
    let indicator = Arc::new(Mutex::new(indicator));
    let sensor = Arc::new(Mutex::new(sensor));

    // ── 1. Indicator reflects the room before the first render ─
    match TemperatureMessage::new(sensor.clone(), indicator.clone()).refresh() {
        Ok(c) => info!("Startup indicator: {:?}", c.band),
        Err(e) => warn!("Startup temperature read failed: {}", e),
    }

    // ── 2. Catalog + controller ───────────────────────────────
    let catalog = standard_catalog(SystemClock, sensor, indicator.clone())
        .context("building message catalog")?;
    let guard = HardwareGuard::new(display, indicator);
    let controller = RotationController::new(catalog, guard, StdDelay, config)
        .context("creating rotation controller")?;
    let handle = controller.handle();

    // Installed before any worker thread starts.
    target::install_shutdown_hook(&handle)?;

    // ── 3. Buttons → router → shared state ────────────────────
    let router = ButtonEventRouter::new(handle.clone());
    for (button, line) in Button::ALL.into_iter().zip(buttons.iter_mut()) {
        router.bind(button, line);
    }
    let poller = {
        let handle = handle.clone();
        spawn_poller(
            buttons.into(),
            Duration::from_millis(pins::BUTTON_POLL_MS),
            move || handle.shutdown_requested(),
            rearm,
        )
        .context("spawning button poller")?
    };
    let dispatcher = router.spawn().context("spawning button dispatcher")?;

    // ── 4. Main loop ──────────────────────────────────────────
    info!("System ready. Entering rotation loop.");
    let mut service = DisplayService::new(controller, LogEventSink::new(), config.tick_interval());
    let cycles = service.run();

    // Dropping the service drops the guard: display cleared, LED off.
    drop(service);

    poller
        .join()
        .map_err(|_| anyhow!("button poller panicked"))?;
    let presses = dispatcher
        .join()
        .map_err(|_| anyhow!("button dispatcher panicked"))?;
    info!("Handled {} button presses", presses);
    Ok(cycles)
}

// ── Logging ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    // stdout belongs to the console display.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("logger init failed: {e}"))
}

// ── ESP32-S3 board ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod target {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use esp_idf_svc::hal::delay::{Ets, FreeRtos};
    use esp_idf_svc::hal::gpio::{
        AnyIOPin, AnyInputPin, AnyOutputPin, Input, InterruptType, Output, PinDriver, Pull,
    };
    use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::units::Hertz;
    use log::{info, warn};

    use statusboard::adapters::time::uptime_ms;
    use statusboard::app::rotation::RotationHandle;
    use statusboard::config::DisplayConfig;
    use statusboard::drivers::button::{ButtonLine, PressCounter};
    use statusboard::drivers::hd44780::{Geometry, Hd44780};
    use statusboard::drivers::status_led::TriColorLed;
    use statusboard::pins;
    use statusboard::sensors::aht20::Aht20;

    use super::Board;

    type OutPin = PinDriver<'static, AnyOutputPin, Output>;
    type InPin = PinDriver<'static, AnyInputPin, Input>;

    fn output(gpio: i32) -> Result<OutPin> {
        // SAFETY: every GPIO number in `pins` is claimed exactly once here.
        let pin = unsafe { AnyOutputPin::new(gpio) };
        PinDriver::output(pin).with_context(|| format!("GPIO{gpio} as output"))
    }

    fn button(gpio: i32, counter: Arc<PressCounter>) -> Result<InPin> {
        // SAFETY: as in `output`.
        let pin = unsafe { AnyInputPin::new(gpio) };
        let mut driver = PinDriver::input(pin).with_context(|| format!("GPIO{gpio} as input"))?;
        driver.set_pull(Pull::Up)?;
        driver.set_interrupt_type(InterruptType::NegEdge)?;
        // SAFETY: the callback only touches atomics and the ISR-safe
        // esp_timer, and `counter` is 'static via the Arc.
        unsafe {
            driver.subscribe(move || {
                counter.record(uptime_ms());
            })?;
        }
        driver.enable_interrupt()?;
        Ok(driver)
    }

    pub(super) fn bring_up(
        config: &DisplayConfig,
    ) -> Result<Board<Hd44780<OutPin, Ets>, TriColorLed<OutPin>, Aht20<I2cDriver<'static>, FreeRtos>>>
    {
        let peripherals = Peripherals::take().context("peripherals already taken")?;

        let display = Hd44780::new(
            output(pins::LCD_RS_GPIO)?,
            output(pins::LCD_E_GPIO)?,
            [
                output(pins::LCD_D4_GPIO)?,
                output(pins::LCD_D5_GPIO)?,
                output(pins::LCD_D6_GPIO)?,
                output(pins::LCD_D7_GPIO)?,
            ],
            Ets,
            Geometry {
                columns: config.lcd_columns,
                lines: config.lcd_lines,
            },
        )
        .map_err(|e| anyhow::anyhow!("LCD init failed: {e}"))?;
        info!("LCD ready ({}x{})", config.lcd_columns, config.lcd_lines);

        let indicator = TriColorLed::new(
            output(pins::LED_R_GPIO)?,
            output(pins::LED_G_GPIO)?,
            output(pins::LED_B_GPIO)?,
        )
        .map_err(|e| anyhow::anyhow!("LED init failed: {e}"))?;

        // SAFETY: as in `output`.
        let (sda, scl) = unsafe {
            (
                AnyIOPin::new(pins::I2C_SDA_GPIO),
                AnyIOPin::new(pins::I2C_SCL_GPIO),
            )
        };
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            sda,
            scl,
            &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
        )
        .context("I2C0 init")?;
        let sensor = Aht20::new(i2c, FreeRtos, config.sensor_i2c_address)
            .map_err(|e| anyhow::anyhow!("AHTx0 init failed: {e}"))?;
        info!("AHTx0 ready at 0x{:02X}", config.sensor_i2c_address);

        let counters = [
            Arc::new(PressCounter::new()),
            Arc::new(PressCounter::new()),
            Arc::new(PressCounter::new()),
        ];
        let mut drivers = [
            button(pins::BUTTON_A_GPIO, counters[0].clone())?,
            button(pins::BUTTON_B_GPIO, counters[1].clone())?,
            button(pins::BUTTON_C_GPIO, counters[2].clone())?,
        ];
        let [a, b, c] = counters;

        Ok(Board {
            display,
            indicator,
            sensor,
            buttons: [
                ButtonLine::new("A", a),
                ButtonLine::new("B", b),
                ButtonLine::new("C", c),
            ],
            // ESP-IDF disarms a GPIO interrupt after it fires.
            rearm: Some(Box::new(move || {
                for d in &mut drivers {
                    if let Err(e) = d.enable_interrupt() {
                        warn!("Button interrupt re-enable failed: {}", e);
                    }
                }
            })),
        })
    }

    /// The device has no operator shutdown; it runs until power is removed.
    pub(super) fn install_shutdown_hook(_handle: &RotationHandle) -> Result<()> {
        Ok(())
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod target {
    use std::io::Stdout;
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::info;

    use statusboard::adapters::sim::{ConsoleDisplay, SimIndicator, SimSensor, StdinButtons};
    use statusboard::app::rotation::RotationHandle;
    use statusboard::config::DisplayConfig;
    use statusboard::drivers::button::{ButtonLine, PressCounter};

    use super::Board;

    pub(super) fn bring_up(
        config: &DisplayConfig,
    ) -> Result<Board<ConsoleDisplay<Stdout>, SimIndicator, SimSensor>> {
        let counters = [
            Arc::new(PressCounter::new()),
            Arc::new(PressCounter::new()),
            Arc::new(PressCounter::new()),
        ];
        // Detached: it blocks on stdin and ends with the process.
        StdinButtons::new(counters[0].clone(), counters[1].clone(), counters[2].clone())
            .spawn()
            .context("spawning stdin button reader")?;
        let [a, b, c] = counters;
        info!("Simulation board ({}x{} console LCD)", config.lcd_columns, config.lcd_lines);

        Ok(Board {
            display: ConsoleDisplay::stdout(config.lcd_columns, config.lcd_lines),
            indicator: SimIndicator::default(),
            sensor: SimSensor::default(),
            buttons: [
                ButtonLine::new("A", a),
                ButtonLine::new("B", b),
                ButtonLine::new("C", c),
            ],
            rearm: None,
        })
    }

    /// Ctrl-C / SIGTERM request a clean shutdown.
    pub(super) fn install_shutdown_hook(handle: &RotationHandle) -> Result<()> {
        let handle = handle.clone();
        ctrlc::set_handler(move || {
            info!("Interrupt received, shutting down");
            handle.request_shutdown();
        })
        .context("installing Ctrl-C handler")
    }
}
