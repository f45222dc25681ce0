//! AHT20 / AHT10 temperature and humidity sensor (I2C, address 0x38).
//!
//! Each read triggers a fresh measurement: both readings come out of the
//! same 6-byte frame, but the two display messages sample at different
//! times, so caching would only show stale values.
//!
//! ## Frame layout
//!
//! ```text
//!  byte:   0       1      2      3          4      5
//!        status  H19:12 H11:4  H3:0|T19:16 T15:8  T7:0
//! ```
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal` [`I2c`] and [`DelayNs`]. On ESP-IDF the bus
//! is an `I2cDriver`; tests drive it with a scripted mock.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;

pub const DEFAULT_ADDRESS: u8 = 0x38;

const CMD_INIT: [u8; 3] = [0xBE, 0x08, 0x00];
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];
const CMD_SOFT_RESET: u8 = 0xBA;

const STATUS_BUSY: u8 = 0x80;
const STATUS_CALIBRATED: u8 = 0x08;

const RESET_WAIT_MS: u32 = 20;
const INIT_WAIT_MS: u32 = 10;
const MEASURE_WAIT_MS: u32 = 80;
const BUSY_RETRY_MS: u32 = 10;
const BUSY_RETRIES: u32 = 10;

/// Full-scale count of the 20-bit readings.
const FULL_SCALE: f32 = 1_048_576.0;

/// Operating range from the datasheet.
const MIN_C: f32 = -40.0;
const MAX_C: f32 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub celsius: f32,
    pub humidity_pct: f32,
}

pub struct Aht20<I, D> {
    i2c: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> Aht20<I, D> {
    /// Reset, calibrate and confirm the calibration bit.
    pub fn new(i2c: I, delay: D, address: u8) -> Result<Self, SensorError> {
        let mut sensor = Self {
            i2c,
            delay,
            address,
        };
        sensor.init()?;
        Ok(sensor)
    }

    fn init(&mut self) -> Result<(), SensorError> {
        self.write(&[CMD_SOFT_RESET])?;
        self.delay.delay_ms(RESET_WAIT_MS);
        self.write(&CMD_INIT)?;
        self.delay.delay_ms(INIT_WAIT_MS);
        let mut retries = 0;
        while self.status()? & STATUS_BUSY != 0 {
            if retries == BUSY_RETRIES {
                return Err(SensorError::Timeout);
            }
            retries += 1;
            self.delay.delay_ms(BUSY_RETRY_MS);
        }
        if self.status()? & STATUS_CALIBRATED == 0 {
            return Err(SensorError::NotCalibrated);
        }
        Ok(())
    }

    /// Trigger a measurement and decode it.
    pub fn measure(&mut self) -> Result<Measurement, SensorError> {
        self.write(&CMD_TRIGGER)?;
        self.delay.delay_ms(MEASURE_WAIT_MS);

        let mut frame = [0u8; 6];
        for attempt in 0..=BUSY_RETRIES {
            self.i2c
                .read(self.address, &mut frame)
                .map_err(|_| SensorError::Bus)?;
            if frame[0] & STATUS_BUSY == 0 {
                return decode(&frame);
            }
            if attempt < BUSY_RETRIES {
                self.delay.delay_ms(BUSY_RETRY_MS);
            }
        }
        Err(SensorError::Timeout)
    }

    pub fn read_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(self.measure()?.celsius)
    }

    pub fn read_humidity(&mut self) -> Result<f32, SensorError> {
        Ok(self.measure()?.humidity_pct)
    }

    fn status(&mut self) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(buf[0])
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|_| SensorError::Bus)
    }
}

/// Decode a 6-byte measurement frame.
pub fn decode(frame: &[u8; 6]) -> Result<Measurement, SensorError> {
    let raw_h = (u32::from(frame[1]) << 12) | (u32::from(frame[2]) << 4) | (u32::from(frame[3]) >> 4);
    let raw_t = (u32::from(frame[3] & 0x0F) << 16) | (u32::from(frame[4]) << 8) | u32::from(frame[5]);

    let humidity_pct = raw_h as f32 * 100.0 / FULL_SCALE;
    let celsius = raw_t as f32 * 200.0 / FULL_SCALE - 50.0;

    if !celsius.is_finite() || !(MIN_C..=MAX_C).contains(&celsius) {
        return Err(SensorError::OutOfRange);
    }
    if !humidity_pct.is_finite() || !(0.0..=100.0).contains(&humidity_pct) {
        return Err(SensorError::OutOfRange);
    }
    Ok(Measurement {
        celsius,
        humidity_pct,
    })
}
