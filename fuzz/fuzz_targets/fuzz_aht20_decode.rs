//! Fuzz target: AHTx0 measurement frame decoder
//!
//! Decodes arbitrary 6-byte frames and verifies:
//! - No panics for any byte pattern
//! - Accepted readings are finite and inside the sensor's rated range
//!
//! cargo fuzz run fuzz_aht20_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use statusboard::sensors::aht20::decode;

fuzz_target!(|frame: [u8; 6]| {
    if let Ok(m) = decode(&frame) {
        assert!(m.celsius.is_finite() && (-40.0..=85.0).contains(&m.celsius));
        assert!(m.humidity_pct.is_finite() && (0.0..=100.0).contains(&m.humidity_pct));
    }
});
