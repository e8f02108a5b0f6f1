//! Thermograph firmware library - host-testable pieces of the RP2350 build.
//!
//! The binary (`main.rs`) adds the hardware glue: ST7789 window driver, DHT22
//! bit-bang reader and flash record storage. Everything here is pure logic.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p thermograph-pico2 --lib --target x86_64-unknown-linux-gnu  # Linux/macOS
//! cargo test -p thermograph-pico2 --lib --target x86_64-pc-windows-msvc    # Windows
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Board wiring, bus speeds and flash layout
pub mod config;

// DHT22 pulse classification and frame decoding
pub mod dht22;

// Header framing of the history record in flash
pub mod flash_record;
