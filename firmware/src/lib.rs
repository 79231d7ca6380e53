//! Quadrature encoder position tracking for RP2040.
//!
//! This crate provides the embedded side of the encoder decoder: it owns the
//! RP2040 input pins and routes their edges into [`encoder_core`].
//!
//! # Hardware Configuration
//!
//! | Function  | GPIO | Description |
//! |-----------|------|-------------|
//! | Channel A | 2    | Encoder phase A (pull-up) |
//! | Channel B | 3    | Encoder phase B (pull-up) |
//! | Home      | 4    | Optional push button to ground (`home-button` feature) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime:
//!
//! - **Edge Task**: Waits on both encoder pins and forwards every edge to the decoder
//! - **Report Task**: Logs position and missed pulses at a fixed interval
//! - **Home Task**: Zeroes the position when the home button is pressed
//!
//! The decoder lives in a `static` guarded by a
//! [`CriticalSectionRawMutex`], so tasks on any executor and plain interrupt
//! handlers can share it.
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`polled`**: Sample both lines on a ticker instead of waiting for edges
//! - **`home-button`**: Enable the home button on GPIO 4
//!
//! # Re-exports
//!
//! This crate re-exports the public items of [`encoder_core`] used by the
//! binary, so consumers only need to depend on this crate.

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features - they install conflicting panic handlers");

use embassy_rp::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

// Re-export core types for convenience
pub use encoder_core::{
    watch_edges, Channel, DecoderError, EncoderSnapshot, GpioBackend, GpioError, HalGpioBackend,
    PinId, QuadratureDecoder,
};

pub mod config;

/// Decoder shared between interrupt-driven tasks and readers.
pub type SharedDecoder = QuadratureDecoder<CriticalSectionRawMutex>;

/// GPIO backend over the two RP2040 encoder inputs.
pub type RpGpioBackend = HalGpioBackend<Input<'static>, Input<'static>>;
