//! Platform-agnostic quadrature encoder decoding.
//!
//! This crate turns the two-phase (A/B) signal of a quadrature encoder into a
//! signed count and a shaft angle, counting transitions that imply a missed
//! edge. It has no platform-specific dependencies and can be used both in
//! embedded `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! - [`transition`]: Gray-code transition table ([`TRANSITION_TABLE`], [`QuadState`])
//! - [`decoder`]: Lock-protected decoder ([`QuadratureDecoder`])
//! - [`gpio`]: GPIO capability trait ([`GpioBackend`]) and an `embedded-hal` adapter
//! - [`watch`]: Async edge routing from a pin to the decoder ([`watch_edges`])
//!
//! # Wiring
//!
//! ```text
//! edge on A ──> on_edge_a(level) ─┐
//!                                 ├──> [ prior_state | position | missed ] <── get_position / set_home
//! edge on B ──> on_edge_b(level) ─┘               (one blocking mutex)
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible to the other modules.
mod fmt;

pub mod decoder;
pub mod gpio;
pub mod transition;
pub mod watch;

// Re-export main types at crate root
pub use decoder::{
    Channel, DecoderError, EncoderSnapshot, QuadratureDecoder, DEFAULT_COUNTS_PER_REVOLUTION,
};
pub use gpio::{GpioBackend, GpioError, HalGpioBackend, PinId};
pub use transition::{Direction, QuadState, Transition, INVALID_TRANSITION, TRANSITION_TABLE};
pub use watch::watch_edges;
