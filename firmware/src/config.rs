//! Board and encoder constants.

use embassy_rp::gpio::Pull;
use encoder_core::PinId;

/// GPIO number of channel A. Must match the pin handed to `Input::new`.
pub const ENCODER_PIN_A: PinId = PinId(2);

/// GPIO number of channel B. Must match the pin handed to `Input::new`.
pub const ENCODER_PIN_B: PinId = PinId(3);

/// Pull applied to both encoder lines (open-collector encoders need pull-ups).
pub const ENCODER_PULL: Pull = Pull::Up;

/// Pulses per revolution of a single channel.
pub const PULSES_PER_REVOLUTION: u32 = 200;

/// Interval between position reports.
pub const REPORT_INTERVAL_MS: u64 = 500;

/// Interval between samples in `polled` mode.
pub const SAMPLE_INTERVAL_US: u64 = 50;

/// Quiet time after a home button press.
pub const HOME_DEBOUNCE_MS: u64 = 200;
