//! QuadratureDecoder: folds A/B edges into a shared position count.

use core::cell::RefCell;
use core::f64::consts::TAU;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::gpio::{GpioBackend, GpioError, PinId};
use crate::transition::{lookup, QuadState, INVALID_TRANSITION};

/// Counts per revolution before `initialize` runs (200 PPR encoder).
pub const DEFAULT_COUNTS_PER_REVOLUTION: u32 = 400;

/// Error type for decoder operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderError {
    /// The GPIO backend could not configure a pin.
    Configuration(GpioError),
    /// Zero pulses per revolution, or too many to count both edges in a `u32`.
    InvalidResolution,
    /// Operation needs the pins recorded by `initialize`.
    NotInitialized,
}

impl From<GpioError> for DecoderError {
    fn from(err: GpioError) -> Self {
        DecoderError::Configuration(err)
    }
}

/// Encoder channel that produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    A,
    B,
}

/// Position and missed pulse count read in one critical section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderSnapshot {
    /// Accumulated counts since the last home.
    pub position: i64,
    /// Invalid transitions since the last home.
    pub missed_pulses: u64,
}

impl EncoderSnapshot {
    /// Position converted to radians for the given resolution.
    #[must_use]
    pub fn radians(&self, counts_per_revolution: u32) -> f64 {
        counts_to_radians(self.position, counts_per_revolution)
    }
}

#[inline]
fn counts_to_radians(position: i64, counts_per_revolution: u32) -> f64 {
    position as f64 / f64::from(counts_per_revolution) * TAU
}

/// Decoding state guarded by the decoder's lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EncoderState {
    prior_state: QuadState,
    position: i64,
    missed_pulses: u64,
    counts_per_revolution: u32,
    pins: Option<(PinId, PinId)>,
}

impl EncoderState {
    const fn new() -> Self {
        Self {
            prior_state: QuadState::new(0),
            position: 0,
            missed_pulses: 0,
            counts_per_revolution: DEFAULT_COUNTS_PER_REVOLUTION,
            pins: None,
        }
    }

    fn seed(&mut self, level_a: bool, level_b: bool) {
        self.prior_state = QuadState::from_levels(level_a, level_b);
    }

    fn update(&mut self, new_state: QuadState) {
        let transition = lookup(self.prior_state, new_state);
        if transition == INVALID_TRANSITION {
            self.missed_pulses += 1;
            trace!(
                "Missed pulse: {} -> {}",
                self.prior_state.raw(),
                new_state.raw()
            );
        } else {
            self.position += i64::from(transition);
        }
        self.prior_state = new_state;
    }

    fn home(&mut self) {
        self.position = 0;
        self.missed_pulses = 0;
    }

    fn radians(&self, position: i64) -> f64 {
        counts_to_radians(position, self.counts_per_revolution)
    }
}

/// Quadrature decoder shared between edge handlers and readers.
///
/// All state sits behind a single blocking mutex. Each operation takes the
/// lock exactly once, so a read-and-reset can never interleave with an edge.
/// With `CriticalSectionRawMutex` the decoder is `Sync` and can live in a
/// `static` reached from interrupt handlers, executor tasks and threads.
///
/// # Example
///
/// ```
/// use embassy_sync::blocking_mutex::raw::NoopRawMutex;
/// use encoder_core::QuadratureDecoder;
///
/// let decoder = QuadratureDecoder::<NoopRawMutex>::new();
/// decoder.on_edge_b(true); // 00 -> 01
/// decoder.on_edge_a(true); // 01 -> 11
/// assert_eq!(decoder.position_counts(), 2);
/// assert_eq!(decoder.pulses_missed(), 0);
/// ```
pub struct QuadratureDecoder<M: RawMutex> {
    state: Mutex<M, RefCell<EncoderState>>,
}

impl<M: RawMutex> QuadratureDecoder<M> {
    /// Create a decoder with all counters zeroed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(EncoderState::new())),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut EncoderState) -> R) -> R {
        self.state.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Configure the pins and seed the state from their current levels.
    ///
    /// Position and missed pulses are left untouched, so calling this again
    /// re-arms decoding without losing the count. The resolution is fixed
    /// by the first successful call.
    pub fn initialize<G: GpioBackend>(
        &self,
        backend: &mut G,
        pin_a: PinId,
        pin_b: PinId,
        pulses_per_revolution: u32,
    ) -> Result<(), DecoderError> {
        if pulses_per_revolution == 0 {
            return Err(DecoderError::InvalidResolution);
        }
        let counts_per_revolution = pulses_per_revolution
            .checked_mul(2)
            .ok_or(DecoderError::InvalidResolution)?;

        backend.configure(pin_a)?;
        backend.configure(pin_b)?;

        let level_a = backend.read_level(pin_a);
        let level_b = backend.read_level(pin_b);

        self.with_state(|state| {
            match state.pins {
                None => state.counts_per_revolution = counts_per_revolution,
                Some(_) => {
                    warn!("Decoder re-initialized, keeping position {}", state.position);
                    if state.counts_per_revolution != counts_per_revolution {
                        warn!(
                            "Ignoring resolution change to {} counts, keeping {}",
                            counts_per_revolution,
                            state.counts_per_revolution
                        );
                    }
                }
            }
            state.pins = Some((pin_a, pin_b));
            state.seed(level_a, level_b);
        });

        debug!(
            "Decoder initialized: A={} B={} cpr={}",
            level_a,
            level_b,
            self.counts_per_revolution()
        );
        Ok(())
    }

    /// Handle an edge on channel A with the line's new level.
    ///
    /// The B bit is taken from the last recorded state, not re-read.
    pub fn on_edge_a(&self, level: bool) {
        self.with_state(|state| {
            let new_state = state.prior_state.with_a(level);
            state.update(new_state);
        });
    }

    /// Handle an edge on channel B with the line's new level.
    ///
    /// The A bit is taken from the last recorded state, not re-read.
    pub fn on_edge_b(&self, level: bool) {
        self.with_state(|state| {
            let new_state = state.prior_state.with_b(level);
            state.update(new_state);
        });
    }

    /// Dispatch an edge to [`on_edge_a`](Self::on_edge_a) or [`on_edge_b`](Self::on_edge_b).
    #[inline]
    pub fn on_edge(&self, channel: Channel, level: bool) {
        match channel {
            Channel::A => self.on_edge_a(level),
            Channel::B => self.on_edge_b(level),
        }
    }

    /// Fold a sample of both lines taken at the same instant.
    ///
    /// Unlike the edge handlers both bits are fresh here, so a sample where
    /// both lines changed is counted as a missed pulse.
    pub fn on_levels(&self, level_a: bool, level_b: bool) {
        self.with_state(|state| state.update(QuadState::from_levels(level_a, level_b)));
    }

    /// Read both initialized pins through `backend` and fold the sample.
    pub fn sample<G: GpioBackend>(&self, backend: &mut G) -> Result<(), DecoderError> {
        let (pin_a, pin_b) = self
            .with_state(|state| state.pins)
            .ok_or(DecoderError::NotInitialized)?;
        let level_a = backend.read_level(pin_a);
        let level_b = backend.read_level(pin_b);
        self.on_levels(level_a, level_b);
        Ok(())
    }

    /// Zero the position and the missed pulse count.
    ///
    /// The quadrature state is kept so decoding continues from the current
    /// physical position.
    pub fn set_home(&self) {
        self.with_state(EncoderState::home);
    }

    /// Current position in radians, optionally homing in the same critical section.
    pub fn get_position(&self, reset: bool) -> f64 {
        self.with_state(|state| {
            let position = state.position;
            if reset {
                state.home();
            }
            state.radians(position)
        })
    }

    /// Invalid transitions seen since the last home.
    #[must_use]
    pub fn pulses_missed(&self) -> u64 {
        self.with_state(|state| state.missed_pulses)
    }

    /// Current position in raw counts.
    #[must_use]
    pub fn position_counts(&self) -> i64 {
        self.with_state(|state| state.position)
    }

    /// Counts per shaft revolution (two per pulse).
    #[must_use]
    pub fn counts_per_revolution(&self) -> u32 {
        self.with_state(|state| state.counts_per_revolution)
    }

    /// Position and missed pulses read together.
    #[must_use]
    pub fn snapshot(&self) -> EncoderSnapshot {
        self.with_state(|state| EncoderSnapshot {
            position: state.position,
            missed_pulses: state.missed_pulses,
        })
    }

    /// Whether `initialize` has completed at least once.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.with_state(|state| state.pins.is_some())
    }

    #[cfg(test)]
    fn prior_state(&self) -> QuadState {
        self.with_state(|state| state.prior_state)
    }
}

impl<M: RawMutex> Default for QuadratureDecoder<M> {
    fn default() -> Self {
        Self::new()
    }
}
