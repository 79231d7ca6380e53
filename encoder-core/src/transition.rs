//! Gray-code transition table and the 2-bit quadrature state.
//!
//! The encoder's two channels form a 2-bit state with A in bit 1 and B in
//! bit 0. Moving forward the state walks the Gray-code cycle
//! `00 -> 01 -> 11 -> 10 -> 00`; moving in reverse it walks the cycle
//! backwards. Every transition between two states is looked up in
//! [`TRANSITION_TABLE`].

/// Table entry marking a transition where both channels changed at once.
///
/// A properly debounced quadrature signal never flips both lines between two
/// observations, so this means at least one edge was lost.
pub const INVALID_TRANSITION: i8 = 2;

const X: i8 = INVALID_TRANSITION;

/// Position delta indexed by `[prior_state][new_state]`.
///
/// ```text
///             new→   00   01   10   11
/// prior=00(0)         0   +1   -1    X
/// prior=01(1)        -1    0    X   +1
/// prior=10(2)        +1    X    0   -1
/// prior=11(3)         X   -1   +1    0
/// ```
pub const TRANSITION_TABLE: [[i8; 4]; 4] = [
    [0, 1, -1, X],
    [-1, 0, X, 1],
    [1, X, 0, -1],
    [X, -1, 1, 0],
];

/// Combined level of both channels, always in `0..=3`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadState(u8);

impl QuadState {
    const A_BIT: u8 = 0b10;
    const B_BIT: u8 = 0b01;

    /// Build a state from the raw 2-bit value; higher bits are discarded.
    #[inline]
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw & 0b11)
    }

    /// Build a state from the two channel levels.
    #[inline]
    #[must_use]
    pub const fn from_levels(level_a: bool, level_b: bool) -> Self {
        Self(((level_a as u8) << 1) | level_b as u8)
    }

    /// Replace the A bit, keeping B.
    #[inline]
    #[must_use]
    pub const fn with_a(self, level: bool) -> Self {
        Self((self.0 & Self::B_BIT) | ((level as u8) << 1))
    }

    /// Replace the B bit, keeping A.
    #[inline]
    #[must_use]
    pub const fn with_b(self, level: bool) -> Self {
        Self((self.0 & Self::A_BIT) | level as u8)
    }

    #[inline]
    #[must_use]
    pub const fn level_a(self) -> bool {
        self.0 & Self::A_BIT != 0
    }

    #[inline]
    #[must_use]
    pub const fn level_b(self) -> bool {
        self.0 & Self::B_BIT != 0
    }

    /// Get the raw 2-bit value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Direction of a single valid step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Walking `00 -> 01 -> 11 -> 10`.
    Forward,
    /// Walking `00 -> 10 -> 11 -> 01`.
    Reverse,
}

/// Classification of a table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Same state observed again.
    Idle,
    /// One channel changed.
    Step(Direction),
    /// Both channels changed; an edge was missed.
    Missed,
}

impl Transition {
    /// Classify the transition from `prior` to `new`.
    #[inline]
    #[must_use]
    pub const fn between(prior: QuadState, new: QuadState) -> Self {
        match lookup(prior, new) {
            0 => Self::Idle,
            1 => Self::Step(Direction::Forward),
            -1 => Self::Step(Direction::Reverse),
            _ => Self::Missed,
        }
    }

    /// Position delta contributed by this transition.
    #[inline]
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::Step(Direction::Forward) => 1,
            Self::Step(Direction::Reverse) => -1,
            Self::Idle | Self::Missed => 0,
        }
    }
}

/// Raw table lookup.
#[inline]
#[must_use]
pub const fn lookup(prior: QuadState, new: QuadState) -> i8 {
    TRANSITION_TABLE[prior.0 as usize][new.0 as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORWARD_CYCLE: [u8; 4] = [0b00, 0b01, 0b11, 0b10];

    #[test]
    fn test_diagonal_is_idle() {
        for raw in 0..4 {
            let state = QuadState::new(raw);
            assert_eq!(Transition::between(state, state), Transition::Idle);
        }
    }

    #[test]
    fn test_forward_cycle_steps_forward() {
        for i in 0..4 {
            let prior = QuadState::new(FORWARD_CYCLE[i]);
            let new = QuadState::new(FORWARD_CYCLE[(i + 1) % 4]);
            assert_eq!(lookup(prior, new), 1);
            assert_eq!(lookup(new, prior), -1);
        }
    }

    #[test]
    fn test_both_bits_flipping_is_missed() {
        for raw in 0..4u8 {
            let prior = QuadState::new(raw);
            let new = QuadState::new(raw ^ 0b11);
            assert_eq!(lookup(prior, new), INVALID_TRANSITION);
            assert_eq!(Transition::between(prior, new), Transition::Missed);
            assert_eq!(Transition::Missed.delta(), 0);
        }
    }

    #[test]
    fn test_table_is_antisymmetric() {
        for prior in 0..4 {
            for new in 0..4 {
                let forward = TRANSITION_TABLE[prior][new];
                let back = TRANSITION_TABLE[new][prior];
                if forward == INVALID_TRANSITION {
                    assert_eq!(back, INVALID_TRANSITION);
                } else {
                    assert_eq!(forward, -back);
                }
            }
        }
    }

    #[test]
    fn test_quad_state_bits() {
        let state = QuadState::from_levels(true, false);
        assert_eq!(state.raw(), 0b10);
        assert!(state.level_a());
        assert!(!state.level_b());

        assert_eq!(state.with_b(true).raw(), 0b11);
        assert_eq!(state.with_a(false).raw(), 0b00);
        assert_eq!(QuadState::new(0xFF).raw(), 0b11);
    }
}
