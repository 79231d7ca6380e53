//! GPIO capability consumed by the decoder, and an `embedded-hal` adapter.

use embedded_hal::digital::InputPin;

/// Platform identifier of a GPIO line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(pub u8);

/// Error type for GPIO backend operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// The backend does not own or know this pin.
    UnknownPin(PinId),
    /// The pin exists but could not be claimed or configured.
    Unavailable(PinId),
    /// Low-level I/O error while talking to the pin.
    Io,
}

/// Platform GPIO access needed by the decoder.
///
/// The decoder only touches GPIO while initializing (and when sampling in
/// polled mode). Interrupt registration stays with the platform, which routes
/// edges to [`QuadratureDecoder::on_edge_a`](crate::QuadratureDecoder::on_edge_a)
/// and [`QuadratureDecoder::on_edge_b`](crate::QuadratureDecoder::on_edge_b).
pub trait GpioBackend {
    /// Prepare a pin for digital input with edge-triggered interrupts.
    fn configure(&mut self, pin: PinId) -> Result<(), GpioError>;

    /// Instantaneous digital level of a pin.
    fn read_level(&mut self, pin: PinId) -> bool;
}

/// [`GpioBackend`] over two already-constructed `embedded-hal` input pins.
///
/// The HAL configures direction and pulls when the pins are built, so
/// `configure` only checks that the requested pin is one of the two owned
/// here and that its level can be read.
pub struct HalGpioBackend<A, B> {
    id_a: PinId,
    pin_a: A,
    id_b: PinId,
    pin_b: B,
}

impl<A: InputPin, B: InputPin> HalGpioBackend<A, B> {
    /// Create a backend from the A and B channel pins.
    pub fn new(id_a: PinId, pin_a: A, id_b: PinId, pin_b: B) -> Self {
        Self {
            id_a,
            pin_a,
            id_b,
            pin_b,
        }
    }

    /// Identifiers of the A and B pins.
    #[must_use]
    pub fn pin_ids(&self) -> (PinId, PinId) {
        (self.id_a, self.id_b)
    }

    /// Decompose the backend into its two pins.
    pub fn into_parts(self) -> (A, B) {
        (self.pin_a, self.pin_b)
    }

    fn is_high(&mut self, pin: PinId) -> Result<bool, GpioError> {
        if pin == self.id_a {
            self.pin_a.is_high().map_err(|_| GpioError::Unavailable(pin))
        } else if pin == self.id_b {
            self.pin_b.is_high().map_err(|_| GpioError::Unavailable(pin))
        } else {
            Err(GpioError::UnknownPin(pin))
        }
    }
}

impl<A: InputPin, B: InputPin> GpioBackend for HalGpioBackend<A, B> {
    fn configure(&mut self, pin: PinId) -> Result<(), GpioError> {
        self.is_high(pin).map(|_| ())
    }

    fn read_level(&mut self, pin: PinId) -> bool {
        match self.is_high(pin) {
            Ok(level) => level,
            Err(e) => {
                warn!("Reading pin failed: {:?}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct FixedPin(bool);

    impl ErrorType for FixedPin {
        type Error = Infallible;
    }

    impl InputPin for FixedPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0)
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl InputPin for BrokenPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Err(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn test_reads_owned_pins() {
        let mut backend = HalGpioBackend::new(PinId(2), FixedPin(true), PinId(3), FixedPin(false));
        assert_eq!(backend.configure(PinId(2)), Ok(()));
        assert_eq!(backend.configure(PinId(3)), Ok(()));
        assert!(backend.read_level(PinId(2)));
        assert!(!backend.read_level(PinId(3)));
    }

    #[test]
    fn test_unknown_pin() {
        let mut backend = HalGpioBackend::new(PinId(2), FixedPin(true), PinId(3), FixedPin(true));
        assert_eq!(
            backend.configure(PinId(7)),
            Err(GpioError::UnknownPin(PinId(7)))
        );
        assert!(!backend.read_level(PinId(7)));
    }

    #[test]
    fn test_unreadable_pin_is_unavailable() {
        let mut backend = HalGpioBackend::new(PinId(2), FixedPin(true), PinId(3), BrokenPin);
        assert_eq!(
            backend.configure(PinId(3)),
            Err(GpioError::Unavailable(PinId(3)))
        );
        assert!(!backend.read_level(PinId(3)));
        // The readable pin keeps working next to one with another error type.
        assert_eq!(backend.configure(PinId(2)), Ok(()));
        assert!(backend.read_level(PinId(2)));
    }
}
