//! Async edge routing from an `embedded-hal-async` pin to the decoder.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use crate::decoder::{Channel, QuadratureDecoder};
use crate::gpio::GpioError;

/// Forward every edge on `pin` to the decoder as `channel`.
///
/// Waits for an edge, reads the line's new level and hands it to
/// [`QuadratureDecoder::on_edge`]. Runs one watcher per channel; they may run
/// on different executors or interrupt priorities since the decoder
/// serializes them.
///
/// The level is read after the wait completes, not latched at the edge. If
/// the line toggles twice before the watcher runs again, both edges collapse
/// into a repeated level and neither is counted. Use `sample` from a fast
/// ticker (the firmware's `polled` mode) or a hardware counter when edges can
/// arrive faster than the watcher is scheduled.
///
/// Never returns under normal operation. Returns [`GpioError::Io`] if the pin
/// reports an error.
pub async fn watch_edges<P, M>(
    pin: &mut P,
    channel: Channel,
    decoder: &QuadratureDecoder<M>,
) -> Result<Infallible, GpioError>
where
    P: Wait + InputPin,
    M: RawMutex,
{
    loop {
        pin.wait_for_any_edge().await.map_err(|_| GpioError::Io)?;
        let level = pin.is_high().map_err(|_| GpioError::Io)?;
        decoder.on_edge(channel, level);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::future::Future;
    use core::pin::Pin;
    use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use std::collections::VecDeque;

    /// Pin that replays a fixed list of levels, one per edge, then errors.
    struct ScriptedPin {
        edges: VecDeque<bool>,
        level: bool,
    }

    impl ScriptedPin {
        fn new(edges: &[bool]) -> Self {
            Self {
                edges: edges.iter().copied().collect(),
                level: false,
            }
        }
    }

    impl ErrorType for ScriptedPin {
        type Error = ErrorKind;
    }

    impl InputPin for ScriptedPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.level)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.level)
        }
    }

    impl Wait for ScriptedPin {
        async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
            self.wait_for_any_edge().await
        }

        async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
            self.wait_for_any_edge().await
        }

        async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
            self.wait_for_any_edge().await
        }

        async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
            self.wait_for_any_edge().await
        }

        async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
            match self.edges.pop_front() {
                Some(level) => {
                    self.level = level;
                    Ok(())
                }
                None => Err(ErrorKind::Other),
            }
        }
    }

    // Helper to run a future to completion (simple blocking executor)
    fn block_on<F: Future>(mut f: F) -> F::Output {
        fn noop_raw_waker() -> RawWaker {
            fn noop(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                noop_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
            RawWaker::new(core::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
        let mut cx = Context::from_waker(&waker);

        // SAFETY: We don't move f after pinning
        let mut f = unsafe { Pin::new_unchecked(&mut f) };

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {
                    panic!("Scripted pin returned Pending unexpectedly");
                }
            }
        }
    }

    #[test]
    fn test_edges_reach_decoder() {
        let decoder = QuadratureDecoder::<NoopRawMutex>::new();
        let mut pin_b = ScriptedPin::new(&[true, false, true]);

        let result = block_on(watch_edges(&mut pin_b, Channel::B, &decoder));
        assert_eq!(result, Err(GpioError::Io));
        // 00 -> 01 -> 00 -> 01
        assert_eq!(decoder.position_counts(), 1);
        assert_eq!(decoder.pulses_missed(), 0);
    }

    #[test]
    fn test_double_toggle_before_read_is_not_counted() {
        let decoder = QuadratureDecoder::<NoopRawMutex>::new();
        // Rise, then fall and rise again before the level is read: the second
        // wake-up sees the same level as the first.
        let mut pin_b = ScriptedPin::new(&[true, true]);

        let _ = block_on(watch_edges(&mut pin_b, Channel::B, &decoder));
        assert_eq!(decoder.position_counts(), 1);
        assert_eq!(decoder.pulses_missed(), 0);
    }

    #[test]
    fn test_two_channels_track_rotation() {
        let decoder = QuadratureDecoder::<NoopRawMutex>::new();
        let mut pin_a = ScriptedPin::new(&[true]);
        let mut pin_b = ScriptedPin::new(&[true]);

        // B rises first then A: 00 -> 01 -> 11
        let _ = block_on(watch_edges(&mut pin_b, Channel::B, &decoder));
        let _ = block_on(watch_edges(&mut pin_a, Channel::A, &decoder));
        assert_eq!(decoder.position_counts(), 2);
    }
}
