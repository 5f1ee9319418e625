//! Driver errors.
//!
//! Only conditions that leave the chip in an unknown state, or that reject a caller's
//! argument, are errors. Everything else the link layer runs into is reported as a
//! plain return value and a log record:
//!
//! - an oversized payload is truncated at encode time
//! - a frame for another node is dropped by the receive path
//! - a send whose acknowledgement never arrives returns `false`
//! - a transmission that does not signal completion within its cap proceeds anyway

/// Errors returned by [`Radio`](crate::radio::Radio).
///
/// `E` is the error type of the underlying [`RegisterInterface`](crate::bus::RegisterInterface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error<E> {
    /// A register transfer failed. Register state is undefined afterwards.
    #[error("bus transfer failed: {0:?}")]
    Bus(E),

    /// The chip did not reach the expected register value during start-up.
    #[error("chip did not sync: register {register:#04x} never read back {expected:#04x}")]
    HardwareSync {
        /// Register being polled.
        register: u8,
        /// Value or flag that was expected.
        expected: u8,
    },

    /// Network ids must be in `1..=254`.
    #[error("network id {0} is outside 1..=254")]
    InvalidNetworkId(u8),

    /// Power is either a percentage (`0..=100`) or a raw level (`0..=31`).
    #[error("power level {0} is out of range")]
    InvalidPowerLevel(u8),
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Error::Bus(err)
    }
}
