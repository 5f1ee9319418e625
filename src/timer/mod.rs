//! Timing utilities for the driver.
//!
//! The chip is driven by bounded polling loops only. This module holds the pieces
//! those loops are built from:
//! - [`PollBudget`]: how long a loop may keep sleeping before it gives up
//! - [`poll_until`]: drives an `nb`-style check against a budget
//! - [`Clock`]: wall-clock source for packet arrival timestamps
//! - [`IrqLine`]: the interrupt-safe flag the DIO0 edge handler raises
//!
//! Elapsed time in a loop is the sum of the sleeps it issued, so the caps hold on
//! targets without a free-running timer.

use embedded_hal::delay::DelayNs;

mod isr;
pub use isr::*;

/// Source of packet arrival timestamps, in milliseconds.
pub trait Clock {
    /// Current time in milliseconds. The epoch is up to the implementation.
    fn now_ms(&self) -> u64;
}

impl<F> Clock for F
where
    F: Fn() -> u64,
{
    fn now_ms(&self) -> u64 {
        self()
    }
}

/// Milliseconds since the Unix epoch, from the host's system clock.
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Sleep allowance of a single polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct PollBudget {
    limit_us: u32,
    step_us: u32,
    spent_us: u32,
}

impl PollBudget {
    /// A budget of `limit_ms`, spent in sleeps of `step_us`.
    pub const fn new(limit_ms: u32, step_us: u32) -> Self {
        Self {
            limit_us: limit_ms.saturating_mul(1_000),
            step_us,
            spent_us: 0,
        }
    }

    /// `true` once the slept time reached the limit.
    pub fn exhausted(&self) -> bool {
        self.spent_us >= self.limit_us
    }

    /// Microseconds slept so far.
    pub fn spent_us(&self) -> u32 {
        self.spent_us
    }

    /// Sleeps one step and charges it to the budget.
    pub fn wait<D: DelayNs>(&mut self, delay: &mut D) {
        delay.delay_us(self.step_us);
        // a zero step still has to make progress
        self.spent_us = self.spent_us.saturating_add(self.step_us.max(1));
    }
}

/// Repeats `check` until it completes, fails, or the budget runs out.
///
/// # Returns
/// - `Ok(Some(value))`: `check` completed
/// - `Ok(None)`: the budget ran out while `check` kept returning `WouldBlock`
/// - `Err(e)`: `check` failed
pub fn poll_until<D, T, E, F>(delay: &mut D, mut budget: PollBudget, mut check: F) -> Result<Option<T>, E>
where
    D: DelayNs,
    F: FnMut() -> nb::Result<T, E>,
{
    loop {
        match check() {
            Ok(value) => return Ok(Some(value)),
            Err(nb::Error::Other(e)) => return Err(e),
            Err(nb::Error::WouldBlock) if budget.exhausted() => return Ok(None),
            Err(nb::Error::WouldBlock) => budget.wait(delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;

    #[test]
    fn test_budget_exhausts_after_limit() {
        let mut delay = NoopDelay::new();
        let mut budget = PollBudget::new(1, 250);
        for _ in 0..4 {
            assert!(!budget.exhausted());
            budget.wait(&mut delay);
        }
        assert!(budget.exhausted());
        assert_eq!(budget.spent_us(), 1_000);
    }

    #[test]
    fn test_poll_until_returns_value() {
        let mut delay = NoopDelay::new();
        let mut calls = 0;
        let result: Result<Option<u8>, ()> = poll_until(&mut delay, PollBudget::new(10, 1_000), || {
            calls += 1;
            if calls < 3 {
                Err(nb::Error::WouldBlock)
            } else {
                Ok(7)
            }
        });
        assert_eq!(result, Ok(Some(7)));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_poll_until_times_out() {
        let mut delay = NoopDelay::new();
        let mut calls = 0;
        let result: Result<Option<()>, ()> = poll_until(&mut delay, PollBudget::new(5, 1_000), || {
            calls += 1;
            Err(nb::Error::WouldBlock)
        });
        assert_eq!(result, Ok(None));
        // one initial check plus one per millisecond slept
        assert_eq!(calls, 6);
    }

    #[test]
    fn test_poll_until_propagates_error() {
        let mut delay = NoopDelay::new();
        let result: Result<Option<()>, &str> =
            poll_until(&mut delay, PollBudget::new(5, 1_000), || Err(nb::Error::Other("bus")));
        assert_eq!(result, Err("bus"));
    }

    #[test]
    fn test_closure_is_a_clock() {
        let clock = || 1_234u64;
        assert_eq!(clock.now_ms(), 1_234);
    }
}
