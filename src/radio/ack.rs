//! Acknowledged sends.
//!
//! A frame sent with the ACK_REQUESTED bit is answered by the receiver with an empty
//! ACK_REPLY frame. The receive path records each reply in the [`AckTable`]; the
//! sender polls the table until its reply shows up or the wait window closes.
//!
//! [`AckTable`]: crate::ack::AckTable

use embedded_hal::delay::DelayNs;

use super::{Radio, RadioResult};
use crate::bus::RegisterInterface;
use crate::timer::{Clock, PollBudget};

impl<B, D, C> Radio<'_, B, D, C>
where
    B: RegisterInterface,
    D: DelayNs,
    C: Clock,
{
    /// Sends with an acknowledgement request, retrying up to `retries` times.
    ///
    /// Each attempt waits at most `wait_ms` for the reply. Returns `true` as soon as
    /// `to` acknowledges and `false` after the last attempt went unanswered.
    pub fn send_with_retry(
        &mut self,
        to: u8,
        payload: &[u8],
        retries: u8,
        wait_ms: u32,
    ) -> RadioResult<bool, B> {
        for attempt in 1..=retries {
            self.send(to, payload, true)?;
            if self.wait_for_ack(to, wait_ms)? {
                debug!("ack from {} on attempt {}", to, attempt);
                return Ok(true);
            }
            debug!("no ack from {} on attempt {}", to, attempt);
        }
        Ok(false)
    }

    /// [`Radio::send_with_retry`] with the configured attempts and wait.
    pub fn send_with_ack(&mut self, to: u8, payload: &[u8]) -> RadioResult<bool, B> {
        let (attempts, wait_ms) = (self.config.send_attempts, self.config.ack_wait_ms);
        self.send_with_retry(to, payload, attempts, wait_ms)
    }

    /// Consumes a recorded acknowledgement from `from`, if there is one.
    pub fn ack_received(&mut self, from: u8) -> bool {
        self.acks.take(from)
    }

    /// `true` if the last received frame asked for an acknowledgement.
    ///
    /// Broadcast frames never count, even when their ACK_REQUESTED bit is set.
    pub fn ack_requested(&self) -> bool {
        self.state.ack_requested
    }

    /// Replies to `to` with an ACK_REPLY frame carrying `payload`.
    ///
    /// Waits for the channel like [`Radio::send`]; once the CSMA window runs out the
    /// reply goes out regardless.
    pub fn send_ack(&mut self, to: u8, payload: &[u8]) -> RadioResult<(), B> {
        let _ = self.wait_for_channel()?;
        self.send_frame(to, payload, false, true)
    }

    fn wait_for_ack(&mut self, from: u8, wait_ms: u32) -> RadioResult<bool, B> {
        let mut budget = PollBudget::new(wait_ms, self.config.timing.ack_poll_us);
        loop {
            let _ = self.service()?;
            if self.acks.take(from) {
                return Ok(true);
            }
            if budget.exhausted() {
                return Ok(false);
            }
            budget.wait(&mut self.delay);
        }
    }
}
