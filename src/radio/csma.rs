//! Carrier sense and transmission.
//!
//! Before a frame goes out the driver listens: the channel counts as free when the chip
//! is idle, or when it is receiving, has no frame in progress and the measured RSSI is
//! below [`CSMA_RSSI_THRESHOLD_DBM`]. A busy channel is retried until the CSMA window
//! elapses, after which the frame is sent anyway.

use embedded_hal::delay::DelayNs;

use super::{Mode, Radio, RadioResult};
use crate::bus::RegisterInterface;
use crate::consts::CSMA_RSSI_THRESHOLD_DBM;
use crate::frame;
use crate::registers::*;
use crate::timer::{Clock, PollBudget};

impl<B, D, C> Radio<'_, B, D, C>
where
    B: RegisterInterface,
    D: DelayNs,
    C: Clock,
{
    /// Checks whether the channel is free to transmit on.
    ///
    /// - in standby the radio starts listening and the channel counts as free
    /// - while receiving with nothing in flight a fresh RSSI sample decides; a quiet
    ///   channel moves the radio to standby, ready for the FIFO write
    /// - in any other state the channel is busy
    pub fn can_send(&mut self) -> RadioResult<bool, B> {
        match self.state.mode {
            Mode::Standby => {
                self.begin_receive()?;
                Ok(true)
            }
            Mode::Receive if self.state.payload_len == 0 => {
                if self.read_rssi(true)? < CSMA_RSSI_THRESHOLD_DBM {
                    self.set_mode(Mode::Standby)?;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            _ => Ok(false),
        }
    }

    /// Arms the receiver.
    ///
    /// A frame left over in the FIFO is discarded with an RX restart, then DIO0 is
    /// mapped to PayloadReady and the chip enters receive.
    pub fn begin_receive(&mut self) -> RadioResult<(), B> {
        if self
            .bus
            .flag_set(REG_IRQFLAGS2, IRQFLAGS2_PAYLOADREADY)?
        {
            self.restart_rx()?;
        }
        self.bus
            .write_register(REG_DIOMAPPING1, DIOMAPPING1_DIO0_01)?;
        self.set_mode(Mode::Receive)
    }

    pub(crate) fn restart_rx(&mut self) -> RadioResult<(), B> {
        self.bus.modify_register(
            REG_PACKETCONFIG2,
            !PACKETCONFIG2_RXRESTART,
            PACKETCONFIG2_RXRESTART,
        )?;
        Ok(())
    }

    /// Sends `payload` to `to` after carrier sense.
    ///
    /// Payloads longer than 61 bytes are truncated. Returns once the chip signalled
    /// "packet sent" (or the transmit cap elapsed) and the radio is receiving again.
    pub fn send(&mut self, to: u8, payload: &[u8], request_ack: bool) -> RadioResult<(), B> {
        // avoid a receive deadlock on a half-read frame
        self.restart_rx()?;
        let _ = self.wait_for_channel()?;
        self.send_frame(to, payload, request_ack, false)
    }

    /// Repeats [`Radio::can_send`] until it succeeds or the CSMA window elapses.
    ///
    /// Edges raised while waiting are serviced between attempts. Returns `false` if
    /// the window ran out.
    pub(crate) fn wait_for_channel(&mut self) -> RadioResult<bool, B> {
        let timing = self.config.timing;
        let mut budget = PollBudget::new(timing.csma_window_ms, timing.csma_poll_us);
        while !self.can_send()? {
            if budget.exhausted() {
                debug!(
                    "channel busy for {} ms, sending anyway",
                    timing.csma_window_ms
                );
                return Ok(false);
            }
            let _ = self.service()?;
            budget.wait(&mut self.delay);
        }
        Ok(true)
    }

    /// Loads and transmits one frame, then returns to receive.
    pub(crate) fn send_frame(
        &mut self,
        to: u8,
        payload: &[u8],
        request_ack: bool,
        ack_reply: bool,
    ) -> RadioResult<(), B> {
        self.set_mode(Mode::Standby)?;
        if !self.wait_mode_ready()? {
            warn!("mode-ready not seen before transmit");
        }
        self.bus
            .write_register(REG_DIOMAPPING1, DIOMAPPING1_DIO0_00)?;

        let encoded = frame::encode(to, self.state.address, payload, request_ack, ack_reply);
        self.bus.write_burst(REG_FIFO, &encoded)?;

        // an edge latched before this point belongs to an earlier frame
        let _ = self.irq.take();
        self.state.tx_pending = true;
        self.set_mode(Mode::Transmit)?;
        trace!("sent {} bytes to {}", encoded.len() as u32, to);
        self.wait_packet_sent()?;

        if self.state.mode != Mode::Receive {
            self.begin_receive()?;
        }
        Ok(())
    }

    /// Services edges until a PacketSent edge clears the pending transmission, or
    /// the transmit cap elapses.
    fn wait_packet_sent(&mut self) -> RadioResult<(), B> {
        let timing = self.config.timing;
        let mut budget = PollBudget::new(timing.tx_timeout_ms, timing.tx_poll_us);
        while self.state.tx_pending {
            if self.irq.take() {
                self.handle_interrupt()?;
                continue;
            }
            if budget.exhausted() {
                warn!("no packet-sent edge within {} ms", timing.tx_timeout_ms);
                self.state.tx_pending = false;
                break;
            }
            budget.wait(&mut self.delay);
        }
        Ok(())
    }
}
