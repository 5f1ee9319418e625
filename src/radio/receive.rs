//! The interrupt-driven receive path.
//!
//! DIO0 fires twice in a frame's life: "packet sent" while transmitting and
//! "payload ready" while receiving. The edge handler only raises the [`IrqLine`];
//! [`Radio::service`] and the waiting loops of the send path take the edge and run
//! [`Radio::handle_interrupt`] in the caller's context.
//!
//! [`IrqLine`]: crate::timer::IrqLine

use embedded_hal::delay::DelayNs;

use super::{Mode, Radio, RadioResult};
use crate::bus::RegisterInterface;
use crate::consts::{BROADCAST_ADDRESS, FIFO_HEADER_LEN, MAX_FRAME_LEN, MAX_RX_PAYLOAD_LEN};
use crate::frame::{Frame, Header};
use crate::packet::Packet;
use crate::registers::*;
use crate::timer::Clock;

impl<B, D, C> Radio<'_, B, D, C>
where
    B: RegisterInterface,
    D: DelayNs,
    C: Clock,
{
    /// Takes a pending DIO0 edge and handles it.
    ///
    /// Without an edge, a receiver stuck past its RX timeout is restarted. Returns
    /// `true` if an edge was handled.
    pub fn service(&mut self) -> RadioResult<bool, B> {
        if self.irq.take() {
            self.handle_interrupt()?;
            return Ok(true);
        }
        if self.state.mode == Mode::Receive
            && self.bus.flag_set(REG_IRQFLAGS1, IRQFLAGS1_TIMEOUT)?
        {
            debug!("rx timeout, restarting receiver");
            self.restart_rx()?;
        }
        Ok(false)
    }

    /// Handles one DIO0 edge.
    ///
    /// 1. While transmitting, only a set PacketSent flag counts: it ends the pending
    ///    transmission and the receiver is re-armed. Any other edge is ignored
    /// 2. In receive with PayloadReady set, reads the frame out of the FIFO
    /// 3. Frames for other nodes are dropped unless promiscuous
    /// 4. Acknowledgement replies are recorded, data frames are queued
    /// 5. Frames that request it are acknowledged when auto-acknowledge is on
    /// 6. The receiver is re-armed
    ///
    /// `rx_locked` is held only around the FIFO read and released before the
    /// acknowledgement goes out. `&mut self` already keeps foreground calls out of
    /// that window, so the flag only guards against the handler being re-entered from
    /// inside it; an edge taken then is put back on the line.
    pub fn handle_interrupt(&mut self) -> RadioResult<(), B> {
        if self.state.rx_locked {
            self.irq.raise();
            return Ok(());
        }

        if self.state.mode == Mode::Transmit {
            if self.bus.flag_set(REG_IRQFLAGS2, IRQFLAGS2_PACKETSENT)? {
                self.state.tx_pending = false;
                return self.begin_receive();
            }
            trace!("edge during transmit without packet-sent");
            return Ok(());
        }

        self.state.rx_locked = true;
        let read = self.read_frame();
        self.state.rx_locked = false;
        self.state.payload_len = 0;

        if let Some(sender) = read? {
            self.send_ack(sender, &[])?;
        }
        if self.state.mode != Mode::Receive {
            self.begin_receive()?;
        }
        Ok(())
    }

    /// Reads a ready frame. Returns the sender when an acknowledgement is owed.
    fn read_frame(&mut self) -> RadioResult<Option<u8>, B> {
        if self.state.mode != Mode::Receive
            || !self
                .bus
                .flag_set(REG_IRQFLAGS2, IRQFLAGS2_PAYLOADREADY)?
        {
            return Ok(None);
        }

        self.set_mode(Mode::Standby)?;
        let mut raw = [0u8; FIFO_HEADER_LEN];
        self.bus.read_burst(REG_FIFO, &mut raw)?;
        if raw[0] > MAX_FRAME_LEN {
            warn!("length byte {} clamped to {}", raw[0], MAX_FRAME_LEN);
        }
        let header = Header::parse(raw);
        self.state.payload_len = header.length;

        if !self.accepts(header.target) {
            trace!("dropping frame for {}", header.target);
            return Ok(None);
        }

        let mut buf = [0u8; MAX_RX_PAYLOAD_LEN];
        let data = &mut buf[..header.payload_len()];
        if !data.is_empty() {
            self.bus.read_burst(REG_FIFO, data)?;
        }
        let rssi = self.read_rssi(false)?;
        let frame = Frame::from_header(header, data);

        self.state.ack_requested = header.requests_ack() && header.target != BROADCAST_ADDRESS;
        if header.is_ack_reply() {
            debug!("ack from {}", header.sender);
            self.acks.record(header.sender);
        } else {
            debug!(
                "{} bytes from {} at {} dBm",
                frame.payload.len() as u32,
                header.sender,
                rssi
            );
            let received_at = self.clock.now_ms();
            self.packets
                .enqueue(Packet::from_frame(frame, rssi, received_at));
        }

        if header.requests_ack() && self.state.auto_acknowledge {
            Ok(Some(header.sender))
        } else {
            Ok(None)
        }
    }

    fn accepts(&self, target: u8) -> bool {
        self.state.promiscuous || target == self.state.address || target == BROADCAST_ADDRESS
    }
}
