//! Received application packets and the queue that holds them.
//!
//! A [`Packet`] is created by the receive path once a data frame addressed to this
//! node (or broadcast, or anything in promiscuous mode) has been read out of the
//! FIFO. Packets are queued in arrival order until the application drains them.
//!
//! With `std` the queue grows without bound; the application is expected to drain it
//! regularly. Without an allocator it holds [`PACKET_QUEUE_LEN`] packets and later
//! arrivals are dropped and counted until it is drained.

#[cfg(not(feature = "std"))]
use crate::consts::PACKET_QUEUE_LEN;
use crate::frame::{Frame, Payload};

#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

/// The packets returned by [`PacketQueue::drain_all`].
#[cfg(not(feature = "std"))]
pub type PacketList = Vec<Packet, PACKET_QUEUE_LEN>;

/// The packets returned by [`PacketQueue::drain_all`].
#[cfg(feature = "std")]
pub type PacketList = Vec<Packet>;

/// A received data packet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Packet {
    receiver: u8,
    sender: u8,
    rssi: i16,
    payload: Payload,
    received_at: u64,
}

impl Packet {
    pub(crate) fn from_frame(frame: Frame, rssi: i16, received_at: u64) -> Self {
        Self {
            receiver: frame.target,
            sender: frame.sender,
            rssi,
            payload: frame.payload,
            received_at,
        }
    }

    /// Address the frame was sent to.
    pub fn receiver(&self) -> u8 {
        self.receiver
    }

    /// Address of the sending node.
    pub fn sender(&self) -> u8 {
        self.sender
    }

    /// Signal strength at reception, in dBm.
    pub fn rssi(&self) -> i16 {
        self.rssi
    }

    /// Payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload as UTF-8 text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.payload).ok()
    }

    /// Arrival time from the radio's [`Clock`](crate::timer::Clock), in milliseconds.
    pub fn received_at(&self) -> u64 {
        self.received_at
    }
}

/// Received packets in arrival order.
#[derive(Debug, Default)]
pub struct PacketQueue {
    packets: PacketList,
    dropped: u32,
}

impl PacketQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a packet. Only the receive path calls this.
    #[cfg(feature = "std")]
    pub(crate) fn enqueue(&mut self, packet: Packet) {
        self.packets.push(packet);
    }

    /// Appends a packet. Only the receive path calls this.
    #[cfg(not(feature = "std"))]
    pub(crate) fn enqueue(&mut self, packet: Packet) {
        if self.packets.push(packet).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            warn!("packet queue full, dropped {} so far", self.dropped);
        }
    }

    /// Returns everything queued so far and leaves the queue empty.
    pub fn drain_all(&mut self) -> PacketList {
        core::mem::take(&mut self.packets)
    }

    /// Number of queued packets.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Packets lost to a full queue. Always zero with `std`.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
