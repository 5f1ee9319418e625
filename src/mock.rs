//! Simulated RFM69 for driver tests.
//!
//! Keeps a register file, an inbound FIFO fed from an inbox of whole frames, and a
//! log of everything written. Entering TX "radiates" the FIFO contents: the frame
//! is recorded, optionally delivered to a linked peer chip, and PacketSent is
//! flagged with a DIO0 edge unless `withhold_sent` is set.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;

use crate::bus::RegisterInterface;
use crate::registers::*;
use crate::timer::IrqLine;

/// Frames waiting to arrive over the air.
pub(crate) type Inbox = Arc<Mutex<VecDeque<Vec<u8>>>>;

/// Shared virtual time in nanoseconds.
pub(crate) type VirtualTime = Arc<AtomicU64>;

/// Delay that advances [`VirtualTime`] instead of sleeping.
#[derive(Debug, Clone, Default)]
pub(crate) struct VirtualDelay {
    pub now: VirtualTime,
}

impl DelayNs for VirtualDelay {
    fn delay_ns(&mut self, ns: u32) {
        let _ = self.now.fetch_add(ns as u64, Ordering::SeqCst);
    }
}

/// Another chip sharing the same channel.
#[derive(Debug, Clone)]
pub(crate) struct Link<'a> {
    pub inbox: Inbox,
    pub irq: &'a IrqLine,
}

#[derive(Debug)]
pub(crate) struct FakeChip<'a> {
    pub regs: [u8; 0x80],
    pub writes: Vec<(u8, u8)>,
    pub fifo: VecDeque<u8>,
    pub inbox: Inbox,
    pub sent: Vec<Vec<u8>>,
    pub sent_at: Vec<u64>,
    pub rssi_raw: u8,
    pub rssi_samples: usize,
    pub rx_timeout: bool,
    pub sync_stuck: bool,
    pub ack_as: Option<u8>,
    pub peer: Option<Link<'a>>,
    pub now: VirtualTime,
    /// Never report PacketSent.
    pub withhold_sent: bool,
    /// IRQFLAGS1 reads that still return no ModeReady.
    pub mode_ready_lag: usize,
    pub irqflags1_reads: usize,
    /// Mode bits written to OPMODE, with the virtual time of the write.
    pub mode_log: Vec<(u8, u64)>,
    irq: &'a IrqLine,
    tx_buf: Vec<u8>,
    packet_sent: bool,
}

impl<'a> FakeChip<'a> {
    pub fn new(irq: &'a IrqLine) -> Self {
        let mut regs = [0u8; 0x80];
        regs[REG_OPMODE as usize] = OPMODE_STANDBY;
        Self {
            regs,
            writes: Vec::new(),
            fifo: VecDeque::new(),
            inbox: Arc::new(Mutex::new(VecDeque::new())),
            sent: Vec::new(),
            sent_at: Vec::new(),
            // -100 dBm, a quiet channel
            rssi_raw: 200,
            rssi_samples: 0,
            rx_timeout: false,
            sync_stuck: false,
            ack_as: None,
            peer: None,
            now: VirtualTime::default(),
            withhold_sent: false,
            mode_ready_lag: 0,
            irqflags1_reads: 0,
            mode_log: Vec::new(),
            irq,
            tx_buf: Vec::new(),
            packet_sent: false,
        }
    }

    pub fn opmode(&self) -> u8 {
        self.regs[REG_OPMODE as usize] & OPMODE_MODE_MASK
    }

    /// Queues a frame as if it had just arrived, and raises DIO0 when listening.
    pub fn arrive(&mut self, frame: &[u8]) {
        self.inbox.lock().unwrap().push_back(frame.to_vec());
        if self.opmode() == OPMODE_RECEIVER {
            self.irq.raise();
        }
    }

    pub fn writes_to(&self, addr: u8) -> usize {
        self.writes.iter().filter(|(a, _)| *a == addr).count()
    }

    fn load_fifo(&mut self) {
        if self.opmode() == OPMODE_RECEIVER && self.fifo.is_empty() {
            if let Some(frame) = self.inbox.lock().unwrap().pop_front() {
                self.fifo.extend(frame);
            }
        }
    }

    fn enter_mode(&mut self, mode: u8) {
        match mode {
            OPMODE_TRANSMITTER => self.radiate(),
            OPMODE_RECEIVER => {
                if !self.inbox.lock().unwrap().is_empty() {
                    self.irq.raise();
                }
            }
            _ => {}
        }
    }

    fn radiate(&mut self) {
        let frame = core::mem::take(&mut self.tx_buf);
        if frame.len() >= 4 {
            let (target, sender, control) = (frame[1], frame[2], frame[3]);
            if let Some(peer) = self.ack_as {
                if control & 0x40 != 0 && (target == peer || target == 0xFF) {
                    self.inbox
                        .lock()
                        .unwrap()
                        .push_back(vec![3, sender, peer, 0x80]);
                }
            }
            if let Some(link) = &self.peer {
                link.inbox.lock().unwrap().push_back(frame.clone());
                link.irq.raise();
            }
        }
        self.sent_at.push(self.now.load(Ordering::SeqCst));
        self.sent.push(frame);
        if !self.withhold_sent {
            self.packet_sent = true;
            self.irq.raise();
        }
    }
}

impl RegisterInterface for FakeChip<'_> {
    type Error = core::convert::Infallible;

    fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error> {
        Ok(match addr {
            REG_IRQFLAGS1 => {
                self.irqflags1_reads += 1;
                let ready = if self.mode_ready_lag > 0 {
                    self.mode_ready_lag -= 1;
                    0
                } else {
                    IRQFLAGS1_MODEREADY
                };
                ready | if self.rx_timeout { IRQFLAGS1_TIMEOUT } else { 0 }
            }
            REG_IRQFLAGS2 => {
                self.load_fifo();
                let sent = if self.packet_sent && self.opmode() == OPMODE_TRANSMITTER {
                    IRQFLAGS2_PACKETSENT
                } else {
                    0
                };
                let ready = if self.fifo.is_empty() {
                    0
                } else {
                    IRQFLAGS2_PAYLOADREADY
                };
                sent | ready
            }
            REG_RSSICONFIG => RSSI_DONE,
            REG_RSSIVALUE => self.rssi_raw,
            REG_SYNCVALUE1 if self.sync_stuck => 0x00,
            _ => self.regs[(addr & READ_MASK) as usize],
        })
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
        self.writes.push((addr, value));
        match addr {
            REG_OPMODE => {
                let previous = self.opmode();
                self.regs[addr as usize] = value;
                let mode = value & OPMODE_MODE_MASK;
                self.mode_log.push((mode, self.now.load(Ordering::SeqCst)));
                if mode != previous {
                    // PacketSent clears when TX is left
                    self.packet_sent = false;
                    self.enter_mode(mode);
                }
            }
            REG_PACKETCONFIG2 if value & PACKETCONFIG2_RXRESTART != 0 => {
                self.fifo.clear();
                self.regs[addr as usize] = value & !PACKETCONFIG2_RXRESTART;
            }
            REG_RSSICONFIG if value & RSSI_START != 0 => self.rssi_samples += 1,
            _ => self.regs[(addr & READ_MASK) as usize] = value,
        }
        Ok(())
    }

    fn write_burst(&mut self, addr: u8, data: &[u8]) -> Result<(), Self::Error> {
        if addr == REG_FIFO {
            self.tx_buf = data.to_vec();
        } else {
            let start = addr as usize;
            self.regs[start..start + data.len()].copy_from_slice(data);
        }
        Ok(())
    }

    fn read_burst(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        assert_eq!(addr, REG_FIFO);
        for byte in buf.iter_mut() {
            *byte = self.fifo.pop_front().unwrap_or(0);
        }
        Ok(())
    }
}
