//! The RFM69 link-layer controller.
//!
//! [`Radio`] owns the register bus, a delay provider, a clock for packet timestamps and
//! a reference to the [`IrqLine`] raised by the DIO0 edge. Everything the driver does
//! happens in the caller's context:
//!
//! - mode changes and their settling waits ([`Radio::set_mode`])
//! - carrier sense and transmission ([`Radio::send`])
//! - acknowledged sends ([`Radio::send_with_retry`])
//! - the receive pipeline ([`Radio::service`]), which consumes DIO0 edges
//!
//! The interrupt handler itself only raises the line. Edges are consumed by
//! [`Radio::service`] and by the waiting loops inside the send paths, so a frame that
//! arrives while a send is in progress is still picked up.
//!
//! ## Start-up
//!
//! [`Radio::init`] performs the sync-register handshake, applies the register list it
//! is given (see [`register_defaults`](crate::config::register_defaults)), then the
//! encryption, PA and power settings from [`RadioConfig`].

use crate::ack::AckTable;
use crate::bus::{await_flag, RegisterInterface};
use crate::config::RadioConfig;
use crate::consts::{AES_KEY_LEN, MAX_POWER_LEVEL, REGISTER_DUMP_FIRST, REGISTER_DUMP_LEN};
use crate::error::Error;
use crate::packet::{PacketList, PacketQueue};
use crate::registers::*;
use crate::timer::{poll_until, Clock, IrqLine, PollBudget};

use embedded_hal::delay::DelayNs;

mod ack;
mod csma;
mod mode;
mod receive;

pub use mode::Mode;

/// Result type of [`Radio`] operations over bus `B`.
pub type RadioResult<T, B> = Result<T, Error<<B as RegisterInterface>::Error>>;

/// Driver state that is not stored on the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct RadioState {
    /// Last mode written to the chip.
    pub mode: Mode,
    /// The interrupt handler is reading a frame out of the FIFO.
    pub rx_locked: bool,
    /// A transmission is waiting for its "packet sent" edge.
    pub tx_pending: bool,
    /// Accept frames addressed to other nodes.
    pub promiscuous: bool,
    /// Answer frames that request an acknowledgement.
    pub auto_acknowledge: bool,
    /// This node's address.
    pub address: u8,
    /// Current network id.
    pub network_id: u8,
    /// Raw PA output level, `0..=31`.
    pub power_level: u8,
    /// PA1+PA2 are driving the antenna.
    pub high_power: bool,
    /// Length byte of the frame being read, zero outside the receive path.
    pub payload_len: u8,
    /// The last received frame asked for an acknowledgement and was not a broadcast.
    pub ack_requested: bool,
}

impl RadioState {
    fn from_config(config: &RadioConfig) -> Self {
        Self {
            // the chip comes out of reset in standby
            mode: Mode::Standby,
            rx_locked: false,
            tx_pending: false,
            promiscuous: config.promiscuous,
            auto_acknowledge: config.auto_acknowledge,
            address: config.address,
            network_id: config.network_id,
            power_level: MAX_POWER_LEVEL,
            high_power: false,
            payload_len: 0,
            ack_requested: false,
        }
    }
}

/// An RFM69 link-layer driver.
///
/// # Type parameters
/// - `B`: register bus, usually [`SpiInterface`](crate::bus::SpiInterface)
/// - `D`: delay provider for every bounded wait
/// - `C`: clock stamping received packets
#[derive(Debug)]
pub struct Radio<'a, B, D, C> {
    bus: B,
    delay: D,
    clock: C,
    irq: &'a IrqLine,
    config: RadioConfig,
    state: RadioState,
    acks: AckTable,
    packets: PacketQueue,
}

impl<'a, B, D, C> Radio<'a, B, D, C>
where
    B: RegisterInterface,
    D: DelayNs,
    C: Clock,
{
    /// Creates a driver. Nothing is written to the chip until [`Radio::init`].
    pub fn new(bus: B, delay: D, clock: C, irq: &'a IrqLine, config: RadioConfig) -> Self {
        Self {
            bus,
            delay,
            clock,
            irq,
            state: RadioState::from_config(&config),
            config,
            acks: AckTable::new(),
            packets: PacketQueue::new(),
        }
    }

    /// Brings the chip up.
    ///
    /// 1. Writes and reads back `0xAA` then `0x55` in `SYNCVALUE1` until the chip echoes them
    /// 2. Applies `registers` in order
    /// 3. Applies the configured encryption key, PA variant and power level
    /// 4. Waits for the mode-ready flag
    ///
    /// # Errors
    /// [`Error::HardwareSync`] if the handshake or the final mode-ready wait times out.
    pub fn init(&mut self, registers: &[(u8, u8)]) -> RadioResult<(), B> {
        self.sync_handshake()?;

        for &(addr, value) in registers {
            self.bus.write_register(addr, value)?;
            if addr == REG_SYNCVALUE2 {
                self.state.network_id = value;
            }
        }

        let key = self.config.encryption_key;
        self.set_encryption_key(key.as_ref())?;
        self.set_high_power(self.config.high_power)?;
        self.set_power_level(self.config.power_percent)?;

        if !self.wait_mode_ready()? {
            return Err(Error::HardwareSync {
                register: REG_IRQFLAGS1,
                expected: IRQFLAGS1_MODEREADY,
            });
        }
        info!(
            "radio up: address {}, network {}",
            self.state.address, self.state.network_id
        );
        Ok(())
    }

    fn sync_handshake(&mut self) -> RadioResult<(), B> {
        let timing = self.config.timing;
        for pattern in SYNC_PATTERNS {
            let bus = &mut self.bus;
            let synced = poll_until(
                &mut self.delay,
                PollBudget::new(timing.sync_timeout_ms, timing.register_poll_us),
                || match bus.read_register(REG_SYNCVALUE1) {
                    Ok(value) if value == pattern => Ok(()),
                    Ok(_) => match bus.write_register(REG_SYNCVALUE1, pattern) {
                        Ok(()) => Err(nb::Error::WouldBlock),
                        Err(e) => Err(nb::Error::Other(e)),
                    },
                    Err(e) => Err(nb::Error::Other(e)),
                },
            )?;
            if synced.is_none() {
                warn!("no sync echo for pattern {}", pattern);
                return Err(Error::HardwareSync {
                    register: REG_SYNCVALUE1,
                    expected: pattern,
                });
            }
        }
        Ok(())
    }

    /// Sets the network id, the second byte of the sync word.
    ///
    /// # Errors
    /// [`Error::InvalidNetworkId`] for `0` and `255`.
    pub fn set_network(&mut self, network_id: u8) -> RadioResult<(), B> {
        if !(1..=254).contains(&network_id) {
            return Err(Error::InvalidNetworkId(network_id));
        }
        self.bus.write_register(REG_SYNCVALUE2, network_id)?;
        self.state.network_id = network_id;
        Ok(())
    }

    /// Sets this node's address.
    pub fn set_address(&mut self, address: u8) -> RadioResult<(), B> {
        self.bus.write_register(REG_NODEADRS, address)?;
        self.state.address = address;
        Ok(())
    }

    /// Sets the transmit power as a percentage of the PA range.
    ///
    /// # Errors
    /// [`Error::InvalidPowerLevel`] above 100.
    pub fn set_power_level(&mut self, percent: u8) -> RadioResult<(), B> {
        if percent > 100 {
            return Err(Error::InvalidPowerLevel(percent));
        }
        let raw = libm::roundf(MAX_POWER_LEVEL as f32 * percent as f32 / 100.0) as u8;
        self.set_power_level_raw(raw)
    }

    /// Sets the raw PA output level.
    ///
    /// # Errors
    /// [`Error::InvalidPowerLevel`] above 31.
    pub fn set_power_level_raw(&mut self, level: u8) -> RadioResult<(), B> {
        if level > MAX_POWER_LEVEL {
            return Err(Error::InvalidPowerLevel(level));
        }
        self.bus
            .modify_register(REG_PALEVEL, !PALEVEL_OUTPUT_POWER_MASK, level)?;
        self.state.power_level = level;
        Ok(())
    }

    /// Selects PA1+PA2 (high-power variants) or PA0.
    ///
    /// Over-current protection is disabled while the high-power PA is in use.
    pub fn set_high_power(&mut self, on: bool) -> RadioResult<(), B> {
        if on {
            self.bus.write_register(REG_OCP, OCP_OFF)?;
            self.bus.modify_register(
                REG_PALEVEL,
                PALEVEL_OUTPUT_POWER_MASK,
                PALEVEL_PA1_ON | PALEVEL_PA2_ON,
            )?;
        } else {
            self.bus.write_register(REG_OCP, OCP_ON)?;
            self.bus
                .write_register(REG_PALEVEL, PALEVEL_PA0_ON | self.state.power_level)?;
        }
        self.state.high_power = on;
        Ok(())
    }

    /// Retunes the carrier to the given `FRF` word.
    pub fn set_frequency(&mut self, frf: u32) -> RadioResult<(), B> {
        self.bus.write_register(REG_FRFMSB, (frf >> 16) as u8)?;
        self.bus.write_register(REG_FRFMID, (frf >> 8) as u8)?;
        self.bus.write_register(REG_FRFLSB, frf as u8)?;
        Ok(())
    }

    /// Enables or disables hardware AES. Switches to standby first.
    pub fn set_encryption_key(&mut self, key: Option<&[u8; AES_KEY_LEN]>) -> RadioResult<(), B> {
        self.set_mode(Mode::Standby)?;
        let aes = match key {
            Some(key) => {
                self.bus.write_burst(REG_AESKEY1, key)?;
                PACKETCONFIG2_AES_ON
            }
            None => 0,
        };
        self.bus
            .modify_register(REG_PACKETCONFIG2, !PACKETCONFIG2_AES_ON, aes)?;
        Ok(())
    }

    /// Accept (or stop accepting) frames addressed to other nodes.
    pub fn set_promiscuous(&mut self, on: bool) {
        self.state.promiscuous = on;
    }

    /// Answer (or stop answering) acknowledgement requests automatically.
    pub fn set_auto_acknowledge(&mut self, on: bool) {
        self.state.auto_acknowledge = on;
    }

    /// Puts the chip to sleep. The next mode change waits for the oscillator.
    pub fn sleep(&mut self) -> RadioResult<(), B> {
        self.set_mode(Mode::Sleep)
    }

    /// Last mode written to the chip.
    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Driver-side state.
    pub fn state(&self) -> &RadioState {
        &self.state
    }

    /// Configuration the driver was created with.
    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// `true` when received packets are waiting.
    pub fn has_packets(&self) -> bool {
        !self.packets.is_empty()
    }

    /// Services pending edges, then hands over every queued packet.
    pub fn drain_packets(&mut self) -> RadioResult<PacketList, B> {
        let _ = self.service()?;
        Ok(self.packets.drain_all())
    }

    /// The received-packet queue.
    pub fn packets(&self) -> &PacketQueue {
        &self.packets
    }

    /// Reads the received signal strength in dBm.
    ///
    /// With `force` a new measurement is started and awaited first; otherwise the
    /// value latched during the last reception is returned.
    pub fn read_rssi(&mut self, force: bool) -> RadioResult<i16, B> {
        if force {
            self.bus.write_register(REG_RSSICONFIG, RSSI_START)?;
            let timing = self.config.timing;
            let bus = &mut self.bus;
            let done = poll_until(
                &mut self.delay,
                PollBudget::new(timing.rssi_timeout_ms, timing.register_poll_us),
                || await_flag(bus, REG_RSSICONFIG, RSSI_DONE),
            )?;
            if done.is_none() {
                warn!("RSSI measurement did not complete");
            }
        }
        let raw = self.bus.read_register(REG_RSSIVALUE)?;
        Ok(-(raw as i16) >> 1)
    }

    /// Reads every configuration register, `0x01..=0x4F`, as `(address, value)` pairs.
    ///
    /// Meant for debugging a misbehaving module. The FIFO at `0x00` is skipped since
    /// reading it would consume a received frame.
    pub fn read_registers(&mut self) -> RadioResult<[(u8, u8); REGISTER_DUMP_LEN], B> {
        let mut dump = [(0u8, 0u8); REGISTER_DUMP_LEN];
        for (addr, entry) in (REGISTER_DUMP_FIRST..).zip(dump.iter_mut()) {
            *entry = (addr, self.bus.read_register(addr)?);
        }
        Ok(dump)
    }

    /// Switches to the low-power PA, puts the chip to sleep and returns the bus.
    pub fn shutdown(mut self) -> RadioResult<B, B> {
        self.set_high_power(false)?;
        self.set_mode(Mode::Sleep)?;
        info!("radio shut down");
        Ok(self.bus)
    }
}
