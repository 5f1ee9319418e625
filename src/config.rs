//! Radio configuration.
//!
//! [`RadioConfig`] lists every option the driver understands together with its
//! default. [`register_defaults`] produces the ordered `(address, value)` list that
//! [`Radio::init`](crate::radio::Radio::init) applies verbatim at start-up.

use crate::consts::*;
use crate::registers::*;

/// Timeouts and poll intervals of the driver's waiting loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Timing {
    /// Carrier-sense window; after it elapses the frame is sent regardless.
    pub csma_window_ms: u32,
    /// Sleep between carrier-sense attempts.
    pub csma_poll_us: u32,
    /// Sleep between acknowledgement checks.
    pub ack_poll_us: u32,
    /// Cap on waiting for the "packet sent" edge.
    pub tx_timeout_ms: u32,
    /// Sleep between "packet sent" checks.
    pub tx_poll_us: u32,
    /// Cap on waiting for the mode-ready flag.
    pub mode_ready_timeout_ms: u32,
    /// Cap on a forced RSSI measurement.
    pub rssi_timeout_ms: u32,
    /// Cap on the start-up sync handshake.
    pub sync_timeout_ms: u32,
    /// Sleep between register polls in the short hardware waits.
    pub register_poll_us: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            csma_window_ms: CSMA_WINDOW_MS,
            csma_poll_us: CSMA_POLL_US,
            ack_poll_us: ACK_POLL_US,
            tx_timeout_ms: TX_TIMEOUT_MS,
            tx_poll_us: TX_POLL_US,
            mode_ready_timeout_ms: MODE_READY_TIMEOUT_MS,
            rssi_timeout_ms: RSSI_TIMEOUT_MS,
            sync_timeout_ms: SYNC_TIMEOUT_MS,
            register_poll_us: REGISTER_POLL_US,
        }
    }
}

/// Driver options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct RadioConfig {
    /// This node's address.
    pub address: u8,
    /// Network id (second sync byte), `1..=254`.
    pub network_id: u8,
    /// Accept frames regardless of their destination.
    pub promiscuous: bool,
    /// Reply to frames that request an acknowledgement.
    pub auto_acknowledge: bool,
    /// Transmit power, percent of the chip's range.
    pub power_percent: u8,
    /// RFM69HW/HCW variant with the +20 dBm PA.
    pub high_power: bool,
    /// Pin carrying DIO0. Informational; the platform wires the edge.
    pub interrupt_pin: u8,
    /// Pin carrying RESET. Informational; the platform drives it.
    pub reset_pin: u8,
    /// Hardware AES key; `None` disables encryption.
    pub encryption_key: Option<[u8; AES_KEY_LEN]>,
    /// Attempts used by [`Radio::send_with_ack`](crate::radio::Radio::send_with_ack).
    pub send_attempts: u8,
    /// Acknowledgement wait per attempt for [`Radio::send_with_ack`](crate::radio::Radio::send_with_ack).
    pub ack_wait_ms: u32,
    /// Waiting-loop constants.
    pub timing: Timing,
}

impl RadioConfig {
    /// Defaults for a node with the given address.
    pub fn new(address: u8) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            address: 1,
            network_id: 100,
            promiscuous: false,
            auto_acknowledge: true,
            power_percent: 70,
            high_power: true,
            interrupt_pin: 18,
            reset_pin: 29,
            encryption_key: None,
            send_attempts: DEFAULT_SEND_ATTEMPTS,
            ack_wait_ms: DEFAULT_ACK_WAIT_MS,
            timing: Timing::default(),
        }
    }
}

/// Frequency band of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Band {
    /// 315 MHz
    Mhz315,
    /// 433 MHz
    Mhz433,
    /// 868 MHz
    Mhz868,
    /// 915 MHz
    Mhz915,
}

impl Band {
    /// Carrier frequency word (`FRF`), as written to the three frequency registers.
    pub const fn frf(self) -> u32 {
        match self {
            Band::Mhz315 => 0x4E_C0_00,
            Band::Mhz433 => 0x6C_40_00,
            Band::Mhz868 => 0xD9_00_00,
            Band::Mhz915 => 0xE4_C0_00,
        }
    }
}

/// Number of entries produced by [`register_defaults`].
pub const REGISTER_DEFAULTS_LEN: usize = 20;

/// Start-up register values for `band` and `network_id`, in write order.
///
/// FSK packet mode at 55.5 kbps with 50 kHz deviation, a two-byte sync word whose
/// second byte is the network id, variable-length frames with CRC, and DIO0 mapped to
/// PayloadReady.
pub fn register_defaults(band: Band, network_id: u8) -> [(u8, u8); REGISTER_DEFAULTS_LEN] {
    let frf = band.frf();
    [
        (
            REG_OPMODE,
            OPMODE_SEQUENCER_ON | OPMODE_LISTEN_OFF | OPMODE_STANDBY,
        ),
        (REG_DATAMODUL, DATAMODUL_PACKET_FSK),
        (REG_BITRATEMSB, BITRATEMSB_55555),
        (REG_BITRATELSB, BITRATELSB_55555),
        (REG_FDEVMSB, FDEVMSB_50000),
        (REG_FDEVLSB, FDEVLSB_50000),
        (REG_FRFMSB, (frf >> 16) as u8),
        (REG_FRFMID, (frf >> 8) as u8),
        (REG_FRFLSB, frf as u8),
        (REG_RXBW, RXBW_DCC_010_MANT16_EXP2),
        (REG_DIOMAPPING1, DIOMAPPING1_DIO0_01),
        (REG_RSSITHRESH, RSSITHRESH_DEFAULT),
        (REG_SYNCCONFIG, SYNCCONFIG_ON_SIZE2),
        (REG_SYNCVALUE1, SYNCVALUE1_DEFAULT),
        (REG_SYNCVALUE2, network_id),
        (REG_PACKETCONFIG1, PACKETCONFIG1_VARIABLE_CRC),
        (REG_PAYLOADLENGTH, MAX_FRAME_LEN),
        (REG_FIFOTHRESH, FIFOTHRESH_TXSTART_NOTEMPTY),
        (REG_PACKETCONFIG2, PACKETCONFIG2_DEFAULT),
        (REG_TESTDAGC, DAGC_IMPROVED_LOWBETA0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_defaults_carry_band_and_network() {
        let regs = register_defaults(Band::Mhz868, 42);
        assert!(regs.contains(&(REG_FRFMSB, 0xD9)));
        assert!(regs.contains(&(REG_FRFMID, 0x00)));
        assert!(regs.contains(&(REG_SYNCVALUE2, 42)));
        assert!(regs.contains(&(REG_PAYLOADLENGTH, 66)));
        assert_eq!(regs[0].0, REG_OPMODE);
    }

    #[test]
    fn test_default_config() {
        let config = RadioConfig::new(7);
        assert_eq!(config.address, 7);
        assert_eq!(config.network_id, 100);
        assert!(config.auto_acknowledge);
        assert!(!config.promiscuous);
        assert_eq!(config.encryption_key, None);
        assert_eq!(config.timing.csma_window_ms, 1_000);
        assert_eq!(config.timing.tx_timeout_ms, 1_000);
    }
}
