//! RFM69 register addresses and bit fields.
//!
//! Only the registers the driver touches, plus those used by the start-up
//! defaults in [`config::register_defaults`](crate::config::register_defaults).
//! Values follow the SX1231/RFM69 datasheet.

/// Mask applied to an address for a read access.
pub const READ_MASK: u8 = 0x7F;
/// Bit set on an address for a write access.
pub const WRITE_FLAG: u8 = 0x80;

/// FIFO read/write access.
pub const REG_FIFO: u8 = 0x00;
/// Operating mode.
pub const REG_OPMODE: u8 = 0x01;
/// Data processing mode and modulation.
pub const REG_DATAMODUL: u8 = 0x02;
/// Bit rate, MSB.
pub const REG_BITRATEMSB: u8 = 0x03;
/// Bit rate, LSB.
pub const REG_BITRATELSB: u8 = 0x04;
/// Frequency deviation, MSB.
pub const REG_FDEVMSB: u8 = 0x05;
/// Frequency deviation, LSB.
pub const REG_FDEVLSB: u8 = 0x06;
/// Carrier frequency, MSB.
pub const REG_FRFMSB: u8 = 0x07;
/// Carrier frequency, middle byte.
pub const REG_FRFMID: u8 = 0x08;
/// Carrier frequency, LSB.
pub const REG_FRFLSB: u8 = 0x09;
/// PA selection and output power.
pub const REG_PALEVEL: u8 = 0x11;
/// Over-current protection.
pub const REG_OCP: u8 = 0x13;
/// Channel filter bandwidth.
pub const REG_RXBW: u8 = 0x19;
/// RSSI measurement control.
pub const REG_RSSICONFIG: u8 = 0x23;
/// Last RSSI measurement, in -0.5 dBm steps.
pub const REG_RSSIVALUE: u8 = 0x24;
/// DIO0..DIO3 mapping.
pub const REG_DIOMAPPING1: u8 = 0x25;
/// Status flags: mode ready, RX timeout, ...
pub const REG_IRQFLAGS1: u8 = 0x27;
/// Status flags: payload ready, packet sent, ...
pub const REG_IRQFLAGS2: u8 = 0x28;
/// RSSI trigger threshold.
pub const REG_RSSITHRESH: u8 = 0x29;
/// Sync word configuration.
pub const REG_SYNCCONFIG: u8 = 0x2E;
/// Sync word, first byte.
pub const REG_SYNCVALUE1: u8 = 0x2F;
/// Sync word, second byte (network id).
pub const REG_SYNCVALUE2: u8 = 0x30;
/// Packet format configuration.
pub const REG_PACKETCONFIG1: u8 = 0x37;
/// Maximum payload length in variable-length mode.
pub const REG_PAYLOADLENGTH: u8 = 0x38;
/// Node address.
pub const REG_NODEADRS: u8 = 0x39;
/// FIFO threshold and TX start condition.
pub const REG_FIFOTHRESH: u8 = 0x3C;
/// RX restart and AES control.
pub const REG_PACKETCONFIG2: u8 = 0x3D;
/// First of the 16 AES key registers.
pub const REG_AESKEY1: u8 = 0x3E;
/// High-power PA trim 1.
pub const REG_TESTPA1: u8 = 0x5A;
/// High-power PA trim 2.
pub const REG_TESTPA2: u8 = 0x5C;
/// Fading margin improvement.
pub const REG_TESTDAGC: u8 = 0x6F;

/// Bits of [`REG_OPMODE`] that select the operating mode.
pub const OPMODE_MODE_MASK: u8 = 0x1C;
/// Sequencer on, listen off.
pub const OPMODE_SEQUENCER_ON: u8 = 0x00;
/// Listen mode off.
pub const OPMODE_LISTEN_OFF: u8 = 0x00;
/// Sleep mode bits.
pub const OPMODE_SLEEP: u8 = 0x00;
/// Standby mode bits.
pub const OPMODE_STANDBY: u8 = 0x04;
/// Frequency synthesizer mode bits.
pub const OPMODE_SYNTHESIZER: u8 = 0x08;
/// Transmit mode bits.
pub const OPMODE_TRANSMITTER: u8 = 0x0C;
/// Receive mode bits.
pub const OPMODE_RECEIVER: u8 = 0x10;

/// Packet mode, FSK, no shaping.
pub const DATAMODUL_PACKET_FSK: u8 = 0x00;
/// 55555 bps, MSB.
pub const BITRATEMSB_55555: u8 = 0x02;
/// 55555 bps, LSB.
pub const BITRATELSB_55555: u8 = 0x40;
/// 50 kHz deviation, MSB.
pub const FDEVMSB_50000: u8 = 0x03;
/// 50 kHz deviation, LSB.
pub const FDEVLSB_50000: u8 = 0x33;

/// PA0 enabled.
pub const PALEVEL_PA0_ON: u8 = 0x80;
/// PA1 enabled.
pub const PALEVEL_PA1_ON: u8 = 0x40;
/// PA2 enabled.
pub const PALEVEL_PA2_ON: u8 = 0x20;
/// Output power bits of [`REG_PALEVEL`].
pub const PALEVEL_OUTPUT_POWER_MASK: u8 = 0x1F;

/// Over-current protection disabled.
pub const OCP_OFF: u8 = 0x0F;
/// Over-current protection enabled, 95 mA trim.
pub const OCP_ON: u8 = 0x1A;

/// DCC 4%, mantissa 16, exponent 2.
pub const RXBW_DCC_010_MANT16_EXP2: u8 = 0x42;

/// Start an RSSI measurement.
pub const RSSI_START: u8 = 0x01;
/// RSSI measurement done.
pub const RSSI_DONE: u8 = 0x02;

/// DIO0 = PacketSent in TX, CrcOk in RX.
pub const DIOMAPPING1_DIO0_00: u8 = 0x00;
/// DIO0 = PayloadReady in RX.
pub const DIOMAPPING1_DIO0_01: u8 = 0x40;

/// Operating mode change finished.
pub const IRQFLAGS1_MODEREADY: u8 = 0x80;
/// RX timeout elapsed.
pub const IRQFLAGS1_TIMEOUT: u8 = 0x04;
/// A full payload is in the FIFO.
pub const IRQFLAGS2_PAYLOADREADY: u8 = 0x04;
/// The frame has been radiated.
pub const IRQFLAGS2_PACKETSENT: u8 = 0x08;

/// RSSI threshold of -110 dBm.
pub const RSSITHRESH_DEFAULT: u8 = 220;

/// Sync on, FIFO fill on sync address, two sync bytes, no tolerance.
pub const SYNCCONFIG_ON_SIZE2: u8 = 0x88;
/// First sync byte, compatible with RFM12B nodes.
pub const SYNCVALUE1_DEFAULT: u8 = 0x2D;

/// Variable length, DC-free off, CRC on, auto clear, no address filter.
pub const PACKETCONFIG1_VARIABLE_CRC: u8 = 0x90;

/// TX starts on FIFO not empty, threshold 15.
pub const FIFOTHRESH_TXSTART_NOTEMPTY: u8 = 0x8F;

/// RX restart delay of two bits, auto RX restart, AES off.
pub const PACKETCONFIG2_DEFAULT: u8 = 0x12;
/// Force an RX restart.
pub const PACKETCONFIG2_RXRESTART: u8 = 0x04;
/// Hardware AES enabled.
pub const PACKETCONFIG2_AES_ON: u8 = 0x01;

/// Improved DAGC for AfcLowBetaOn = 0.
pub const DAGC_IMPROVED_LOWBETA0: u8 = 0x30;

/// PA1 trim for +20 dBm operation.
pub const TESTPA1_BOOST: u8 = 0x5D;
/// PA2 trim for +20 dBm operation.
pub const TESTPA2_BOOST: u8 = 0x7C;
/// PA1 trim, normal operation.
pub const TESTPA1_NORMAL: u8 = 0x55;
/// PA2 trim, normal operation.
pub const TESTPA2_NORMAL: u8 = 0x70;

/// Values used by the start-up sync handshake.
pub const SYNC_PATTERNS: [u8; 2] = [0xAA, 0x55];
