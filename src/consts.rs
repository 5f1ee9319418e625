//! Constants used across the link-layer implementation.
//!
//! This module defines the frame geometry, reserved addresses, the carrier-sense
//! threshold and the default timings of every bounded polling loop.
//!
//! ## Key Concepts
//!
//! - **Frame**: `[length, target, sender, control, payload...]`, where `length`
//!   counts every byte after itself.
//! - **FIFO limit**: the chip accepts at most 66 bytes per frame, so an outbound
//!   payload is capped at [`MAX_PAYLOAD_LEN`].
//! - **Timings**: all waits are polling loops with a cap; the defaults below feed
//!   [`Timing::default`](crate::config::Timing).

/// Number of header bytes that follow the length byte (target, sender, control).
pub const FRAME_HEADER_LEN: u8 = 3;

/// Size of the header as read from the FIFO, length byte included.
pub const FIFO_HEADER_LEN: usize = 4;

/// Largest value the length byte may take. Anything above is clamped on receive.
pub const MAX_FRAME_LEN: u8 = 66;

/// Maximum payload accepted for transmission. Longer payloads are truncated.
pub const MAX_PAYLOAD_LEN: usize = 61;

/// Largest payload a received frame can carry after length clamping.
pub const MAX_RX_PAYLOAD_LEN: usize = (MAX_FRAME_LEN - FRAME_HEADER_LEN) as usize;

/// Capacity of an encoded frame buffer (length byte + header + payload).
pub const MAX_ENCODED_LEN: usize = 1 + FRAME_HEADER_LEN as usize + MAX_PAYLOAD_LEN;

/// Reserved destination accepted by every receiver.
pub const BROADCAST_ADDRESS: u8 = u8::MAX;

/// RSSI (dBm) below which the channel is considered quiet.
pub const CSMA_RSSI_THRESHOLD_DBM: i16 = -90;

/// Number of received packets held when no allocator is available.
#[cfg(not(feature = "std"))]
pub const PACKET_QUEUE_LEN: usize = 8;

/// Length of the hardware AES key.
pub const AES_KEY_LEN: usize = 16;

/// Highest raw output power setting.
pub const MAX_POWER_LEVEL: u8 = 31;

/// Default carrier-sense window before a send proceeds regardless.
pub const CSMA_WINDOW_MS: u32 = 1_000;

/// Sleep between carrier-sense attempts.
pub const CSMA_POLL_US: u32 = 1_000;

/// Sleep between acknowledgement table checks.
pub const ACK_POLL_US: u32 = 1_000;

/// Cap on waiting for the "packet sent" edge.
pub const TX_TIMEOUT_MS: u32 = 1_000;

/// Sleep between "packet sent" checks.
pub const TX_POLL_US: u32 = 1_000;

/// Cap on waiting for the mode-ready flag.
pub const MODE_READY_TIMEOUT_MS: u32 = 100;

/// Cap on a forced RSSI measurement.
pub const RSSI_TIMEOUT_MS: u32 = 10;

/// Cap on the start-up sync handshake with the chip.
pub const SYNC_TIMEOUT_MS: u32 = 15_000;

/// Sleep between register polls in the short hardware waits.
pub const REGISTER_POLL_US: u32 = 100;

/// Default number of attempts for an acknowledged send.
pub const DEFAULT_SEND_ATTEMPTS: u8 = 3;

/// Default time to wait for an acknowledgement per attempt.
pub const DEFAULT_ACK_WAIT_MS: u32 = 50;

/// First register covered by a register dump; `0x00` is the FIFO.
pub const REGISTER_DUMP_FIRST: u8 = 0x01;

/// Registers in a dump, `0x01..=0x4F`.
pub const REGISTER_DUMP_LEN: usize = 0x4F;
