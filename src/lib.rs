//! # rfm69-link
//!
//! A portable, no_std Rust link-layer driver for HopeRF RFM69 sub-GHz packet radios
//! (RFM69W/CW and the high-power RFM69HW/HCW variants).
//!
//! The chip does the bit-level FSK work; this crate turns its register interface into
//! a usable packet radio:
//! - an operating-mode state machine with the chip's ready/settling waits
//! - best-effort carrier sense (CSMA) before each transmission
//! - a small addressed frame format with acknowledgement bits
//! - acknowledged sends with retry, and automatic acknowledgement of inbound frames
//! - an interrupt-driven receive pipeline feeding an in-memory packet queue
//!
//! ## Crate features
//! | Feature     | Description |
//! |-------------|-------------|
//! | `std`       | Disables `#![no_std]`, stores received packets in a growable `std::vec::Vec` and provides [`timer::SystemClock`] |
//! | `defmt-0-3` | Uses `defmt` logging |
//! | `log`       | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rfm69_link::bus::SpiInterface;
//! use rfm69_link::config::{register_defaults, Band, RadioConfig};
//! use rfm69_link::radio::Radio;
//! use rfm69_link::timer::IrqLine;
//!
//! static DIO0: IrqLine = IrqLine::new();
//!
//! // Wire the DIO0 rising edge to `DIO0.raise()` in the platform's interrupt handler.
//!
//! let config = RadioConfig::new(1);
//! let mut radio = Radio::new(SpiInterface::new(spi), delay, clock, &DIO0, config);
//! radio.init(&register_defaults(Band::Mhz433, config.network_id))?;
//! radio.begin_receive()?;
//!
//! if radio.send_with_retry(2, b"hello", 3, 50)? {
//!     // node 2 acknowledged
//! }
//! loop {
//!     for packet in radio.drain_packets()? {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - The interrupt handler must only call [`timer::IrqLine::raise`]; the bus work happens
//!   on the caller's side in [`radio::Radio::service`] and inside the send loops.
//! - All waits are bounded polling loops driven by an `embedded_hal::delay::DelayNs`.
//! - Carrier sense is best-effort: once the CSMA window elapses the frame is sent anyway.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

pub use critical_section;
pub use heapless;

pub(crate) mod fmt;

pub mod ack;
pub mod bus;
pub mod config;
pub mod consts;
pub mod error;
pub mod frame;
pub mod packet;
pub mod radio;
pub mod registers;
pub mod timer;

#[cfg(test)]
pub(crate) mod mock;

pub use error::Error;
pub use frame::{Control, Frame, Header};
pub use packet::{Packet, PacketQueue};
pub use radio::{Mode, Radio};
