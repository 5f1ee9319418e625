//! Register access over the serial bus.
//!
//! [`RegisterInterface`] is the seam between the link layer and the hardware: single
//! register reads and writes, plus burst transfers for the FIFO and the AES key.
//! [`SpiInterface`] implements it for any `embedded_hal::spi::SpiDevice` using the
//! RFM69 access convention:
//!
//! | Access      | Bytes on the wire                      |
//! |-------------|----------------------------------------|
//! | read        | `[addr & 0x7F, 0x00]`, value in byte 1 |
//! | write       | `[addr | 0x80, value]`                 |
//! | burst write | `[addr | 0x80, data...]`               |
//! | burst read  | `[addr & 0x7F, 0x00 × N]`              |
//!
//! Transfer failures are returned as-is; the driver never retries them.

use embedded_hal::spi::{Operation, SpiDevice};

use crate::registers::{READ_MASK, WRITE_FLAG};

/// Byte-level register access to the radio.
pub trait RegisterInterface {
    /// Error raised by a failed transfer.
    type Error: core::fmt::Debug;

    /// Reads one register.
    fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error>;

    /// Writes one register.
    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error>;

    /// Writes `data` starting at `addr` in a single chip-select cycle.
    fn write_burst(&mut self, addr: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Fills `buf` from `addr` in a single chip-select cycle.
    fn read_burst(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Read-modify-write: keeps the bits in `keep`, then ORs in `bits`.
    fn modify_register(&mut self, addr: u8, keep: u8, bits: u8) -> Result<(), Self::Error> {
        let current = self.read_register(addr)?;
        self.write_register(addr, (current & keep) | bits)
    }

    /// Returns `true` when any bit of `mask` is set in the register.
    fn flag_set(&mut self, addr: u8, mask: u8) -> Result<bool, Self::Error> {
        Ok(self.read_register(addr)? & mask != 0)
    }
}

/// Polls a status flag once, in the shape [`poll_until`](crate::timer::poll_until) expects.
pub fn await_flag<B: RegisterInterface>(
    bus: &mut B,
    addr: u8,
    mask: u8,
) -> nb::Result<(), B::Error> {
    match bus.flag_set(addr, mask) {
        Ok(true) => Ok(()),
        Ok(false) => Err(nb::Error::WouldBlock),
        Err(e) => Err(nb::Error::Other(e)),
    }
}

/// [`RegisterInterface`] over an `embedded-hal` SPI device.
#[derive(Debug)]
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Wraps an SPI device. Chip-select handling is the device's job.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> RegisterInterface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error> {
        let mut buf = [addr & READ_MASK, 0x00];
        self.spi.transfer_in_place(&mut buf)?;
        Ok(buf[1])
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
        self.spi.write(&[addr | WRITE_FLAG, value])
    }

    fn write_burst(&mut self, addr: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.spi.transaction(&mut [
            Operation::Write(&[addr | WRITE_FLAG]),
            Operation::Write(data),
        ])
    }

    fn read_burst(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        buf.fill(0);
        self.spi.transaction(&mut [
            Operation::Write(&[addr & READ_MASK]),
            Operation::TransferInPlace(buf),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{REG_FIFO, REG_IRQFLAGS1, REG_OPMODE, REG_PALEVEL};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    #[test]
    fn test_read_register_masks_address() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(vec![0x81 & 0x7F, 0x00], vec![0x00, 0x2A]),
            SpiTransaction::transaction_end(),
        ];
        let spi = SpiMock::new(&expectations);
        let mut bus = SpiInterface::new(spi);

        assert_eq!(bus.read_register(0x81).unwrap(), 0x2A);
        bus.release().done();
    }

    #[test]
    fn test_write_register_sets_write_flag() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![REG_OPMODE | 0x80, 0x04]),
            SpiTransaction::transaction_end(),
        ];
        let spi = SpiMock::new(&expectations);
        let mut bus = SpiInterface::new(spi);

        bus.write_register(REG_OPMODE, 0x04).unwrap();
        bus.release().done();
    }

    #[test]
    fn test_modify_register_preserves_unmasked_bits() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(vec![REG_PALEVEL, 0x00], vec![0x00, 0xFF]),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![REG_PALEVEL | 0x80, 0xE0 | 0x15]),
            SpiTransaction::transaction_end(),
        ];
        let spi = SpiMock::new(&expectations);
        let mut bus = SpiInterface::new(spi);

        bus.modify_register(REG_PALEVEL, 0xE0, 0x15).unwrap();
        bus.release().done();
    }

    #[test]
    fn test_fifo_burst_write_is_one_transaction() {
        let frame = [0x08, 0x02, 0x01, 0x40, b'h', b'e', b'l', b'l', b'o'];
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![REG_FIFO | 0x80]),
            SpiTransaction::write_vec(frame.to_vec()),
            SpiTransaction::transaction_end(),
        ];
        let spi = SpiMock::new(&expectations);
        let mut bus = SpiInterface::new(spi);

        bus.write_burst(REG_FIFO, &frame).unwrap();
        bus.release().done();
    }

    #[test]
    fn test_fifo_burst_read_header() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![REG_FIFO]),
            SpiTransaction::transfer_in_place(vec![0, 0, 0, 0], vec![0x08, 0x02, 0x01, 0x40]),
            SpiTransaction::transaction_end(),
        ];
        let spi = SpiMock::new(&expectations);
        let mut bus = SpiInterface::new(spi);

        let mut header = [0xFFu8; 4];
        bus.read_burst(REG_FIFO, &mut header).unwrap();
        assert_eq!(header, [0x08, 0x02, 0x01, 0x40]);
        bus.release().done();
    }

    #[test]
    fn test_await_flag_would_block_until_set() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(vec![REG_IRQFLAGS1, 0x00], vec![0x00, 0x00]),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(vec![REG_IRQFLAGS1, 0x00], vec![0x00, 0x80]),
            SpiTransaction::transaction_end(),
        ];
        let spi = SpiMock::new(&expectations);
        let mut bus = SpiInterface::new(spi);

        assert_eq!(
            await_flag(&mut bus, REG_IRQFLAGS1, 0x80),
            Err(nb::Error::WouldBlock)
        );
        assert_eq!(await_flag(&mut bus, REG_IRQFLAGS1, 0x80), Ok(()));
        bus.release().done();
    }
}
