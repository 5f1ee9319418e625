//! Operating-mode state machine.

use embedded_hal::delay::DelayNs;

use super::{Radio, RadioResult};
use crate::bus::{await_flag, RegisterInterface};
use crate::registers::*;
use crate::timer::{poll_until, Clock, PollBudget};

/// Operating mode of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Mode {
    /// Lowest power; the oscillator is off.
    Sleep,
    /// Oscillator running, radio idle.
    Standby,
    /// Frequency synthesizer running.
    Synthesizer,
    /// Listening for frames.
    Receive,
    /// Transmitting the FIFO contents.
    Transmit,
}

impl Mode {
    /// Mode bits of `OPMODE`.
    pub const fn bits(self) -> u8 {
        match self {
            Mode::Sleep => OPMODE_SLEEP,
            Mode::Standby => OPMODE_STANDBY,
            Mode::Synthesizer => OPMODE_SYNTHESIZER,
            Mode::Receive => OPMODE_RECEIVER,
            Mode::Transmit => OPMODE_TRANSMITTER,
        }
    }

    /// Decodes the mode bits of an `OPMODE` value. Reserved encodings yield `None`.
    pub const fn from_bits(opmode: u8) -> Option<Self> {
        match opmode & OPMODE_MODE_MASK {
            OPMODE_SLEEP => Some(Mode::Sleep),
            OPMODE_STANDBY => Some(Mode::Standby),
            OPMODE_SYNTHESIZER => Some(Mode::Synthesizer),
            OPMODE_RECEIVER => Some(Mode::Receive),
            OPMODE_TRANSMITTER => Some(Mode::Transmit),
            _ => None,
        }
    }
}

impl<B, D, C> Radio<'_, B, D, C>
where
    B: RegisterInterface,
    D: DelayNs,
    C: Clock,
{
    /// Switches the chip to `target`.
    ///
    /// Nothing is written when `target` is already the current mode. On high-power
    /// modules the PA boost trims are enabled for transmit and disabled for receive.
    /// Leaving sleep waits for the mode-ready flag; a timeout there is logged and the
    /// switch proceeds.
    pub fn set_mode(&mut self, target: Mode) -> RadioResult<(), B> {
        let previous = self.state.mode;
        if target == previous {
            return Ok(());
        }

        self.bus
            .modify_register(REG_OPMODE, !OPMODE_MODE_MASK, target.bits())?;

        if self.state.high_power {
            match target {
                Mode::Transmit => self.set_pa_boost(true)?,
                Mode::Receive => self.set_pa_boost(false)?,
                _ => {}
            }
        }

        if previous == Mode::Sleep && !self.wait_mode_ready()? {
            warn!("mode-ready not seen leaving sleep");
        }

        self.state.mode = target;
        Ok(())
    }

    fn set_pa_boost(&mut self, on: bool) -> RadioResult<(), B> {
        let (pa1, pa2) = if on {
            (TESTPA1_BOOST, TESTPA2_BOOST)
        } else {
            (TESTPA1_NORMAL, TESTPA2_NORMAL)
        };
        self.bus.write_register(REG_TESTPA1, pa1)?;
        self.bus.write_register(REG_TESTPA2, pa2)?;
        Ok(())
    }

    /// Polls the mode-ready flag. Returns `false` if it did not appear in time.
    pub(crate) fn wait_mode_ready(&mut self) -> RadioResult<bool, B> {
        let timing = self.config.timing;
        let bus = &mut self.bus;
        let ready = poll_until(
            &mut self.delay,
            PollBudget::new(timing.mode_ready_timeout_ms, timing.register_poll_us),
            || await_flag(bus, REG_IRQFLAGS1, IRQFLAGS1_MODEREADY),
        )?;
        Ok(ready.is_some())
    }
}
