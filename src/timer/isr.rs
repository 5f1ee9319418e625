use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

/// Pending-edge flag shared between the DIO0 interrupt handler and the driver.
///
/// The handler only records that the line rose; the driver picks the event up on the
/// caller's side and does the bus work there, so an interrupt never interleaves with
/// a register sequence in progress.
///
/// # Example
/// ```rust
/// use rfm69_link::timer::IrqLine;
///
/// static DIO0: IrqLine = IrqLine::new();
///
/// // #[interrupt]
/// fn exti0() {
///     DIO0.raise();
/// }
/// # exti0();
/// assert!(DIO0.take());
/// assert!(!DIO0.take());
/// ```
pub struct IrqLine {
    pending: Mutex<Cell<bool>>,
}

impl IrqLine {
    /// A line with no pending edge.
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(false)),
        }
    }

    /// Records a rising edge. Safe to call from interrupt context.
    pub fn raise(&self) {
        critical_section::with(|cs| self.pending.borrow(cs).set(true));
    }

    /// Consumes the pending edge, if any.
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).replace(false))
    }

    /// Returns whether an edge is pending without consuming it.
    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).get())
    }
}

impl Default for IrqLine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IrqLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrqLine")
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes_edge() {
        let line = IrqLine::new();
        assert!(!line.take());
        line.raise();
        line.raise();
        assert!(line.is_pending());
        assert!(line.take());
        assert!(!line.take());
    }
}
