//! Bookkeeping of received acknowledgements.
//!
//! The receive path records every acknowledgement frame by sender; a waiting send
//! consumes the record. Each record is consumed at most once.

use crate::consts::BROADCAST_ADDRESS;

/// Pending acknowledgements, one flag per sender address.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct AckTable {
    pending: [u32; 8],
}

impl AckTable {
    /// An empty table.
    pub const fn new() -> Self {
        Self { pending: [0; 8] }
    }

    /// Records an acknowledgement from `sender`.
    pub fn record(&mut self, sender: u8) {
        let (word, bit) = Self::slot(sender);
        self.pending[word] |= bit;
    }

    /// Consumes an acknowledgement from `sender`.
    ///
    /// For [`BROADCAST_ADDRESS`] any pending acknowledgement matches; the one from
    /// the lowest address is consumed.
    pub fn take(&mut self, sender: u8) -> bool {
        if sender == BROADCAST_ADDRESS {
            return match self.first_pending() {
                Some(addr) => self.take_exact(addr),
                None => false,
            };
        }
        self.take_exact(sender)
    }

    /// Returns whether an acknowledgement from `sender` is pending, without consuming it.
    pub fn contains(&self, sender: u8) -> bool {
        let (word, bit) = Self::slot(sender);
        self.pending[word] & bit != 0
    }

    /// `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.iter().all(|w| *w == 0)
    }

    /// Forgets every pending acknowledgement.
    pub fn clear(&mut self) {
        self.pending = [0; 8];
    }

    fn take_exact(&mut self, sender: u8) -> bool {
        let (word, bit) = Self::slot(sender);
        let was_set = self.pending[word] & bit != 0;
        self.pending[word] &= !bit;
        was_set
    }

    fn first_pending(&self) -> Option<u8> {
        self.pending
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| (i as u32 * 32 + w.trailing_zeros()) as u8)
    }

    fn slot(sender: u8) -> (usize, u32) {
        ((sender / 32) as usize, 1u32 << (sender % 32))
    }
}

impl Default for AckTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_is_at_most_once() {
        let mut acks = AckTable::new();
        acks.record(7);
        assert!(acks.take(7));
        assert!(!acks.take(7));
    }

    #[test]
    fn test_take_only_matches_sender() {
        let mut acks = AckTable::new();
        acks.record(200);
        assert!(!acks.take(3));
        assert!(acks.contains(200));
        assert!(acks.take(200));
        assert!(acks.is_empty());
    }

    #[test]
    fn test_broadcast_matches_any_sender() {
        let mut acks = AckTable::new();
        assert!(!acks.take(BROADCAST_ADDRESS));
        acks.record(40);
        acks.record(90);
        assert!(acks.take(BROADCAST_ADDRESS));
        assert!(!acks.contains(40));
        assert!(acks.contains(90));
        acks.clear();
        assert!(acks.is_empty());
    }

    #[test]
    fn test_address_zero_and_max() {
        let mut acks = AckTable::new();
        acks.record(0);
        acks.record(254);
        assert!(acks.take(0));
        assert!(acks.take(254));
    }
}
