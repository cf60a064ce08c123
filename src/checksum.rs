//! Running 16-bit checksum appended to every `AT+SBDWB` upload.
//!
//! The modem verifies an uploaded message against the least significant
//! two bytes of the arithmetic sum of its payload. The sum is transmitted
//! most-significant byte first, whatever the host byte order.

/// Accumulates the SBD payload checksum one byte at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Checksum {
    sum: u16,
}

impl Checksum {
    /// Creates an empty accumulator (sum of zero).
    pub const fn new() -> Self {
        Self { sum: 0 }
    }

    /// Folds one payload byte into the sum, wrapping modulo 2^16.
    pub fn update(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(u16::from(byte));
    }

    /// Folds a whole slice into the sum.
    pub fn update_slice(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.update(b);
        }
    }

    /// The current 16-bit sum.
    pub const fn value(&self) -> u16 {
        self.sum
    }

    /// The two trailer bytes in wire order: high byte, then low byte.
    pub const fn to_wire(&self) -> [u8; 2] {
        self.sum.to_be_bytes()
    }
}
