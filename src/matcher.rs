//! Incremental token matching and numeric extraction over a live byte stream.
//!
//! Both helpers here are pure state machines: they are fed one byte at a
//! time by [`CommandChannel`](crate::channel::CommandChannel), which owns the
//! transport, the deadline and the byte budget. Neither ever pushes a byte
//! back, so the stream position after a failed wait is wherever the caller
//! stopped feeding.

/// Tracks how much of a token the most recent bytes have matched.
///
/// On a mismatch the matched prefix is reset to zero and the offending byte
/// is *not* re-examined as the start of a new match. This can miss a token
/// that overlaps a partial match of itself (e.g. `"aab"` inside `"aaab"`),
/// which is harmless for the modem's reply vocabulary since none of its
/// tokens has a repeated prefix. Tokens added to
/// [`consts`](crate::consts) must keep that property.
#[derive(Debug, Clone)]
pub struct TokenMatcher<'a> {
    token: &'a [u8],
    matched: usize,
}

impl<'a> TokenMatcher<'a> {
    /// Starts matching `token` from an empty prefix.
    pub fn new(token: &'a str) -> Self {
        Self {
            token: token.as_bytes(),
            matched: 0,
        }
    }

    /// Feeds one byte. Returns `true` once the whole token has been seen.
    pub fn feed(&mut self, byte: u8) -> bool {
        if self.token.get(self.matched) == Some(&byte) {
            self.matched += 1;
        } else {
            self.matched = 0;
        }
        self.is_complete()
    }

    /// Whether the token has been matched end-to-end.
    ///
    /// An empty token is complete before any byte is fed.
    pub fn is_complete(&self) -> bool {
        self.matched >= self.token.len()
    }

    /// Length of the currently matched prefix.
    pub fn matched(&self) -> usize {
        self.matched
    }
}

/// Radix-generic unsigned integer accumulator.
///
/// Digits are folded in as `acc = acc * radix + digit` with wraparound at
/// 64 bits. Decimal readers truncate the result to 32 bits, which is the
/// same value a 32-bit accumulator would have wrapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct NumericReader {
    radix: u32,
    value: u64,
}

impl NumericReader {
    /// Reader for base 10 digits `0-9`.
    pub const fn decimal() -> Self {
        Self {
            radix: 10,
            value: 0,
        }
    }

    /// Reader for base 16 digits `0-9`, `a-f` and `A-F`.
    pub const fn hex() -> Self {
        Self {
            radix: 16,
            value: 0,
        }
    }

    /// Feeds one byte. Returns `false` when the byte is not a digit in this
    /// radix, which ends the number; the accumulator is left untouched.
    pub fn feed(&mut self, byte: u8) -> bool {
        match char::from(byte).to_digit(self.radix) {
            Some(digit) => {
                self.value = self
                    .value
                    .wrapping_mul(u64::from(self.radix))
                    .wrapping_add(u64::from(digit));
                true
            }
            None => false,
        }
    }

    /// The value accumulated so far (zero if no digit was read).
    pub const fn value(&self) -> u64 {
        self.value
    }
}
