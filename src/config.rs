//! Runtime configuration for the command channel.

use crate::consts::{DEFAULT_BYTE_BUDGET, DEFAULT_TIMEOUT_SECS};
use crate::diag::DebugLevel;

/// Settings applied to every exchange with the modem.
///
/// The defaults match the modem's usual behaviour: a 30 second wait per
/// reply, a 100 byte budget per token wait, no diagnostic output and a pure
/// busy poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Config {
    /// Longest wait for a token or a number, in seconds.
    pub timeout_secs: u32,
    /// Verbosity of the diagnostic port.
    pub debug_level: DebugLevel,
    /// Bytes a single token wait may consume before giving up.
    pub byte_budget: u16,
    /// Pause between polls of an empty transport, in microseconds. `0` spins.
    pub poll_interval_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug_level: DebugLevel::Silent,
            byte_budget: DEFAULT_BYTE_BUDGET,
            poll_interval_us: 0,
        }
    }
}

impl Config {
    /// Sets the per-reply timeout.
    pub fn with_timeout(mut self, secs: u32) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the diagnostic verbosity.
    pub fn with_debug_level(mut self, level: DebugLevel) -> Self {
        self.debug_level = level;
        self
    }

    /// Sets the per-wait byte budget.
    pub fn with_byte_budget(mut self, bytes: u16) -> Self {
        self.byte_budget = bytes;
        self
    }

    /// Sets the pause between empty polls.
    pub fn with_poll_interval_us(mut self, us: u32) -> Self {
        self.poll_interval_us = us;
        self
    }
}
