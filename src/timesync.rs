//! Network time via `AT-MSSTM`.
//!
//! The modem reports system time as a hexadecimal count of 90 ms frames
//! since [`MODEM_EPOCH`]. A reply of `no network service` parses as zero,
//! which is treated as "time unknown".

use embedded_hal::delay::DelayNs;
use embedded_hal_nb::serial::{Read, Write};

use crate::channel::ChannelResult;
use crate::clock::Clock;
use crate::consts::{CMD_SYSTEM_TIME, MODEM_EPOCH, TOKEN_SYSTEM_TIME};
use crate::diag::{DebugLevel, DebugSink};
use crate::driver::SbdDriver;

/// Converts a native tick count into Unix seconds.
///
/// Each tick is 90 ms, so `unix = ticks * 9 / 100 + MODEM_EPOCH`, truncating.
pub const fn native_to_unix(ticks: u64) -> u64 {
    ticks.saturating_mul(9) / 100 + MODEM_EPOCH
}

impl<S, C, D, G> SbdDriver<S, C, D, G>
where
    S: Read<u8> + Write<u8>,
    C: Clock,
    D: DelayNs,
    G: DebugSink,
{
    /// Reads the modem's native tick count (`AT-MSSTM`).
    ///
    /// Returns `0` when the modem has no valid network time or does not answer.
    pub fn raw_time(&mut self) -> ChannelResult<u64, S> {
        self.channel.command(CMD_SYSTEM_TIME)?;
        let _ = self.channel.wait_for(TOKEN_SYSTEM_TIME)?;
        self.channel.read_hex()
    }

    /// Synchronizes the local clock to network time.
    ///
    /// On a valid reply the clock is set to the converted time. Otherwise a
    /// diagnostic is emitted and the clock is left alone. Either way any
    /// unread reply bytes are drained afterwards.
    ///
    /// # Returns
    /// The clock's reading after the attempt: the network time on success,
    /// the unchanged local time otherwise.
    pub fn get_time(&mut self) -> ChannelResult<u64, S> {
        let ticks = self.raw_time()?;
        if ticks > 0 {
            let unix = native_to_unix(ticks);
            self.channel.clock_mut().set_time(unix);
            debug!("clock set from network: {} ticks -> {}", ticks, unix);
        } else {
            warn!("no network time available");
            self.channel.debug(
                DebugLevel::Messages,
                format_args!("Could not update time from network"),
            );
        }
        let _ = self.channel.flush_input()?;
        Ok(self.channel.clock_mut().now())
    }
}
