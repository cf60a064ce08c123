//! Binary upload into the modem's mobile-originated buffer (`AT+SBDWB`).
//!
//! ## Wire sequence
//!
//! ```text
//! host  -> AT+SBDWB=<len>\r\n
//! modem <- READY\r\n
//! host  -> <len payload bytes><checksum high><checksum low>
//! modem <- 0\r\n\r\nOK\r\n            (not read here)
//! ```
//!
//! The checksum is the 16-bit sum of the payload bytes, sent most significant
//! byte first. The modem's verdict on the upload is left in the stream; a
//! bad load only shows up when the next session reports it.

use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;
use embedded_hal_nb::serial::{Read, Write};
use heapless::String;

use crate::channel::ChannelResult;
use crate::checksum::Checksum;
use crate::clock::Clock;
use crate::consts::{CMD_WRITE_BINARY, LEN_ARG_DIGITS, SBD_MAX_PAYLOAD_LEN, TOKEN_READY};
use crate::diag::DebugSink;
use crate::driver::SbdDriver;
use crate::error::Error;

impl<S, C, D, G> SbdDriver<S, C, D, G>
where
    S: Read<u8> + Write<u8>,
    C: Clock,
    D: DelayNs,
    G: DebugSink,
{
    /// Loads `payload` into the modem's outbound buffer.
    ///
    /// The payload and its checksum are streamed once the command has been
    /// issued, whether or not `READY` was seen in time. An empty payload is
    /// legal and still sends the (zero) checksum.
    ///
    /// # Returns
    /// - `Ok(true)`: the modem announced `READY` before the payload was sent
    /// - `Ok(false)`: `READY` timed out; the modem probably discarded the upload
    /// - `Err(Error::PayloadTooLarge)`: more than [`SBD_MAX_PAYLOAD_LEN`] bytes;
    ///   nothing was written
    pub fn load_buffer(&mut self, payload: &[u8]) -> ChannelResult<bool, S> {
        if payload.len() > SBD_MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge(payload.len()));
        }
        let len = payload.len() as u8;

        let mut arg: String<LEN_ARG_DIGITS> = String::new();
        // Infallible: a u8 never needs more than three digits.
        let _ = write!(arg, "{}", len);

        self.channel.raw(CMD_WRITE_BINARY)?;
        self.channel.command(&arg)?;
        let ready = self.channel.wait_for(TOKEN_READY)?;

        let mut sum = Checksum::new();
        for &b in payload {
            self.channel.write_byte(b)?;
            sum.update(b);
        }
        self.channel.write_bytes(&sum.to_wire())?;

        debug!(
            "loaded {} bytes, checksum {}, ready {}",
            len,
            sum.value(),
            ready
        );
        Ok(ready)
    }
}
