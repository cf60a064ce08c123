//! Constants used across the SBD driver.
//!
//! This module defines the fixed protocol vocabulary of the 9602/9612 AT
//! dialect, along with the timing and sizing defaults the driver starts with.
//!
//! ## Key Concepts
//!
//! - **Commands**: AT command lines written to the modem, terminated by [`LINE_TERMINATOR`]
//!   unless they are followed by a binary payload.
//! - **Tokens**: fixed substrings the driver waits to observe in the reply stream.
//!   None of them overlaps itself, which is what keeps the naive token matcher correct.
//! - **Epoch**: the modem counts time from its own origin, expressed here in Unix seconds.
//!
//! The command/token pairs are case-sensitive and must be sent exactly as listed.

/// Baud rate the modem's serial port runs at.
///
/// The driver does not own the UART; configure it at this rate before
/// handing it to [`SbdDriver::new`](crate::driver::SbdDriver::new).
pub const DATA_RATE: u32 = 19_200;

/// The modem's native time origin, in Unix seconds (2007-03-08 03:50:21 UTC).
pub const MODEM_EPOCH: u64 = 1_173_325_821;

/// Default wait applied to every token match and numeric read, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u32 = 30;

/// Default number of bytes a single token wait may consume before giving up.
pub const DEFAULT_BYTE_BUDGET: u16 = 100;

/// Largest payload the single-byte length header of `AT+SBDWB` can describe.
pub const SBD_MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// Line terminator appended to every command issued with
/// [`CommandChannel::command`](crate::channel::CommandChannel::command).
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Decimal digits needed for the largest `AT+SBDWB` length argument.
pub(crate) const LEN_ARG_DIGITS: usize = 3;

/// Disable command echo.
pub const CMD_ECHO_OFF: &str = "ATE0";
/// Select verbose (textual) result codes.
pub const CMD_VERBOSE_ON: &str = "ATV1";
/// Liveness probe.
pub const CMD_ATTENTION: &str = "AT";
/// Radio on.
pub const CMD_RADIO_ON: &str = "AT*R1";
/// Radio off.
pub const CMD_RADIO_OFF: &str = "AT*R0";
/// Write binary data to the mobile-originated buffer. The decimal length follows.
pub const CMD_WRITE_BINARY: &str = "AT+SBDWB=";
/// Initiate an extended SBD session.
pub const CMD_SESSION: &str = "AT+SBDIX";
/// Query signal quality.
pub const CMD_SIGNAL_QUALITY: &str = "AT+CSQ";
/// Query the network system time.
pub const CMD_SYSTEM_TIME: &str = "AT-MSSTM";

/// Generic success result.
pub const TOKEN_OK: &str = "OK";
/// Modem is ready to accept the binary payload of `AT+SBDWB`.
pub const TOKEN_READY: &str = "READY";
/// Prefix of the `AT+SBDIX` reply, followed by the decimal MO status.
pub const TOKEN_SESSION: &str = "SBDIX: ";
/// Prefix of the `AT+CSQ` reply, followed by the signal bars.
pub const TOKEN_SIGNAL_QUALITY: &str = "CSQ:";
/// Prefix of the `AT-MSSTM` reply, followed by the hexadecimal tick count.
pub const TOKEN_SYSTEM_TIME: &str = "MSSTM: ";
