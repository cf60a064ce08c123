//! AT command channel over a byte-oriented serial transport.
//!
//! [`CommandChannel`] writes command lines to the modem and parses its
//! replies straight off the live byte stream, one byte at a time. Every wait
//! is a polling loop bounded by the configured timeout, so no operation can
//! block forever, even if the modem never answers.
//!
//! ## Failure model
//!
//! The modem's reply stream has no error framing. A token that never shows
//! up, a number cut short, or a silent transport all look the same from
//! here: the wait ends at the deadline, a diagnostic line is emitted, and the
//! caller receives `false` or whatever partial value was read. Only a fault
//! reported by the transport itself is returned as an [`Error`].
//!
//! Bytes are never pushed back. After a failed wait the stream position is
//! wherever the timeout or byte budget left it, and callers must not assume
//! the reply stream has been resynchronized.
//!
//! ## Concurrency
//!
//! The channel assumes exactly one exchange in flight. It takes `&mut self`
//! for every operation, so the borrow checker enforces that for you.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal_nb::serial::{ErrorType, Read, Write};
use nb::block;

use crate::clock::Clock;
use crate::config::Config;
use crate::consts::LINE_TERMINATOR;
use crate::diag::{DebugLevel, DebugSink, Diagnostics};
use crate::error::Error;
use crate::matcher::{NumericReader, TokenMatcher};

/// Result type of every channel operation, parameterised over the transport `S`.
pub type ChannelResult<T, S> = Result<T, Error<<S as ErrorType>::Error>>;

/// Issues AT commands and parses replies from the transport.
///
/// ## Type Parameters
///
/// - `S`: the serial transport, implementing [`embedded_hal_nb::serial::Read`] and
///   [`embedded_hal_nb::serial::Write`] for `u8`. `WouldBlock` from `read()`
///   means "no byte available yet".
/// - `C`: the [`Clock`] used for wait deadlines.
/// - `D`: a [`DelayNs`] used to pace polling of an empty transport.
/// - `G`: the [`DebugSink`] behind the diagnostic port.
#[derive(Debug)]
pub struct CommandChannel<S, C, D, G> {
    serial: S,
    clock: C,
    delay: D,
    diag: Diagnostics<G>,
    timeout_secs: u32,
    byte_budget: u16,
    poll_interval_us: u32,
}

impl<S, C, D, G> CommandChannel<S, C, D, G>
where
    S: Read<u8> + Write<u8>,
    C: Clock,
    D: DelayNs,
    G: DebugSink,
{
    /// Creates a channel over `serial` with the settings in `config`.
    pub fn new(serial: S, clock: C, delay: D, sink: G, config: Config) -> Self {
        Self {
            serial,
            clock,
            delay,
            diag: Diagnostics::new(sink, config.debug_level),
            timeout_secs: config.timeout_secs,
            byte_budget: config.byte_budget,
            poll_interval_us: config.poll_interval_us,
        }
    }

    /// Applies the timing and verbosity settings in `config`.
    pub fn apply(&mut self, config: &Config) {
        self.timeout_secs = config.timeout_secs;
        self.byte_budget = config.byte_budget;
        self.poll_interval_us = config.poll_interval_us;
        self.diag.set_level(config.debug_level);
    }

    /// Writes `text` followed by the line terminator.
    pub fn command(&mut self, text: &str) -> ChannelResult<(), S> {
        trace!("-> {}", text);
        self.diag.message(DebugLevel::Echo, format_args!("{}", text));
        self.write_bytes(text.as_bytes())?;
        self.write_bytes(LINE_TERMINATOR)
    }

    /// Writes `text` with no line terminator, for commands whose argument or
    /// payload follows separately.
    pub fn raw(&mut self, text: &str) -> ChannelResult<(), S> {
        trace!("-> {} (unterminated)", text);
        self.diag.message(DebugLevel::Echo, format_args!("{}", text));
        self.write_bytes(text.as_bytes())
    }

    /// Writes raw bytes, blocking until the transport accepts each one.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> ChannelResult<(), S> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// Writes a single raw byte.
    pub fn write_byte(&mut self, byte: u8) -> ChannelResult<(), S> {
        block!(self.serial.write(byte)).map_err(Error::Serial)
    }

    /// Consumes bytes until the most recent ones spell out `token`.
    ///
    /// Returns `true` as soon as the last byte of the token is read, leaving
    /// everything after it unread. Returns `false` once the timeout expires
    /// or the byte budget is spent, whichever comes first; the bytes consumed
    /// up to then are discarded.
    pub fn wait_for(&mut self, token: &str) -> ChannelResult<bool, S> {
        let start = self.clock.now();
        let mut matcher = TokenMatcher::new(token);
        let mut budget = self.byte_budget;

        while !matcher.is_complete() {
            if budget == 0 {
                warn!("byte budget spent waiting for {}", token);
                self.diag.message(
                    DebugLevel::Messages,
                    format_args!(
                        "Gave up waiting for \"{}\" after {} bytes",
                        token, self.byte_budget
                    ),
                );
                return Ok(false);
            }
            match self.next_byte(start)? {
                Some(b) => {
                    budget -= 1;
                    let _ = matcher.feed(b);
                }
                None => {
                    warn!("timed out waiting for {}", token);
                    self.diag.message(
                        DebugLevel::Messages,
                        format_args!("Timed out waiting for \"{}\"", token),
                    );
                    return Ok(false);
                }
            }
        }
        trace!("<- matched {}", token);
        Ok(true)
    }

    /// Reads an unsigned decimal number.
    ///
    /// Stops at the first non-digit, which is consumed and discarded, or at
    /// the timeout. Returns `0` if no digit was read. The value wraps at
    /// 32 bits.
    pub fn read_decimal(&mut self) -> ChannelResult<u32, S> {
        // Truncation keeps the low 32 bits, exactly what a u32 accumulator wraps to.
        self.read_number(NumericReader::decimal())
            .map(|value| value as u32)
    }

    /// Reads an unsigned hexadecimal number (either case).
    ///
    /// Same termination rules as [`read_decimal`](Self::read_decimal), with a
    /// 64-bit accumulator.
    pub fn read_hex(&mut self) -> ChannelResult<u64, S> {
        self.read_number(NumericReader::hex())
    }

    fn read_number(&mut self, mut reader: NumericReader) -> ChannelResult<u64, S> {
        let start = self.clock.now();
        loop {
            match self.next_byte(start)? {
                Some(b) if reader.feed(b) => {}
                Some(_) => break,
                None => {
                    warn!("timed out reading a number, keeping {}", reader.value());
                    self.diag.message(
                        DebugLevel::Messages,
                        format_args!("Timed out reading a number"),
                    );
                    break;
                }
            }
        }
        trace!("<- number {}", reader.value());
        Ok(reader.value())
    }

    /// Discards every byte the transport has already buffered.
    ///
    /// Does not wait for more. Returns how many bytes were dropped.
    pub fn flush_input(&mut self) -> ChannelResult<usize, S> {
        let mut dropped = 0;
        while self.poll_byte()?.is_some() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!("flushed {} unread bytes", dropped);
        }
        Ok(dropped)
    }

    /// Polls the transport until a byte arrives or the deadline measured from
    /// `start` passes.
    fn next_byte(&mut self, start: u64) -> ChannelResult<Option<u8>, S> {
        loop {
            if self.expired(start) {
                return Ok(None);
            }
            if let Some(b) = self.poll_byte()? {
                return Ok(Some(b));
            }
            if self.poll_interval_us > 0 {
                self.delay.delay_us(self.poll_interval_us);
            }
        }
    }

    fn poll_byte(&mut self) -> ChannelResult<Option<u8>, S> {
        match self.serial.read() {
            Ok(b) => {
                self.diag.echo(b);
                Ok(Some(b))
            }
            Err(nb::Error::WouldBlock) => Ok(None),
            Err(nb::Error::Other(e)) => Err(Error::Serial(e)),
        }
    }

    fn expired(&mut self, start: u64) -> bool {
        self.clock.now().saturating_sub(start) > u64::from(self.timeout_secs)
    }

    /// Emits a diagnostic line if the port is at least as verbose as `level`.
    pub fn debug(&mut self, level: DebugLevel, args: fmt::Arguments<'_>) {
        self.diag.message(level, args);
    }

    /// Current per-reply timeout, in seconds.
    pub fn timeout(&self) -> u32 {
        self.timeout_secs
    }

    /// Changes the per-reply timeout. Only call between exchanges.
    pub fn set_timeout(&mut self, secs: u32) {
        self.timeout_secs = secs;
    }

    /// Current diagnostic verbosity.
    pub fn debug_level(&self) -> DebugLevel {
        self.diag.level()
    }

    /// Changes the diagnostic verbosity.
    pub fn set_debug_level(&mut self, level: DebugLevel) {
        self.diag.set_level(level);
    }

    /// The diagnostic port.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics<G> {
        &mut self.diag
    }

    /// The clock used for deadlines and time sync.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// The underlying transport.
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Tears the channel down into its parts.
    pub fn release(self) -> (S, C, D, G) {
        (self.serial, self.clock, self.delay, self.diag.into_sink())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::FmtSink;
    use crate::testing::{CountingDelay, ScriptedSerial, SteppingClock};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_nb::serial::ErrorKind;

    type TestChannel<G = ()> = CommandChannel<ScriptedSerial, SteppingClock, NoopDelay, G>;

    fn channel(reply: &[u8]) -> TestChannel {
        CommandChannel::new(
            ScriptedSerial::replying(reply),
            SteppingClock::new(0, 1_000),
            NoopDelay::new(),
            (),
            Config::default().with_timeout(2),
        )
    }

    #[test]
    fn test_command_appends_line_terminator() {
        let mut ch = channel(b"");
        ch.command("AT+CSQ").unwrap();
        assert_eq!(ch.serial_mut().tx, b"AT+CSQ\r\n");
    }

    #[test]
    fn test_raw_has_no_terminator() {
        let mut ch = channel(b"");
        ch.raw("AT+SBDWB=").unwrap();
        assert_eq!(ch.serial_mut().tx, b"AT+SBDWB=");
    }

    #[test]
    fn test_wait_for_consumes_through_last_matched_byte() {
        let mut ch = channel(b"\r\nATV1\r\nOK\r\nrest");
        assert!(ch.wait_for("OK").unwrap());
        assert_eq!(ch.serial_mut().unread(), b"\r\nrest");
    }

    #[test]
    fn test_wait_for_succeeds_once() {
        let mut ch = channel(b"OK OK");
        assert!(ch.wait_for("OK").unwrap());
        assert!(ch.wait_for("OK").unwrap());
        assert!(!ch.wait_for("OK").unwrap());
    }

    #[test]
    fn test_wait_for_times_out_on_silent_transport() {
        let mut ch = channel(b"");
        assert!(!ch.wait_for("READY").unwrap());
        // 2 second timeout, expiry once more than 2 seconds have elapsed.
        assert_eq!(ch.clock_mut().now, 3);
    }

    #[test]
    fn test_wait_for_returns_in_real_time() {
        let mut ch = CommandChannel::new(
            ScriptedSerial::default(),
            crate::clock::StdClock::default(),
            NoopDelay::new(),
            (),
            Config::default().with_timeout(1),
        );
        let started = std::time::Instant::now();
        assert!(!ch.wait_for("OK").unwrap());
        assert!(started.elapsed() < std::time::Duration::from_secs(3));
    }

    #[test]
    fn test_wait_for_gives_up_when_budget_is_spent() {
        let noise = [b'x'; 150];
        let mut ch = channel(&noise);
        assert!(!ch.wait_for("OK").unwrap());
        assert_eq!(ch.serial_mut().unread().len(), 50);
    }

    #[test]
    fn test_budget_is_configurable() {
        let mut ch = channel(b"0123456789OK");
        ch.apply(&Config::default().with_byte_budget(11));
        assert!(!ch.wait_for("OK").unwrap());
        assert_eq!(ch.serial_mut().unread(), b"K");
    }

    #[test]
    fn test_read_decimal_discards_terminator() {
        let mut ch = channel(b"123X9");
        assert_eq!(ch.read_decimal().unwrap(), 123);
        // 'X' ended the number and is gone; the next read starts at '9'.
        assert_eq!(ch.serial_mut().unread(), b"9");
        assert_eq!(ch.read_decimal().unwrap(), 9);
    }

    #[test]
    fn test_read_decimal_wraps_at_32_bits() {
        let mut ch = channel(b"4294967297\r");
        assert_eq!(ch.read_decimal().unwrap(), 1);
    }

    #[test]
    fn test_read_hex_mixed_case() {
        let mut ch = channel(b"1a2B\r\n");
        assert_eq!(ch.read_hex().unwrap(), 0x1a2b);
        assert_eq!(ch.serial_mut().unread(), b"\n");
    }

    #[test]
    fn test_read_number_keeps_partial_value_on_timeout() {
        let mut ch = channel(b"42");
        assert_eq!(ch.read_decimal().unwrap(), 42);
        let mut ch = channel(b"");
        assert_eq!(ch.read_hex().unwrap(), 0);
    }

    #[test]
    fn test_flush_input_drains_without_waiting() {
        let mut ch = channel(b"\r\nOK\r\n");
        assert_eq!(ch.flush_input().unwrap(), 6);
        assert!(ch.serial_mut().unread().is_empty());
        assert_eq!(ch.flush_input().unwrap(), 0);
    }

    #[test]
    fn test_transport_fault_is_an_error() {
        let mut ch = channel(b"OK");
        ch.serial_mut().fail_reads = true;
        assert_eq!(ch.wait_for("OK"), Err(Error::Serial(ErrorKind::Overrun)));
        assert_eq!(ch.read_decimal(), Err(Error::Serial(ErrorKind::Overrun)));
    }

    #[test]
    fn test_echo_level_mirrors_traffic() {
        let mut ch: TestChannel<FmtSink<String>> = CommandChannel::new(
            ScriptedSerial::replying(b"\r\nOK"),
            SteppingClock::frozen(0),
            NoopDelay::new(),
            FmtSink::new(String::new()),
            Config::default().with_debug_level(DebugLevel::Echo),
        );
        ch.command("AT").unwrap();
        assert!(ch.wait_for("OK").unwrap());
        let (_, _, _, sink) = ch.release();
        assert_eq!(sink.into_inner(), "AT\r\n\r\nOK");
    }

    #[test]
    fn test_timeout_is_reported_at_message_level() {
        let mut ch: TestChannel<FmtSink<String>> = CommandChannel::new(
            ScriptedSerial::default(),
            SteppingClock::new(0, 1),
            NoopDelay::new(),
            FmtSink::new(String::new()),
            Config::default()
                .with_timeout(1)
                .with_debug_level(DebugLevel::Messages),
        );
        ch.command("AT").unwrap();
        assert!(!ch.wait_for("OK").unwrap());
        assert_eq!(ch.debug_level(), DebugLevel::Messages);
        let (_, _, _, sink) = ch.release();
        assert_eq!(sink.into_inner(), "Timed out waiting for \"OK\"\r\n");
    }

    #[test]
    fn test_poll_interval_paces_empty_polls() {
        let mut ch = CommandChannel::new(
            ScriptedSerial::default(),
            SteppingClock::new(0, 5),
            CountingDelay::default(),
            (),
            Config::default().with_timeout(1).with_poll_interval_us(100),
        );
        assert!(!ch.wait_for("OK").unwrap());
        let (_, _, delay, _) = ch.release();
        assert!(delay.calls > 0);
        assert_eq!(delay.total_ns, u64::from(delay.calls) * 100_000);
    }

    #[test]
    fn test_runtime_settings() {
        let mut ch = channel(b"");
        assert_eq!(ch.timeout(), 2);
        ch.set_timeout(45);
        assert_eq!(ch.timeout(), 45);
        ch.set_debug_level(DebugLevel::Echo);
        assert_eq!(ch.diagnostics_mut().level(), DebugLevel::Echo);
    }
}
