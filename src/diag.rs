//! Human-readable trace output for commands and modem replies.
//!
//! The diagnostic port is separate from the crate's structured logging: it
//! mirrors the AT conversation to a sink chosen by the application (often a
//! second UART), gated by a [`DebugLevel`]. Nothing written here affects the
//! protocol, and a sink that drops output is never an error.

use core::fmt::{self, Write};

/// Verbosity of the diagnostic port.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DebugLevel {
    /// No diagnostic output.
    #[default]
    Silent = 0,
    /// Driver messages such as timeouts and failed time syncs.
    Messages = 1,
    /// Messages, every command written, and every byte read echoed raw.
    Echo = 2,
}

impl From<u8> for DebugLevel {
    fn from(level: u8) -> Self {
        match level {
            0 => DebugLevel::Silent,
            1 => DebugLevel::Messages,
            _ => DebugLevel::Echo,
        }
    }
}

/// Destination for diagnostic output.
pub trait DebugSink {
    /// Writes one line of text.
    fn line(&mut self, args: fmt::Arguments<'_>);

    /// Echoes a single raw byte received from the modem.
    fn echo(&mut self, byte: u8);
}

/// Discards everything.
impl DebugSink for () {
    fn line(&mut self, _args: fmt::Arguments<'_>) {}

    fn echo(&mut self, _byte: u8) {}
}

/// Adapts any [`core::fmt::Write`] (a debug UART, a `String`) into a [`DebugSink`].
///
/// Lines are terminated with `\r\n`. Echoed bytes are written as the
/// corresponding `char`.
#[derive(Debug, Default)]
pub struct FmtSink<W: Write> {
    /// The wrapped writer.
    pub inner: W,
}

impl<W: Write> FmtSink<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> DebugSink for FmtSink<W> {
    fn line(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.inner.write_fmt(args);
        let _ = self.inner.write_str("\r\n");
    }

    fn echo(&mut self, byte: u8) {
        let _ = self.inner.write_char(char::from(byte));
    }
}

/// Forwards diagnostic lines to the `log` crate at debug level.
///
/// Echoed bytes are forwarded at trace level, one record per byte.
#[cfg(feature = "log")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[cfg(feature = "log")]
impl DebugSink for LogSink {
    fn line(&mut self, args: fmt::Arguments<'_>) {
        log::debug!(target: "sbd9612::diag", "{}", args);
    }

    fn echo(&mut self, byte: u8) {
        log::trace!(target: "sbd9612::diag", "{:?}", char::from(byte));
    }
}

/// A [`DebugSink`] paired with the level that gates it.
#[derive(Debug)]
pub struct Diagnostics<G> {
    level: DebugLevel,
    sink: G,
}

impl<G: DebugSink> Diagnostics<G> {
    /// Creates a port writing to `sink` at `level`.
    pub fn new(sink: G, level: DebugLevel) -> Self {
        Self { level, sink }
    }

    /// Current verbosity.
    pub fn level(&self) -> DebugLevel {
        self.level
    }

    /// Changes the verbosity.
    pub fn set_level(&mut self, level: DebugLevel) {
        self.level = level;
    }

    /// Replaces the sink, returning the old one.
    pub fn replace_sink(&mut self, sink: G) -> G {
        core::mem::replace(&mut self.sink, sink)
    }

    /// Mutable access to the sink.
    pub fn sink_mut(&mut self) -> &mut G {
        &mut self.sink
    }

    /// Emits a line if the port is at least as verbose as `level`.
    pub fn message(&mut self, level: DebugLevel, args: fmt::Arguments<'_>) {
        if level != DebugLevel::Silent && self.level >= level {
            self.sink.line(args);
        }
    }

    /// Echoes a received byte when raw echo is enabled.
    pub fn echo(&mut self, byte: u8) {
        if self.level >= DebugLevel::Echo {
            self.sink.echo(byte);
        }
    }

    pub(crate) fn into_sink(self) -> G {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(DebugLevel::Silent < DebugLevel::Messages);
        assert!(DebugLevel::Messages < DebugLevel::Echo);
        assert_eq!(DebugLevel::from(0), DebugLevel::Silent);
        assert_eq!(DebugLevel::from(1), DebugLevel::Messages);
        assert_eq!(DebugLevel::from(7), DebugLevel::Echo);
    }

    #[test]
    fn test_silent_port_writes_nothing() {
        let mut diag = Diagnostics::new(FmtSink::new(String::new()), DebugLevel::Silent);
        diag.message(DebugLevel::Messages, format_args!("hello"));
        diag.echo(b'x');
        assert!(diag.into_sink().into_inner().is_empty());
    }

    #[test]
    fn test_message_level_gates_echo() {
        let mut diag = Diagnostics::new(FmtSink::new(String::new()), DebugLevel::Messages);
        diag.message(DebugLevel::Messages, format_args!("timed out after {}s", 30));
        diag.message(DebugLevel::Echo, format_args!("AT+CSQ"));
        diag.echo(b'O');
        assert_eq!(diag.into_sink().into_inner(), "timed out after 30s\r\n");
    }

    #[test]
    fn test_echo_level_writes_everything() {
        let mut diag = Diagnostics::new(FmtSink::new(String::new()), DebugLevel::Echo);
        diag.message(DebugLevel::Echo, format_args!("AT"));
        diag.echo(b'O');
        diag.echo(b'K');
        assert_eq!(diag.into_sink().into_inner(), "AT\r\nOK");
    }
}
