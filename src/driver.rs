//! Short-burst-data modem driver for the Iridium 9602/9612 family.
//!
//! This module provides the [`SbdDriver`] struct, which sequences the AT
//! commands needed to bring the modem up, load a message, run an SBD session,
//! query signal quality and read network time. All parsing happens in the
//! [`CommandChannel`] it owns; the driver only decides what to send and what
//! to wait for.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::serial::{Mock as SerialMock, Transaction as SerialTransaction};
//! use sbd9612::clock::StdClock;
//! use sbd9612::config::Config;
//! use sbd9612::driver::SbdDriver;
//!
//! fn main() {
//!     # let mut serial = SerialMock::new(&[
//!     #     SerialTransaction::write_many(b"AT+CSQ\r\n"),
//!     #     SerialTransaction::read_many(b"\r\n+CSQ:4\r"),
//!     # ]);
//!     # let uart = serial.clone();
//!     let mut modem = SbdDriver::new(uart, StdClock::default(), NoopDelay::new(), (), Config::default());
//!
//!     let bars = modem.signal_strength().unwrap();
//!     # assert_eq!(bars, 4);
//!     # serial.done();
//! }
//! ```
//!
//! ## Design Notes
//!
//! The driver is strictly request/response: one exchange at a time, each
//! bounded by the channel's timeout. Nothing runs in the background, and
//! there is no shutdown step; dropping the driver (or calling
//! [`release`](SbdDriver::release)) hands the transport back.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal_nb::serial::{Read, Write};

use crate::channel::{ChannelResult, CommandChannel};
use crate::clock::Clock;
use crate::config::Config;
use crate::consts::{
    CMD_ATTENTION, CMD_ECHO_OFF, CMD_RADIO_OFF, CMD_RADIO_ON, CMD_SESSION, CMD_SIGNAL_QUALITY,
    CMD_VERBOSE_ON, DATA_RATE, MODEM_EPOCH, TOKEN_OK, TOKEN_SESSION, TOKEN_SIGNAL_QUALITY,
};
use crate::diag::{DebugLevel, DebugSink};

/// Initialization progress of an [`SbdDriver`].
///
/// [`SbdDriver::begin`] walks the states in order. [`Ready`](SbdState::Ready)
/// is terminal: there is no shutdown transition.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum SbdState {
    /// Constructed, no command sent yet.
    #[default]
    Uninitialized,
    /// Settings applied; `ATE0` is being sent to turn command echo off.
    EchoDisabling,
    /// `ATV1` is being sent to select verbose result codes.
    VerboseEnabling,
    /// Handshake finished and the local clock seeded.
    Ready,
}

/// An AT-command driver for an SBD satellite modem.
///
/// ## Type Parameters
///
/// - `S`: serial transport (`embedded_hal_nb::serial::Read<u8> + Write<u8>`)
///   already configured at [`DATA_RATE`] baud
/// - `C`: wall [`Clock`], used for deadlines and set by network time sync
/// - `D`: delay used to pace polling, see [`Config::poll_interval_us`]
/// - `G`: [`DebugSink`] for the diagnostic port, `()` to discard
///
/// ## Notes
///
/// - Every method blocks until its reply arrives or the timeout passes.
/// - Timeouts are not errors. Interpret zero or `false` results as failure
///   in your own retry logic; [`Error`](crate::error::Error) is only returned
///   for transport faults and oversize payloads.
#[derive(Debug)]
pub struct SbdDriver<S, C, D, G> {
    /// The command channel talking to the modem.
    pub channel: CommandChannel<S, C, D, G>,
    config: Config,
    state: SbdState,
}

impl<S, C, D, G> SbdDriver<S, C, D, G>
where
    S: Read<u8> + Write<u8>,
    C: Clock,
    D: DelayNs,
    G: DebugSink,
{
    /// Creates a driver over `serial`. Nothing is sent until [`begin`](Self::begin).
    ///
    /// # Arguments
    /// - `serial`: the UART connected to the modem, configured at [`DATA_RATE`] baud.
    /// - `clock`: the wall clock to time waits against and to synchronize.
    /// - `delay`: paces polling of an empty UART.
    /// - `sink`: destination of the diagnostic port.
    /// - `config`: settings applied by `begin`.
    pub fn new(serial: S, clock: C, delay: D, sink: G, config: Config) -> Self {
        Self {
            channel: CommandChannel::new(serial, clock, delay, sink, config),
            config,
            state: SbdState::Uninitialized,
        }
    }

    /// Current initialization state.
    pub fn state(&self) -> SbdState {
        self.state
    }

    /// Brings the modem into a known state.
    ///
    /// Applies the driver's [`Config`], turns command echo off (`ATE0`),
    /// selects verbose result codes (`ATV1`) and seeds the local clock with
    /// [`MODEM_EPOCH`]. The state advances to [`SbdState::Ready`] even when
    /// a handshake goes unanswered.
    ///
    /// # Returns
    /// - `true`: both handshakes were acknowledged with `OK`
    /// - `false`: at least one timed out; the modem may still echo commands
    ///   or reply in numeric mode
    pub fn begin(&mut self) -> ChannelResult<bool, S> {
        self.channel.apply(&self.config);
        self.state = SbdState::EchoDisabling;
        debug!(
            "bringing modem up at {} baud, timeout {}s",
            DATA_RATE,
            self.config.timeout_secs
        );

        self.channel.command(CMD_ECHO_OFF)?;
        let echo_off = self.channel.wait_for(TOKEN_OK)?;
        self.state = SbdState::VerboseEnabling;

        self.channel.command(CMD_VERBOSE_ON)?;
        let verbose = self.channel.wait_for(TOKEN_OK)?;

        self.channel.clock_mut().set_time(MODEM_EPOCH);
        self.state = SbdState::Ready;

        if !(echo_off && verbose) {
            warn!(
                "modem init incomplete (echo off: {}, verbose: {})",
                echo_off,
                verbose
            );
        }
        Ok(echo_off && verbose)
    }

    /// Runs an SBD session (`AT+SBDIX`): sends the loaded message, if any,
    /// and checks the mailbox.
    ///
    /// # Returns
    /// The mobile-originated status code exactly as the modem reports it.
    /// Codes 0-4 mean the message went out; see the modem's AT reference for
    /// the rest. `0` is also what a timed-out session yields.
    pub fn conduct_session(&mut self) -> ChannelResult<u32, S> {
        self.channel.command(CMD_SESSION)?;
        let _ = self.channel.wait_for(TOKEN_SESSION)?;
        let status = self.channel.read_decimal()?;
        debug!("SBD session finished with status {}", status);
        Ok(status)
    }

    /// Sends the loaded message. Currently the same as
    /// [`conduct_session`](Self::conduct_session).
    pub fn send(&mut self) -> ChannelResult<u32, S> {
        self.conduct_session()
    }

    /// Queries signal quality (`AT+CSQ`).
    ///
    /// # Returns
    /// Signal bars, `0` (no signal) to `5`.
    pub fn signal_strength(&mut self) -> ChannelResult<u32, S> {
        self.channel.command(CMD_SIGNAL_QUALITY)?;
        let _ = self.channel.wait_for(TOKEN_SIGNAL_QUALITY)?;
        self.channel.read_decimal()
    }

    /// Switches the radio on (`AT*R1`) or off (`AT*R0`). The reply is not checked.
    pub fn set_radio(&mut self, on: bool) -> ChannelResult<(), S> {
        self.channel
            .command(if on { CMD_RADIO_ON } else { CMD_RADIO_OFF })
    }

    /// Liveness probe (`AT`). Returns whether the modem answered `OK`.
    pub fn attention(&mut self) -> ChannelResult<bool, S> {
        self.channel.command(CMD_ATTENTION)?;
        self.channel.wait_for(TOKEN_OK)
    }

    /// Changes the per-reply timeout, in seconds.
    pub fn set_timeout(&mut self, secs: u32) {
        self.config.timeout_secs = secs;
        self.channel.set_timeout(secs);
    }

    /// Changes the diagnostic verbosity.
    pub fn set_debug_level(&mut self, level: DebugLevel) {
        self.config.debug_level = level;
        self.channel.set_debug_level(level);
    }

    /// Routes diagnostics to `sink` at full verbosity ([`DebugLevel::Echo`]).
    ///
    /// # Returns
    /// The sink previously in use.
    pub fn enable_debug(&mut self, sink: G) -> G {
        self.set_debug_level(DebugLevel::Echo);
        self.channel.diagnostics_mut().replace_sink(sink)
    }

    /// Silences the diagnostic port.
    pub fn disable_debug(&mut self) {
        self.set_debug_level(DebugLevel::Silent);
    }

    /// Writes a line to the diagnostic port at [`DebugLevel::Messages`].
    pub fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.channel.debug(DebugLevel::Messages, args);
    }

    /// Writes a line to the diagnostic port if it is at least as verbose as `level`.
    pub fn debug_at(&mut self, level: DebugLevel, args: fmt::Arguments<'_>) {
        self.channel.debug(level, args);
    }

    /// Releases the transport, clock, delay and sink.
    pub fn release(self) -> (S, C, D, G) {
        self.channel.release()
    }
}
