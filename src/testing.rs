//! Fakes shared by the unit tests.
//!
//! `embedded-hal-mock` covers exact wire traffic, but its serial mock cannot
//! stall. These fakes can: an exhausted [`ScriptedSerial`] reports
//! `WouldBlock` forever, and [`SteppingClock`] advances one second every few
//! reads so deadlines expire without sleeping.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use embedded_hal_nb::serial::{ErrorKind, ErrorType, Read, Write};

use crate::clock::Clock;

#[derive(Debug, Default)]
pub(crate) struct ScriptedSerial {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub fail_reads: bool,
}

impl ScriptedSerial {
    pub fn replying(reply: &[u8]) -> Self {
        Self {
            rx: reply.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn unread(&self) -> Vec<u8> {
        self.rx.iter().copied().collect()
    }
}

impl ErrorType for ScriptedSerial {
    type Error = ErrorKind;
}

impl Read<u8> for ScriptedSerial {
    fn read(&mut self) -> nb::Result<u8, ErrorKind> {
        if self.fail_reads {
            return Err(nb::Error::Other(ErrorKind::Overrun));
        }
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl Write<u8> for ScriptedSerial {
    fn write(&mut self, word: u8) -> nb::Result<(), ErrorKind> {
        self.tx.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), ErrorKind> {
        Ok(())
    }
}

/// Advances by one second every `reads_per_sec` calls to `now()`.
#[derive(Debug)]
pub(crate) struct SteppingClock {
    pub now: u64,
    pub reads_per_sec: u32,
    pub reads: u32,
    pub sets: Vec<u64>,
}

impl SteppingClock {
    pub fn new(start: u64, reads_per_sec: u32) -> Self {
        Self {
            now: start,
            reads_per_sec,
            reads: 0,
            sets: Vec::new(),
        }
    }

    /// A clock that effectively never advances during a test.
    pub fn frozen(start: u64) -> Self {
        Self::new(start, u32::MAX)
    }
}

impl Clock for SteppingClock {
    fn now(&mut self) -> u64 {
        self.reads += 1;
        if self.reads >= self.reads_per_sec {
            self.reads = 0;
            self.now += 1;
        }
        self.now
    }

    fn set_time(&mut self, unix_secs: u64) {
        self.sets.push(unix_secs);
        self.now = unix_secs;
    }
}

#[derive(Debug, Default)]
pub(crate) struct CountingDelay {
    pub total_ns: u64,
    pub calls: u32,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }
}
