//! Wall-clock abstraction used for wait deadlines and network time sync.
//!
//! The driver only needs seconds resolution. Waits compare elapsed seconds
//! against the configured timeout, so a [`Clock`] must not jump while an
//! exchange is outstanding; [`SbdDriver::get_time`](crate::driver::SbdDriver::get_time)
//! only calls [`Clock::set_time`] between exchanges.

/// A settable clock counting Unix seconds.
pub trait Clock {
    /// Current time in seconds since the Unix epoch.
    fn now(&mut self) -> u64;

    /// Sets the current time, in seconds since the Unix epoch.
    fn set_time(&mut self, unix_secs: u64);
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&mut self) -> u64 {
        (**self).now()
    }

    fn set_time(&mut self, unix_secs: u64) {
        (**self).set_time(unix_secs)
    }
}

/// A [`Clock`] backed by [`std::time::Instant`].
///
/// Between calls to [`set_time`](Clock::set_time) it advances monotonically
/// from the last value set, starting at zero.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    base: std::time::Instant,
    base_secs: u64,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Creates a clock reading `unix_secs` now.
    pub fn starting_at(unix_secs: u64) -> Self {
        Self {
            base: std::time::Instant::now(),
            base_secs: unix_secs,
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::starting_at(0)
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&mut self) -> u64 {
        self.base_secs + self.base.elapsed().as_secs()
    }

    fn set_time(&mut self, unix_secs: u64) {
        *self = Self::starting_at(unix_secs);
    }
}
