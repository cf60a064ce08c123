//! # sbd9612
//!
//! A portable, no_std Rust driver for Iridium short-burst-data (SBD) satellite modems,
//! such as the Quake 9612 and the Iridium 9602/9603, reachable over a plain UART.
//!
//! This driver talks the modem's AT-command dialect using:
//! - `embedded-hal-nb` serial traits for the byte transport
//! - a pluggable [`Clock`](clock::Clock) for wait deadlines and network time sync
//! - `embedded-hal` `DelayNs` to pace polling of an idle UART
//! - an optional diagnostic port mirroring the AT conversation
//!
//! ## Crate features
//! | Feature     | Description |
//! |-------------|-------------|
//! | `std`       | Disables `#![no_std]` and enables [`StdClock`](clock::StdClock) |
//! | `defmt-0-3` | Uses `defmt` logging |
//! | `log`       | Uses `log` logging and enables [`LogSink`](diag::LogSink) |
//!
//! ## Software Features
//!
//! - **Buffer loading** with the `AT+SBDWB` length/payload/checksum protocol
//! - **SBD sessions** (`AT+SBDIX`) returning the raw modem status code
//! - **Signal quality** (`AT+CSQ`) and radio power control (`AT*R1`/`AT*R0`)
//! - **Network time** (`AT-MSSTM`) converted to Unix seconds and applied to the local clock
//! - Every wait bounded by a timeout; no call can hang on a silent modem
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sbd9612::{config::Config, driver::SbdDriver};
//!
//! let mut modem = SbdDriver::new(uart, clock, delay, (), Config::default());
//! modem.begin()?;
//! modem.load_buffer(b"hello from orbit")?;
//! let status = modem.conduct_session()?;
//! if status <= 4 {
//!     // message delivered to the gateway
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - Configure the UART at [`DATA_RATE`](consts::DATA_RATE) (19200 baud, 8N1) before handing it over
//! - Timeouts are soft: they produce `false`/zero results and a diagnostic line, never an error
//! - Exactly one command/response exchange may be in flight; all methods take `&mut self`
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

pub use embedded_hal_nb;

#[macro_use]
mod fmt;

mod buffer;
pub mod channel;
pub mod checksum;
pub mod clock;
pub mod config;
pub mod consts;
pub mod diag;
pub mod driver;
pub mod error;
pub mod matcher;
pub mod timesync;

#[cfg(test)]
pub(crate) mod testing;
