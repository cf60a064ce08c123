//! Hard errors reported by the driver.
//!
//! Timeouts and unexpected replies are *not* errors: the modem's serial
//! protocol has no error framing, so those surface as `false` or zero
//! results plus a diagnostic line. Only transport faults and requests the
//! protocol cannot express are reported here.

use crate::consts::SBD_MAX_PAYLOAD_LEN;

/// Driver error, generic over the transport's error type `E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error<E> {
    /// The serial transport reported a fault while reading or writing.
    #[error("serial transport error: {0:?}")]
    Serial(E),
    /// The payload does not fit the single-byte length header of `AT+SBDWB`.
    #[error("payload of {0} bytes exceeds the {max} byte SBD buffer", max = SBD_MAX_PAYLOAD_LEN)]
    PayloadTooLarge(usize),
}
