//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The battery sensor could not be read. Treated as a transient by
    /// the monitor, which degrades to an "unknown" reading rather than
    /// failing.
    #[error("battery sensor unavailable: {0}")]
    SensorUnavailable(String),

    /// A notification could not be handed to the platform. The monitor
    /// does not retry; the alert is lost until the next cycle.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}
