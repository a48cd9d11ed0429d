//! Battery threshold monitor.
//!
//! Watches a battery's charge level and charging status and raises a
//! desktop notification the first time each of three conditions becomes
//! true within a charge/discharge cycle: charge low, charge full while
//! plugged in, and charge at the recommended unplug level while plugged
//! in. The [`monitor`] module holds the threshold state machine; the
//! [`observer`] module supplies readings; the [`notify`] module
//! delivers alerts.

pub mod error;
pub mod monitor;
pub mod notify;
pub mod observer;
pub mod tracing;
