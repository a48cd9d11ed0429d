//! Tracing setup and the macro prelude used throughout the crate.

use tracing_subscriber::EnvFilter;

/// Import as `use crate::tracing::prelude::*;` to get the usual macros.
pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

/// Initialize the global subscriber. Honors `RUST_LOG`, defaulting to
/// `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .init();
}
