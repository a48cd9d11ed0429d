//! Battery observation sources.
//!
//! An observer supplies point-in-time readings and change
//! subscriptions for the two inputs the monitor cares about: charge
//! level and charging status. The monitor treats every change event as
//! a trigger to re-evaluate with the latest known pair, so the two
//! inputs travel over separate subscriptions.

pub mod sysfs;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub use sysfs::{SysfsBatteryObserver, SysfsConfig};

/// Whether the device is currently drawing charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargingState {
    Charging,
    NotCharging,
    Unknown,
}

impl ChargingState {
    /// Collapse to a boolean, if the state is known.
    pub fn known(self) -> Option<bool> {
        match self {
            ChargingState::Charging => Some(true),
            ChargingState::NotCharging => Some(false),
            ChargingState::Unknown => None,
        }
    }
}

/// One snapshot of the battery. `level` is a fraction in [0, 1];
/// `None` means the sensor had no reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryObservation {
    pub level: Option<f32>,
    pub charging: ChargingState,
}

/// Source of battery readings.
///
/// Point-in-time accessors plus individually cancelable change
/// subscriptions. A sensor that cannot report degrades to `None` /
/// [`ChargingState::Unknown`] rather than failing; a missing reading
/// is an expected transient, not an error.
#[async_trait]
pub trait BatteryObserver: Send {
    /// Latest charge level as a fraction in [0, 1], if known.
    async fn current_level(&self) -> Option<f32>;

    /// Latest charging status.
    async fn charging_state(&self) -> ChargingState;

    /// Subscribe to level changes.
    fn subscribe_level(&self) -> Subscription<Option<f32>>;

    /// Subscribe to charging-status changes.
    fn subscribe_charging(&self) -> Subscription<ChargingState>;
}

/// A cancelable stream of values from a battery observer.
///
/// Wakes once per change, carrying the new value. Ends when the
/// source goes away or [`unsubscribe`](Self::unsubscribe) is called.
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
    cancel: CancellationToken,
}

impl<T: Clone> Subscription<T> {
    pub fn new(rx: watch::Receiver<T>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }

    /// Wait for the next change and return the new value. `None` once
    /// the subscription has ended.
    pub async fn changed(&mut self) -> Option<T> {
        tokio::select! {
            // Cancellation wins over a pending value.
            biased;

            _ = self.cancel.cancelled() => None,
            changed = self.rx.changed() => match changed {
                Ok(()) => Some(self.rx.borrow_and_update().clone()),
                Err(_) => None,
            },
        }
    }

    /// Stop the subscription. Pending and future `changed()` calls
    /// resolve to `None`.
    pub fn unsubscribe(&mut self) {
        self.cancel.cancel();
    }
}
