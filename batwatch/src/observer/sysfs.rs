//! Battery readings from the Linux power-supply sysfs interface.
//!
//! Polls `<base>/<supply>/capacity` and `<base>/<supply>/status` on an
//! interval and publishes into watch channels, so downstream
//! subscribers wake only when a value actually changes. Read failures
//! publish "unknown" rather than erroring; a battery that briefly
//! cannot be read should look like a missing reading, not a fault.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::{BatteryObservation, BatteryObserver, ChargingState, Subscription};
use crate::error::{Error, Result};
use crate::tracing::prelude::*;

const SYSFS_POWER_SUPPLY: &str = "/sys/class/power_supply";
const DEFAULT_SUPPLY: &str = "BAT0";
const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct SysfsConfig {
    pub base_dir: PathBuf,
    /// Power-supply name under the base directory (e.g. "BAT0").
    pub supply: String,
    pub poll_interval: Duration,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(SYSFS_POWER_SUPPLY),
            supply: DEFAULT_SUPPLY.to_string(),
            poll_interval: POLL_INTERVAL,
        }
    }
}

/// Observer backed by the kernel's power-supply class.
pub struct SysfsBatteryObserver {
    level_rx: watch::Receiver<Option<f32>>,
    charging_rx: watch::Receiver<ChargingState>,
    cancel: CancellationToken,
}

impl SysfsBatteryObserver {
    /// Create the observer and spawn its polling task. The task stops
    /// when `cancellation` is cancelled.
    ///
    /// Fails only when the supply does not exist at all; readings that
    /// go missing later degrade to "unknown" instead.
    pub fn spawn(config: SysfsConfig, cancellation: CancellationToken) -> Result<Self> {
        let supply_dir = config.base_dir.join(&config.supply);
        if !supply_dir.exists() {
            return Err(Error::SensorUnavailable(format!(
                "no power supply at {}",
                supply_dir.display()
            )));
        }

        let (level_tx, level_rx) = watch::channel(None);
        let (charging_tx, charging_rx) = watch::channel(ChargingState::Unknown);

        tokio::spawn(poll_task(config, level_tx, charging_tx, cancellation.clone()));

        Ok(Self {
            level_rx,
            charging_rx,
            cancel: cancellation,
        })
    }
}

#[async_trait]
impl BatteryObserver for SysfsBatteryObserver {
    async fn current_level(&self) -> Option<f32> {
        *self.level_rx.borrow()
    }

    async fn charging_state(&self) -> ChargingState {
        *self.charging_rx.borrow()
    }

    fn subscribe_level(&self) -> Subscription<Option<f32>> {
        Subscription::new(self.level_rx.clone(), self.cancel.child_token())
    }

    fn subscribe_charging(&self) -> Subscription<ChargingState> {
        Subscription::new(self.charging_rx.clone(), self.cancel.child_token())
    }
}

async fn poll_task(
    config: SysfsConfig,
    level_tx: watch::Sender<Option<f32>>,
    charging_tx: watch::Sender<ChargingState>,
    cancellation: CancellationToken,
) {
    let supply_dir = config.base_dir.join(&config.supply);

    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancellation.cancelled() => break,
            _ = interval.tick() => {
                let observation = read_supply(&supply_dir).await;
                level_tx.send_if_modified(|level| replace_if_changed(level, observation.level));
                charging_tx.send_if_modified(|state| replace_if_changed(state, observation.charging));
            }
        }
    }

    trace!("Sysfs poll task stopped");
}

fn replace_if_changed<T: PartialEq>(current: &mut T, next: T) -> bool {
    if *current == next {
        false
    } else {
        *current = next;
        true
    }
}

async fn read_supply(dir: &Path) -> BatteryObservation {
    let level = match fs::read_to_string(dir.join("capacity")).await {
        Ok(raw) => parse_capacity(&raw),
        Err(e) => {
            debug!(error = %e, "Capacity read failed");
            None
        }
    };

    let charging = match fs::read_to_string(dir.join("status")).await {
        Ok(raw) => parse_status(&raw),
        Err(e) => {
            debug!(error = %e, "Status read failed");
            ChargingState::Unknown
        }
    };

    BatteryObservation { level, charging }
}

/// Parse the `capacity` attribute (whole percent) into a fraction.
fn parse_capacity(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .map(|pct| pct.min(100) as f32 / 100.0)
}

/// Parse the `status` attribute. A battery reported as `Full` is still
/// on the charger, so it counts as charging.
fn parse_status(raw: &str) -> ChargingState {
    match raw.trim() {
        "Charging" | "Full" => ChargingState::Charging,
        "Discharging" | "Not charging" => ChargingState::NotCharging,
        _ => ChargingState::Unknown,
    }
}
