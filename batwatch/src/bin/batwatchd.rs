//! Battery monitor daemon.
//!
//! Watches the platform battery through sysfs and raises a desktop
//! notification the first time each threshold is crossed in a
//! charge/discharge cycle.

use std::env;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use batwatch::monitor::BatteryMonitor;
use batwatch::notify::{self, DesktopNotifier};
use batwatch::observer::{SysfsBatteryObserver, SysfsConfig};
use batwatch::tracing::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    batwatch::tracing::init();

    let mut config = SysfsConfig::default();
    if let Ok(supply) = env::var("BATWATCH_POWER_SUPPLY") {
        config.supply = supply;
    }

    let running = CancellationToken::new();

    let observer = SysfsBatteryObserver::spawn(config.clone(), running.clone())?;

    let (notify_tx, notify_rx) = mpsc::channel(8);
    let delivery = tokio::spawn(notify::delivery_task(
        notify_rx,
        DesktopNotifier,
        running.clone(),
    ));

    let (monitor, mut display_rx) = BatteryMonitor::new(&observer, notify_tx).await;
    let monitor_task = tokio::spawn(monitor.run(running.clone()));

    // Stand-in for a presentation layer: log the displayed state.
    let display_task = tokio::spawn({
        let running = running.clone();
        async move {
            loop {
                tokio::select! {
                    _ = running.cancelled() => break,
                    changed = display_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snapshot = *display_rx.borrow_and_update();
                        info!(
                            level_pct = ?snapshot.level.map(|l| l.percent()),
                            charging = ?snapshot.charging,
                            "Battery state"
                        );
                    }
                }
            }
        }
    });

    info!(supply = %config.supply, "batwatchd started");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    running.cancel();

    let _ = monitor_task.await;
    let _ = delivery.await;
    let _ = display_task.await;

    Ok(())
}
