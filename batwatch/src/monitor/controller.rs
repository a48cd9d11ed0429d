//! Event-driven battery monitor.

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::display::{BatteryDisplay, DisplayedLevel};
use super::thresholds::ThresholdState;
use crate::notify::NotificationRequest;
use crate::observer::{BatteryObserver, ChargingState, Subscription};
use crate::tracing::prelude::*;

/// Owns the threshold state for one monitoring session.
///
/// Wakes once per level or charging change, re-evaluates with the
/// latest known pair (not necessarily the value carried by the waking
/// event, since both halves must be current), and queues any resulting
/// notification requests. Also publishes a [`BatteryDisplay`] snapshot
/// for the presentation layer.
///
/// Requests are dispatched fire-and-forget; the threshold flags are
/// set when the monitor decides to emit, not after confirmed delivery.
pub struct BatteryMonitor {
    level_sub: Subscription<Option<f32>>,
    charging_sub: Subscription<ChargingState>,
    level: Option<f32>,
    charging: ChargingState,
    thresholds: ThresholdState,
    display_tx: watch::Sender<BatteryDisplay>,
    notify_tx: mpsc::Sender<NotificationRequest>,
}

impl BatteryMonitor {
    /// Build a monitor subscribed to `observer`, with fresh threshold
    /// state. Returns the monitor and the display handle the
    /// presentation layer watches.
    pub async fn new(
        observer: &impl BatteryObserver,
        notify_tx: mpsc::Sender<NotificationRequest>,
    ) -> (Self, watch::Receiver<BatteryDisplay>) {
        let level_sub = observer.subscribe_level();
        let charging_sub = observer.subscribe_charging();
        let level = observer.current_level().await;
        let charging = observer.charging_state().await;

        let (display_tx, display_rx) = watch::channel(BatteryDisplay::default());

        let monitor = Self {
            level_sub,
            charging_sub,
            level,
            charging,
            thresholds: ThresholdState::new(),
            display_tx,
            notify_tx,
        };

        (monitor, display_rx)
    }

    /// Run until cancelled or the observer goes away, then tear down
    /// the session: both subscriptions are dropped before the
    /// threshold state.
    pub async fn run(mut self, cancellation: CancellationToken) {
        // The initial readings may already sit past a threshold.
        self.step().await;

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => break,
                changed = self.level_sub.changed() => match changed {
                    Some(level) => {
                        self.level = level;
                        self.step().await;
                    }
                    None => break,
                },
                changed = self.charging_sub.changed() => match changed {
                    Some(state) => {
                        self.charging = state;
                        self.step().await;
                    }
                    None => break,
                },
            }
        }

        self.level_sub.unsubscribe();
        self.charging_sub.unsubscribe();
        trace!("Battery monitor stopped");
    }

    /// One evaluation step over the latest known pair.
    async fn step(&mut self) {
        let displayed = self.level.and_then(DisplayedLevel::from_fraction);
        let charging = self.charging.known();

        self.display_tx.send_if_modified(|display| {
            let next = BatteryDisplay {
                level: displayed,
                charging,
            };
            if *display == next {
                false
            } else {
                *display = next;
                true
            }
        });

        // Rules compare against both halves; wait until the charging
        // status is known.
        let Some(charging) = charging else {
            debug!(level = ?displayed, "Charging status unknown, skipping evaluation");
            return;
        };

        let requests = self.thresholds.evaluate(displayed, charging);

        debug!(
            level = ?displayed,
            charging,
            state = ?self.thresholds,
            emitted = requests.len(),
            "Evaluation step"
        );

        for request in requests {
            info!(title = %request.title, level = ?displayed, charging, "Threshold crossed");
            if self.notify_tx.send(request).await.is_err() {
                debug!("Notification channel closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct TestObserver {
        level_tx: watch::Sender<Option<f32>>,
        charging_tx: watch::Sender<ChargingState>,
        cancel: CancellationToken,
    }

    impl TestObserver {
        fn new() -> Self {
            Self {
                level_tx: watch::channel(None).0,
                charging_tx: watch::channel(ChargingState::Unknown).0,
                cancel: CancellationToken::new(),
            }
        }
    }

    #[async_trait]
    impl BatteryObserver for TestObserver {
        async fn current_level(&self) -> Option<f32> {
            *self.level_tx.borrow()
        }

        async fn charging_state(&self) -> ChargingState {
            *self.charging_tx.borrow()
        }

        fn subscribe_level(&self) -> Subscription<Option<f32>> {
            Subscription::new(self.level_tx.subscribe(), self.cancel.child_token())
        }

        fn subscribe_charging(&self) -> Subscription<ChargingState> {
            Subscription::new(self.charging_tx.subscribe(), self.cancel.child_token())
        }
    }

    async fn create_monitor() -> (
        BatteryMonitor,
        TestObserver,
        mpsc::Receiver<NotificationRequest>,
        watch::Receiver<BatteryDisplay>,
    ) {
        let observer = TestObserver::new();
        let (notify_tx, notify_rx) = mpsc::channel(8);
        let (monitor, display_rx) = BatteryMonitor::new(&observer, notify_tx).await;
        (monitor, observer, notify_rx, display_rx)
    }

    #[tokio::test]
    async fn does_not_evaluate_until_charging_is_known() {
        let (mut monitor, observer, mut notify_rx, display_rx) = create_monitor().await;

        observer.level_tx.send(Some(0.10)).unwrap();
        monitor.level = Some(0.10);
        monitor.step().await;

        assert!(notify_rx.try_recv().is_err());

        // The display still shows what is known.
        let display = *display_rx.borrow();
        assert_eq!(display.level, Some(DisplayedLevel::from_percent(10)));
        assert_eq!(display.charging, None);
    }

    #[tokio::test]
    async fn emits_low_once_across_repeated_steps() {
        let (mut monitor, _observer, mut notify_rx, _display_rx) = create_monitor().await;

        monitor.level = Some(0.20);
        monitor.charging = ChargingState::NotCharging;

        monitor.step().await;
        assert_eq!(notify_rx.try_recv().unwrap().title, "Bateria baixa!");

        monitor.step().await;
        assert!(notify_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn publishes_display_snapshot_on_change_only() {
        let (mut monitor, _observer, _notify_rx, mut display_rx) = create_monitor().await;

        monitor.level = Some(0.50);
        monitor.charging = ChargingState::Charging;
        monitor.step().await;

        assert!(display_rx.has_changed().unwrap());
        let display = *display_rx.borrow_and_update();
        assert_eq!(display.level, Some(DisplayedLevel::from_percent(50)));
        assert_eq!(display.charging, Some(true));

        // Same values again: no wakeup for the presentation layer.
        monitor.step().await;
        assert!(!display_rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn reacts_to_observation_events_end_to_end() {
        let (monitor, observer, mut notify_rx, _display_rx) = create_monitor().await;

        let cancellation = CancellationToken::new();
        let task = tokio::spawn(monitor.run(cancellation.clone()));

        observer.charging_tx.send(ChargingState::NotCharging).unwrap();
        observer.level_tx.send(Some(0.18)).unwrap();

        let request = notify_rx.recv().await.unwrap();
        assert_eq!(request.title, "Bateria baixa!");

        // Plugging in re-arms low; climbing to full fires both
        // charge-cycle alerts along the way.
        observer.charging_tx.send(ChargingState::Charging).unwrap();
        observer.level_tx.send(Some(0.80)).unwrap();
        let request = notify_rx.recv().await.unwrap();
        assert_eq!(request.title, "Nível recomendado atingido!");

        observer.level_tx.send(Some(1.0)).unwrap();
        let request = notify_rx.recv().await.unwrap();
        assert_eq!(request.title, "Bateria cheia!");

        cancellation.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn run_stops_when_observer_goes_away() {
        let (monitor, observer, _notify_rx, _display_rx) = create_monitor().await;

        let task = tokio::spawn(monitor.run(CancellationToken::new()));
        drop(observer);

        task.await.unwrap();
    }
}
