//! Notification requests and their delivery.

pub mod desktop;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::tracing::prelude::*;

pub use desktop::DesktopNotifier;

/// An alert to be delivered, decoupled from the delivery mechanism.
///
/// Value object with no identity; consumed once by the delivery task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    /// Deliver after this delay; immediately when `None`.
    pub trigger: Option<Duration>,
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>, trigger: Option<Duration>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            trigger,
        }
    }

    /// A request with no scheduling directive.
    pub fn immediate(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, None)
    }
}

/// Delivery backend.
///
/// Delivery is assumed asynchronous and fallible. The monitor never
/// awaits confirmation; it sets its guard flags when it decides to
/// emit, making each alert an at-most-once attempt.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, request: &NotificationRequest) -> Result<()>;
}

/// Drain the request queue into a notifier, in order.
///
/// A failed delivery is logged and dropped. The guard flag that
/// produced the request stays set, so the alert will not repeat until
/// the next cycle.
pub async fn delivery_task(
    mut requests: mpsc::Receiver<NotificationRequest>,
    notifier: impl Notifier,
    cancellation: CancellationToken,
) {
    loop {
        let request = tokio::select! {
            _ = cancellation.cancelled() => break,
            request = requests.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        if let Some(delay) = request.trigger {
            tokio::time::sleep(delay).await;
        }

        debug!(title = %request.title, "Delivering notification");
        if let Err(e) = notifier.deliver(&request).await {
            warn!(title = %request.title, error = %e, "Notification delivery failed");
        }
    }

    trace!("Delivery task stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        delivered: Arc<Mutex<Vec<NotificationRequest>>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, request: &NotificationRequest) -> Result<()> {
            if self.fail {
                return Err(crate::error::Error::Delivery("denied".to_string()));
            }
            self.delivered.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn delivers_requests_in_order() {
        let (tx, rx) = mpsc::channel(8);
        let notifier = RecordingNotifier::default();
        let delivered = notifier.delivered.clone();

        tx.send(NotificationRequest::immediate("a", "1")).await.unwrap();
        tx.send(NotificationRequest::immediate("b", "2")).await.unwrap();
        drop(tx);

        delivery_task(rx, notifier, CancellationToken::new()).await;

        let delivered = delivered.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].title, "a");
        assert_eq!(delivered[1].title, "b");
    }

    #[tokio::test]
    async fn failed_delivery_does_not_stall_the_queue() {
        let (tx, rx) = mpsc::channel(8);
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let delivered = notifier.delivered.clone();

        tx.send(NotificationRequest::immediate("a", "1")).await.unwrap();
        drop(tx);

        delivery_task(rx, notifier, CancellationToken::new()).await;

        assert!(delivered.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn honors_trigger_delay() {
        let (tx, rx) = mpsc::channel(8);
        let notifier = RecordingNotifier::default();
        let delivered = notifier.delivered.clone();

        tx.send(NotificationRequest::new(
            "later",
            "body",
            Some(Duration::from_secs(60)),
        ))
        .await
        .unwrap();
        drop(tx);

        let task = tokio::spawn(delivery_task(rx, notifier, CancellationToken::new()));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(delivered.lock().unwrap().is_empty());

        tokio::time::advance(Duration::from_secs(1)).await;
        task.await.unwrap();
        assert_eq!(delivered.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stops_on_cancellation() {
        let (_tx, rx) = mpsc::channel::<NotificationRequest>(8);
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        delivery_task(rx, RecordingNotifier::default(), cancellation).await;
    }
}
