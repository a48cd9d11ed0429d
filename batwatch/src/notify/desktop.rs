//! Desktop notifications via the platform notification service.

use async_trait::async_trait;
use notify_rust::Notification;

use super::{NotificationRequest, Notifier};
use crate::error::{Error, Result};

/// Delivers alerts through the desktop notification daemon.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn deliver(&self, request: &NotificationRequest) -> Result<()> {
        let notification = Notification::new()
            .summary(&request.title)
            .body(&request.body)
            .appname("batwatch")
            .finalize();

        // show() talks to the notification daemon synchronously.
        tokio::task::spawn_blocking(move || notification.show())
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?
            .map_err(|e| Error::Delivery(e.to_string()))?;

        Ok(())
    }
}
