//! Status fan-out to capture observers.
//!
//! Two independent channels mirror the original extension surfaces: an
//! ephemeral toast in the extension UI and a visible notice injected into
//! the page. Either listener may be absent, or may have gone away between
//! trigger and completion; delivery failure is swallowed and logged at
//! debug, and never affects the capture itself.

use serde::Serialize;
use std::sync::Mutex;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

/// One ephemeral notice for the extension UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: StatusLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct StatusChannels {
    ui: Mutex<Option<mpsc::UnboundedSender<Toast>>>,
    page: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl StatusChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or replace) the extension-UI toast listener.
    pub fn attach_ui(&self) -> mpsc::UnboundedReceiver<Toast> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut guard) = self.ui.lock() {
            *guard = Some(tx);
        }
        rx
    }

    /// Attach (or replace) the in-page notice listener.
    pub fn attach_page(&self) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut guard) = self.page.lock() {
            *guard = Some(tx);
        }
        rx
    }

    /// Send a toast to the extension UI, if anyone is listening.
    pub fn toast(&self, level: StatusLevel, message: impl Into<String>) {
        let message = message.into();
        let Ok(guard) = self.ui.lock() else { return };
        if let Some(tx) = guard.as_ref() {
            if tx
                .send(Toast {
                    level,
                    message: message.clone(),
                })
                .is_err()
            {
                tracing::debug!(message = %message, "UI toast listener gone, dropping notice");
            }
        }
    }

    /// Send a visible notice to the page, if a content surface exists.
    pub fn notify_page(&self, message: impl Into<String>) {
        let message = message.into();
        let Ok(guard) = self.page.lock() else { return };
        if let Some(tx) = guard.as_ref() {
            if tx.send(message.clone()).is_err() {
                tracing::debug!(message = %message, "page notice listener gone, dropping notice");
            }
        }
    }

    /// Fan one status update out to both channels.
    pub fn broadcast(&self, level: StatusLevel, message: &str) {
        self.toast(level, message);
        self.notify_page(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn attached_listeners_receive_notices() {
        let status = StatusChannels::new();
        let mut ui = status.attach_ui();
        let mut page = status.attach_page();

        status.broadcast(StatusLevel::Success, "Memory captured successfully.");

        let toast = ui.recv().await.unwrap();
        assert_eq!(toast.level, StatusLevel::Success);
        assert_eq!(page.recv().await.unwrap(), "Memory captured successfully.");
    }

    #[test]
    fn delivery_without_listeners_is_a_no_op() {
        let status = StatusChannels::new();
        status.broadcast(StatusLevel::Error, "nobody is listening");
    }

    #[test]
    fn delivery_to_dropped_listener_is_swallowed() {
        let status = StatusChannels::new();
        let rx = status.attach_ui();
        drop(rx);
        status.toast(StatusLevel::Info, "Capturing memory...");
    }
}
