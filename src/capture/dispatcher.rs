//! The capture dispatcher: routes every trigger into one upload routine.

use super::bus::{BusHandle, BusMessage, CaptureTabReply};
use super::status::{StatusChannels, StatusLevel};
use super::uploader::ScreenshotUploader;
use super::{CAPTURE_BLOCKED_MESSAGE, is_capturable_url, is_injectable_url, parse_data_url};
use crate::domain::{CaptureEvent, Trigger};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The active browser tab, as seen by the capture primitive.
#[derive(Debug, Clone)]
pub struct TabInfo {
    pub url: String,
    pub title: Option<String>,
}

/// Platform capture primitive: resolve the active tab and rasterize it.
#[async_trait]
pub trait TabCapture: Send + Sync + std::fmt::Debug {
    /// The currently focused tab, if any browser window is open.
    async fn active_tab(&self) -> Result<Option<TabInfo>>;

    /// Rasterize the active tab to a PNG data URL.
    async fn capture_visible(&self) -> Result<String>;
}

/// Tab source for surfaces with no browser attached (CLI paste flow).
#[derive(Debug, Default)]
pub struct DetachedTabs;

#[async_trait]
impl TabCapture for DetachedTabs {
    async fn active_tab(&self) -> Result<Option<TabInfo>> {
        Ok(None)
    }

    async fn capture_visible(&self) -> Result<String> {
        Err(anyhow::anyhow!("no browser surface attached"))
    }
}

#[derive(Debug)]
pub struct CaptureDispatcher {
    uploader: Arc<dyn ScreenshotUploader>,
    tabs: Arc<dyn TabCapture>,
    status: Arc<StatusChannels>,
    owner_id: String,
}

impl CaptureDispatcher {
    pub fn new(
        uploader: Arc<dyn ScreenshotUploader>,
        tabs: Arc<dyn TabCapture>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            uploader,
            tabs,
            status: Arc::new(StatusChannels::new()),
            owner_id: owner_id.into(),
        }
    }

    /// The status fan-out observers attach to.
    pub fn status(&self) -> Arc<StatusChannels> {
        Arc::clone(&self.status)
    }

    /// Start consuming the bus. Each message runs on its own task, so
    /// independent captures interleave freely.
    pub fn spawn(self: Arc<Self>) -> (BusHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<BusMessage>(32);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let dispatcher = Arc::clone(&self);
                tokio::spawn(async move { dispatcher.handle(msg).await });
            }
        });
        (BusHandle::new(tx), handle)
    }

    async fn handle(&self, msg: BusMessage) {
        match msg {
            BusMessage::CaptureVisibleTab { reply } => {
                let result = self.tabs.capture_visible().await;
                let out = match result {
                    Ok(data_url) => CaptureTabReply {
                        data_url: Some(data_url),
                        error: None,
                    },
                    Err(e) => CaptureTabReply {
                        data_url: None,
                        error: Some(e.to_string()),
                    },
                };
                // Requester may have closed; dropping the reply is fine.
                let _ = reply.send(out);
            }
            BusMessage::HotkeyCapture { reply } => {
                let _ = reply.send(true);
                self.global_capture(Trigger::Hotkey).await;
            }
            BusMessage::UploadPastedImage { image_data, reply } => {
                let _ = reply.send(true);
                self.pasted_image(&image_data).await;
            }
        }
    }

    /// Full capture flow for tab-based triggers (button, hotkey, menu):
    /// capturability check, platform capture, then the shared upload
    /// routine. Non-capturable pages are rejected before any capture or
    /// network call.
    pub async fn global_capture(&self, trigger: Trigger) {
        self.status.toast(StatusLevel::Info, "Capturing memory...");

        let tab = match self.tabs.active_tab().await {
            Ok(tab) => tab,
            Err(e) => {
                tracing::warn!(error = %e, "failed to resolve active tab");
                self.fail("Screenshot capture failed");
                return;
            }
        };

        let Some(tab) = tab else {
            self.fail("No active browser tab to capture");
            return;
        };

        if !is_capturable_url(&tab.url) {
            tracing::info!(url = %tab.url, "capture rejected for non-capturable page");
            // No content surface exists on browser-internal pages, so the
            // rejection can only reach the UI toast there.
            if is_injectable_url(&tab.url) {
                self.fail(CAPTURE_BLOCKED_MESSAGE);
            } else {
                self.status.toast(StatusLevel::Error, CAPTURE_BLOCKED_MESSAGE);
            }
            return;
        }

        let data_url = match self.tabs.capture_visible().await {
            Ok(data_url) => data_url,
            Err(e) => {
                self.fail(&friendly_capture_error(&e));
                return;
            }
        };

        let Ok((mime, image)) = parse_data_url(&data_url) else {
            self.fail("Failed to capture screen");
            return;
        };

        self.upload_event(CaptureEvent::new(trigger, image, mime))
            .await;
    }

    /// Clipboard paste flow: decode the pasted data URL and reuse the
    /// same upload routine as every other trigger.
    pub async fn pasted_image(&self, image_data: &str) {
        match parse_data_url(image_data) {
            Ok((mime, image)) => {
                self.upload_event(CaptureEvent::new(Trigger::Paste, image, mime))
                    .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "pasted payload was not a decodable image");
                self.fail("Failed to process pasted image");
            }
        }
    }

    /// The single idempotent upload routine. The capture event is
    /// consumed here and discarded whatever the outcome.
    async fn upload_event(&self, event: CaptureEvent) {
        let trigger = event.trigger;
        match self
            .uploader
            .upload(&self.owner_id, event.image, &event.mime)
            .await
        {
            Ok(outcome) => {
                tracing::info!(
                    name: "capture.uploaded",
                    trigger = trigger.as_str(),
                    image_url = %outcome.image_url,
                    "Capture uploaded"
                );
                self.status.toast(
                    StatusLevel::Success,
                    "Memory captured! AI is indexing your discovery...",
                );
                self.status.notify_page("Memory captured successfully.");
            }
            Err(e) => {
                tracing::warn!(trigger = trigger.as_str(), error = %e, "capture upload failed");
                self.fail(&e.to_string());
            }
        }
    }

    fn fail(&self, message: &str) {
        self.status.broadcast(StatusLevel::Error, message);
    }
}

/// Map raw capture-primitive errors onto user-facing messages.
///
/// Permission failures mean the tab cannot be captured (browser-internal
/// page focused between trigger and capture), so they get the same
/// distinct message as the pre-check.
fn friendly_capture_error(e: &anyhow::Error) -> String {
    let raw = e.to_string();
    if raw.contains("permission") {
        CAPTURE_BLOCKED_MESSAGE.to_string()
    } else if raw.is_empty() {
        "Failed to capture screen".to_string()
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_errors_map_to_the_blocked_message() {
        let e = anyhow::anyhow!("Either the '<all_urls>' or 'activeTab' permission is required.");
        assert_eq!(friendly_capture_error(&e), CAPTURE_BLOCKED_MESSAGE);
    }

    #[test]
    fn other_errors_pass_through() {
        let e = anyhow::anyhow!("tab went away");
        assert_eq!(friendly_capture_error(&e), "tab went away");
    }
}
