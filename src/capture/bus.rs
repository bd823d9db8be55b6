//! Typed command bus between capture surfaces and the dispatcher.
//!
//! Each command carries a oneshot reply channel; the requester may drop
//! its end at any point (popup closed, page navigated away) and the
//! dispatcher discards the reply without treating it as a failure.

use tokio::sync::{mpsc, oneshot};

/// Reply to a `CaptureVisibleTab` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTabReply {
    /// PNG data URL on success.
    pub data_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum BusMessage {
    /// UI surface asks for a raw capture of the active tab.
    CaptureVisibleTab {
        reply: oneshot::Sender<CaptureTabReply>,
    },
    /// Page hotkey asks the dispatcher to run the whole capture flow.
    HotkeyCapture { reply: oneshot::Sender<bool> },
    /// Page forwards a pasted clipboard image (base64 data URL).
    UploadPastedImage {
        image_data: String,
        reply: oneshot::Sender<bool>,
    },
}

/// The dispatcher task has shut down.
#[derive(Debug, thiserror::Error)]
#[error("capture dispatcher is not running")]
pub struct BusClosed;

/// Cloneable sending side of the capture bus.
#[derive(Debug, Clone)]
pub struct BusHandle {
    tx: mpsc::Sender<BusMessage>,
}

impl BusHandle {
    pub(crate) fn new(tx: mpsc::Sender<BusMessage>) -> Self {
        Self { tx }
    }

    pub async fn capture_visible_tab(&self) -> Result<CaptureTabReply, BusClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BusMessage::CaptureVisibleTab { reply })
            .await
            .map_err(|_| BusClosed)?;
        rx.await.map_err(|_| BusClosed)
    }

    /// Kick off the global capture flow; `true` means the dispatcher
    /// accepted the request (the flow itself reports through the status
    /// channels).
    pub async fn hotkey_capture(&self) -> Result<bool, BusClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BusMessage::HotkeyCapture { reply })
            .await
            .map_err(|_| BusClosed)?;
        rx.await.map_err(|_| BusClosed)
    }

    pub async fn upload_pasted_image(&self, image_data: String) -> Result<bool, BusClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BusMessage::UploadPastedImage { image_data, reply })
            .await
            .map_err(|_| BusClosed)?;
        rx.await.map_err(|_| BusClosed)
    }
}
