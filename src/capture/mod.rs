//! Capture trigger handling.
//!
//! The four input surfaces (manual button, hotkey, context menu,
//! clipboard paste) live in isolated execution contexts with no shared
//! memory. They are modeled here as a typed message bus: commands flow
//! into one [`dispatcher::CaptureDispatcher`], replies correlate through
//! oneshot channels, and user-visible status fans out through
//! [`status::StatusChannels`] to whichever observers are still attached.
//! A disconnected observer is a normal outcome, never an error.

pub mod bus;
pub mod dispatcher;
pub mod status;
pub mod uploader;

pub use bus::{BusClosed, BusHandle, BusMessage, CaptureTabReply};
pub use dispatcher::{CaptureDispatcher, DetachedTabs, TabCapture, TabInfo};
pub use status::{StatusChannels, StatusLevel, Toast};
pub use uploader::{HttpUploader, ScreenshotUploader, UploadError};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Owner used when no account is linked (original guest flow).
pub const GUEST_OWNER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// User-facing rejection for captures against browser-internal pages.
pub const CAPTURE_BLOCKED_MESSAGE: &str =
    "Capture blocked on this tab. Switch to a normal website tab and try again.";

/// Whether the platform capture primitive may be invoked for this URL.
///
/// Only regular web pages qualify; browser-internal and extension pages
/// are rejected before any capture or network call.
pub fn is_capturable_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Whether a content script (the in-page notice channel) can exist here.
pub fn is_injectable_url(url: &str) -> bool {
    !(url.starts_with("chrome://")
        || url.starts_with("edge://")
        || url.starts_with("about:")
        || url.starts_with("chrome-extension://"))
}

/// Decode a `data:<mime>;base64,<payload>` URL into (mime, bytes).
pub fn parse_data_url(data_url: &str) -> Result<(String, Vec<u8>), DataUrlError> {
    let rest = data_url.strip_prefix("data:").ok_or(DataUrlError::Scheme)?;
    let (mime, payload) = rest.split_once(";base64,").ok_or(DataUrlError::Encoding)?;
    if mime.is_empty() {
        return Err(DataUrlError::Scheme);
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| DataUrlError::Payload)?;
    Ok((mime.to_string(), bytes))
}

/// Encode bytes as a base64 data URL.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a data URL")]
    Scheme,
    #[error("data URL is not base64-encoded")]
    Encoding,
    #[error("data URL payload is not valid base64")]
    Payload,
}
