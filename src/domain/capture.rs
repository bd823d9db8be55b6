use chrono::{DateTime, Utc};

/// MIME type produced by the tab capture primitive.
pub const CAPTURE_MIME: &str = "image/png";

/// Which input surface initiated a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Extension UI button.
    Manual,
    /// Keyboard shortcut in the page.
    Hotkey,
    /// "Recall this page" context menu entry.
    ContextMenu,
    /// Image pasted from the clipboard.
    Paste,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Hotkey => "hotkey",
            Self::ContextMenu => "context-menu",
            Self::Paste => "paste",
        }
    }
}

impl std::str::FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "hotkey" => Ok(Self::Hotkey),
            "context-menu" => Ok(Self::ContextMenu),
            "paste" => Ok(Self::Paste),
            other => Err(format!("unknown capture trigger: {other}")),
        }
    }
}

/// One user-initiated capture attempt.
///
/// Ephemeral: consumed by the dispatcher's upload routine and discarded
/// after the upload completes or fails. Never persisted.
#[derive(Debug, Clone)]
pub struct CaptureEvent {
    pub trigger: Trigger,
    /// Raw PNG payload.
    pub image: Vec<u8>,
    pub mime: String,
    pub created_at: DateTime<Utc>,
}

impl CaptureEvent {
    pub fn new(trigger: Trigger, image: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            trigger,
            image,
            mime: mime.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn trigger_names_round_trip() {
        for t in [
            Trigger::Manual,
            Trigger::Hotkey,
            Trigger::ContextMenu,
            Trigger::Paste,
        ] {
            assert_eq!(Trigger::from_str(t.as_str()), Ok(t));
        }
        assert!(Trigger::from_str("double-click").is_err());
    }
}
