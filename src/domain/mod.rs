//! Core domain types for the screenshot memory service.

pub mod capture;
pub mod memory;

pub use capture::{CaptureEvent, Trigger};
pub use memory::{MemoryRecord, NewMemoryRecord, ScreenshotAnalysis, SearchResult};
