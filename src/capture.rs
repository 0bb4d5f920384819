//! Screenshot capture backends.
//!
//! The coordinator never awaits a capture inline; it schedules one on a
//! detached task after every accepted step and attaches the result to
//! whatever step is last at that later time. A backend that fails, or a
//! capture that lands after the recording moved on, costs nothing but a
//! missing `screenshot` field.

use anyhow::{bail, Result};

/// Grabs the visible surface of a target as an encoded image string
/// (PNG data URL in the shipped backends).
///
/// Implementations run on a blocking worker thread, so they may do
/// synchronous platform calls.
pub trait CaptureBackend: Send + Sync + 'static {
    fn capture_visible(&self, target_id: &str) -> Result<String>;
}

/// Backend for embedders without a surface grabber. Every capture fails,
/// which the side-channel swallows; sessions simply carry no screenshots.
pub struct UnavailableCapture;

impl CaptureBackend for UnavailableCapture {
    fn capture_visible(&self, target_id: &str) -> Result<String> {
        bail!("no capture backend configured for target {target_id}");
    }
}
