//! Clipboard controller: binds the copy controls of one rendered surface and
//! services clicks with transient "Copied!"/"Error" feedback.
//!
//! [`ClipboardController::attach`] returns a [`CopyBindings`] handle; dropping
//! it detaches the handlers. At most one binding may exist per render epoch,
//! and a re-rendered surface starts a new epoch, so handlers can never stack
//! up across re-renders.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use thiserror::Error;

use crate::surface::{CopyLabel, RenderEpoch, Surface};

/// How long the feedback label stays before reverting to "Copy".
pub const REVERT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

/// Writes text to a clipboard. Seam for tests to observe and fail writes.
pub trait ClipboardSink: Send + Sync + 'static {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard via arboard. A fresh handle per write keeps the sink
/// stateless and avoids holding the platform clipboard open.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        arboard::Clipboard::new()
            .and_then(|mut c| c.set_text(text.to_string()))
            .map_err(|e| ClipboardError(e.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("copy handlers already bound for this render; detach the previous binding first")]
    AlreadyBound,
}

pub struct ClipboardController {
    sink: Arc<dyn ClipboardSink>,
    revert_delay: Duration,
}

impl ClipboardController {
    pub fn new() -> Self {
        Self::with_sink(Arc::new(SystemClipboard), REVERT_DELAY)
    }

    pub fn with_sink(sink: Arc<dyn ClipboardSink>, revert_delay: Duration) -> Self {
        Self { sink, revert_delay }
    }

    /// Bind the copy controls of the surface's current render.
    pub fn attach(&self, surface: &Surface) -> Result<CopyBindings, BindError> {
        let epoch = surface.epoch();
        if epoch.bound.swap(true, Ordering::SeqCst) {
            return Err(BindError::AlreadyBound);
        }
        Ok(CopyBindings {
            epoch,
            sink: Arc::clone(&self.sink),
            revert_delay: self.revert_delay,
        })
    }
}

impl Default for ClipboardController {
    fn default() -> Self {
        Self::new()
    }
}

/// Live handlers for one render epoch. Dropping the value detaches them.
pub struct CopyBindings {
    epoch: Arc<RenderEpoch>,
    sink: Arc<dyn ClipboardSink>,
    revert_delay: Duration,
}

impl CopyBindings {
    /// Handle a click on copy control `index`: write the control's raw
    /// payload to the clipboard, flip the label (and, on success, the style),
    /// and spawn an independent timer task that reverts the feedback.
    ///
    /// Returns the label now shown, or `None` for an unknown index. A write
    /// failure is logged and surfaced only as the "Error" label; it never
    /// propagates. Repeat clicks spawn independent timers; whichever fires
    /// last has the final word on the label.
    pub fn click(&self, index: usize) -> Option<CopyLabel> {
        let payload = {
            let controls = self.epoch.controls.lock().ok()?;
            controls.get(index)?.payload.clone()
        };
        let outcome = self.sink.set_text(&payload);
        let label = {
            let mut controls = self.epoch.controls.lock().ok()?;
            let control = controls.get_mut(index)?;
            match outcome {
                Ok(()) => {
                    control.label = CopyLabel::Copied;
                    control.success_style = true;
                    CopyLabel::Copied
                }
                Err(e) => {
                    log::warn!("Failed to copy code block {}: {}", index, e);
                    control.label = CopyLabel::Error;
                    CopyLabel::Error
                }
            }
        };
        let epoch = Arc::clone(&self.epoch);
        let revert_style = label == CopyLabel::Copied;
        let delay = self.revert_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Ok(mut controls) = epoch.controls.lock() {
                if let Some(control) = controls.get_mut(index) {
                    control.label = CopyLabel::Copy;
                    if revert_style {
                        control.success_style = false;
                    }
                }
            }
        });
        Some(label)
    }

    pub fn label(&self, index: usize) -> Option<CopyLabel> {
        let controls = self.epoch.controls.lock().ok()?;
        controls.get(index).map(|c| c.label)
    }
}

impl Drop for CopyBindings {
    fn drop(&mut self) {
        self.epoch.bound.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::render;

    /// Records writes; fails them when `fail` is set.
    struct MockSink {
        texts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockSink {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                texts: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                texts: Mutex::new(Vec::new()),
                fail: true,
            })
        }
    }

    impl ClipboardSink for MockSink {
        fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError("denied".to_string()));
            }
            self.texts.lock().expect("mock lock").push(text.to_string());
            Ok(())
        }
    }

    fn surface_with_block(code: &str) -> Surface {
        let mut surface = Surface::new();
        surface.show(&[render::render_message(&format!(
            "```rust\n{}\n```",
            code
        ))]);
        surface
    }

    #[tokio::test]
    async fn click_copies_exact_payload_and_shows_copied() {
        let sink = MockSink::ok();
        let controller = ClipboardController::with_sink(sink.clone(), Duration::from_millis(10));
        let surface = surface_with_block("let s = \"a & b < c\";");
        let bindings = controller.attach(&surface).expect("attach");

        assert_eq!(bindings.click(0), Some(CopyLabel::Copied));
        assert_eq!(surface.control_label(0), Some(CopyLabel::Copied));
        let texts = sink.texts.lock().expect("mock lock");
        assert_eq!(texts.as_slice(), ["let s = \"a & b < c\";"]);
    }

    #[tokio::test]
    async fn label_reverts_after_delay() {
        let controller = ClipboardController::with_sink(MockSink::ok(), Duration::from_millis(10));
        let surface = surface_with_block("x");
        let bindings = controller.attach(&surface).expect("attach");
        bindings.click(0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(surface.control_label(0), Some(CopyLabel::Copy));
    }

    #[tokio::test]
    async fn failed_write_shows_error_without_style_change() {
        let controller =
            ClipboardController::with_sink(MockSink::failing(), Duration::from_millis(10));
        let surface = surface_with_block("x");
        let bindings = controller.attach(&surface).expect("attach");
        assert_eq!(bindings.click(0), Some(CopyLabel::Error));
        let styled = {
            let epoch = surface.epoch();
            let guard = epoch.controls.lock().expect("controls lock");
            guard[0].success_style
        };
        assert!(!styled);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(surface.control_label(0), Some(CopyLabel::Copy));
    }

    #[tokio::test]
    async fn unknown_index_is_a_no_op() {
        let controller = ClipboardController::with_sink(MockSink::ok(), Duration::from_millis(10));
        let surface = surface_with_block("x");
        let bindings = controller.attach(&surface).expect("attach");
        assert_eq!(bindings.click(7), None);
    }

    #[tokio::test]
    async fn only_one_binding_per_render() {
        let controller = ClipboardController::with_sink(MockSink::ok(), Duration::from_millis(10));
        let surface = surface_with_block("x");
        let bindings = controller.attach(&surface).expect("attach");
        assert_eq!(controller.attach(&surface).err(), Some(BindError::AlreadyBound));
        drop(bindings);
        assert!(controller.attach(&surface).is_ok());
    }

    #[tokio::test]
    async fn rerender_invalidates_old_binding() {
        let sink = MockSink::ok();
        let controller = ClipboardController::with_sink(sink.clone(), Duration::from_millis(10));
        let mut surface = surface_with_block("old");
        let stale = controller.attach(&surface).expect("attach");

        surface.show(&[render::render_message("```rust\nnew\n```")]);
        let fresh = controller.attach(&surface).expect("new epoch attaches");

        // The stale binding still works against its orphaned controls but
        // cannot touch the new render's state.
        stale.click(0);
        assert_eq!(surface.control_label(0), Some(CopyLabel::Copy));
        fresh.click(0);
        assert_eq!(surface.control_label(0), Some(CopyLabel::Copied));
        let texts = sink.texts.lock().expect("mock lock");
        assert_eq!(texts.as_slice(), ["old", "new"]);
    }
}
