//! Display surface: holds the markup for the currently shown message list and
//! the copy controls embedded in it.
//!
//! Each call to [`Surface::show`] starts a new render epoch. Copy handlers
//! are bound per epoch (see [`crate::clipboard`]); replacing the content
//! orphans the previous epoch's controls so stale bindings cannot touch the
//! surface, which is what prevents duplicate handlers accumulating across
//! re-renders.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::render::RenderedMessage;

/// Visible label on a copy control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyLabel {
    Copy,
    Copied,
    Error,
}

impl CopyLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            CopyLabel::Copy => "Copy",
            CopyLabel::Copied => "Copied!",
            CopyLabel::Error => "Error",
        }
    }
}

/// One copy control: the exact raw payload plus its transient visual state.
#[derive(Debug)]
pub(crate) struct CopyControl {
    pub(crate) payload: String,
    pub(crate) label: CopyLabel,
    pub(crate) success_style: bool,
}

/// State shared between the surface and the bindings attached to one render.
/// Replaced wholesale when the surface re-renders.
pub(crate) struct RenderEpoch {
    pub(crate) controls: Mutex<Vec<CopyControl>>,
    pub(crate) bound: AtomicBool,
}

impl RenderEpoch {
    fn empty() -> Arc<Self> {
        Arc::new(Self {
            controls: Mutex::new(Vec::new()),
            bound: AtomicBool::new(false),
        })
    }
}

pub struct Surface {
    html: String,
    epoch: Arc<RenderEpoch>,
}

impl Surface {
    pub fn new() -> Self {
        Self {
            html: String::new(),
            epoch: RenderEpoch::empty(),
        }
    }

    /// Replace the displayed markup with a fresh render of the message list.
    /// Controls are created in document order, one per code block; any
    /// bindings attached to the previous render are invalidated.
    pub(crate) fn show(&mut self, rendered: &[RenderedMessage]) {
        let mut html = String::new();
        let mut controls = Vec::new();
        for message in rendered {
            html.push_str(&message.html);
            for block in &message.blocks {
                controls.push(CopyControl {
                    payload: block.raw.clone(),
                    label: CopyLabel::Copy,
                    success_style: false,
                });
            }
        }
        self.html = html;
        self.epoch = Arc::new(RenderEpoch {
            controls: Mutex::new(controls),
            bound: AtomicBool::new(false),
        });
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn control_count(&self) -> usize {
        self.epoch
            .controls
            .lock()
            .map(|c| c.len())
            .unwrap_or_default()
    }

    pub fn control_label(&self, index: usize) -> Option<CopyLabel> {
        let controls = self.epoch.controls.lock().ok()?;
        controls.get(index).map(|c| c.label)
    }

    pub(crate) fn epoch(&self) -> Arc<RenderEpoch> {
        Arc::clone(&self.epoch)
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render;

    #[test]
    fn show_creates_one_control_per_block_in_order() {
        let mut surface = Surface::new();
        let rendered = vec![
            render::render_message("```a\nfirst\n```"),
            render::render_message("text"),
            render::render_message("```b\nsecond\n```"),
        ];
        surface.show(&rendered);
        assert_eq!(surface.control_count(), 2);
        assert_eq!(surface.control_label(0), Some(CopyLabel::Copy));
        let epoch = surface.epoch();
        let controls = epoch.controls.lock().expect("controls lock");
        assert_eq!(controls[0].payload, "first");
        assert_eq!(controls[1].payload, "second");
    }

    #[test]
    fn show_replaces_previous_epoch() {
        let mut surface = Surface::new();
        surface.show(&[render::render_message("```a\n1\n```")]);
        let old = surface.epoch();
        surface.show(&[render::render_message("plain")]);
        assert_eq!(surface.control_count(), 0);
        assert!(!Arc::ptr_eq(&old, &surface.epoch()));
    }
}
