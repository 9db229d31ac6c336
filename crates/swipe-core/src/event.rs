#![forbid(unsafe_code)]

//! Input events a host feeds into [`SwipeEngine::process`](crate::SwipeEngine::process).

use crate::engine::SwipeDirection;

/// One pointer lifecycle signal, in surface-local px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    /// Finger down (`touchstart` / `pointerdown`).
    Start { x: f64, y: f64 },
    /// Finger moved (`touchmove` / `pointermove`).
    Move { x: f64, y: f64 },
    /// Finger lifted (`touchend` / `pointerup`).
    End,
    /// Platform aborted the touch (`touchcancel` / `pointercancel`).
    Cancel,
}

impl TouchEvent {
    /// Short lowercase name, used in logs and traces.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Move { .. } => "move",
            Self::End => "end",
            Self::Cancel => "cancel",
        }
    }
}

/// What the host should do after dispatching one [`TouchEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    /// Call the platform's prevent-default so the page does not scroll.
    pub suppress_default: bool,
    /// Direction whose callback fired during this event, if any.
    pub committed: Option<SwipeDirection>,
}
