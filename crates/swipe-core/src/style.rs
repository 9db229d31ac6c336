#![forbid(unsafe_code)]

//! Presentation descriptor derived from engine state.
//!
//! Nothing here is stored: [`SwipeEngine::style`](crate::SwipeEngine::style)
//! recomputes a [`SwipeStyle`] from the current offset and tracking flag.
//! While a finger is down the renderer should follow the offset instantly;
//! once tracking ends the snap-back is eased.

use std::fmt;

/// How the renderer should move to a new `translate_x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    /// Jump straight to the new offset (finger is down).
    Instant,
    /// Animate to the new offset.
    #[default]
    Eased,
}

/// Horizontal displacement plus the transition to apply to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeStyle<'a> {
    /// Signed horizontal displacement in px.
    pub translate_x: f64,
    pub transition: Transition,
    /// Duration of the eased transition.
    pub duration_ms: u64,
    /// CSS easing keyword of the eased transition.
    pub easing: &'a str,
}

impl<'a> SwipeStyle<'a> {
    /// Descriptor for an offset, instant while `tracking`.
    #[must_use]
    pub fn new(translate_x: f64, tracking: bool, duration_ms: u64, easing: &'a str) -> Self {
        Self {
            translate_x,
            transition: if tracking {
                Transition::Instant
            } else {
                Transition::Eased
            },
            duration_ms,
            easing,
        }
    }

    /// CSS `transform` value, e.g. `translateX(170px)`.
    #[must_use]
    pub fn transform(&self) -> String {
        format!("translateX({}px)", Px(self.translate_x))
    }

    /// CSS `transition` value: `none` while instant, otherwise
    /// `transform <ms>ms <easing>`.
    #[must_use]
    pub fn transition_css(&self) -> String {
        match self.transition {
            Transition::Instant => "none".to_string(),
            Transition::Eased => format!("transform {}ms {}", self.duration_ms, self.easing),
        }
    }

    /// Whether the renderer should animate towards `translate_x`.
    #[inline]
    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.transition == Transition::Eased
    }
}

impl fmt::Display for SwipeStyle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transform: {}; transition: {}",
            self.transform(),
            self.transition_css()
        )
    }
}

/// Pixel value without a trailing `.0` and without `-0`.
struct Px(f64);

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0.0 {
            f.write_str("0")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
