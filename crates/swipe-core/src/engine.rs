#![forbid(unsafe_code)]

//! Swipe recognition: turns a stream of touch positions into a horizontal
//! offset and a committed direction.
//!
//! [`SwipeEngine`] is a stateful processor owned by one swipeable surface.
//! The host forwards pointer lifecycle calls (`start` / `move_to` / `end`)
//! together with its current [`Instant`], applies the returned
//! [`MoveResponse`] to the platform event, and reads back the offset or
//! [`SwipeStyle`] for rendering.
//!
//! # State Machine
//!
//! ```text
//! Idle ──start──▶ Undetermined ──move──▶ Horizontal ──end──▶ Resetting ──delay──▶ Idle
//!                      │                                 └──end (no auto-reset)──▶ Idle
//!                      └──move (|dy| > |dx|·ratio)──▶ Vertical ──end──▶ Idle
//! ```
//!
//! - The first move decides the axis. Vertical intent hands the event back to
//!   the platform (page scroll) and ignores the rest of the gesture.
//! - Horizontal moves set the offset from the raw delta, damped past
//!   `max_swipe`, and reclassify the direction from the raw delta on every
//!   move: `dx > threshold` is [`SwipeDirection::Left`], `dx < -threshold` is
//!   [`SwipeDirection::Right`], anything in between (bounds included) is
//!   [`SwipeDirection::None`].
//! - Release fires at most one directional callback and, with `auto_reset`,
//!   schedules a snap-back `reset_delay` later.
//!
//! # Invariants
//!
//! 1. Callbacks fire only from `end()`, at most once per gesture.
//! 2. `is_vertical_intent` is set at most once per gesture and cleared only by
//!    the next `start()`.
//! 3. After `reset()` the offset is 0, the direction is `None`, and tracking
//!    is off; a second `reset()` changes nothing.
//! 4. Every accepted call notifies subscribers once; ignored calls do not
//!    notify. A snap-back that fires at the top of a call notifies on its own.
//!
//! # Failure Modes
//!
//! - Out-of-order calls (`move_to` before `start`, a second `end`, `end` after
//!   a vertical gesture was released) are ignored.
//! - Non-finite coordinates are accepted as-is; they never panic but can
//!   leave a NaN offset until the next reset.
//! - A snap-back scheduled by one gesture is not cancelled by the next
//!   `start` unless `cancel_pending_reset_on_start` is set. When it fires
//!   mid-gesture it zeroes the offset and ends tracking, so the rest of that
//!   gesture is ignored.
//!
//! # Timers
//!
//! The engine never sleeps or spawns. Pending snap-backs are kept as
//! deadlines and fire on the first call whose `now` has reached them:
//! any input call, or [`SwipeEngine::tick`]. Hosts that need the snap-back
//! without further input arm one wakeup at [`SwipeEngine::next_deadline`].

use std::fmt;

use tracing::{debug, trace};
use web_time::Instant;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::config::SwipeConfig;
use crate::event::{Response, TouchEvent};
use crate::notify::{Listeners, Subscription};
use crate::style::SwipeStyle;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Classification of the current or last gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum SwipeDirection {
    #[default]
    None,
    /// Raw horizontal delta beyond `+threshold`.
    Left,
    /// Raw horizontal delta beyond `-threshold`.
    Right,
}

impl SwipeDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the engine is in the gesture lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Phase {
    /// No active touch.
    #[default]
    Idle,
    /// Finger down, no move seen yet.
    Undetermined,
    /// Horizontal swipe in progress.
    Horizontal,
    /// Vertical scroll; moves are ignored until release.
    Vertical,
    /// Released horizontal gesture waiting for its snap-back.
    Resetting,
}

/// Result of [`SwipeEngine::move_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveResponse {
    /// The host must prevent the platform default (page scroll) for this
    /// event.
    pub suppress_default: bool,
}

/// Mutable per-surface gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwipeState {
    /// True between `start` and release (or until the snap-back fires).
    pub is_tracking: bool,
    pub direction: SwipeDirection,
    /// Signed horizontal visual displacement in px.
    pub offset: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    pub is_vertical_intent: bool,
}

/// Value delivered to subscribers after each accepted call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeSnapshot {
    pub state: SwipeState,
    pub phase: Phase,
    /// At least one snap-back is scheduled.
    pub reset_pending: bool,
}

type SwipeCallback = Box<dyn FnMut()>;

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Visual offset for a raw horizontal delta.
///
/// Within `max_swipe` the offset follows the finger. Past it, only
/// `resistance` of the excess distance is applied, preserving the sign.
#[must_use]
pub fn resisted_offset(dx: f64, max_swipe: f64, resistance: f64) -> f64 {
    let distance = dx.abs();
    if distance > max_swipe {
        dx.signum() * (max_swipe + (distance - max_swipe) * resistance)
    } else {
        dx
    }
}

/// Direction for a raw horizontal delta. Both bounds are exclusive.
#[must_use]
pub fn classify(dx: f64, threshold: f64) -> SwipeDirection {
    if dx > threshold {
        SwipeDirection::Left
    } else if dx < -threshold {
        SwipeDirection::Right
    } else {
        SwipeDirection::None
    }
}

// ---------------------------------------------------------------------------
// SwipeEngine
// ---------------------------------------------------------------------------

/// Stateful swipe recognizer for one surface.
///
/// ```
/// use swipe_core::{SwipeConfig, SwipeDirection, SwipeEngine};
/// use web_time::Instant;
///
/// let mut engine = SwipeEngine::new(SwipeConfig::default());
/// let t = Instant::now();
/// engine.start(0.0, 0.0, t);
/// assert!(engine.move_to(200.0, 0.0, t).suppress_default);
/// assert_eq!(engine.offset(), 170.0);
/// assert_eq!(engine.end(t), Some(SwipeDirection::Left));
/// ```
pub struct SwipeEngine {
    config: SwipeConfig,
    state: SwipeState,
    phase: Phase,
    /// Snap-back deadlines in scheduling order.
    pending_resets: Vec<Instant>,
    on_left_swipe: Option<SwipeCallback>,
    on_right_swipe: Option<SwipeCallback>,
    listeners: Listeners<SwipeSnapshot>,
}

impl fmt::Debug for SwipeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwipeEngine")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("pending_resets", &self.pending_resets.len())
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl Default for SwipeEngine {
    fn default() -> Self {
        Self::new(SwipeConfig::default())
    }
}

impl SwipeEngine {
    /// Create an idle engine with the given configuration.
    #[must_use]
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            state: SwipeState::default(),
            phase: Phase::Idle,
            pending_resets: Vec::new(),
            on_left_swipe: None,
            on_right_swipe: None,
            listeners: Listeners::new(),
        }
    }

    /// Callback for a released gesture classified [`SwipeDirection::Left`].
    #[must_use]
    pub fn on_left_swipe(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_left_swipe = Some(Box::new(callback));
        self
    }

    /// Callback for a released gesture classified [`SwipeDirection::Right`].
    #[must_use]
    pub fn on_right_swipe(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_right_swipe = Some(Box::new(callback));
        self
    }

    /// Receive a [`SwipeSnapshot`] after every accepted call. Dropping the
    /// returned guard unsubscribes.
    pub fn subscribe(&mut self, callback: impl Fn(&SwipeSnapshot) + 'static) -> Subscription {
        self.listeners.subscribe(callback)
    }

    // -- input ---------------------------------------------------------------

    /// Finger down at `(x, y)`. Always accepted; an active gesture is
    /// restarted.
    pub fn start(&mut self, x: f64, y: f64, now: Instant) {
        self.fire_due_resets(now);

        if self.config.cancel_pending_reset_on_start && !self.pending_resets.is_empty() {
            debug!(
                cancelled = self.pending_resets.len(),
                "pending snap-back cancelled by new gesture"
            );
            self.pending_resets.clear();
        }

        self.state.origin_x = x;
        self.state.origin_y = y;
        self.state.is_tracking = true;
        self.state.is_vertical_intent = false;
        self.state.direction = SwipeDirection::None;
        self.phase = Phase::Undetermined;

        trace!(x, y, "swipe start");
        self.notify();
    }

    /// Finger moved to `(x, y)`.
    ///
    /// Ignored (and reports no suppression) unless a gesture is being
    /// tracked on an undecided or horizontal axis.
    pub fn move_to(&mut self, x: f64, y: f64, now: Instant) -> MoveResponse {
        self.fire_due_resets(now);

        if !matches!(self.phase, Phase::Undetermined | Phase::Horizontal) {
            return MoveResponse::default();
        }

        let dx = x - self.state.origin_x;
        let dy = y - self.state.origin_y;

        if self.phase == Phase::Undetermined {
            if dy.abs() > dx.abs() * self.config.vertical_ratio {
                self.state.is_vertical_intent = true;
                self.phase = Phase::Vertical;
                trace!(dx, dy, "vertical intent, yielding to scroll");
                self.notify();
                return MoveResponse {
                    suppress_default: false,
                };
            }
            self.phase = Phase::Horizontal;
            trace!(dx, dy, "horizontal intent");
        }

        self.state.offset = resisted_offset(dx, self.config.max_swipe, self.config.resistance);
        self.state.direction = classify(dx, self.config.threshold);
        trace!(
            dx,
            offset = self.state.offset,
            direction = self.state.direction.as_str(),
            "swipe move"
        );
        self.notify();

        MoveResponse {
            suppress_default: true,
        }
    }

    /// Finger lifted.
    ///
    /// Returns the direction whose callback fired, if any. Only a horizontal
    /// gesture commits; releasing an undecided or vertical gesture just stops
    /// tracking and leaves offset and direction untouched.
    pub fn end(&mut self, now: Instant) -> Option<SwipeDirection> {
        self.fire_due_resets(now);

        match self.phase {
            Phase::Undetermined | Phase::Vertical => {
                self.state.is_tracking = false;
                self.phase = Phase::Idle;
                trace!("swipe released without horizontal movement");
                self.notify();
                None
            }
            Phase::Horizontal => self.commit(now),
            Phase::Idle | Phase::Resetting => None,
        }
    }

    /// Platform aborted the touch. Drops the gesture without firing a
    /// callback and clears the offset immediately.
    ///
    /// Returns whether a gesture was active.
    pub fn cancel(&mut self, now: Instant) -> bool {
        self.fire_due_resets(now);

        if !matches!(
            self.phase,
            Phase::Undetermined | Phase::Horizontal | Phase::Vertical
        ) {
            return false;
        }
        debug!(offset = self.state.offset, "swipe cancelled");
        self.clear_visual_state();
        self.notify();
        true
    }

    /// Zero the offset, clear the direction, and stop tracking.
    ///
    /// Pending snap-backs are left scheduled.
    pub fn reset(&mut self) {
        self.clear_visual_state();
        trace!("swipe reset");
        self.notify();
    }

    /// Fire any snap-back whose deadline has passed. Returns whether one
    /// fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.fire_due_resets(now)
    }

    /// Dispatch one [`TouchEvent`].
    pub fn process(&mut self, event: &TouchEvent, now: Instant) -> Response {
        match *event {
            TouchEvent::Start { x, y } => {
                self.start(x, y, now);
                Response::default()
            }
            TouchEvent::Move { x, y } => Response {
                suppress_default: self.move_to(x, y, now).suppress_default,
                committed: None,
            },
            TouchEvent::End => Response {
                suppress_default: false,
                committed: self.end(now),
            },
            TouchEvent::Cancel => {
                self.cancel(now);
                Response::default()
            }
        }
    }

    // -- read model ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.state.offset
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> SwipeDirection {
        self.state.direction
    }

    #[inline]
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.state.is_tracking
    }

    #[inline]
    #[must_use]
    pub fn is_vertical_intent(&self) -> bool {
        self.state.is_vertical_intent
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &SwipeState {
        &self.state
    }

    /// Presentation descriptor for the current state.
    #[must_use]
    pub fn style(&self) -> SwipeStyle<'_> {
        SwipeStyle::new(
            self.state.offset,
            self.state.is_tracking,
            self.config.transition_ms,
            &self.config.transition_easing,
        )
    }

    #[must_use]
    pub fn snapshot(&self) -> SwipeSnapshot {
        SwipeSnapshot {
            state: self.state,
            phase: self.phase,
            reset_pending: !self.pending_resets.is_empty(),
        }
    }

    /// Earliest scheduled snap-back, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_resets.iter().copied().min()
    }

    /// Number of notifications delivered so far.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.listeners.version()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Internal transitions
// ---------------------------------------------------------------------------

impl SwipeEngine {
    fn commit(&mut self, now: Instant) -> Option<SwipeDirection> {
        let direction = self.state.direction;
        let callback = match direction {
            SwipeDirection::Left => self.on_left_swipe.as_mut(),
            SwipeDirection::Right => self.on_right_swipe.as_mut(),
            SwipeDirection::None => None,
        };
        if let Some(callback) = callback {
            callback();
        }
        debug!(
            direction = direction.as_str(),
            offset = self.state.offset,
            "swipe committed"
        );

        if self.config.auto_reset {
            self.pending_resets.push(now + self.config.reset_delay());
            self.phase = Phase::Resetting;
        } else {
            self.state.is_tracking = false;
            self.phase = Phase::Idle;
        }
        self.notify();

        match direction {
            SwipeDirection::None => None,
            committed => Some(committed),
        }
    }

    fn fire_due_resets(&mut self, now: Instant) -> bool {
        let before = self.pending_resets.len();
        self.pending_resets.retain(|due| *due > now);
        if self.pending_resets.len() == before {
            return false;
        }

        // Idle means a host reset already cleared the surface.
        let stale = !matches!(self.phase, Phase::Resetting | Phase::Idle);
        if stale {
            debug!(
                phase = ?self.phase,
                offset = self.state.offset,
                "snap-back fired during a newer gesture"
            );
        } else {
            trace!("snap-back fired");
        }
        self.clear_visual_state();
        self.notify();
        true
    }

    fn clear_visual_state(&mut self) {
        self.state.offset = 0.0;
        self.state.direction = SwipeDirection::None;
        self.state.is_tracking = false;
        self.phase = Phase::Idle;
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        self.listeners.notify(&snapshot);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
