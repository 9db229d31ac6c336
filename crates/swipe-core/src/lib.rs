#![forbid(unsafe_code)]

//! Core: touch-swipe gesture recognition for swipeable list rows and cards.
//!
//! # Role
//! `swipe-core` owns the gesture state of one swipeable surface. A rendering
//! layer forwards pointer lifecycle calls, prevents page scrolling when told
//! to, and draws the horizontal offset it reads back. Everything is
//! single-threaded and host-clocked: the engine never sleeps, spawns, or
//! touches a global.
//!
//! # Primary responsibilities
//! - **SwipeEngine**: axis disambiguation, resistance-limited offset,
//!   direction classification, release callbacks, deferred snap-back.
//! - **SwipeConfig**: thresholds and timings, loadable from TOML/JSON with the
//!   `config` feature.
//! - **SwipeStyle**: the derived `transform` / `transition` pair for renderers.
//! - **Listeners / Subscription**: change notification for retained-mode
//!   renderers that do not poll.

pub mod config;
pub mod engine;
pub mod event;
pub mod notify;
pub mod style;

pub use config::{ConfigError, SwipeConfig};
pub use engine::{
    MoveResponse, Phase, SwipeDirection, SwipeEngine, SwipeSnapshot, SwipeState, classify,
    resisted_offset,
};
pub use event::{Response, TouchEvent};
pub use notify::{Listeners, Subscription};
pub use style::{SwipeStyle, Transition};
