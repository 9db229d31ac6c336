#![forbid(unsafe_code)]

//! Deterministic replay of a [`TraceFile`] through a [`SwipeEngine`].
//!
//! The engine runs on a virtual clock: each record's `ts_ms` is added to a
//! fixed base instant, so replays are independent of wall time. Every
//! record first calls [`SwipeEngine::tick`] so a snap-back that falls due
//! between two records is reported on the record where it became visible.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use swipe_core::{Phase, SwipeConfig, SwipeDirection, SwipeEngine};
use tracing::{debug, info_span};
use web_time::Instant;

use crate::trace::{TraceFile, TraceRecord};

/// Engine state after one trace record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub line: usize,
    pub ts_ms: u64,
    pub event: &'static str,
    pub phase: Phase,
    pub offset: f64,
    pub direction: SwipeDirection,
    pub tracking: bool,
    /// Present for move records only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committed: Option<SwipeDirection>,
    /// A scheduled snap-back fired before this record was applied.
    pub snap_back_fired: bool,
    pub transform: String,
    pub transition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub session_name: String,
    pub steps: usize,
    pub left_swipes: u32,
    pub right_swipes: u32,
    pub snap_backs: u32,
    pub notifications: u64,
    pub final_offset: f64,
    pub final_direction: SwipeDirection,
    pub final_phase: Phase,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub summary: ReplaySummary,
}

/// Replay `trace` against a fresh engine built from `config`.
#[must_use]
pub fn replay(trace: &TraceFile, config: SwipeConfig) -> ReplayReport {
    let _span = info_span!("swipe.replay", session = trace.session_name()).entered();

    let left = Rc::new(Cell::new(0u32));
    let right = Rc::new(Cell::new(0u32));
    let notifications = Rc::new(Cell::new(0u64));
    let (l, r, n) = (
        Rc::clone(&left),
        Rc::clone(&right),
        Rc::clone(&notifications),
    );

    let mut engine = SwipeEngine::new(config)
        .on_left_swipe(move || l.set(l.get() + 1))
        .on_right_swipe(move || r.set(r.get() + 1));
    let _subscription = engine.subscribe(move |_| n.set(n.get() + 1));

    let base = Instant::now();
    let mut steps = Vec::with_capacity(trace.len());
    let mut snap_backs = 0u32;

    for (line, record) in trace.steps() {
        let Some(ts_ms) = record.ts_ms() else {
            continue;
        };
        let now = base + Duration::from_millis(ts_ms);
        let snap_back_fired = engine.tick(now);
        if snap_back_fired {
            snap_backs += 1;
        }

        let (suppress_default, committed) = match record {
            TraceRecord::Reset { .. } => {
                engine.reset();
                (None, None)
            }
            _ => match record.touch_event() {
                Some(event) => {
                    let response = engine.process(&event, now);
                    let suppress = matches!(record, TraceRecord::Move { .. })
                        .then_some(response.suppress_default);
                    (suppress, response.committed)
                }
                None => (None, None),
            },
        };

        let style = engine.style();
        let step = StepReport {
            line: *line,
            ts_ms,
            event: record.name(),
            phase: engine.phase(),
            offset: engine.offset(),
            direction: engine.direction(),
            tracking: engine.is_tracking(),
            suppress_default,
            committed,
            snap_back_fired,
            transform: style.transform(),
            transition: style.transition_css(),
        };
        debug!(
            line = step.line,
            event = step.event,
            offset = step.offset,
            phase = ?step.phase,
            "replayed"
        );
        steps.push(step);
    }

    let summary = ReplaySummary {
        session_name: trace.session_name().to_string(),
        steps: steps.len(),
        left_swipes: left.get(),
        right_swipes: right.get(),
        snap_backs,
        notifications: notifications.get(),
        final_offset: engine.offset(),
        final_direction: engine.direction(),
        final_phase: engine.phase(),
    };
    ReplayReport { steps, summary }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4} t={:>5}ms {:<6} {:<12} offset={:<8} dir={:<5} tracking={}",
            self.line,
            self.ts_ms,
            self.event,
            format!("{:?}", self.phase).to_lowercase(),
            self.offset,
            self.direction,
            yes_no(self.tracking),
        )?;
        if let Some(suppress) = self.suppress_default {
            write!(f, " suppress={}", yes_no(suppress))?;
        }
        if let Some(direction) = self.committed {
            write!(f, " committed={direction}")?;
        }
        if self.snap_back_fired {
            f.write_str(" snap-back")?;
        }
        write!(f, " [{}; {}]", self.transform, self.transition)
    }
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session {}: {} steps, left={} right={} snap-backs={} notifications={}, final offset={} ({})",
            self.session_name,
            self.steps,
            self.left_swipes,
            self.right_swipes,
            self.snap_backs,
            self.notifications,
            self.final_offset,
            self.final_direction,
        )
    }
}
