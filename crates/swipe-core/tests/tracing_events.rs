//! Diagnostics emitted through `tracing`.
//!
//! A capture layer records event messages and `swipe.notify` span counts so
//! the stale snap-back paths can be asserted without a formatter.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use swipe_core::{SwipeConfig, SwipeEngine};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use web_time::Instant;

#[derive(Debug, Default)]
struct Captured {
    messages: Vec<String>,
    notify_spans: usize,
}

struct CaptureLayer {
    state: Arc<Mutex<Captured>>,
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::Id,
        _ctx: Context<'_, S>,
    ) {
        if attrs.metadata().name() == "swipe.notify" {
            self.state.lock().expect("capture lock").notify_spans += 1;
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            self.state.lock().expect("capture lock").messages.push(message);
        }
    }
}

fn with_capture(f: impl FnOnce()) -> Captured {
    let state = Arc::new(Mutex::new(Captured::default()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        state: Arc::clone(&state),
    });
    {
        let _guard = tracing::subscriber::set_default(subscriber);
        tracing::callsite::rebuild_interest_cache();
        f();
    }
    tracing::callsite::rebuild_interest_cache();
    let mut captured = state.lock().expect("capture lock");
    std::mem::take(&mut *captured)
}

/// Commit a right swipe, then start a second gesture before the snap-back
/// is due and keep moving past the deadline.
fn overlapping_gestures(engine: &mut SwipeEngine) {
    let t = Instant::now();
    engine.start(0.0, 0.0, t);
    engine.move_to(-100.0, 0.0, t + Duration::from_millis(16));
    engine.end(t + Duration::from_millis(32));
    engine.start(0.0, 0.0, t + Duration::from_millis(60));
    engine.move_to(-30.0, 0.0, t + Duration::from_millis(80));
    engine.move_to(-40.0, 0.0, t + Duration::from_millis(200));
}

#[test]
fn stale_snap_back_is_reported() {
    let captured = with_capture(|| {
        let mut engine = SwipeEngine::default();
        overlapping_gestures(&mut engine);
    });
    assert!(
        captured
            .messages
            .iter()
            .any(|m| m == "snap-back fired during a newer gesture"),
        "messages: {:?}",
        captured.messages
    );
    assert!(captured.messages.iter().any(|m| m == "swipe committed"));
}

#[test]
fn cancelled_snap_back_is_reported_in_fixed_mode() {
    let captured = with_capture(|| {
        let mut engine = SwipeEngine::new(SwipeConfig {
            cancel_pending_reset_on_start: true,
            ..SwipeConfig::default()
        });
        overlapping_gestures(&mut engine);
    });
    assert!(
        captured
            .messages
            .iter()
            .any(|m| m == "pending snap-back cancelled by new gesture"),
        "messages: {:?}",
        captured.messages
    );
    assert!(
        !captured
            .messages
            .iter()
            .any(|m| m == "snap-back fired during a newer gesture")
    );
}

#[test]
fn snap_back_after_host_reset_is_not_stale() {
    let captured = with_capture(|| {
        let mut engine = SwipeEngine::default();
        let t = Instant::now();
        engine.start(0.0, 0.0, t);
        engine.move_to(-100.0, 0.0, t + Duration::from_millis(16));
        engine.end(t + Duration::from_millis(32));
        engine.reset();
        assert!(engine.tick(t + Duration::from_millis(200)));
    });
    assert!(captured.messages.iter().any(|m| m == "snap-back fired"));
    assert!(
        !captured
            .messages
            .iter()
            .any(|m| m == "snap-back fired during a newer gesture"),
        "messages: {:?}",
        captured.messages
    );
}

#[test]
fn notify_span_only_opens_with_subscribers() {
    let bare = with_capture(|| {
        let mut engine = SwipeEngine::default();
        engine.start(0.0, 0.0, Instant::now());
    });
    assert_eq!(bare.notify_spans, 0);

    let subscribed = with_capture(|| {
        let mut engine = SwipeEngine::default();
        let _sub = engine.subscribe(|_| {});
        let t = Instant::now();
        engine.start(0.0, 0.0, t);
        engine.move_to(20.0, 0.0, t);
    });
    assert_eq!(subscribed.notify_spans, 2);
}
