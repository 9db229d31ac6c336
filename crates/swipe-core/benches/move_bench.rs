//! Benchmark: per-move cost of the swipe engine.
//!
//! Run with: `cargo bench -p swipe-core --bench move_bench`
//!
//! A touch surface delivers one move per display frame; this measures a full
//! horizontal gesture with and without a subscribed renderer.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use swipe_core::{SwipeEngine, TouchEvent};
use web_time::Instant;

const FRAME: Duration = Duration::from_millis(16);

fn gesture() -> Vec<TouchEvent> {
    let mut events = vec![TouchEvent::Start { x: 0.0, y: 0.0 }];
    events.extend((1..=60).map(|i| TouchEvent::Move {
        x: f64::from(i) * 4.0,
        y: 1.0,
    }));
    events.push(TouchEvent::End);
    events
}

fn bench_gesture(c: &mut Criterion) {
    let events = gesture();
    let mut group = c.benchmark_group("swipe_gesture");

    group.bench_function("bare", |b| {
        let mut engine = SwipeEngine::default();
        let mut t = Instant::now();
        b.iter(|| {
            for event in &events {
                black_box(engine.process(black_box(event), t));
                t += FRAME;
            }
            engine.tick(t + Duration::from_secs(1));
        });
    });

    group.bench_function("subscribed", |b| {
        let mut engine = SwipeEngine::default();
        let sink = Rc::new(Cell::new(0.0));
        let sink_clone = Rc::clone(&sink);
        let _sub = engine.subscribe(move |snap| sink_clone.set(snap.state.offset));
        let mut t = Instant::now();
        b.iter(|| {
            for event in &events {
                black_box(engine.process(black_box(event), t));
                t += FRAME;
            }
            engine.tick(t + Duration::from_secs(1));
        });
        black_box(sink.get());
    });

    group.finish();
}

criterion_group!(benches, bench_gesture);
criterion_main!(benches);
