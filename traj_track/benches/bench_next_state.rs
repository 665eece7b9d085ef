//! # Tracker Cycle Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use traj_track::{
    tracker::Params, FeedForward, ManualClock, Pose2, TimedSample, TimedTrajectory, TrajTracker,
};

fn next_state_benchmark(c: &mut Criterion) {
    // ---- Build a long trajectory ----

    // A 0.5 m radius circle driven at 1 m/s, sampled every 10 ms
    let samples = (0..10_000)
        .map(|i| {
            let t_s = i as f64 * 0.01;
            let theta = 2.0 * t_s;
            TimedSample::new(
                t_s,
                Pose2::new(0.5 * theta.sin(), 0.5 - 0.5 * theta.cos(), theta),
                2.0,
                1.0,
            )
        })
        .collect();
    let trajectory = Arc::new(TimedTrajectory::new(samples).unwrap());

    let clock = ManualClock::new();
    let mut tracker = TrajTracker::new(FeedForward, clock.clone(), Params::default());
    tracker.reset(trajectory.clone());

    let pose = Pose2::new(0.01, -0.02, 0.0);

    c.bench_function("next_state", |b| {
        b.iter(|| {
            // Start again once the end is reached so every cycle interpolates
            if tracker.is_finished() {
                tracker.reset(trajectory.clone());
            }
            clock.advance(0.02);
            tracker.next_state_now(black_box(&pose)).unwrap()
        })
    });
}

criterion_group!(benches, next_state_benchmark);
criterion_main!(benches);
