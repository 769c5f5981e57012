// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rolling duration estimates for pipeline stages.
//!
//! [`TimingHistory`] tracks EMA-smoothed estimates of the four durations the
//! scheduler predicts with: begin-main-frame to ready-to-commit, commit to
//! ready-to-activate, activation, and draw. The estimates feed deadline
//! placement and the main-thread latency-recovery heuristic; they are tied
//! to a specific rendering context and reset when the output surface is
//! lost.

use crate::settings::TimingEstimates;
use crate::time::Duration;

/// Exponential moving average over duration samples, seeded with a
/// configured estimate so predictions are sane before the first
/// observation.
#[derive(Clone, Copy, Debug)]
struct DurationEma {
    value: f32,
    seed: f32,
    alpha: f32,
}

impl DurationEma {
    fn new(seed: Duration, alpha: f32) -> Self {
        let seed = seed.ticks() as f32;
        Self {
            value: seed,
            seed,
            alpha,
        }
    }

    fn observe(&mut self, sample: Duration) {
        self.value = self.alpha * sample.ticks() as f32 + (1.0 - self.alpha) * self.value;
    }

    fn reset(&mut self) {
        self.value = self.seed;
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "EMA of u64 tick samples stays within u64"
    )]
    fn get(&self) -> Duration {
        Duration(self.value.max(0.0) as u64)
    }
}

/// Rolling estimates of pipeline stage durations.
#[derive(Clone, Debug)]
pub struct TimingHistory {
    begin_main_frame_to_commit: DurationEma,
    commit_to_ready_to_activate: DurationEma,
    activate: DurationEma,
    draw: DurationEma,
}

impl TimingHistory {
    /// Creates a history seeded from the given tuning.
    #[must_use]
    pub fn new(timing: &TimingEstimates) -> Self {
        Self {
            begin_main_frame_to_commit: DurationEma::new(
                timing.begin_main_frame_to_commit_seed,
                timing.ema_alpha,
            ),
            commit_to_ready_to_activate: DurationEma::new(
                timing.commit_to_ready_to_activate_seed,
                timing.ema_alpha,
            ),
            activate: DurationEma::new(timing.activate_seed, timing.ema_alpha),
            draw: DurationEma::new(timing.draw_seed, timing.ema_alpha),
        }
    }

    /// Records an observed begin-main-frame-sent to ready-to-commit span.
    pub fn observe_begin_main_frame_to_commit(&mut self, sample: Duration) {
        self.begin_main_frame_to_commit.observe(sample);
    }

    /// Records an observed commit to ready-to-activate span.
    pub fn observe_commit_to_ready_to_activate(&mut self, sample: Duration) {
        self.commit_to_ready_to_activate.observe(sample);
    }

    /// Records an observed activation duration.
    pub fn observe_activate(&mut self, sample: Duration) {
        self.activate.observe(sample);
    }

    /// Records an observed draw-to-swap duration.
    pub fn observe_draw(&mut self, sample: Duration) {
        self.draw.observe(sample);
    }

    /// Current begin-main-frame to ready-to-commit estimate.
    #[must_use]
    pub fn begin_main_frame_to_commit_estimate(&self) -> Duration {
        self.begin_main_frame_to_commit.get()
    }

    /// Current commit to ready-to-activate estimate.
    #[must_use]
    pub fn commit_to_ready_to_activate_estimate(&self) -> Duration {
        self.commit_to_ready_to_activate.get()
    }

    /// Current activation estimate.
    #[must_use]
    pub fn activate_estimate(&self) -> Duration {
        self.activate.get()
    }

    /// Current draw estimate.
    #[must_use]
    pub fn draw_estimate(&self) -> Duration {
        self.draw.get()
    }

    /// Estimated time for the main thread to produce a drawable tree:
    /// begin-main-frame, commit, and activation end to end.
    #[must_use]
    pub fn main_frame_to_activate_estimate(&self) -> Duration {
        self.begin_main_frame_to_commit_estimate()
            .saturating_add(self.commit_to_ready_to_activate_estimate())
            .saturating_add(self.activate_estimate())
    }

    /// Drops all accumulated smoothing and restores the configured seeds.
    ///
    /// History measures one rendering context; a fresh output surface means
    /// fresh observations.
    pub fn reset(&mut self) {
        self.begin_main_frame_to_commit.reset();
        self.commit_to_ready_to_activate.reset();
        self.activate.reset();
        self.draw.reset();
    }
}
