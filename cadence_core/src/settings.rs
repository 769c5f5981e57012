// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable per-scheduler configuration.
//!
//! A [`SchedulerSettings`] is taken by value at construction and never
//! mutated afterwards. The historically boolean mode switches (throttled
//! production, self-ticking, synchronous embedder) are a single
//! [`FrameSourceMode`] so the mutually exclusive control-flow paths are
//! explicit, and the empirically tuned timing constants live in
//! [`TimingEstimates`] rather than being hard-coded.

use crate::args::DEFAULT_INTERVAL;
use crate::time::Duration;

/// Where begin-frame ticks come from and how production is throttled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameSourceMode {
    /// An external source (display vsync) delivers ticks; the scheduler
    /// subscribes and unsubscribes as work comes and goes.
    External,
    /// The scheduler arms its own periodic tick wakeups at `interval`.
    Synthetic {
        /// Spacing between self-armed ticks.
        interval: Duration,
    },
    /// No throttling: a fresh tick is armed with zero delay whenever work
    /// remains. Useful for benchmarks and tests.
    Unthrottled,
    /// A synchronous embedder drives drawing directly through
    /// [`Scheduler::on_draw_for_output_surface`]; no deadline wakeups are
    /// armed and draw work is requested via the invalidate action.
    ///
    /// [`Scheduler::on_draw_for_output_surface`]:
    ///     crate::scheduler::Scheduler::on_draw_for_output_surface
    SynchronousExternal,
}

/// Tuning knobs for duration estimation and deadline placement.
///
/// The seeds are conventional 60 Hz numbers; all of them are configuration
/// because their correctness is a performance concern, not a logical one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingEstimates {
    /// EMA smoothing factor for all four duration estimators (0.0–1.0).
    /// Smaller values smooth more.
    pub ema_alpha: f32,
    /// Seed estimate for begin-main-frame to ready-to-commit.
    pub begin_main_frame_to_commit_seed: Duration,
    /// Seed estimate for commit to ready-to-activate.
    pub commit_to_ready_to_activate_seed: Duration,
    /// Seed estimate for pending-tree activation.
    pub activate_seed: Duration,
    /// Seed estimate for draw-and-swap.
    pub draw_seed: Duration,
    /// Room reserved at the end of each tick's deadline for a downstream
    /// (parent) compositor's own draw.
    pub parent_draw_estimate: Duration,
}

impl Default for TimingEstimates {
    fn default() -> Self {
        Self {
            ema_alpha: 0.25,
            begin_main_frame_to_commit_seed: Duration(4_000_000),
            commit_to_ready_to_activate_seed: Duration(2_000_000),
            activate_seed: Duration(1_000_000),
            draw_seed: Duration(2_000_000),
            parent_draw_estimate: Duration::ZERO,
        }
    }
}

/// Immutable configuration snapshot for one scheduler instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerSettings {
    /// Tick delivery and throttling mode.
    pub source: FrameSourceMode,
    /// Allow sending the next begin-main-frame before the previous commit's
    /// first draw has happened.
    pub main_frame_before_draw: bool,
    /// Allow sending the next begin-main-frame while a pending tree still
    /// awaits activation.
    pub main_frame_before_activation: bool,
    /// Initial bound on submitted-but-unacknowledged swaps.
    pub max_pending_swaps: u32,
    /// After this many consecutive checkerboard-aborted draws, force a
    /// commit-then-draw cycle to get something on screen. `None` disables
    /// the escalation.
    pub forced_draw_after_failed_draws: Option<u32>,
    /// Duration estimation and deadline tuning.
    pub timing: TimingEstimates,
}

impl SchedulerSettings {
    /// Throttled production against an external vsync source, the normal
    /// embedding.
    #[must_use]
    pub fn throttled() -> Self {
        Self {
            source: FrameSourceMode::External,
            main_frame_before_draw: true,
            main_frame_before_activation: false,
            max_pending_swaps: 2,
            forced_draw_after_failed_draws: Some(4),
            timing: TimingEstimates::default(),
        }
    }

    /// Self-ticking at the default 60 Hz interval, for hosts without a real
    /// vsync signal.
    #[must_use]
    pub fn synthetic() -> Self {
        Self {
            source: FrameSourceMode::Synthetic {
                interval: DEFAULT_INTERVAL,
            },
            ..Self::throttled()
        }
    }

    /// Unthrottled back-to-back production.
    #[must_use]
    pub fn unthrottled() -> Self {
        Self {
            source: FrameSourceMode::Unthrottled,
            ..Self::throttled()
        }
    }

    /// Embedder-driven synchronous drawing.
    #[must_use]
    pub fn synchronous() -> Self {
        Self {
            source: FrameSourceMode::SynchronousExternal,
            ..Self::throttled()
        }
    }

    /// Whether this instance is driven by a synchronous embedder.
    #[must_use]
    pub fn is_synchronous(&self) -> bool {
        self.source == FrameSourceMode::SynchronousExternal
    }

    /// Whether the scheduler arms its own tick wakeups in this mode.
    #[must_use]
    pub fn self_ticking(&self) -> bool {
        matches!(
            self.source,
            FrameSourceMode::Synthetic { .. } | FrameSourceMode::Unthrottled
        )
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::throttled()
    }
}
