// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the scheduling loop.
//!
//! [`TraceSink`] is a per-event trait the embedding's frame loop calls as it
//! drives the scheduler; all methods default to no-ops so sinks implement
//! only what they care about. [`Tracer`] wraps an optional
//! `&mut dyn TraceSink`: with the `trace` feature **off** every method
//! compiles to nothing, with it **on** each method costs one `Option`
//! branch.
//!
//! The scheduler core does not emit events itself; the driver (see the
//! harness crate) observes ticks, dispatched actions, deadline arming, and
//! retro-frame handling at the call sites it already owns, and forwards
//! them here. This keeps the core free of any sink plumbing.

use crate::args::BeginFrameArgs;
use crate::machine::{Action, DeadlineMode, DrawResult};
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// What happened to a begin-frame tick on arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickDisposition {
    /// The tick started an impl frame immediately.
    Handled,
    /// The scheduler was busy or unsubscribed; the tick joined the
    /// retro-frame queue.
    Deferred,
}

/// Emitted when a begin-frame tick reaches the scheduler.
#[derive(Clone, Copy, Debug)]
pub struct TickEvent {
    /// The (parent-adjusted) tick.
    pub args: BeginFrameArgs,
    /// Whether it ran or was deferred.
    pub disposition: TickDisposition,
}

/// Emitted for every non-`None` action the scheduler dispatches.
#[derive(Clone, Copy, Debug)]
pub struct ActionEvent {
    /// Monotonic impl-frame counter at dispatch time.
    pub frame_number: u64,
    /// The dispatched action.
    pub action: Action,
}

/// Emitted when the impl-frame deadline is armed or re-armed.
#[derive(Clone, Copy, Debug)]
pub struct DeadlineEvent {
    /// Impl-frame counter.
    pub frame_number: u64,
    /// The mode the deadline was computed under.
    pub mode: DeadlineMode,
    /// When the wakeup is due.
    pub due: HostTime,
}

/// What happened to a retro frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetroFrameStage {
    /// Pulled from the queue and run.
    Consumed,
    /// Discarded because its deadline had passed at drain time.
    Expired,
}

/// Emitted when the retro-frame queue is drained.
#[derive(Clone, Copy, Debug)]
pub struct RetroFrameEvent {
    /// The queued tick's frame time.
    pub frame_time: HostTime,
    /// Whether it ran or expired.
    pub stage: RetroFrameStage,
}

/// Emitted when a draw reports its outcome.
#[derive(Clone, Copy, Debug)]
pub struct DrawOutcomeEvent {
    /// Impl-frame counter.
    pub frame_number: u64,
    /// The reported result.
    pub result: DrawResult,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the scheduling loop.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called when a begin-frame tick arrives.
    fn on_tick(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// Called for each dispatched action.
    fn on_action(&mut self, e: &ActionEvent) {
        _ = e;
    }

    /// Called when the deadline is armed.
    fn on_deadline_armed(&mut self, e: &DeadlineEvent) {
        _ = e;
    }

    /// Called for each retro frame consumed or expired.
    fn on_retro_frame(&mut self, e: &RetroFrameEvent) {
        _ = e;
    }

    /// Called when a draw outcome is reported.
    fn on_draw_outcome(&mut self, e: &DrawOutcomeEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`TickEvent`].
    #[inline]
    pub fn tick(&mut self, e: &TickEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ActionEvent`].
    #[inline]
    pub fn action(&mut self, e: &ActionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_action(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DeadlineEvent`].
    #[inline]
    pub fn deadline_armed(&mut self, e: &DeadlineEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_deadline_armed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RetroFrameEvent`].
    #[inline]
    pub fn retro_frame(&mut self, e: &RetroFrameEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_retro_frame(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DrawOutcomeEvent`].
    #[inline]
    pub fn draw_outcome(&mut self, e: &DrawOutcomeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_draw_outcome(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
