// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The consumed begin-frame source capability.
//!
//! A begin-frame source is whatever produces ticks: a display's vsync
//! signal, a platform display link, or a test double. The scheduler only
//! tells the source whether it wants ticks; ticks themselves arrive through
//! [`Scheduler::begin_frame`](crate::scheduler::Scheduler::begin_frame), and
//! pause notifications through
//! [`Scheduler::on_begin_frame_source_paused_changed`](crate::scheduler::Scheduler::on_begin_frame_source_paused_changed),
//! both called by the host that owns the delivery mechanism.
//!
//! In the self-ticking modes ([`FrameSourceMode::Synthetic`] and
//! [`FrameSourceMode::Unthrottled`]) no external source exists; use
//! [`NullBeginFrameSource`].
//!
//! [`FrameSourceMode::Synthetic`]: crate::settings::FrameSourceMode::Synthetic
//! [`FrameSourceMode::Unthrottled`]: crate::settings::FrameSourceMode::Unthrottled

/// An external producer of begin-frame ticks.
pub trait BeginFrameSource {
    /// Tells the source whether this scheduler currently wants ticks.
    ///
    /// Idempotent: the scheduler may repeat the current value.
    fn set_observing(&mut self, observing: bool);
}

/// A source for modes that do not consume external ticks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBeginFrameSource;

impl BeginFrameSource for NullBeginFrameSource {
    fn set_observing(&mut self, _observing: bool) {}
}
