// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host capabilities for time and deferred wakeups.
//!
//! The scheduler never blocks and never sleeps; "waiting" means arming a
//! wakeup through the host's [`WakeupHost`] and returning to the event
//! loop. Pending wakeups are plain value objects identified by a
//! [`WakeupToken`]; cancellation is cooperative — a host that cannot truly
//! cancel a timer (e.g. a `setTimeout`-style API) can still deliver the
//! stale fire, which the scheduler ignores because the token no longer
//! matches.

use crate::time::HostTime;

/// Reads the host's monotonic clock.
pub trait Clock {
    /// Current host time.
    fn now(&self) -> HostTime;
}

/// Which scheduler entry point a wakeup should re-enter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WakeupKind {
    /// Fire the impl-frame deadline.
    Deadline,
    /// Drain the retro-frame queue.
    RetroFrame,
    /// Deliver a self-armed begin-frame tick (synthetic/unthrottled modes).
    SyntheticTick,
}

/// Identifies one armed wakeup.
///
/// Tokens are unique per host for the lifetime of a session; a fired or
/// cancelled token is never reused for a different wakeup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WakeupToken(pub u64);

/// Arms and cancels deferred wakeups on the host's event loop.
///
/// When a wakeup becomes due the host calls
/// [`Scheduler::on_wakeup`](crate::scheduler::Scheduler::on_wakeup) with the
/// token it got from [`schedule`](Self::schedule). A zero-delay wakeup
/// (`due <= now`) must still go through the event loop rather than firing
/// synchronously; run-to-completion of the current entry point depends on
/// it.
pub trait WakeupHost {
    /// Arms a wakeup of the given kind at `due`, returning its token.
    fn schedule(&mut self, kind: WakeupKind, due: HostTime) -> WakeupToken;

    /// Cancels a previously armed wakeup. Cancelling an already-fired or
    /// unknown token is a no-op.
    fn cancel(&mut self, token: WakeupToken);
}

/// An armed wakeup the scheduler is holding on to. Which entry point it
/// re-enters is encoded by the slot that stores it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingWakeup {
    pub(crate) token: WakeupToken,
    pub(crate) due: HostTime,
}
