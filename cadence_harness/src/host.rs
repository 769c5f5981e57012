// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Manual clock and wakeup queue.

use alloc::vec::Vec;

use cadence_core::client::SchedulerClient;
use cadence_core::scheduler::Scheduler;
use cadence_core::source::BeginFrameSource;
use cadence_core::time::{Duration, HostTime};
use cadence_core::wakeup::{Clock, WakeupHost, WakeupKind, WakeupToken};

/// One wakeup currently armed on a [`ManualHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmedWakeup {
    /// Which scheduler entry point the wakeup re-enters.
    pub kind: WakeupKind,
    /// The token the scheduler holds for it.
    pub token: WakeupToken,
    /// When it is due.
    pub due: HostTime,
}

/// A deterministic scheduler host: time only moves when the test says so,
/// and armed wakeups sit in an inspectable queue until pumped.
///
/// Wakeups fire in due order; equal due times fire in arming order (tokens
/// are handed out monotonically).
#[derive(Debug, Default)]
pub struct ManualHost {
    now: HostTime,
    next_token: u64,
    armed: Vec<ArmedWakeup>,
}

impl ManualHost {
    /// A host starting at time zero with nothing armed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current manual time.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.now
    }

    /// Jumps the clock to `now`. Does not fire anything by itself.
    pub fn set_now(&mut self, now: HostTime) {
        debug_assert!(now >= self.now, "manual time must be monotonic");
        self.now = now;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.now = self.now + delta;
    }

    /// Everything currently armed, in arming order.
    #[must_use]
    pub fn armed(&self) -> &[ArmedWakeup] {
        &self.armed
    }

    /// The next wakeup to fire: earliest due, ties broken by arming order.
    #[must_use]
    pub fn earliest(&self) -> Option<ArmedWakeup> {
        self.armed
            .iter()
            .min_by_key(|w| (w.due, w.token.0))
            .copied()
    }

    /// Removes one armed wakeup. Unknown tokens are a no-op.
    pub fn remove(&mut self, token: WakeupToken) {
        self.armed.retain(|w| w.token != token);
    }
}

impl Clock for ManualHost {
    fn now(&self) -> HostTime {
        self.now
    }
}

impl WakeupHost for ManualHost {
    fn schedule(&mut self, kind: WakeupKind, due: HostTime) -> WakeupToken {
        self.next_token += 1;
        let token = WakeupToken(self.next_token);
        self.armed.push(ArmedWakeup { kind, token, due });
        token
    }

    fn cancel(&mut self, token: WakeupToken) {
        self.remove(token);
    }
}

/// Fires the earliest armed wakeup, advancing the manual clock to its due
/// time first. Returns the kind that fired, or `None` if nothing is armed.
pub fn run_next_wakeup<C, S>(sched: &mut Scheduler<C, ManualHost, S>) -> Option<WakeupKind>
where
    C: SchedulerClient,
    S: BeginFrameSource,
{
    let wakeup = sched.host().earliest()?;
    let host = sched.host_mut();
    host.set_now(host.now().max(wakeup.due));
    host.remove(wakeup.token);
    sched.on_wakeup(wakeup.token);
    Some(wakeup.kind)
}

/// Pumps wakeups until the queue is empty or `max_steps` have run. Returns
/// the number of wakeups fired.
///
/// The bound matters: an unthrottled or synthetic-ticking scheduler with
/// outstanding work re-arms itself forever.
pub fn run_until_idle<C, S>(sched: &mut Scheduler<C, ManualHost, S>, max_steps: usize) -> usize
where
    C: SchedulerClient,
    S: BeginFrameSource,
{
    let mut steps = 0;
    while steps < max_steps && run_next_wakeup(sched).is_some() {
        steps += 1;
    }
    steps
}
