// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The orchestrator: bridges the pure state machine to real time.
//!
//! [`Scheduler`] owns the [`SchedulerStateMachine`], the [`TimingHistory`],
//! the retro-frame queue, and the armed wakeups. It is the only component
//! that schedules timers or receives external ticks; everything else is a
//! consequence of its action drain loop.
//!
//! # Control flow
//!
//! A begin-frame tick arrives (externally via [`begin_frame`] or from a
//! self-armed wakeup), its deadline is adjusted for downstream draw latency,
//! and it either opens an impl frame or joins the retro-frame queue. Opening
//! a frame drains the state machine's actions into the client, then arms a
//! deadline wakeup in one of four modes. When the deadline fires, pending
//! draws are forced out, the frame closes, and deferred ticks get their
//! chance. Every public entry point runs to completion; "waiting" is an
//! armed wakeup and a return to the host's event loop.
//!
//! [`begin_frame`]: Scheduler::begin_frame

use alloc::collections::VecDeque;

use crate::args::{BeginFrameArgs, DEFAULT_INTERVAL};
use crate::client::{ClientRequests, SchedulerClient};
use crate::history::TimingHistory;
use crate::machine::{
    Action, BeginImplFrameState, BeginMainFrameAbortReason, DeadlineMode, SchedulerStateMachine,
};
use crate::settings::{FrameSourceMode, SchedulerSettings};
use crate::source::{BeginFrameSource, NullBeginFrameSource};
use crate::time::HostTime;
use crate::wakeup::{Clock, PendingWakeup, WakeupHost, WakeupKind, WakeupToken};

/// Everything the scheduler needs from its host event loop: a monotonic
/// clock and cancellable deferred wakeups.
pub trait SchedulerHost: Clock + WakeupHost {}

impl<T: Clock + WakeupHost> SchedulerHost for T {}

/// The frame scheduler orchestrator.
///
/// Owns its [`SchedulerClient`], its [`SchedulerHost`], and (for
/// [`FrameSourceMode::External`]) a [`BeginFrameSource`]; self-ticking modes
/// pass [`NullBeginFrameSource`]. All entry points execute on the host's
/// single scheduling thread, run-to-completion.
#[derive(Debug)]
pub struct Scheduler<C, H, S = NullBeginFrameSource> {
    settings: SchedulerSettings,
    machine: SchedulerStateMachine,
    history: TimingHistory,
    client: C,
    host: H,
    source: S,

    /// Whether begin frames are currently wanted (and, in external mode,
    /// whether the source has been told so).
    observing: bool,
    source_paused: bool,
    inside_process_scheduled_actions: bool,

    begin_impl_frame_args: Option<BeginFrameArgs>,
    retro_frame_args: VecDeque<BeginFrameArgs>,

    pending_deadline: Option<PendingWakeup>,
    pending_retro: Option<PendingWakeup>,
    pending_tick: Option<PendingWakeup>,
    deadline_mode: DeadlineMode,
    last_synthetic_tick_time: Option<HostTime>,

    // Observation timestamps feeding the timing history.
    begin_main_frame_sent_time: Option<HostTime>,
    commit_time: Option<HostTime>,
    draw_issued_time: Option<HostTime>,
}

impl<C, H> Scheduler<C, H>
where
    C: SchedulerClient,
    H: SchedulerHost,
{
    /// Creates a scheduler for a self-ticking or synchronous mode, with no
    /// external begin-frame source.
    pub fn without_source(settings: SchedulerSettings, client: C, host: H) -> Self {
        debug_assert!(
            settings.source != FrameSourceMode::External,
            "external mode needs a real begin-frame source"
        );
        Self::new(settings, client, host, NullBeginFrameSource)
    }
}

impl<C, H, S> Scheduler<C, H, S>
where
    C: SchedulerClient,
    H: SchedulerHost,
    S: BeginFrameSource,
{
    /// Creates a scheduler from an immutable settings snapshot.
    ///
    /// Nothing is subscribed or armed until a need arises.
    pub fn new(settings: SchedulerSettings, client: C, host: H, source: S) -> Self {
        Self {
            machine: SchedulerStateMachine::new(settings),
            history: TimingHistory::new(&settings.timing),
            settings,
            client,
            host,
            source,
            observing: false,
            source_paused: false,
            inside_process_scheduled_actions: false,
            begin_impl_frame_args: None,
            retro_frame_args: VecDeque::new(),
            pending_deadline: None,
            pending_retro: None,
            pending_tick: None,
            deadline_mode: DeadlineMode::Late,
            last_synthetic_tick_time: None,
            begin_main_frame_sent_time: None,
            commit_time: None,
            draw_issued_time: None,
        }
    }

    // -- accessors ----------------------------------------------------------

    /// This scheduler's settings snapshot.
    #[must_use]
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// The owned client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The owned client, mutably.
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// The owned host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The owned host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The owned begin-frame source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Read-only view of the decision core, for introspection and tests.
    #[must_use]
    pub fn machine(&self) -> &SchedulerStateMachine {
        &self.machine
    }

    /// Current duration estimates.
    #[must_use]
    pub fn history(&self) -> &TimingHistory {
        &self.history
    }

    /// Whether a main frame is requested or in flight.
    #[must_use]
    pub fn commit_pending(&self) -> bool {
        self.machine.commit_pending()
    }

    /// Whether a redraw is requested.
    #[must_use]
    pub fn redraw_pending(&self) -> bool {
        self.machine.redraw_pending()
    }

    /// Whether a deadline wakeup is currently armed.
    #[must_use]
    pub fn begin_impl_frame_deadline_pending(&self) -> bool {
        self.pending_deadline.is_some()
    }

    /// When the armed deadline wakeup is due, if one is armed.
    #[must_use]
    pub fn begin_impl_frame_deadline_due(&self) -> Option<HostTime> {
        self.pending_deadline.map(|p| p.due)
    }

    /// The mode the current deadline was armed under.
    #[must_use]
    pub fn deadline_mode(&self) -> DeadlineMode {
        self.deadline_mode
    }

    /// Whether begin frames are currently wanted.
    #[must_use]
    pub fn observing_begin_frames(&self) -> bool {
        self.observing
    }

    /// Number of deferred ticks waiting in the retro-frame queue.
    #[must_use]
    pub fn retro_frame_count(&self) -> usize {
        self.retro_frame_args.len()
    }

    /// Whether the main thread is running more than a frame behind.
    #[must_use]
    pub fn main_thread_is_in_high_latency_mode(&self) -> bool {
        self.machine.main_thread_is_in_high_latency_mode()
    }

    // -- need-flag forwarders ----------------------------------------------

    /// The embedder is ready for output surface creation.
    pub fn set_can_start(&mut self) {
        self.machine.set_can_start();
        self.process_scheduled_actions();
    }

    /// Compositor visibility.
    pub fn set_visible(&mut self, visible: bool) {
        self.machine.set_visible(visible);
        self.process_scheduled_actions();
    }

    /// Whether the active tree is drawable.
    pub fn set_can_draw(&mut self, can_draw: bool) {
        self.machine.set_can_draw(can_draw);
        self.process_scheduled_actions();
    }

    /// Requests a main-thread frame.
    pub fn set_needs_begin_main_frame(&mut self) {
        self.machine.set_needs_begin_main_frame();
        self.process_scheduled_actions();
    }

    /// Requests a redraw.
    pub fn set_needs_redraw(&mut self) {
        self.machine.set_needs_redraw();
        self.process_scheduled_actions();
    }

    /// Requests impl-thread animation.
    pub fn set_needs_animate(&mut self) {
        self.machine.set_needs_animate();
        self.process_scheduled_actions();
    }

    /// Requests tile preparation.
    pub fn set_needs_prepare_tiles(&mut self) {
        self.machine.set_needs_prepare_tiles();
        self.process_scheduled_actions();
    }

    /// Suppresses or releases main-frame production.
    pub fn set_defer_commits(&mut self, defer: bool) {
        self.machine.set_defer_commits(defer);
        self.process_scheduled_actions();
    }

    /// Prioritize smoothness over main-thread latency.
    pub fn set_smoothness_takes_priority(&mut self, priority: bool) {
        self.machine.set_smoothness_takes_priority(priority);
        self.process_scheduled_actions();
    }

    /// Bounds unacknowledged swaps in flight.
    pub fn set_max_pending_swaps(&mut self, max: u32) {
        self.machine.set_max_pending_swaps(max);
        self.process_scheduled_actions();
    }

    // -- main-thread pipeline notifications --------------------------------

    /// The main thread picked up the begin-main-frame.
    pub fn notify_begin_main_frame_started(&mut self) {
        self.machine.notify_begin_main_frame_started();
        self.process_scheduled_actions();
    }

    /// The main thread finished; a commit may now be scheduled.
    pub fn notify_ready_to_commit(&mut self) {
        if let Some(sent) = self.begin_main_frame_sent_time.take() {
            let sample = self.host.now().saturating_duration_since(sent);
            self.history.observe_begin_main_frame_to_commit(sample);
        }
        self.machine.notify_ready_to_commit();
        self.process_scheduled_actions();
    }

    /// The main thread declined to produce a commit this cycle.
    pub fn begin_main_frame_aborted(&mut self, reason: BeginMainFrameAbortReason) {
        self.begin_main_frame_sent_time = None;
        self.machine.begin_main_frame_aborted(reason);
        self.process_scheduled_actions();
    }

    /// For hosts whose commit is asynchronous: marks the moment main-thread
    /// state finished transferring, refining the commit timestamp recorded
    /// at dispatch.
    pub fn did_commit(&mut self) {
        self.commit_time = Some(self.host.now());
        self.process_scheduled_actions();
    }

    // -- impl-thread pipeline notifications --------------------------------

    /// The pending tree finished rastering.
    pub fn notify_ready_to_activate(&mut self) {
        if let Some(commit) = self.commit_time.take() {
            let sample = self.host.now().saturating_duration_since(commit);
            self.history.observe_commit_to_ready_to_activate(sample);
        }
        self.machine.notify_ready_to_activate();
        self.process_scheduled_actions();
    }

    /// Raster for the active tree caught up; its first draw will succeed.
    pub fn notify_ready_to_draw(&mut self) {
        self.machine.notify_ready_to_draw();
        self.process_scheduled_actions();
    }

    /// A swap was submitted outside a draw dispatch.
    pub fn did_swap_buffers(&mut self) {
        self.handle_did_swap_buffers();
        self.process_scheduled_actions();
    }

    /// A previously submitted swap was acknowledged.
    pub fn did_swap_buffers_complete(&mut self) {
        self.machine.did_swap_buffers_complete();
        self.process_scheduled_actions();
    }

    /// Whether the last swap contained incomplete tiles.
    pub fn set_swap_used_incomplete_tile(&mut self, used: bool) {
        self.machine.set_swap_used_incomplete_tile(used);
        self.process_scheduled_actions();
    }

    // -- output surface lifecycle ------------------------------------------

    /// The rendering context disappeared: the abort-everything path.
    ///
    /// Deferred ticks are discarded (they were timed against the dead
    /// context), the timing history resets, and the state machine drains
    /// toward surface recreation. If a frame is open its deadline is
    /// re-armed to fire immediately so the drain happens promptly.
    pub fn did_lose_output_surface(&mut self) {
        self.machine.did_lose_output_surface();
        self.retro_frame_args.clear();
        if let Some(p) = self.pending_retro.take() {
            self.host.cancel(p.token);
        }
        self.begin_main_frame_sent_time = None;
        self.commit_time = None;
        self.draw_issued_time = None;
        self.history.reset();
        self.process_scheduled_actions();
    }

    /// A replacement output surface is up and initialized.
    pub fn did_create_and_initialize_output_surface(&mut self) {
        self.machine.did_create_and_initialize_output_surface();
        self.process_scheduled_actions();
    }

    // -- tick delivery ------------------------------------------------------

    /// Delivers one begin-frame tick.
    ///
    /// The deadline is first pulled in by the configured parent-compositor
    /// draw estimate. If the scheduler cannot act on the tick right now
    /// (mid-frame, unsubscribed, or older ticks are already queued) it is
    /// deferred as a retro frame rather than dropped.
    pub fn begin_frame(&mut self, args: BeginFrameArgs) {
        let adjusted = args.with_deadline_adjusted_by(self.settings.timing.parent_draw_estimate);
        let should_defer = !self.retro_frame_args.is_empty()
            || self.pending_retro.is_some()
            || !self.observing
            || self.machine.begin_impl_frame_state() != BeginImplFrameState::Idle;
        if should_defer {
            self.retro_frame_args.push_back(adjusted);
            return;
        }
        self.begin_impl_frame(adjusted);
    }

    /// The source's ability to produce ticks changed.
    pub fn on_begin_frame_source_paused_changed(&mut self, paused: bool) {
        self.source_paused = paused;
        self.process_scheduled_actions();
    }

    /// A previously armed wakeup became due. Stale tokens (cancelled or
    /// superseded arms) are ignored.
    pub fn on_wakeup(&mut self, token: WakeupToken) {
        if self.pending_deadline.is_some_and(|p| p.token == token) {
            self.pending_deadline = None;
            self.on_begin_impl_frame_deadline();
        } else if self.pending_retro.is_some_and(|p| p.token == token) {
            self.pending_retro = None;
            self.begin_retro_frame();
        } else if self.pending_tick.is_some_and(|p| p.token == token) {
            self.pending_tick = None;
            self.synthetic_tick();
        }
    }

    /// Embedder-driven draw entry for [`FrameSourceMode::SynchronousExternal`]:
    /// collapses the deadline into this synchronous call.
    pub fn on_draw_for_output_surface(&mut self) {
        debug_assert!(self.settings.is_synchronous());
        debug_assert_eq!(
            self.machine.begin_impl_frame_state(),
            BeginImplFrameState::InsideBeginFrame
        );
        self.on_begin_impl_frame_deadline();
    }

    // -- frame lifecycle ----------------------------------------------------

    fn begin_impl_frame(&mut self, args: BeginFrameArgs) {
        debug_assert_eq!(
            self.machine.begin_impl_frame_state(),
            BeginImplFrameState::Idle
        );
        self.begin_impl_frame_args = Some(args);

        // Latency recovery: a chronically late main thread gets one quiet
        // frame to catch up, provided the estimates say its work would fit
        // before this frame's deadline.
        if !self.machine.smoothness_takes_priority()
            && self.machine.main_thread_is_in_high_latency_mode()
            && self.can_begin_main_frame_and_activate_before_deadline(&args)
        {
            self.machine.set_skip_next_begin_main_frame_to_reduce_latency();
        }

        self.machine.on_begin_impl_frame(&args);
        let mut requests = ClientRequests::default();
        self.client.will_begin_impl_frame(&args, &mut requests);
        self.apply_client_requests(requests);
        self.process_scheduled_actions();
        self.schedule_begin_impl_frame_deadline();
    }

    fn on_begin_impl_frame_deadline(&mut self) {
        // The wakeup may have been consumed or the deadline re-armed; make
        // sure no stale duplicate can fire after this.
        if let Some(p) = self.pending_deadline.take() {
            self.host.cancel(p.token);
        }
        self.machine.on_begin_impl_frame_deadline();
        self.process_scheduled_actions();
        self.machine.on_begin_impl_frame_idle();
        self.begin_impl_frame_args = None;
        let mut requests = ClientRequests::default();
        self.client.did_finish_impl_frame(&mut requests);
        self.apply_client_requests(requests);
        // Run housekeeping again now that the frame is closed: deferred
        // ticks and synthetic arming only proceed from idle.
        self.process_scheduled_actions();
    }

    fn can_begin_main_frame_and_activate_before_deadline(&self, args: &BeginFrameArgs) -> bool {
        match args
            .frame_time
            .checked_add(self.history.main_frame_to_activate_estimate())
        {
            Some(estimated_done) => estimated_done < args.deadline,
            None => false,
        }
    }

    // -- the drain loop -----------------------------------------------------

    /// Drains the state machine into the client until no action is
    /// warranted, then performs scheduling housekeeping (subscription,
    /// retro-frame posting, synthetic ticks, deadline re-arming).
    ///
    /// Re-entrancy-guarded: a host whose wakeups fire synchronously cannot
    /// recurse into a second drain; the outer loop picks up whatever the
    /// inner call would have done.
    pub fn process_scheduled_actions(&mut self) {
        if self.inside_process_scheduled_actions {
            return;
        }
        self.inside_process_scheduled_actions = true;
        loop {
            let action = self.machine.next_action();
            self.machine.update_state(action);
            if action == Action::None {
                break;
            }
            self.dispatch(action);
        }
        self.inside_process_scheduled_actions = false;

        self.update_begin_frame_subscription();
        self.post_begin_retro_frame_if_needed();
        self.setup_synthetic_tick();
        self.reschedule_deadline_if_early();
    }

    fn dispatch(&mut self, action: Action) {
        let mut requests = ClientRequests::default();
        match action {
            Action::None => unreachable!("None terminates the drain loop"),
            Action::BeginOutputSurfaceCreation => {
                self.client
                    .scheduled_action_begin_output_surface_creation(&mut requests);
            }
            Action::SendBeginMainFrame => {
                let args = self.begin_impl_frame_args.unwrap_or_else(|| {
                    // Surface bring-up sends outside any frame; synthesize
                    // plausible args so the main thread has a timeline.
                    BeginFrameArgs::for_interval(self.host.now(), DEFAULT_INTERVAL)
                });
                self.begin_main_frame_sent_time = Some(self.host.now());
                self.client
                    .scheduled_action_send_begin_main_frame(&args, &mut requests);
            }
            Action::Commit => {
                self.client.scheduled_action_commit(&mut requests);
                self.commit_time = Some(self.host.now());
            }
            Action::ActivateSyncTree => {
                let start = self.host.now();
                self.client
                    .scheduled_action_activate_sync_tree(&mut requests);
                let sample = self.host.now().saturating_duration_since(start);
                self.history.observe_activate(sample);
            }
            Action::Animate => {
                self.client.scheduled_action_animate(&mut requests);
            }
            Action::DrawAndSwapIfPossible => {
                self.draw_issued_time = Some(self.host.now());
                let result = self
                    .client
                    .scheduled_action_draw_and_swap_if_possible(&mut requests);
                self.apply_client_requests(requests);
                requests = ClientRequests::default();
                self.machine.did_draw(result);
            }
            Action::DrawAndSwapForced => {
                self.draw_issued_time = Some(self.host.now());
                let result = self
                    .client
                    .scheduled_action_draw_and_swap_forced(&mut requests);
                self.apply_client_requests(requests);
                requests = ClientRequests::default();
                self.machine.did_draw(result);
            }
            Action::DrawAndSwapAbort => {
                // Retired internally; the client is not asked to draw.
            }
            Action::PrepareTiles => {
                self.client.scheduled_action_prepare_tiles(&mut requests);
            }
            Action::InvalidateOutputSurface => {
                self.client
                    .scheduled_action_invalidate_output_surface(&mut requests);
            }
        }
        self.apply_client_requests(requests);
    }

    fn apply_client_requests(&mut self, requests: ClientRequests) {
        if requests.is_empty() {
            return;
        }
        if requests.needs_redraw {
            self.machine.set_needs_redraw();
        }
        if requests.needs_animate {
            self.machine.set_needs_animate();
        }
        if requests.needs_begin_main_frame {
            self.machine.set_needs_begin_main_frame();
        }
        if requests.needs_prepare_tiles {
            self.machine.set_needs_prepare_tiles();
        }
        for _ in 0..requests.swaps_submitted {
            self.handle_did_swap_buffers();
        }
        for _ in 0..requests.swaps_completed {
            self.machine.did_swap_buffers_complete();
        }
        if let Some(used) = requests.swap_used_incomplete_tile {
            self.machine.set_swap_used_incomplete_tile(used);
        }
    }

    fn handle_did_swap_buffers(&mut self) {
        self.machine.did_swap_buffers();
        if let Some(issued) = self.draw_issued_time.take() {
            let sample = self.host.now().saturating_duration_since(issued);
            self.history.observe_draw(sample);
        }
    }

    // -- scheduling housekeeping -------------------------------------------

    fn update_begin_frame_subscription(&mut self) {
        let needed = self.machine.begin_frame_needed() && !self.source_paused;
        if needed && !self.observing {
            self.observing = true;
            if self.settings.source == FrameSourceMode::External {
                self.source.set_observing(true);
            }
        } else if !needed
            && self.observing
            // Unsubscribing only at a deadline keeps the subscription from
            // toggling within a frame.
            && self.machine.begin_impl_frame_state() == BeginImplFrameState::InsideDeadline
        {
            self.observing = false;
            if self.settings.source == FrameSourceMode::External {
                self.source.set_observing(false);
            }
            let mut requests = ClientRequests::default();
            self.client
                .send_begin_main_frame_not_expected_soon(&mut requests);
            self.apply_client_requests(requests);
        }
    }

    fn post_begin_retro_frame_if_needed(&mut self) {
        if !self.observing {
            return;
        }
        if self.retro_frame_args.is_empty() || self.pending_retro.is_some() {
            return;
        }
        if self.machine.begin_impl_frame_state() != BeginImplFrameState::Idle {
            return;
        }
        let now = self.host.now();
        let token = self.host.schedule(WakeupKind::RetroFrame, now);
        self.pending_retro = Some(PendingWakeup { token, due: now });
    }

    fn begin_retro_frame(&mut self) {
        if self.machine.begin_impl_frame_state() != BeginImplFrameState::Idle {
            return;
        }
        // Expiry sweep: a deferred tick whose (adjusted) deadline already
        // passed is useless; drop it rather than running a frame against a
        // deadline in the past. This is a recovery policy, checked only
        // here.
        let now = self.host.now();
        while let Some(front) = self.retro_frame_args.front() {
            if front.deadline < now {
                self.retro_frame_args.pop_front();
            } else {
                break;
            }
        }
        if let Some(args) = self.retro_frame_args.pop_front() {
            self.begin_impl_frame(args);
        }
    }

    fn setup_synthetic_tick(&mut self) {
        if !self.settings.self_ticking() {
            return;
        }
        let needed = self.machine.begin_frame_needed() && !self.source_paused && self.observing;
        if !needed {
            if let Some(p) = self.pending_tick.take() {
                self.host.cancel(p.token);
            }
            return;
        }
        if self.pending_tick.is_some() {
            return;
        }
        if self.machine.begin_impl_frame_state() != BeginImplFrameState::Idle {
            return;
        }
        let now = self.host.now();
        let due = match self.settings.source {
            FrameSourceMode::Synthetic { interval } => self
                .last_synthetic_tick_time
                .and_then(|t| t.checked_add(interval))
                .filter(|next| *next > now)
                .unwrap_or(now),
            FrameSourceMode::Unthrottled => now,
            FrameSourceMode::External | FrameSourceMode::SynchronousExternal => return,
        };
        let token = self.host.schedule(WakeupKind::SyntheticTick, due);
        self.pending_tick = Some(PendingWakeup { token, due });
    }

    fn synthetic_tick(&mut self) {
        let now = self.host.now();
        let interval = match self.settings.source {
            FrameSourceMode::Synthetic { interval } => interval,
            _ => DEFAULT_INTERVAL,
        };
        self.last_synthetic_tick_time = Some(now);
        self.begin_frame(BeginFrameArgs::for_interval(now, interval));
    }

    fn schedule_begin_impl_frame_deadline(&mut self) {
        if let Some(p) = self.pending_deadline.take() {
            self.host.cancel(p.token);
        }
        let Some(args) = self.begin_impl_frame_args else {
            return;
        };
        let mode = self.machine.current_deadline_mode();
        self.deadline_mode = mode;
        let due = match mode {
            // The synchronous embedder calls `on_draw_for_output_surface`
            // itself; arming a task would race it.
            DeadlineMode::None => return,
            DeadlineMode::Immediate => self.host.now(),
            DeadlineMode::Regular => args.deadline.saturating_sub(self.history.draw_estimate()),
            DeadlineMode::Late => args
                .frame_time
                .checked_add(args.interval)
                .unwrap_or(args.deadline),
        };
        let token = self.host.schedule(WakeupKind::Deadline, due);
        self.pending_deadline = Some(PendingWakeup { token, due });
    }

    fn reschedule_deadline_if_early(&mut self) {
        if self.machine.begin_impl_frame_state() != BeginImplFrameState::InsideBeginFrame {
            return;
        }
        if self.pending_deadline.is_none() || self.deadline_mode == DeadlineMode::Immediate {
            return;
        }
        if self.machine.should_trigger_begin_impl_frame_deadline_early() {
            self.schedule_begin_impl_frame_deadline();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::client::ClientRequests;
    use crate::machine::DrawResult;
    use crate::settings::TimingEstimates;
    use crate::time::Duration;

    // A minimal deterministic host: manual clock plus an ordered wakeup
    // queue the test pumps by hand.
    #[derive(Debug, Default)]
    struct TestHost {
        now: u64,
        next_token: u64,
        armed: Vec<(WakeupKind, WakeupToken, u64)>,
    }

    impl TestHost {
        fn earliest(&self) -> Option<(WakeupKind, WakeupToken, u64)> {
            self.armed.iter().min_by_key(|(_, t, due)| (*due, t.0)).copied()
        }
    }

    impl Clock for TestHost {
        fn now(&self) -> HostTime {
            HostTime(self.now)
        }
    }

    impl WakeupHost for TestHost {
        fn schedule(&mut self, kind: WakeupKind, due: HostTime) -> WakeupToken {
            self.next_token += 1;
            let token = WakeupToken(self.next_token);
            self.armed.push((kind, token, due.ticks()));
            token
        }

        fn cancel(&mut self, token: WakeupToken) {
            self.armed.retain(|(_, t, _)| *t != token);
        }
    }

    // A recording client in the style of the machine tests: logs action
    // names, draws succeed or fail on request, swaps ack automatically.
    #[derive(Debug)]
    struct TestClient {
        actions: Vec<&'static str>,
        draw_will_succeed: bool,
        automatic_swap_ack: bool,
    }

    impl Default for TestClient {
        fn default() -> Self {
            Self {
                actions: Vec::new(),
                draw_will_succeed: true,
                automatic_swap_ack: true,
            }
        }
    }

    impl TestClient {
        fn draw(&mut self, name: &'static str, requests: &mut ClientRequests) -> DrawResult {
            self.actions.push(name);
            if self.draw_will_succeed {
                requests.did_swap_buffers();
                if self.automatic_swap_ack {
                    requests.did_swap_buffers_complete();
                }
                DrawResult::Success
            } else {
                DrawResult::AbortedCheckerboardAnimations
            }
        }
    }

    impl SchedulerClient for TestClient {
        fn will_begin_impl_frame(&mut self, _args: &BeginFrameArgs, _rq: &mut ClientRequests) {
            self.actions.push("will_begin_impl_frame");
        }

        fn did_finish_impl_frame(&mut self, _rq: &mut ClientRequests) {
            self.actions.push("did_finish_impl_frame");
        }

        fn scheduled_action_animate(&mut self, _rq: &mut ClientRequests) {
            self.actions.push("animate");
        }

        fn scheduled_action_send_begin_main_frame(
            &mut self,
            _args: &BeginFrameArgs,
            _rq: &mut ClientRequests,
        ) {
            self.actions.push("send_begin_main_frame");
        }

        fn scheduled_action_commit(&mut self, _rq: &mut ClientRequests) {
            self.actions.push("commit");
        }

        fn scheduled_action_activate_sync_tree(&mut self, _rq: &mut ClientRequests) {
            self.actions.push("activate_sync_tree");
        }

        fn scheduled_action_draw_and_swap_if_possible(
            &mut self,
            requests: &mut ClientRequests,
        ) -> DrawResult {
            self.draw("draw_and_swap_if_possible", requests)
        }

        fn scheduled_action_draw_and_swap_forced(
            &mut self,
            requests: &mut ClientRequests,
        ) -> DrawResult {
            self.draw("draw_and_swap_forced", requests)
        }

        fn scheduled_action_prepare_tiles(&mut self, _rq: &mut ClientRequests) {
            self.actions.push("prepare_tiles");
        }

        fn scheduled_action_begin_output_surface_creation(&mut self, _rq: &mut ClientRequests) {
            self.actions.push("begin_output_surface_creation");
        }

        fn scheduled_action_invalidate_output_surface(&mut self, _rq: &mut ClientRequests) {
            self.actions.push("invalidate_output_surface");
        }

        fn send_begin_main_frame_not_expected_soon(&mut self, _rq: &mut ClientRequests) {
            self.actions.push("begin_main_frame_not_expected_soon");
        }
    }

    #[derive(Debug, Default)]
    struct TestSource {
        observing: bool,
    }

    impl BeginFrameSource for TestSource {
        fn set_observing(&mut self, observing: bool) {
            self.observing = observing;
        }
    }

    type TestScheduler = Scheduler<TestClient, TestHost, TestSource>;

    fn scheduler(settings: SchedulerSettings) -> TestScheduler {
        Scheduler::new(
            settings,
            TestClient::default(),
            TestHost::default(),
            TestSource::default(),
        )
    }

    /// Runs the earliest armed wakeup, advancing the manual clock to its due
    /// time. Returns the kind that ran.
    fn run_next_wakeup(sched: &mut TestScheduler) -> Option<WakeupKind> {
        let (kind, token, due) = sched.host().earliest()?;
        let host = sched.host_mut();
        host.now = host.now.max(due);
        host.cancel(token);
        sched.on_wakeup(token);
        Some(kind)
    }

    fn take_actions(sched: &mut TestScheduler) -> Vec<&'static str> {
        core::mem::take(&mut sched.client_mut().actions)
    }

    fn tick_at(frame_time: u64) -> BeginFrameArgs {
        BeginFrameArgs::for_interval(HostTime(frame_time), DEFAULT_INTERVAL)
    }

    /// Brings a scheduler to a quiescent Active-surface state.
    fn initialize_surface_and_first_commit(sched: &mut TestScheduler) {
        sched.set_can_start();
        sched.set_visible(true);
        sched.set_can_draw(true);
        assert_eq!(take_actions(sched), ["begin_output_surface_creation"]);
        sched.did_create_and_initialize_output_surface();

        sched.set_needs_begin_main_frame();
        assert_eq!(take_actions(sched), ["send_begin_main_frame"]);
        sched.notify_begin_main_frame_started();
        sched.notify_ready_to_commit();
        assert_eq!(take_actions(sched), ["commit"]);
        sched.notify_ready_to_activate();
        assert_eq!(take_actions(sched), ["activate_sync_tree"]);

        // Draw the first frame through a real tick+deadline cycle.
        sched.host_mut().now = 1_000_000;
        sched.begin_frame(tick_at(1_000_000));
        assert!(sched.begin_impl_frame_deadline_pending());
        assert_eq!(run_next_wakeup(sched), Some(WakeupKind::Deadline));
        let actions = take_actions(sched);
        assert!(
            actions.contains(&"draw_and_swap_if_possible"),
            "first commit should reach the screen: {actions:?}"
        );

        // One more tick to let the subscription settle back down.
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        assert_eq!(run_next_wakeup(sched), Some(WakeupKind::Deadline));
        take_actions(sched);
        assert!(!sched.observing_begin_frames());
    }

    #[test]
    fn initialize_output_surface_does_not_begin_impl_frame() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        sched.set_can_start();
        sched.set_visible(true);
        sched.set_can_draw(true);
        assert_eq!(take_actions(&mut sched), ["begin_output_surface_creation"]);
        sched.did_create_and_initialize_output_surface();
        assert_eq!(take_actions(&mut sched), Vec::<&str>::new());
        assert!(!sched.begin_impl_frame_deadline_pending());
    }

    #[test]
    fn request_commit_full_cycle() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        initialize_surface_and_first_commit(&mut sched);

        // A commit request subscribes to begin frames; nothing else yet.
        sched.set_needs_begin_main_frame();
        assert!(sched.observing_begin_frames());
        assert!(sched.source().observing);
        assert_eq!(take_actions(&mut sched), Vec::<&str>::new());

        // The tick starts the frame and sends the main frame.
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        assert_eq!(
            take_actions(&mut sched),
            ["will_begin_impl_frame", "send_begin_main_frame"]
        );
        assert!(sched.begin_impl_frame_deadline_pending());

        // Deadline without a swap: wait for the next tick.
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        assert_eq!(take_actions(&mut sched), ["did_finish_impl_frame"]);
        assert!(!sched.begin_impl_frame_deadline_pending());
        assert!(sched.observing_begin_frames());

        // Ready-to-commit triggers the commit outside the frame.
        sched.notify_begin_main_frame_started();
        sched.notify_ready_to_commit();
        assert_eq!(take_actions(&mut sched), ["commit"]);

        // Activation readiness promotes the pending tree.
        sched.notify_ready_to_activate();
        assert_eq!(take_actions(&mut sched), ["activate_sync_tree"]);

        // The next tick animates and its deadline draws.
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        assert_eq!(take_actions(&mut sched), ["will_begin_impl_frame", "animate"]);
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        let actions = take_actions(&mut sched);
        assert_eq!(
            actions,
            ["draw_and_swap_if_possible", "did_finish_impl_frame"]
        );

        // One idle frame later the subscription drops without toggling
        // mid-frame.
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        assert_eq!(take_actions(&mut sched), ["will_begin_impl_frame"]);
        assert!(sched.observing_begin_frames());
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        let actions = take_actions(&mut sched);
        assert!(
            actions.contains(&"begin_main_frame_not_expected_soon"),
            "unsubscribing tells the main thread to relax: {actions:?}"
        );
        assert!(!sched.observing_begin_frames());
    }

    #[test]
    fn redraw_only_frame_draws_without_main_frame() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        initialize_surface_and_first_commit(&mut sched);

        sched.set_needs_redraw();
        assert!(sched.observing_begin_frames());

        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        // Only drawing is pending: the deadline is immediate.
        assert_eq!(sched.deadline_mode(), DeadlineMode::Immediate);
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        let actions = take_actions(&mut sched);
        assert!(actions.contains(&"draw_and_swap_if_possible"));
        assert!(
            !actions.contains(&"send_begin_main_frame"),
            "no commit was requested: {actions:?}"
        );
    }

    #[test]
    fn aborted_main_frame_never_commits() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        initialize_surface_and_first_commit(&mut sched);

        sched.set_needs_begin_main_frame();
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        assert_eq!(
            take_actions(&mut sched),
            ["will_begin_impl_frame", "send_begin_main_frame"]
        );

        sched.begin_main_frame_aborted(BeginMainFrameAbortReason::FinishedNoUpdates);
        assert!(!sched.commit_pending());
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        let actions = take_actions(&mut sched);
        assert!(!actions.contains(&"commit"), "{actions:?}");
    }

    #[test]
    fn retro_frames_run_in_order_after_busy_frame() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        initialize_surface_and_first_commit(&mut sched);

        sched.set_needs_begin_main_frame();
        let t0 = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t0;
        // Long-deadline tick so the queued ones stay fresh.
        let mut args = tick_at(t0);
        args.deadline = HostTime(t0 + 40 * DEFAULT_INTERVAL.ticks());
        sched.begin_frame(args);
        assert_eq!(
            take_actions(&mut sched),
            ["will_begin_impl_frame", "send_begin_main_frame"]
        );

        // Two more ticks arrive while the frame is open: both defer.
        let mut t1 = tick_at(t0 + DEFAULT_INTERVAL.ticks());
        t1.deadline = HostTime(t0 + 41 * DEFAULT_INTERVAL.ticks());
        let mut t2 = tick_at(t0 + 2 * DEFAULT_INTERVAL.ticks());
        t2.deadline = HostTime(t0 + 42 * DEFAULT_INTERVAL.ticks());
        sched.begin_frame(t1);
        sched.begin_frame(t2);
        assert_eq!(sched.retro_frame_count(), 2);

        // Close the frame; the first retro frame is posted and runs.
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        take_actions(&mut sched);
        sched.notify_begin_main_frame_started();
        sched.notify_ready_to_commit();
        assert_eq!(take_actions(&mut sched), ["commit"]);
        sched.notify_ready_to_activate();
        assert_eq!(take_actions(&mut sched), ["activate_sync_tree"]);

        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::RetroFrame));
        let actions = take_actions(&mut sched);
        assert_eq!(actions[0], "will_begin_impl_frame");
        assert_eq!(sched.retro_frame_count(), 1, "t2 still queued");

        // Its deadline closes frame t1, then t2 is posted and runs.
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        take_actions(&mut sched);
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::RetroFrame));
        let actions = take_actions(&mut sched);
        assert_eq!(actions[0], "will_begin_impl_frame");
        assert_eq!(sched.retro_frame_count(), 0);
    }

    #[test]
    fn expired_retro_frames_are_discarded_at_drain() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        initialize_surface_and_first_commit(&mut sched);

        sched.set_needs_begin_main_frame();
        let t0 = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t0;
        sched.begin_frame(tick_at(t0));
        take_actions(&mut sched);

        // Queue a tick whose deadline will have passed by drain time, and a
        // fresh one behind it.
        let stale = tick_at(t0 + 1_000);
        let mut fresh = tick_at(t0 + 2_000);
        fresh.deadline = HostTime(t0 + 100 * DEFAULT_INTERVAL.ticks());
        sched.begin_frame(stale);
        sched.begin_frame(fresh);
        assert_eq!(sched.retro_frame_count(), 2);

        // Let enough time pass that `stale` expires before the queue drains.
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        take_actions(&mut sched);
        sched.host_mut().now = t0 + 2 * DEFAULT_INTERVAL.ticks();

        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::RetroFrame));
        let actions = take_actions(&mut sched);
        assert_eq!(
            actions[0], "will_begin_impl_frame",
            "the fresh tick still runs"
        );
        assert_eq!(sched.retro_frame_count(), 0, "the stale tick was dropped");
    }

    #[test]
    fn swap_throttling_holds_main_frames_until_ack() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        initialize_surface_and_first_commit(&mut sched);
        sched.set_max_pending_swaps(1);
        sched.client_mut().automatic_swap_ack = false;

        // Draw once to spend the only swap credit.
        sched.set_needs_redraw();
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        assert!(take_actions(&mut sched).contains(&"draw_and_swap_if_possible"));
        assert!(sched.machine().swap_throttled());

        // While throttled, a commit request does not go to the main thread.
        sched.set_needs_begin_main_frame();
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        let actions = take_actions(&mut sched);
        assert!(
            !actions.contains(&"send_begin_main_frame"),
            "throttled: {actions:?}"
        );

        // The ack releases it immediately.
        sched.did_swap_buffers_complete();
        let actions = take_actions(&mut sched);
        assert!(
            actions.contains(&"send_begin_main_frame"),
            "ack should release the main frame: {actions:?}"
        );
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        take_actions(&mut sched);
    }

    #[test]
    fn output_surface_loss_discards_retro_frames_and_recreates() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        initialize_surface_and_first_commit(&mut sched);

        sched.set_needs_begin_main_frame();
        let t0 = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t0;
        sched.begin_frame(tick_at(t0));
        take_actions(&mut sched);
        sched.begin_frame(tick_at(t0 + DEFAULT_INTERVAL.ticks()));
        assert_eq!(sched.retro_frame_count(), 1);

        sched.did_lose_output_surface();
        assert_eq!(sched.retro_frame_count(), 0, "queued ticks are dead");
        // The in-flight main frame aborts against the lost surface.
        sched.begin_main_frame_aborted(BeginMainFrameAbortReason::OutputSurfaceLost);

        // The open frame's deadline was pulled in; run it to drain out.
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        let actions = take_actions(&mut sched);
        assert!(
            actions.contains(&"begin_output_surface_creation"),
            "recreation, not drawing, follows loss: {actions:?}"
        );
        assert!(!actions.contains(&"draw_and_swap_if_possible"));

        sched.did_create_and_initialize_output_surface();
        let actions = take_actions(&mut sched);
        assert_eq!(
            actions,
            ["send_begin_main_frame"],
            "the fresh surface solicits its first commit"
        );
    }

    #[test]
    fn latency_recovery_skips_one_main_frame_when_estimates_fit() {
        let mut settings = SchedulerSettings::throttled();
        // Estimates small enough to fit comfortably inside a frame.
        settings.timing.begin_main_frame_to_commit_seed = Duration(1_000_000);
        settings.timing.commit_to_ready_to_activate_seed = Duration(500_000);
        settings.timing.activate_seed = Duration(500_000);
        let mut sched = scheduler(settings);
        initialize_surface_and_first_commit(&mut sched);

        // Miss a deadline: send a main frame and let the frame close without
        // a commit.
        sched.set_needs_begin_main_frame();
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        assert!(take_actions(&mut sched).contains(&"send_begin_main_frame"));
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        take_actions(&mut sched);
        assert!(sched.main_thread_is_in_high_latency_mode());

        // Next frame: another commit is wanted, but the scheduler skips the
        // send to let the late one land inside this frame.
        sched.set_needs_begin_main_frame();
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        let actions = take_actions(&mut sched);
        assert!(
            !actions.contains(&"send_begin_main_frame"),
            "recovery frame must skip the send: {actions:?}"
        );

        // The late main frame lands and the pipeline catches up within this
        // frame.
        sched.notify_begin_main_frame_started();
        sched.notify_ready_to_commit();
        assert_eq!(
            take_actions(&mut sched),
            ["commit"],
            "the skip must hold back the next send even after the commit"
        );
        sched.notify_ready_to_activate();
        assert_eq!(take_actions(&mut sched), ["activate_sync_tree", "animate"]);
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        let actions = take_actions(&mut sched);
        assert!(actions.contains(&"draw_and_swap_if_possible"));
        assert!(
            !sched.main_thread_is_in_high_latency_mode(),
            "latency recovered"
        );
    }

    #[test]
    fn smoothness_priority_disables_latency_recovery() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        initialize_surface_and_first_commit(&mut sched);
        sched.set_smoothness_takes_priority(true);

        sched.set_needs_begin_main_frame();
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        assert!(take_actions(&mut sched).contains(&"send_begin_main_frame"));
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        take_actions(&mut sched);

        sched.set_needs_begin_main_frame();
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        sched.notify_begin_main_frame_started();
        sched.notify_ready_to_commit();
        take_actions(&mut sched);
        sched.notify_ready_to_activate();
        let actions = take_actions(&mut sched);
        assert!(actions.contains(&"activate_sync_tree"));
        // Smoothness also holds the second request behind the undrawn tree.
        assert!(
            !actions.contains(&"send_begin_main_frame"),
            "smoothness priority keeps the main thread off an undrawn tree: {actions:?}"
        );
    }

    #[test]
    fn synthetic_mode_self_ticks() {
        let mut sched: Scheduler<TestClient, TestHost> = Scheduler::without_source(
            SchedulerSettings::synthetic(),
            TestClient::default(),
            TestHost::default(),
        );
        sched.set_can_start();
        sched.set_visible(true);
        sched.set_can_draw(true);
        assert_eq!(
            core::mem::take(&mut sched.client_mut().actions),
            ["begin_output_surface_creation"]
        );
        sched.did_create_and_initialize_output_surface();
        sched.set_needs_begin_main_frame();
        assert_eq!(
            core::mem::take(&mut sched.client_mut().actions),
            ["send_begin_main_frame"]
        );
        sched.notify_begin_main_frame_started();
        sched.notify_ready_to_commit();
        sched.notify_ready_to_activate();
        core::mem::take(&mut sched.client_mut().actions);

        // A redraw need arms a synthetic tick with no external source.
        assert!(
            sched
                .host()
                .armed
                .iter()
                .any(|(k, _, _)| *k == WakeupKind::SyntheticTick),
            "synthetic tick should be armed: {:?}",
            sched.host().armed
        );
        // Pump: tick opens the frame, deadline draws.
        let (_, token, due) = sched.host().earliest().unwrap();
        {
            let host = sched.host_mut();
            host.now = host.now.max(due);
            host.cancel(token);
        }
        sched.on_wakeup(token);
        let actions = core::mem::take(&mut sched.client_mut().actions);
        assert_eq!(actions[0], "will_begin_impl_frame");

        let (_, token, due) = sched.host().earliest().unwrap();
        {
            let host = sched.host_mut();
            host.now = host.now.max(due);
            host.cancel(token);
        }
        sched.on_wakeup(token);
        let actions = core::mem::take(&mut sched.client_mut().actions);
        assert!(
            actions.contains(&"draw_and_swap_if_possible"),
            "synthetic deadline draws: {actions:?}"
        );
    }

    #[test]
    fn synchronous_mode_posts_no_deadline_and_draws_on_demand() {
        let mut sched: Scheduler<TestClient, TestHost> = Scheduler::without_source(
            SchedulerSettings::synchronous(),
            TestClient::default(),
            TestHost::default(),
        );
        sched.set_can_start();
        sched.set_visible(true);
        sched.set_can_draw(true);
        core::mem::take(&mut sched.client_mut().actions);
        sched.did_create_and_initialize_output_surface();
        sched.set_needs_begin_main_frame();
        core::mem::take(&mut sched.client_mut().actions);
        sched.notify_begin_main_frame_started();
        sched.notify_ready_to_commit();
        sched.notify_ready_to_activate();
        core::mem::take(&mut sched.client_mut().actions);

        sched.set_needs_redraw();
        sched.begin_frame(BeginFrameArgs::for_interval(HostTime(100), DEFAULT_INTERVAL));
        let actions = core::mem::take(&mut sched.client_mut().actions);
        assert!(
            actions.contains(&"invalidate_output_surface"),
            "synchronous mode asks the embedder to draw: {actions:?}"
        );
        assert!(
            !sched.begin_impl_frame_deadline_pending(),
            "no deadline task in synchronous mode"
        );

        sched.on_draw_for_output_surface();
        let actions = core::mem::take(&mut sched.client_mut().actions);
        assert!(
            actions.contains(&"draw_and_swap_if_possible"),
            "the embedder-driven draw runs the deadline inline: {actions:?}"
        );
    }

    #[test]
    fn failed_draw_keeps_request_and_retries() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        initialize_surface_and_first_commit(&mut sched);
        sched.client_mut().draw_will_succeed = false;

        sched.set_needs_redraw();
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        assert!(take_actions(&mut sched).contains(&"draw_and_swap_if_possible"));

        // The failure kept the redraw and solicited new content.
        assert!(sched.redraw_pending());
        assert!(sched.commit_pending());
        assert!(sched.observing_begin_frames());

        sched.client_mut().draw_will_succeed = true;
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        assert_eq!(run_next_wakeup(&mut sched), Some(WakeupKind::Deadline));
        assert!(take_actions(&mut sched).contains(&"draw_and_swap_if_possible"));
        assert!(!sched.redraw_pending());
    }

    #[test]
    fn timing_history_learns_from_the_pipeline() {
        let mut sched = scheduler(SchedulerSettings::throttled());
        initialize_surface_and_first_commit(&mut sched);
        let seed = sched.history().begin_main_frame_to_commit_estimate();

        sched.set_needs_begin_main_frame();
        let t = sched.host().now + DEFAULT_INTERVAL.ticks();
        sched.host_mut().now = t;
        sched.begin_frame(tick_at(t));
        take_actions(&mut sched);
        // The main thread takes 12ms to become ready.
        sched.host_mut().now += 12_000_000;
        sched.notify_begin_main_frame_started();
        sched.notify_ready_to_commit();
        take_actions(&mut sched);
        assert_ne!(
            sched.history().begin_main_frame_to_commit_estimate(),
            seed,
            "the 12ms observation must move the estimate"
        );

        // Surface loss resets history to the configured seeds.
        sched.did_lose_output_surface();
        assert_eq!(
            sched.history().begin_main_frame_to_commit_estimate(),
            TimingEstimates::default().begin_main_frame_to_commit_seed
        );
    }
}
