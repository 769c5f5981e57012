// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pure frame-scheduling decision core.
//!
//! [`SchedulerStateMachine`] holds every flag and phase of the frame
//! pipeline and answers one question: given everything that has happened,
//! what single [`Action`] should be performed next? It owns no timers,
//! performs no I/O, and never blocks; anomalies (failed draws, aborted main
//! frames, lost output surfaces) are recorded as state and change future
//! answers rather than propagating as errors.
//!
//! # Protocol
//!
//! The orchestrator drives the machine in a drain loop:
//!
//! ```text
//! loop {
//!     let action = machine.next_action();
//!     machine.update_state(action);     // before the client runs it
//!     dispatch(action);                 // client performs the work
//!     if action == Action::None { break; }
//! }
//! ```
//!
//! `update_state` is applied *before* the client executes the action so that
//! any state observed during execution already reflects the action being in
//! flight; a request arriving mid-action can therefore never re-issue the
//! same action.
//!
//! Phase transitions (`on_begin_impl_frame`, `on_begin_impl_frame_deadline`,
//! `on_begin_impl_frame_idle`) and completion notifications
//! (`notify_ready_to_commit`, `did_draw`, ...) arrive between drains and
//! unlock different answers.

use crate::args::BeginFrameArgs;
use crate::settings::SchedulerSettings;
use crate::time::HostTime;

/// The single next thing the scheduler should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Nothing is warranted right now.
    None,
    /// Ask the client to start creating an output surface.
    BeginOutputSurfaceCreation,
    /// Dispatch a begin-main-frame to the main thread.
    SendBeginMainFrame,
    /// Transfer the main thread's result into the pending tree.
    Commit,
    /// Promote the pending tree to the active tree.
    ActivateSyncTree,
    /// Advance impl-thread animations.
    Animate,
    /// Draw the active tree and swap if the draw succeeds.
    DrawAndSwapIfPossible,
    /// Draw unconditionally; used to break a checkerboard stall.
    DrawAndSwapForced,
    /// Internally retire a draw that cannot happen (invisible or undrawable)
    /// so the pipeline does not deadlock. Not dispatched to the client.
    DrawAndSwapAbort,
    /// Let the tiling system work.
    PrepareTiles,
    /// Request an embedder-driven draw (synchronous mode only).
    InvalidateOutputSurface,
}

/// Outcome of a dispatched draw, reported back via
/// [`SchedulerStateMachine::did_draw`].
///
/// Aborted variants are hints for retry policy, never crash signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawResult {
    /// The frame was drawn and a swap was requested.
    Success,
    /// Animation content was still checkerboarding; drawing was skipped to
    /// wait for new content.
    AbortedCheckerboardAnimations,
    /// Required content was not rastered yet.
    AbortedMissingContent,
    /// The GPU context disappeared mid-draw. Surface loss follows.
    AbortedContextLost,
    /// The tree was not in a drawable state.
    AbortedCantDraw,
}

/// Why the main thread declined to produce a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BeginMainFrameAbortReason {
    /// The main frame ran but nothing changed; the request is fully handled.
    FinishedNoUpdates,
    /// The compositor became invisible; retry once visible.
    NotVisible,
    /// Commits are currently deferred; retry when undeferred.
    DeferredCommit,
    /// The output surface went away; retry on the new surface.
    OutputSurfaceLost,
}

/// Phase of the impl-thread frame cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BeginImplFrameState {
    /// Between frames.
    Idle,
    /// A begin-frame tick has been accepted; the deadline has not fired.
    InsideBeginFrame,
    /// The deadline fired; pending draws are being forced out.
    InsideDeadline,
}

/// Phase of the main-thread pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BeginMainFrameState {
    /// No main frame outstanding.
    Idle,
    /// A begin-main-frame was dispatched and not yet picked up.
    Sent,
    /// The main thread started working on it.
    Started,
    /// The main thread finished; the commit action may now run.
    ReadyToCommit,
}

/// Lifecycle of the rendering context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputSurfaceState {
    /// Never had a surface.
    None,
    /// Creation was requested and is in flight.
    Creating,
    /// Surface exists; its first commit has not landed.
    WaitingForFirstCommit,
    /// First commit landed; its activation has not happened.
    WaitingForFirstActivation,
    /// Fully usable.
    Active,
    /// The surface was lost; everything drains toward recreation.
    Lost,
}

/// Escalation ladder for repeated checkerboard-aborted draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForcedRedrawState {
    /// No escalation in progress.
    Idle,
    /// Waiting for a fresh commit to draw from.
    WaitingForCommit,
    /// Commit landed; waiting for its activation.
    WaitingForActivation,
    /// Activated; the next draw is forced.
    WaitingForDraw,
}

/// How the orchestrator should arm the impl-frame deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeadlineMode {
    /// No deadline task at all (synchronous embedder drives draws).
    None,
    /// Fire as soon as the event loop allows: we can already draw.
    Immediate,
    /// Fire at the tick's deadline, less the draw estimate.
    Regular,
    /// Nothing to draw yet; fire at the expected next frame time so a late
    /// activation can still draw without waiting a full extra frame.
    Late,
}

/// The pure decision core of the scheduler.
#[derive(Debug)]
pub struct SchedulerStateMachine {
    settings: SchedulerSettings,

    begin_impl_frame_state: BeginImplFrameState,
    begin_main_frame_state: BeginMainFrameState,
    output_surface_state: OutputSurfaceState,
    forced_redraw_state: ForcedRedrawState,

    // Frame counter and once-per-frame stamps. Frame numbers start at 1;
    // zero means "never".
    current_frame_number: u64,
    last_frame_number_animate_performed: u64,
    last_frame_number_swap_performed: u64,
    last_frame_number_begin_main_frame_sent: u64,
    last_frame_number_prepare_tiles_performed: u64,
    last_frame_time: HostTime,

    needs_redraw: bool,
    needs_animate: bool,
    needs_begin_main_frame: bool,
    needs_prepare_tiles: bool,

    visible: bool,
    can_start: bool,
    can_draw: bool,
    defer_commits: bool,
    smoothness_takes_priority: bool,

    has_pending_tree: bool,
    pending_tree_is_ready_for_activation: bool,
    active_tree_needs_first_draw: bool,
    active_tree_is_ready_to_draw: bool,

    did_create_and_initialize_first_output_surface: bool,
    did_invalidate_output_surface_this_frame: bool,

    skip_next_begin_main_frame_to_reduce_latency: bool,
    skip_begin_main_frame_this_frame: bool,
    main_thread_missed_last_deadline: bool,
    swap_used_incomplete_tile: bool,

    pending_swaps: u32,
    max_pending_swaps: u32,
    consecutive_checkerboard_animations: u32,
}

impl SchedulerStateMachine {
    /// Creates a machine in its initial state: everything idle, no surface,
    /// no needs.
    #[must_use]
    pub fn new(settings: SchedulerSettings) -> Self {
        Self {
            max_pending_swaps: settings.max_pending_swaps,
            settings,
            begin_impl_frame_state: BeginImplFrameState::Idle,
            begin_main_frame_state: BeginMainFrameState::Idle,
            output_surface_state: OutputSurfaceState::None,
            forced_redraw_state: ForcedRedrawState::Idle,
            current_frame_number: 0,
            last_frame_number_animate_performed: 0,
            last_frame_number_swap_performed: 0,
            last_frame_number_begin_main_frame_sent: 0,
            last_frame_number_prepare_tiles_performed: 0,
            last_frame_time: HostTime(0),
            needs_redraw: false,
            needs_animate: false,
            needs_begin_main_frame: false,
            needs_prepare_tiles: false,
            visible: false,
            can_start: false,
            can_draw: false,
            defer_commits: false,
            smoothness_takes_priority: false,
            has_pending_tree: false,
            pending_tree_is_ready_for_activation: false,
            active_tree_needs_first_draw: false,
            active_tree_is_ready_to_draw: false,
            did_create_and_initialize_first_output_surface: false,
            did_invalidate_output_surface_this_frame: false,
            skip_next_begin_main_frame_to_reduce_latency: false,
            skip_begin_main_frame_this_frame: false,
            main_thread_missed_last_deadline: false,
            swap_used_incomplete_tile: false,
            pending_swaps: 0,
            consecutive_checkerboard_animations: 0,
        }
    }

    // -- input setters ------------------------------------------------------

    /// The embedder is ready for output surface creation to begin.
    pub fn set_can_start(&mut self) {
        self.can_start = true;
    }

    /// Compositor visibility. Going invisible blocks main frames and draws.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the active tree is currently in a drawable state.
    pub fn set_can_draw(&mut self, can_draw: bool) {
        self.can_draw = can_draw;
    }

    /// Requests impl-thread animation this frame.
    pub fn set_needs_animate(&mut self) {
        self.needs_animate = true;
    }

    /// Requests a main-thread frame. Idempotent: while one is outstanding
    /// this only records that another is wanted afterwards; two are never
    /// in flight concurrently.
    pub fn set_needs_begin_main_frame(&mut self) {
        self.needs_begin_main_frame = true;
    }

    /// Requests a redraw of the active tree.
    pub fn set_needs_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Requests tile preparation work.
    pub fn set_needs_prepare_tiles(&mut self) {
        self.needs_prepare_tiles = true;
    }

    /// Suppresses main-frame production without dropping the request.
    pub fn set_defer_commits(&mut self, defer: bool) {
        self.defer_commits = defer;
    }

    /// Prioritize the active tree's smoothness over main-thread latency.
    pub fn set_smoothness_takes_priority(&mut self, priority: bool) {
        self.smoothness_takes_priority = priority;
    }

    /// Bounds the number of unacknowledged swaps in flight.
    pub fn set_max_pending_swaps(&mut self, max: u32) {
        debug_assert!(max > 0, "a zero swap budget would deadlock drawing");
        self.max_pending_swaps = max;
    }

    /// Skip the next frame's begin-main-frame dispatch so a chronically late
    /// main thread can catch up. Consumed by the next impl frame.
    pub fn set_skip_next_begin_main_frame_to_reduce_latency(&mut self) {
        self.skip_next_begin_main_frame_to_reduce_latency = true;
    }

    /// The last swap contained checkerboard/incomplete tiles; prefer impl
    /// latency so the missing content fills in quickly.
    pub fn set_swap_used_incomplete_tile(&mut self, used: bool) {
        self.swap_used_incomplete_tile = used;
        if used {
            self.needs_redraw = true;
        }
    }

    // -- state queries ------------------------------------------------------

    /// Current impl-frame phase.
    #[must_use]
    pub fn begin_impl_frame_state(&self) -> BeginImplFrameState {
        self.begin_impl_frame_state
    }

    /// Current main-thread pipeline phase.
    #[must_use]
    pub fn begin_main_frame_state(&self) -> BeginMainFrameState {
        self.begin_main_frame_state
    }

    /// Current output surface lifecycle phase.
    #[must_use]
    pub fn output_surface_state(&self) -> OutputSurfaceState {
        self.output_surface_state
    }

    /// Whether a main frame is requested or in flight.
    #[must_use]
    pub fn commit_pending(&self) -> bool {
        self.needs_begin_main_frame || self.begin_main_frame_state != BeginMainFrameState::Idle
    }

    /// Whether a redraw is requested.
    #[must_use]
    pub fn redraw_pending(&self) -> bool {
        self.needs_redraw
    }

    /// Whether tile preparation is requested.
    #[must_use]
    pub fn prepare_tiles_pending(&self) -> bool {
        self.needs_prepare_tiles
    }

    /// Whether a pending tree awaits activation.
    #[must_use]
    pub fn has_pending_tree(&self) -> bool {
        self.has_pending_tree
    }

    /// Whether the active tree still awaits its first draw.
    #[must_use]
    pub fn active_tree_needs_first_draw(&self) -> bool {
        self.active_tree_needs_first_draw
    }

    /// Whether the main thread failed to deliver within the last frame.
    #[must_use]
    pub fn main_thread_missed_last_deadline(&self) -> bool {
        self.main_thread_missed_last_deadline
    }

    /// Whether smoothness currently takes priority over main-thread latency.
    #[must_use]
    pub fn smoothness_takes_priority(&self) -> bool {
        self.smoothness_takes_priority
    }

    /// Monotonic impl-frame counter; zero before the first frame.
    #[must_use]
    pub fn current_frame_number(&self) -> u64 {
        self.current_frame_number
    }

    /// Frame time of the most recently accepted tick.
    #[must_use]
    pub fn last_frame_time(&self) -> HostTime {
        self.last_frame_time
    }

    /// True when swap credits are exhausted: `pending_swaps` has reached
    /// `max_pending_swaps` and draws must wait for an acknowledgement.
    #[must_use]
    pub fn swap_throttled(&self) -> bool {
        self.pending_swaps >= self.max_pending_swaps
    }

    fn has_initialized_output_surface(&self) -> bool {
        matches!(
            self.output_surface_state,
            OutputSurfaceState::WaitingForFirstCommit
                | OutputSurfaceState::WaitingForFirstActivation
                | OutputSurfaceState::Active
        )
    }

    fn just_swapped_in_this_frame(&self) -> bool {
        self.current_frame_number > 0
            && self.last_frame_number_swap_performed == self.current_frame_number
    }

    /// Whether begin-frame ticks are currently wanted at all.
    ///
    /// Beyond the immediate animate/draw needs this is deliberately
    /// proactive: a pending main frame, a pending tree, pending tile work,
    /// or a swap in the current frame all keep the subscription alive so the
    /// next tick is not delayed by an unsubscribe/resubscribe glitch.
    #[must_use]
    pub fn begin_frame_needed(&self) -> bool {
        if !self.has_initialized_output_surface() {
            return false;
        }
        if !self.visible {
            return false;
        }
        let to_animate_or_draw = self.needs_redraw || self.needs_animate;
        if self.settings.is_synchronous() {
            // Proactive ticks are wrong for a synchronous embedder: every
            // tick must draw, so only tick when there is something to draw.
            return to_animate_or_draw;
        }
        to_animate_or_draw || self.proactive_begin_frame_wanted()
    }

    fn proactive_begin_frame_wanted(&self) -> bool {
        if self.commit_pending() {
            return true;
        }
        if self.has_pending_tree {
            return true;
        }
        if self.needs_prepare_tiles {
            return true;
        }
        // A swap this frame usually means another frame is coming; keeping
        // the subscription avoids a toggle the tick source might sample at
        // an inopportune moment.
        if self.just_swapped_in_this_frame() {
            return true;
        }
        false
    }

    /// Whether the main thread is running more than a frame behind: its
    /// in-flight work can no longer reach the screen in the frame that
    /// requested it.
    #[must_use]
    pub fn main_thread_is_in_high_latency_mode(&self) -> bool {
        // A main frame freshly sent this frame, before the deadline, is the
        // low-latency regime.
        let main_frame_in_flight = matches!(
            self.begin_main_frame_state,
            BeginMainFrameState::Sent | BeginMainFrameState::Started
        );
        if main_frame_in_flight
            && self.begin_impl_frame_state == BeginImplFrameState::InsideBeginFrame
        {
            return false;
        }
        // Any other in-flight main-frame work was carried over from a
        // previous frame or started after the deadline. A merely *requested*
        // frame does not count: nothing has been dispatched yet.
        if self.begin_main_frame_state != BeginMainFrameState::Idle {
            return true;
        }
        if self.has_pending_tree {
            return true;
        }
        if self.begin_impl_frame_state == BeginImplFrameState::InsideDeadline {
            // A tree drawn (or awaiting first draw) at this deadline that was
            // not produced by this frame's main frame came from an older one.
            return (self.active_tree_needs_first_draw || self.just_swapped_in_this_frame())
                && self.last_frame_number_begin_main_frame_sent != self.current_frame_number;
        }
        self.active_tree_needs_first_draw
    }

    // -- decision -----------------------------------------------------------

    /// Returns the next action warranted by the current state.
    ///
    /// Deterministic and side-effect free. Call in a drain loop with
    /// [`update_state`](Self::update_state) until it returns
    /// [`Action::None`].
    #[must_use]
    pub fn next_action(&self) -> Action {
        if self.should_activate_sync_tree() {
            return Action::ActivateSyncTree;
        }
        if self.should_commit() {
            return Action::Commit;
        }
        if self.should_animate() {
            return Action::Animate;
        }
        if self.should_draw() {
            if self.pending_draws_should_be_aborted() {
                return Action::DrawAndSwapAbort;
            }
            if self.forced_redraw_state == ForcedRedrawState::WaitingForDraw {
                return Action::DrawAndSwapForced;
            }
            return Action::DrawAndSwapIfPossible;
        }
        if self.should_prepare_tiles() {
            return Action::PrepareTiles;
        }
        if self.should_invalidate_output_surface() {
            return Action::InvalidateOutputSurface;
        }
        if self.should_send_begin_main_frame() {
            return Action::SendBeginMainFrame;
        }
        if self.should_begin_output_surface_creation() {
            return Action::BeginOutputSurfaceCreation;
        }
        Action::None
    }

    fn pending_activations_should_be_forced(&self) -> bool {
        // With the surface gone or the compositor invisible nothing will
        // drive a normal activation, and the main thread may be blocked
        // waiting for one.
        self.output_surface_state == OutputSurfaceState::Lost || !self.visible
    }

    fn pending_draws_should_be_aborted(&self) -> bool {
        if self.pending_activations_should_be_forced() {
            return true;
        }
        !self.can_draw || !self.visible
    }

    fn should_activate_sync_tree(&self) -> bool {
        if !self.has_pending_tree {
            return false;
        }
        self.pending_tree_is_ready_for_activation || self.pending_activations_should_be_forced()
    }

    fn should_commit(&self) -> bool {
        if self.begin_main_frame_state != BeginMainFrameState::ReadyToCommit {
            return false;
        }
        // The pending tree slot must be free.
        if self.has_pending_tree {
            return false;
        }
        // Get the previous commit on screen before replacing it, unless the
        // embedding opted into deeper pipelining.
        if self.active_tree_needs_first_draw && !self.settings.main_frame_before_draw {
            return false;
        }
        true
    }

    fn should_animate(&self) -> bool {
        if !self.visible || !self.can_draw {
            return false;
        }
        if self.begin_impl_frame_state == BeginImplFrameState::Idle {
            return false;
        }
        // Once per frame.
        if self.last_frame_number_animate_performed == self.current_frame_number {
            return false;
        }
        self.needs_redraw || self.needs_animate
    }

    fn should_draw(&self) -> bool {
        // An undrawable pending draw is retired (aborted) only when the main
        // thread could be blocked behind the active tree's first draw;
        // otherwise there is no reason to abort anything. Unlike real draws,
        // the retirement is not tied to a frame: surface teardown must be
        // able to drain while ticks are stopped.
        if self.pending_draws_should_be_aborted() {
            return self.active_tree_needs_first_draw;
        }
        if !self.needs_redraw {
            return false;
        }
        if self.output_surface_state != OutputSurfaceState::Active {
            return false;
        }
        // Draws never run between frames.
        if self.begin_impl_frame_state == BeginImplFrameState::Idle {
            return false;
        }
        // A forced redraw jumps the deadline and the swap throttle: its
        // whole point is to end a stall.
        if self.forced_redraw_state == ForcedRedrawState::WaitingForDraw {
            return true;
        }
        if self.begin_impl_frame_state != BeginImplFrameState::InsideDeadline {
            return false;
        }
        // Once per frame.
        if self.just_swapped_in_this_frame() {
            return false;
        }
        if self.swap_throttled() {
            return false;
        }
        true
    }

    fn should_prepare_tiles(&self) -> bool {
        if !self.needs_prepare_tiles {
            return false;
        }
        // Tile work rides the tail of the frame, after any draw.
        if self.begin_impl_frame_state != BeginImplFrameState::InsideDeadline {
            return false;
        }
        self.last_frame_number_prepare_tiles_performed != self.current_frame_number
    }

    fn should_invalidate_output_surface(&self) -> bool {
        if !self.settings.is_synchronous() {
            return false;
        }
        // Invalidations are requested while the frame is open; the embedder
        // answers with `on_draw_for_output_surface`.
        if self.begin_impl_frame_state != BeginImplFrameState::InsideBeginFrame {
            return false;
        }
        if self.did_invalidate_output_surface_this_frame {
            return false;
        }
        (self.needs_redraw && !self.swap_throttled()) || self.needs_prepare_tiles
    }

    fn should_send_begin_main_frame(&self) -> bool {
        if !self.needs_begin_main_frame {
            return false;
        }
        if self.defer_commits {
            return false;
        }
        // Invariant: at most one begin-main-frame outstanding.
        if self.begin_main_frame_state != BeginMainFrameState::Idle {
            return false;
        }
        if !self.visible {
            return false;
        }
        if self.skip_begin_main_frame_this_frame {
            return false;
        }
        if self.has_pending_tree && !self.settings.main_frame_before_activation {
            return false;
        }
        // Smoothness priority: don't stack main-thread work behind
        // undisplayed trees.
        if self.smoothness_takes_priority
            && (self.has_pending_tree || self.active_tree_needs_first_draw)
        {
            return false;
        }
        // A fresh surface wants its first commit as soon as possible, even
        // between frames.
        if self.output_surface_state == OutputSurfaceState::WaitingForFirstCommit {
            return true;
        }
        // Otherwise main frames are sent only from inside an impl frame, so
        // both pipelines stay locked to the same tick.
        if self.begin_impl_frame_state == BeginImplFrameState::Idle && self.begin_frame_needed() {
            return false;
        }
        // The commit produced for a forced redraw is wanted regardless of
        // the per-frame budget below.
        if self.forced_redraw_state == ForcedRedrawState::WaitingForCommit {
            return true;
        }
        // Once per frame.
        if self.current_frame_number > 0
            && self.last_frame_number_begin_main_frame_sent == self.current_frame_number
        {
            return false;
        }
        if !self.has_initialized_output_surface() {
            return false;
        }
        // Swap-ack throttle the main thread too, unless this frame already
        // swapped (in which case the ack is presumably on its way).
        if self.swap_throttled() && !self.just_swapped_in_this_frame() {
            return false;
        }
        true
    }

    fn should_begin_output_surface_creation(&self) -> bool {
        if !self.can_start {
            return false;
        }
        // Drain the frame and the main-thread pipeline first so the new
        // surface starts clean.
        if self.begin_impl_frame_state != BeginImplFrameState::Idle {
            return false;
        }
        if self.begin_main_frame_state != BeginMainFrameState::Idle {
            return false;
        }
        if self.has_pending_tree || self.active_tree_needs_first_draw {
            return false;
        }
        matches!(
            self.output_surface_state,
            OutputSurfaceState::None | OutputSurfaceState::Lost
        )
    }

    // -- action acknowledgement --------------------------------------------

    /// Applies the state effects of `action`, chosen by
    /// [`next_action`](Self::next_action), before the client executes it.
    pub fn update_state(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::BeginOutputSurfaceCreation => self.will_begin_output_surface_creation(),
            Action::SendBeginMainFrame => self.will_send_begin_main_frame(),
            Action::Commit => self.will_commit(false),
            Action::ActivateSyncTree => self.will_activate(),
            Action::Animate => self.will_animate(),
            Action::DrawAndSwapIfPossible | Action::DrawAndSwapForced => self.will_draw(),
            Action::DrawAndSwapAbort => self.will_abort_draw(),
            Action::PrepareTiles => self.will_prepare_tiles(),
            Action::InvalidateOutputSurface => self.will_invalidate_output_surface(),
        }
    }

    fn will_begin_output_surface_creation(&mut self) {
        debug_assert!(matches!(
            self.output_surface_state,
            OutputSurfaceState::None | OutputSurfaceState::Lost
        ));
        self.output_surface_state = OutputSurfaceState::Creating;
    }

    fn will_send_begin_main_frame(&mut self) {
        debug_assert_eq!(self.begin_main_frame_state, BeginMainFrameState::Idle);
        debug_assert!(self.visible);
        self.begin_main_frame_state = BeginMainFrameState::Sent;
        self.needs_begin_main_frame = false;
        self.last_frame_number_begin_main_frame_sent = self.current_frame_number;
    }

    fn will_commit(&mut self, commit_had_no_updates: bool) {
        self.begin_main_frame_state = BeginMainFrameState::Idle;
        if commit_had_no_updates {
            return;
        }
        self.has_pending_tree = true;
        self.pending_tree_is_ready_for_activation = false;
        self.active_tree_is_ready_to_draw = false;
        if self.forced_redraw_state == ForcedRedrawState::WaitingForCommit {
            self.forced_redraw_state = ForcedRedrawState::WaitingForActivation;
        }
        if self.output_surface_state == OutputSurfaceState::WaitingForFirstCommit {
            self.output_surface_state = OutputSurfaceState::WaitingForFirstActivation;
        }
    }

    fn will_activate(&mut self) {
        debug_assert!(self.has_pending_tree);
        self.has_pending_tree = false;
        self.pending_tree_is_ready_for_activation = false;
        self.active_tree_needs_first_draw = true;
        self.active_tree_is_ready_to_draw = false;
        self.needs_redraw = true;
        if self.forced_redraw_state == ForcedRedrawState::WaitingForActivation {
            self.forced_redraw_state = ForcedRedrawState::WaitingForDraw;
        }
        if self.output_surface_state == OutputSurfaceState::WaitingForFirstActivation {
            self.output_surface_state = OutputSurfaceState::Active;
        }
    }

    fn will_animate(&mut self) {
        self.last_frame_number_animate_performed = self.current_frame_number;
        self.needs_animate = false;
    }

    fn will_draw(&mut self) {
        self.needs_redraw = false;
        self.active_tree_needs_first_draw = false;
        if self.forced_redraw_state == ForcedRedrawState::WaitingForDraw {
            self.forced_redraw_state = ForcedRedrawState::Idle;
        }
    }

    fn will_abort_draw(&mut self) {
        // Retire the draw without asking the client, so surface teardown or
        // visibility loss cannot leave the main thread blocked behind it.
        self.active_tree_needs_first_draw = false;
        self.needs_redraw = false;
    }

    fn will_prepare_tiles(&mut self) {
        self.needs_prepare_tiles = false;
        self.last_frame_number_prepare_tiles_performed = self.current_frame_number;
    }

    fn will_invalidate_output_surface(&mut self) {
        self.did_invalidate_output_surface_this_frame = true;
    }

    // -- impl-frame phase transitions --------------------------------------

    /// A begin-frame tick was accepted; the impl frame opens.
    pub fn on_begin_impl_frame(&mut self, args: &BeginFrameArgs) {
        debug_assert_eq!(self.begin_impl_frame_state, BeginImplFrameState::Idle);
        self.begin_impl_frame_state = BeginImplFrameState::InsideBeginFrame;
        self.current_frame_number += 1;
        self.last_frame_time = args.frame_time;
        self.skip_begin_main_frame_this_frame = self.skip_next_begin_main_frame_to_reduce_latency;
        self.skip_next_begin_main_frame_to_reduce_latency = false;
        self.did_invalidate_output_surface_this_frame = false;
    }

    /// The deadline fired; still-pending draws are forced out now.
    pub fn on_begin_impl_frame_deadline(&mut self) {
        debug_assert_eq!(
            self.begin_impl_frame_state,
            BeginImplFrameState::InsideBeginFrame
        );
        self.begin_impl_frame_state = BeginImplFrameState::InsideDeadline;
    }

    /// The frame is fully closed; the machine is ready for the next tick.
    pub fn on_begin_impl_frame_idle(&mut self) {
        debug_assert_eq!(
            self.begin_impl_frame_state,
            BeginImplFrameState::InsideDeadline
        );
        self.begin_impl_frame_state = BeginImplFrameState::Idle;
        // A main frame still in flight at frame close missed this deadline.
        self.main_thread_missed_last_deadline = matches!(
            self.begin_main_frame_state,
            BeginMainFrameState::Sent | BeginMainFrameState::Started
        );
    }

    /// Which deadline the orchestrator should arm for the frame that is
    /// currently open.
    #[must_use]
    pub fn current_deadline_mode(&self) -> DeadlineMode {
        if self.settings.is_synchronous() {
            return DeadlineMode::None;
        }
        if self.should_trigger_begin_impl_frame_deadline_early() {
            return DeadlineMode::Immediate;
        }
        if self.needs_redraw && !self.swap_throttled() {
            return DeadlineMode::Regular;
        }
        DeadlineMode::Late
    }

    /// Whether the open frame's deadline should fire as soon as possible
    /// instead of waiting out its armed time.
    #[must_use]
    pub fn should_trigger_begin_impl_frame_deadline_early(&self) -> bool {
        if self.begin_impl_frame_state != BeginImplFrameState::InsideBeginFrame {
            return false;
        }
        // End the frame promptly so surface recreation can begin.
        if self.output_surface_state == OutputSurfaceState::Lost {
            return true;
        }
        if !self.needs_redraw {
            return false;
        }
        // The last swap went out with holes in it; fill them in quickly.
        if self.swap_used_incomplete_tile {
            return true;
        }
        if self.swap_throttled() {
            return false;
        }
        // Nothing main-thread-side to wait for: draw immediately. A freshly
        // activated tree waits for raster to signal readiness first.
        self.begin_main_frame_state == BeginMainFrameState::Idle
            && !self.has_pending_tree
            && (!self.active_tree_needs_first_draw || self.active_tree_is_ready_to_draw)
    }

    // -- main-thread pipeline notifications --------------------------------

    /// The main thread picked up the begin-main-frame.
    pub fn notify_begin_main_frame_started(&mut self) {
        debug_assert_eq!(self.begin_main_frame_state, BeginMainFrameState::Sent);
        self.begin_main_frame_state = BeginMainFrameState::Started;
    }

    /// The main thread finished producing the frame; the commit action may
    /// now be offered.
    pub fn notify_ready_to_commit(&mut self) {
        debug_assert_eq!(self.begin_main_frame_state, BeginMainFrameState::Started);
        self.begin_main_frame_state = BeginMainFrameState::ReadyToCommit;
    }

    /// The main thread declined to produce a commit this cycle.
    ///
    /// Resets the main pipeline to idle. Whether the underlying need is
    /// re-raised depends on the reason: `FinishedNoUpdates` means the
    /// request was fully handled; every other reason is a temporary
    /// condition worth retrying.
    pub fn begin_main_frame_aborted(&mut self, reason: BeginMainFrameAbortReason) {
        debug_assert!(matches!(
            self.begin_main_frame_state,
            BeginMainFrameState::Sent | BeginMainFrameState::Started
        ));
        match reason {
            BeginMainFrameAbortReason::FinishedNoUpdates => {
                self.will_commit(true);
            }
            BeginMainFrameAbortReason::NotVisible
            | BeginMainFrameAbortReason::DeferredCommit
            | BeginMainFrameAbortReason::OutputSurfaceLost => {
                self.begin_main_frame_state = BeginMainFrameState::Idle;
                self.needs_begin_main_frame = true;
            }
        }
    }

    // -- impl-thread pipeline notifications --------------------------------

    /// The pending tree finished rastering and may be activated.
    pub fn notify_ready_to_activate(&mut self) {
        if self.has_pending_tree {
            self.pending_tree_is_ready_for_activation = true;
        }
    }

    /// Raster for the active tree caught up; its first draw will not
    /// checkerboard.
    pub fn notify_ready_to_draw(&mut self) {
        self.active_tree_is_ready_to_draw = true;
    }

    /// Reports the outcome of a dispatched draw action.
    ///
    /// Failures are transient by policy: they re-raise the redraw (and
    /// usually a main frame, since new content is the cure) and the
    /// scheduler simply tries again next frame. A long enough streak of
    /// checkerboarded draws escalates to a forced draw so the user is not
    /// stuck behind perpetually-almost-ready content.
    pub fn did_draw(&mut self, result: DrawResult) {
        match result {
            DrawResult::Success => {
                self.consecutive_checkerboard_animations = 0;
                self.forced_redraw_state = ForcedRedrawState::Idle;
                self.main_thread_missed_last_deadline = false;
            }
            DrawResult::AbortedCheckerboardAnimations => {
                self.needs_redraw = true;
                // An escalation already in progress should not be restarted
                // by the failures it exists to resolve.
                if self.forced_redraw_state != ForcedRedrawState::Idle {
                    return;
                }
                self.needs_begin_main_frame = true;
                self.consecutive_checkerboard_animations += 1;
                if let Some(threshold) = self.settings.forced_draw_after_failed_draws
                    && self.consecutive_checkerboard_animations >= threshold
                {
                    self.consecutive_checkerboard_animations = 0;
                    self.forced_redraw_state = ForcedRedrawState::WaitingForCommit;
                }
            }
            DrawResult::AbortedMissingContent => {
                self.needs_redraw = true;
                self.needs_begin_main_frame = true;
            }
            DrawResult::AbortedCantDraw => {
                self.needs_redraw = true;
            }
            DrawResult::AbortedContextLost => {
                // Surface loss arrives separately via
                // `did_lose_output_surface`; nothing to retry against the
                // dead context.
            }
        }
    }

    /// A swap was submitted to the display pipeline.
    pub fn did_swap_buffers(&mut self) {
        self.pending_swaps += 1;
        debug_assert!(self.pending_swaps <= self.max_pending_swaps);
        self.last_frame_number_swap_performed = self.current_frame_number;
    }

    /// A previously submitted swap was acknowledged.
    pub fn did_swap_buffers_complete(&mut self) {
        debug_assert!(self.pending_swaps > 0);
        self.pending_swaps = self.pending_swaps.saturating_sub(1);
    }

    // -- output surface lifecycle ------------------------------------------

    /// The rendering context disappeared. The only hard-reset path: all
    /// in-flight phases drain toward surface recreation.
    pub fn did_lose_output_surface(&mut self) {
        if matches!(
            self.output_surface_state,
            OutputSurfaceState::None | OutputSurfaceState::Lost
        ) {
            return;
        }
        self.output_surface_state = OutputSurfaceState::Lost;
        self.needs_redraw = false;
        self.active_tree_is_ready_to_draw = false;
        self.forced_redraw_state = ForcedRedrawState::Idle;
    }

    /// A fresh output surface is up; it needs a commit and an activation
    /// before it can draw.
    pub fn did_create_and_initialize_output_surface(&mut self) {
        debug_assert_eq!(self.output_surface_state, OutputSurfaceState::Creating);
        self.output_surface_state = OutputSurfaceState::WaitingForFirstCommit;
        self.pending_swaps = 0;
        if self.did_create_and_initialize_first_output_surface {
            // Everything rendered through the old context is gone; the main
            // thread must produce fresh content even if nobody asked.
            self.needs_begin_main_frame = true;
        }
        self.did_create_and_initialize_first_output_surface = true;
    }
}
