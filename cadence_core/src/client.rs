// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capability interface the scheduler drives.
//!
//! A [`SchedulerClient`] performs the actual work the scheduler only decides
//! about: sending main frames, committing, activating, drawing, swapping.
//! The scheduler never knows the concrete host type; adapters implement this
//! narrow trait.
//!
//! Every callback receives a [`ClientRequests`] accumulator. Work performed
//! inside a callback frequently discovers new needs (a draw that notices it
//! wants another frame, a commit that requests tile work); raising those
//! through the accumulator lets the scheduler merge them at the head of its
//! drain loop instead of re-entering itself, which keeps every entry point
//! run-to-completion.

use crate::args::BeginFrameArgs;
use crate::machine::DrawResult;

/// Requests raised by a client callback while the scheduler's drain loop is
/// running.
///
/// Merged into the state machine after the callback returns; a request can
/// therefore never re-issue the action it was raised from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientRequests {
    pub(crate) needs_redraw: bool,
    pub(crate) needs_animate: bool,
    pub(crate) needs_begin_main_frame: bool,
    pub(crate) needs_prepare_tiles: bool,
    pub(crate) swaps_submitted: u32,
    pub(crate) swaps_completed: u32,
    pub(crate) swap_used_incomplete_tile: Option<bool>,
}

impl ClientRequests {
    /// Requests a redraw.
    pub fn set_needs_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Requests impl-thread animation.
    pub fn set_needs_animate(&mut self) {
        self.needs_animate = true;
    }

    /// Requests a main-thread frame.
    pub fn set_needs_begin_main_frame(&mut self) {
        self.needs_begin_main_frame = true;
    }

    /// Requests tile preparation.
    pub fn set_needs_prepare_tiles(&mut self) {
        self.needs_prepare_tiles = true;
    }

    /// Reports that the draw just performed submitted a swap.
    pub fn did_swap_buffers(&mut self) {
        self.swaps_submitted += 1;
    }

    /// Reports that a previously submitted swap was acknowledged.
    pub fn did_swap_buffers_complete(&mut self) {
        self.swaps_completed += 1;
    }

    /// Reports whether the submitted swap contained incomplete tiles.
    pub fn set_swap_used_incomplete_tile(&mut self, used: bool) {
        self.swap_used_incomplete_tile = Some(used);
    }

    pub(crate) fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Performs the work the scheduler schedules.
///
/// All methods are one-way notifications except the two draw calls, whose
/// [`DrawResult`] feeds the retry policy. The scheduler calls these on its
/// own thread, run-to-completion; implementations must not block.
pub trait SchedulerClient {
    /// An impl frame is opening with these (already adjusted) args.
    fn will_begin_impl_frame(&mut self, args: &BeginFrameArgs, requests: &mut ClientRequests);

    /// The impl frame fully closed (deadline processed).
    fn did_finish_impl_frame(&mut self, requests: &mut ClientRequests);

    /// Advance impl-thread animations.
    fn scheduled_action_animate(&mut self, requests: &mut ClientRequests);

    /// Dispatch a begin-main-frame to the main thread. Non-blocking; the
    /// main thread acknowledges later through the scheduler's `notify_*`
    /// entry points.
    fn scheduled_action_send_begin_main_frame(
        &mut self,
        args: &BeginFrameArgs,
        requests: &mut ClientRequests,
    );

    /// Transfer main-thread output into the pending tree.
    fn scheduled_action_commit(&mut self, requests: &mut ClientRequests);

    /// Promote the pending tree to active.
    fn scheduled_action_activate_sync_tree(&mut self, requests: &mut ClientRequests);

    /// Draw and swap if the tree is drawable.
    fn scheduled_action_draw_and_swap_if_possible(
        &mut self,
        requests: &mut ClientRequests,
    ) -> DrawResult;

    /// Draw and swap unconditionally to break a stall.
    fn scheduled_action_draw_and_swap_forced(
        &mut self,
        requests: &mut ClientRequests,
    ) -> DrawResult;

    /// Let the tiling system work.
    fn scheduled_action_prepare_tiles(&mut self, requests: &mut ClientRequests);

    /// Start creating an output surface.
    fn scheduled_action_begin_output_surface_creation(&mut self, requests: &mut ClientRequests);

    /// Ask the synchronous embedder for a draw (synchronous mode only).
    fn scheduled_action_invalidate_output_surface(&mut self, requests: &mut ClientRequests);

    /// No begin-main-frame will be sent for the foreseeable future; the main
    /// thread may relax.
    fn send_begin_main_frame_not_expected_soon(&mut self, requests: &mut ClientRequests) {
        _ = requests;
    }
}
