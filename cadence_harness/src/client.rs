// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording test doubles for the scheduler's boundary traits.

use alloc::vec::Vec;

use cadence_core::args::BeginFrameArgs;
use cadence_core::client::{ClientRequests, SchedulerClient};
use cadence_core::machine::DrawResult;
use cadence_core::source::BeginFrameSource;

/// A [`SchedulerClient`] that records every callback by name and whose draw
/// behavior is scriptable.
///
/// Fields are public so a test can reconfigure behavior mid-scenario, the
/// way a real embedding's circumstances change mid-session.
#[derive(Debug)]
pub struct RecordingClient {
    actions: Vec<&'static str>,
    num_draws: u32,
    last_begin_impl_frame_args: Option<BeginFrameArgs>,

    /// Whether the next draws succeed. A failing draw reports
    /// checkerboarding, the common transient failure.
    pub draw_will_happen: bool,
    /// Whether a successful draw submits a swap.
    pub swap_will_happen_if_draw_happens: bool,
    /// Whether submitted swaps are acknowledged inside the same dispatch.
    /// Disable to exercise swap throttling.
    pub automatic_swap_ack: bool,
    /// Raise a redraw request from inside the next draw callback, then
    /// clear. Exercises the no-recursive-drain protocol.
    pub request_redraw_inside_next_draw: bool,
    /// Raise a main-frame request from inside the next draw callback, then
    /// clear.
    pub request_begin_main_frame_inside_next_draw: bool,
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            num_draws: 0,
            last_begin_impl_frame_args: None,
            draw_will_happen: true,
            swap_will_happen_if_draw_happens: true,
            automatic_swap_ack: true,
            request_redraw_inside_next_draw: false,
            request_begin_main_frame_inside_next_draw: false,
        }
    }
}

impl RecordingClient {
    /// A fresh client with default (all-success) behavior.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every callback recorded so far, in order.
    #[must_use]
    pub fn actions(&self) -> &[&'static str] {
        &self.actions
    }

    /// Drains and returns the recorded callbacks.
    pub fn take_actions(&mut self) -> Vec<&'static str> {
        core::mem::take(&mut self.actions)
    }

    /// Whether `name` was recorded since the last drain.
    #[must_use]
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.iter().any(|a| *a == name)
    }

    /// Total draw callbacks (successful or not) over the client's lifetime.
    #[must_use]
    pub fn num_draws(&self) -> u32 {
        self.num_draws
    }

    /// The args of the most recent `will_begin_impl_frame`.
    #[must_use]
    pub fn last_begin_impl_frame_args(&self) -> Option<BeginFrameArgs> {
        self.last_begin_impl_frame_args
    }

    fn draw(&mut self, name: &'static str, requests: &mut ClientRequests) -> DrawResult {
        self.actions.push(name);
        self.num_draws += 1;
        if self.request_redraw_inside_next_draw {
            self.request_redraw_inside_next_draw = false;
            requests.set_needs_redraw();
        }
        if self.request_begin_main_frame_inside_next_draw {
            self.request_begin_main_frame_inside_next_draw = false;
            requests.set_needs_begin_main_frame();
        }
        if !self.draw_will_happen {
            return DrawResult::AbortedCheckerboardAnimations;
        }
        if self.swap_will_happen_if_draw_happens {
            requests.did_swap_buffers();
            if self.automatic_swap_ack {
                requests.did_swap_buffers_complete();
            }
        }
        DrawResult::Success
    }
}

impl SchedulerClient for RecordingClient {
    fn will_begin_impl_frame(&mut self, args: &BeginFrameArgs, _requests: &mut ClientRequests) {
        self.actions.push("will_begin_impl_frame");
        self.last_begin_impl_frame_args = Some(*args);
    }

    fn did_finish_impl_frame(&mut self, _requests: &mut ClientRequests) {
        self.actions.push("did_finish_impl_frame");
    }

    fn scheduled_action_animate(&mut self, _requests: &mut ClientRequests) {
        self.actions.push("animate");
    }

    fn scheduled_action_send_begin_main_frame(
        &mut self,
        _args: &BeginFrameArgs,
        _requests: &mut ClientRequests,
    ) {
        self.actions.push("send_begin_main_frame");
    }

    fn scheduled_action_commit(&mut self, _requests: &mut ClientRequests) {
        self.actions.push("commit");
    }

    fn scheduled_action_activate_sync_tree(&mut self, _requests: &mut ClientRequests) {
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

    fn scheduled_action_prepare_tiles(&mut self, _requests: &mut ClientRequests) {
        self.actions.push("prepare_tiles");
    }

    fn scheduled_action_begin_output_surface_creation(
        &mut self,
        _requests: &mut ClientRequests,
    ) {
        self.actions.push("begin_output_surface_creation");
    }

    fn scheduled_action_invalidate_output_surface(&mut self, _requests: &mut ClientRequests) {
        self.actions.push("invalidate_output_surface");
    }

    fn send_begin_main_frame_not_expected_soon(&mut self, _requests: &mut ClientRequests) {
        self.actions.push("begin_main_frame_not_expected_soon");
    }
}

/// A [`BeginFrameSource`] that records subscription state and toggle count.
#[derive(Debug, Default)]
pub struct RecordingBeginFrameSource {
    observing: bool,
    toggles: u32,
}

impl RecordingBeginFrameSource {
    /// Whether the scheduler currently wants ticks.
    #[must_use]
    pub fn observing(&self) -> bool {
        self.observing
    }

    /// How many times the subscription flipped.
    #[must_use]
    pub fn toggles(&self) -> u32 {
        self.toggles
    }
}

impl BeginFrameSource for RecordingBeginFrameSource {
    fn set_observing(&mut self, observing: bool) {
        if self.observing != observing {
            self.toggles += 1;
        }
        self.observing = observing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_draw_reports_checkerboarding_and_swaps_nothing() {
        let mut client = RecordingClient::new();
        client.draw_will_happen = false;
        let mut requests = ClientRequests::default();
        let result = client.scheduled_action_draw_and_swap_if_possible(&mut requests);
        assert_eq!(result, DrawResult::AbortedCheckerboardAnimations);
        assert_eq!(requests, ClientRequests::default(), "no swap on failure");
        assert_eq!(client.num_draws(), 1);
    }

    #[test]
    fn source_counts_real_toggles_only() {
        let mut source = RecordingBeginFrameSource::default();
        source.set_observing(true);
        source.set_observing(true);
        source.set_observing(false);
        assert_eq!(source.toggles(), 2);
        assert!(!source.observing());
    }
}
