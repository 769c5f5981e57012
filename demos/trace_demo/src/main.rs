// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated scheduling session that exercises tracing and diagnostics.
//!
//! Drives 60 synthetic vsync ticks through a throttled [`Scheduler`] with a
//! recording client, a jank tracker, and a [`RecorderSink`], then exports a
//! Chrome trace JSON file.
//!
//! [`Scheduler`]: cadence_core::scheduler::Scheduler
//! [`RecorderSink`]: cadence_debug::recorder::RecorderSink

use std::fs::File;
use std::io::BufWriter;

use cadence_core::args::{BeginFrameArgs, DEFAULT_INTERVAL};
use cadence_core::client::{ClientRequests, SchedulerClient};
use cadence_core::machine::{Action, BeginMainFrameState, DrawResult};
use cadence_core::scheduler::Scheduler;
use cadence_core::settings::SchedulerSettings;
use cadence_core::time::{HostTime, Timebase};
use cadence_core::trace::{
    ActionEvent, DeadlineEvent, TickDisposition, TickEvent, TraceSink,
};
use cadence_debug::recorder::RecorderSink;
use cadence_harness::{FrameSample, JankTracker, ManualHost, RecordingBeginFrameSource, run_next_wakeup};

const FRAME_COUNT: u64 = 60;

/// A client that performs trivial "work" and records every dispatched
/// action into the trace recorder it owns.
struct TracingClient {
    recorder: RecorderSink,
    frame_number: u64,
    draws: u64,
}

impl TracingClient {
    fn record(&mut self, action: Action) {
        self.recorder.on_action(&ActionEvent {
            frame_number: self.frame_number,
            action,
        });
    }
}

impl SchedulerClient for TracingClient {
    fn will_begin_impl_frame(&mut self, _args: &BeginFrameArgs, _rq: &mut ClientRequests) {
        self.frame_number += 1;
    }

    fn did_finish_impl_frame(&mut self, _rq: &mut ClientRequests) {}

    fn scheduled_action_animate(&mut self, _rq: &mut ClientRequests) {
        self.record(Action::Animate);
    }

    fn scheduled_action_send_begin_main_frame(
        &mut self,
        _args: &BeginFrameArgs,
        _rq: &mut ClientRequests,
    ) {
        self.record(Action::SendBeginMainFrame);
    }

    fn scheduled_action_commit(&mut self, _rq: &mut ClientRequests) {
        self.record(Action::Commit);
    }

    fn scheduled_action_activate_sync_tree(&mut self, _rq: &mut ClientRequests) {
        self.record(Action::ActivateSyncTree);
    }

    fn scheduled_action_draw_and_swap_if_possible(
        &mut self,
        requests: &mut ClientRequests,
    ) -> DrawResult {
        self.record(Action::DrawAndSwapIfPossible);
        self.draws += 1;
        requests.did_swap_buffers();
        requests.did_swap_buffers_complete();
        DrawResult::Success
    }

    fn scheduled_action_draw_and_swap_forced(
        &mut self,
        requests: &mut ClientRequests,
    ) -> DrawResult {
        self.record(Action::DrawAndSwapForced);
        self.draws += 1;
        requests.did_swap_buffers();
        requests.did_swap_buffers_complete();
        DrawResult::Success
    }

    fn scheduled_action_prepare_tiles(&mut self, _rq: &mut ClientRequests) {
        self.record(Action::PrepareTiles);
    }

    fn scheduled_action_begin_output_surface_creation(&mut self, _rq: &mut ClientRequests) {
        self.record(Action::BeginOutputSurfaceCreation);
    }

    fn scheduled_action_invalidate_output_surface(&mut self, _rq: &mut ClientRequests) {
        self.record(Action::InvalidateOutputSurface);
    }
}

fn main() {
    let timebase = Timebase::NANOS;
    let client = TracingClient {
        recorder: RecorderSink::new(),
        frame_number: 0,
        draws: 0,
    };
    let mut sched = Scheduler::new(
        SchedulerSettings::throttled(),
        client,
        ManualHost::new(),
        RecordingBeginFrameSource::default(),
    );
    let mut jank = JankTracker::<32>::default();

    // Surface bring-up and first commit.
    sched.set_can_start();
    sched.set_visible(true);
    sched.set_can_draw(true);
    sched.did_create_and_initialize_output_surface();
    sched.set_needs_begin_main_frame();
    sched.notify_begin_main_frame_started();
    sched.notify_ready_to_commit();
    sched.notify_ready_to_activate();

    let mut now = 1_000_000_000_u64; // start at 1s
    let mut last_frame_at = now;

    for frame in 0..FRAME_COUNT {
        // Animation runs every frame; the main thread produces new content
        // every sixth frame and is always quick about it.
        sched.set_needs_redraw();
        if frame % 6 == 0 {
            sched.set_needs_begin_main_frame();
        }

        now += DEFAULT_INTERVAL.ticks();
        sched.host_mut().set_now(HostTime(now));
        let args = BeginFrameArgs::for_interval(HostTime(now), DEFAULT_INTERVAL);
        sched.begin_frame(args);
        let handled = sched.begin_impl_frame_deadline_pending();
        sched.client_mut().recorder.on_tick(&TickEvent {
            args,
            disposition: if handled {
                TickDisposition::Handled
            } else {
                TickDisposition::Deferred
            },
        });
        if let Some(due) = sched.begin_impl_frame_deadline_due() {
            let frame_number = sched.machine().current_frame_number();
            let mode = sched.deadline_mode();
            sched.client_mut().recorder.on_deadline_armed(&DeadlineEvent {
                frame_number,
                mode,
                due,
            });
        }

        // Service the main-thread pipeline promptly whenever a main frame
        // actually went out (a latency-recovery frame may hold one back).
        if sched.machine().begin_main_frame_state() == BeginMainFrameState::Sent {
            sched.notify_begin_main_frame_started();
            sched.notify_ready_to_commit();
            sched.notify_ready_to_activate();
        }

        // Pump the deadline (and any retro frames it unblocks).
        while run_next_wakeup(&mut sched).is_some() {
            if !sched.begin_impl_frame_deadline_pending() && sched.retro_frame_count() == 0 {
                break;
            }
        }

        let delta_ms = (sched.host().now().ticks() - last_frame_at) as f64 / 1_000_000.0;
        last_frame_at = sched.host().now().ticks();
        let report = jank.observe(FrameSample {
            missed_deadline: sched.main_thread_is_in_high_latency_mode(),
            frame_delta_ms: delta_ms,
        });
        if frame == FRAME_COUNT - 1 {
            println!(
                "grade {}  misses {}/{}  deltas {}",
                report.grade.as_str(),
                report.missed_frames,
                report.total_frames,
                jank.sparkline()
            );
        }

        now = sched.host().now().ticks().max(now);
    }

    println!("{} draws over {FRAME_COUNT} frames", sched.client().draws);

    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    cadence_debug::chrome::export(sched.client().recorder.as_bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");
    println!("Wrote {path} ({FRAME_COUNT} frames)");
}
