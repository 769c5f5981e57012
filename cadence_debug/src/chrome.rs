// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes
//! [Chrome Trace Event Format][spec] JSON to the given writer, loadable in
//! `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use cadence_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Tick(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "BeginFrame",
                    "cat": "Scheduler",
                    "ts": ticks_to_us(e.args.frame_time.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "deadline_us": ticks_to_us(e.args.deadline.ticks(), timebase),
                        "interval_us": ticks_to_us(e.args.interval.ticks(), timebase),
                        "kind": format!("{:?}", e.args.kind),
                        "disposition": format!("{:?}", e.disposition),
                    }
                }));
            }
            RecordedEvent::Action(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.action),
                    "cat": "Action",
                    "ts": 0,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_number": e.frame_number,
                    }
                }));
            }
            RecordedEvent::Deadline(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "DeadlineArmed",
                    "cat": "Scheduler",
                    "ts": ticks_to_us(e.due.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_number": e.frame_number,
                        "mode": format!("{:?}", e.mode),
                    }
                }));
            }
            RecordedEvent::RetroFrame(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RetroFrame",
                    "cat": "Scheduler",
                    "ts": ticks_to_us(e.frame_time.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "stage": format!("{:?}", e.stage),
                    }
                }));
            }
            RecordedEvent::DrawOutcome(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "DrawOutcome",
                    "cat": "Draw",
                    "ts": 0,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_number": e.frame_number,
                        "result": format!("{:?}", e.result),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
