// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic harness for driving a [`Scheduler`] by hand.
//!
//! Real schedulers run against a display clock; tests and demos need the
//! same machinery with time under the caller's thumb. This crate provides:
//!
//! - [`ManualHost`] — a manual clock plus an ordered wakeup queue, and the
//!   [`run_next_wakeup`] / [`run_until_idle`] pumps that advance time to
//!   each wakeup's due point exactly.
//! - [`RecordingClient`] — a [`SchedulerClient`] that logs every call by
//!   name and whose draw behavior (success, swap, automatic acks) is
//!   scriptable per test.
//! - [`RecordingBeginFrameSource`] — records subscription toggles.
//! - [`JankTracker`] — rolling missed-deadline statistics with letter
//!   grades and an ASCII sparkline, for demo HUDs.
//!
//! [`Scheduler`]: cadence_core::scheduler::Scheduler
//! [`SchedulerClient`]: cadence_core::client::SchedulerClient

#![no_std]

extern crate alloc;

mod client;
mod host;
mod jank;

pub use client::{RecordingBeginFrameSource, RecordingClient};
pub use host::{ArmedWakeup, ManualHost, run_next_wakeup, run_until_idle};
pub use jank::{FrameSample, JankGrade, JankReport, JankTracker};
