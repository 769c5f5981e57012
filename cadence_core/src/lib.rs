// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame scheduling for deadline-driven compositing.
//!
//! `cadence_core` decides *when* a rendering engine should do its work:
//! given a stream of begin-frame ticks from a display (or a synthetic
//! clock), it orders animation, main-thread frame production, commits,
//! activations, draws, and swaps against each tick's hard deadline, while
//! keeping a chronically late main thread or a backlogged swap chain from
//! stalling either pipeline. It is `no_std` compatible (with `alloc`) and
//! performs no I/O of its own.
//!
//! # Architecture
//!
//! ```text
//!   BeginFrameSource (vsync / synthetic / embedder)
//!       │ begin_frame(args)
//!       ▼
//!   Scheduler ──► SchedulerStateMachine::next_action() ──► Action
//!       │                                                    │
//!       │ arm deadline / retro wakeups (WakeupHost)          ▼
//!       │                                            SchedulerClient
//!       │                                  (animate, commit, draw, swap)
//!       ▼                                                    │
//!   TimingHistory ◄── observations (send→commit, draw→swap) ─┘
//! ```
//!
//! **[`machine`]** — The pure decision core: every flag and phase of both
//! pipelines, answering "what single action next?" with no timers or I/O.
//!
//! **[`scheduler`]** — The orchestrator: the action drain loop, the
//! retro-frame queue, deadline arming in four modes, subscription
//! hysteresis, and the synthetic/unthrottled/synchronous tick modes.
//!
//! **[`history`]** — EMA estimates of pipeline stage durations, feeding
//! deadline placement and latency recovery.
//!
//! **[`args`]** / **[`time`]** — The begin-frame tick value type and the
//! monotonic tick-based time model.
//!
//! **[`settings`]** — Immutable per-instance configuration, including the
//! frame source mode and all tuning constants.
//!
//! **[`client`]** / **[`source`]** / **[`wakeup`]** — The narrow capability
//! traits at the boundary: work execution, tick subscription, and deferred
//! wakeups with cancel tokens.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types
//! for scheduling-loop instrumentation, with the zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): reserved for std-only conveniences in
//!   dependents; the core itself stays `no_std`.
//! - `trace` (disabled by default): enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod args;
pub mod client;
pub mod history;
pub mod machine;
pub mod scheduler;
pub mod settings;
pub mod source;
pub mod time;
pub mod trace;
pub mod wakeup;
