// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording and Chrome trace export for scheduler diagnostics.
//!
//! [`recorder::RecorderSink`] captures [`TraceSink`] events into a compact
//! binary buffer; [`chrome::export`] turns a recording into Chrome Trace
//! Event Format JSON for `chrome://tracing` or Perfetto.
//!
//! [`TraceSink`]: cadence_core::trace::TraceSink

pub mod chrome;
pub mod recorder;
