// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them
//! back as an iterator of [`RecordedEvent`].

use cadence_core::args::{BeginFrameArgs, BeginFrameKind};
use cadence_core::machine::{Action, DeadlineMode, DrawResult};
use cadence_core::time::{Duration, HostTime};
use cadence_core::trace::{
    ActionEvent, DeadlineEvent, DrawOutcomeEvent, RetroFrameEvent, RetroFrameStage, TickDisposition,
    TickEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_TICK: u8 = 1;
const TAG_ACTION: u8 = 2;
const TAG_DEADLINE: u8 = 3;
const TAG_RETRO_FRAME: u8 = 4;
const TAG_DRAW_OUTCOME: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_action(&mut self, action: Action) {
        self.write_u8(encode_action(action));
    }
}

fn encode_action(action: Action) -> u8 {
    match action {
        Action::None => 0,
        Action::BeginOutputSurfaceCreation => 1,
        Action::SendBeginMainFrame => 2,
        Action::Commit => 3,
        Action::ActivateSyncTree => 4,
        Action::Animate => 5,
        Action::DrawAndSwapIfPossible => 6,
        Action::DrawAndSwapForced => 7,
        Action::DrawAndSwapAbort => 8,
        Action::PrepareTiles => 9,
        Action::InvalidateOutputSurface => 10,
    }
}

fn decode_action(v: u8) -> Option<Action> {
    Some(match v {
        0 => Action::None,
        1 => Action::BeginOutputSurfaceCreation,
        2 => Action::SendBeginMainFrame,
        3 => Action::Commit,
        4 => Action::ActivateSyncTree,
        5 => Action::Animate,
        6 => Action::DrawAndSwapIfPossible,
        7 => Action::DrawAndSwapForced,
        8 => Action::DrawAndSwapAbort,
        9 => Action::PrepareTiles,
        10 => Action::InvalidateOutputSurface,
        _ => return None,
    })
}

fn encode_draw_result(result: DrawResult) -> u8 {
    match result {
        DrawResult::Success => 0,
        DrawResult::AbortedCheckerboardAnimations => 1,
        DrawResult::AbortedMissingContent => 2,
        DrawResult::AbortedContextLost => 3,
        DrawResult::AbortedCantDraw => 4,
    }
}

fn decode_draw_result(v: u8) -> Option<DrawResult> {
    Some(match v {
        0 => DrawResult::Success,
        1 => DrawResult::AbortedCheckerboardAnimations,
        2 => DrawResult::AbortedMissingContent,
        3 => DrawResult::AbortedContextLost,
        4 => DrawResult::AbortedCantDraw,
        _ => return None,
    })
}

fn encode_deadline_mode(mode: DeadlineMode) -> u8 {
    match mode {
        DeadlineMode::None => 0,
        DeadlineMode::Immediate => 1,
        DeadlineMode::Regular => 2,
        DeadlineMode::Late => 3,
    }
}

fn decode_deadline_mode(v: u8) -> Option<DeadlineMode> {
    Some(match v {
        0 => DeadlineMode::None,
        1 => DeadlineMode::Immediate,
        2 => DeadlineMode::Regular,
        3 => DeadlineMode::Late,
        _ => return None,
    })
}

impl TraceSink for RecorderSink {
    fn on_tick(&mut self, e: &TickEvent) {
        self.write_u8(TAG_TICK);
        self.write_u64(e.args.frame_time.ticks());
        self.write_u64(e.args.deadline.ticks());
        self.write_u64(e.args.interval.ticks());
        self.write_u8(match e.args.kind {
            BeginFrameKind::Normal => 0,
            BeginFrameKind::Missed => 1,
        });
        self.write_u8(match e.disposition {
            TickDisposition::Handled => 0,
            TickDisposition::Deferred => 1,
        });
    }

    fn on_action(&mut self, e: &ActionEvent) {
        self.write_u8(TAG_ACTION);
        self.write_u64(e.frame_number);
        self.write_action(e.action);
    }

    fn on_deadline_armed(&mut self, e: &DeadlineEvent) {
        self.write_u8(TAG_DEADLINE);
        self.write_u64(e.frame_number);
        self.write_u8(encode_deadline_mode(e.mode));
        self.write_u64(e.due.ticks());
    }

    fn on_retro_frame(&mut self, e: &RetroFrameEvent) {
        self.write_u8(TAG_RETRO_FRAME);
        self.write_u64(e.frame_time.ticks());
        self.write_u8(match e.stage {
            RetroFrameStage::Consumed => 0,
            RetroFrameStage::Expired => 1,
        });
    }

    fn on_draw_outcome(&mut self, e: &DrawOutcomeEvent) {
        self.write_u8(TAG_DRAW_OUTCOME);
        self.write_u64(e.frame_number);
        self.write_u8(encode_draw_result(e.result));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`TickEvent`].
    Tick(TickEvent),
    /// An [`ActionEvent`].
    Action(ActionEvent),
    /// A [`DeadlineEvent`].
    Deadline(DeadlineEvent),
    /// A [`RetroFrameEvent`].
    RetroFrame(RetroFrameEvent),
    /// A [`DrawOutcomeEvent`].
    DrawOutcome(DrawOutcomeEvent),
}

/// Iterates over the events in a binary recording.
///
/// Decoding stops silently at the first malformed or truncated record; a
/// recording is an append-only diagnostic stream, not a durable format.
pub fn decode(bytes: &[u8]) -> impl Iterator<Item = RecordedEvent> + '_ {
    Decoder { bytes, pos: 0 }
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Decoder<'_> {
    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        let slice = self.bytes.get(self.pos..self.pos + 8)?;
        self.pos += 8;
        Some(u64::from_le_bytes(slice.try_into().ok()?))
    }
}

impl Iterator for Decoder<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<RecordedEvent> {
        match self.read_u8()? {
            TAG_TICK => {
                let frame_time = HostTime(self.read_u64()?);
                let deadline = HostTime(self.read_u64()?);
                let interval = Duration(self.read_u64()?);
                let kind = match self.read_u8()? {
                    0 => BeginFrameKind::Normal,
                    1 => BeginFrameKind::Missed,
                    _ => return None,
                };
                let disposition = match self.read_u8()? {
                    0 => TickDisposition::Handled,
                    1 => TickDisposition::Deferred,
                    _ => return None,
                };
                let mut args = BeginFrameArgs::new(frame_time, deadline, interval);
                if kind == BeginFrameKind::Missed {
                    args = args.as_missed();
                }
                Some(RecordedEvent::Tick(TickEvent { args, disposition }))
            }
            TAG_ACTION => {
                let frame_number = self.read_u64()?;
                let action = decode_action(self.read_u8()?)?;
                Some(RecordedEvent::Action(ActionEvent {
                    frame_number,
                    action,
                }))
            }
            TAG_DEADLINE => {
                let frame_number = self.read_u64()?;
                let mode = decode_deadline_mode(self.read_u8()?)?;
                let due = HostTime(self.read_u64()?);
                Some(RecordedEvent::Deadline(DeadlineEvent {
                    frame_number,
                    mode,
                    due,
                }))
            }
            TAG_RETRO_FRAME => {
                let frame_time = HostTime(self.read_u64()?);
                let stage = match self.read_u8()? {
                    0 => RetroFrameStage::Consumed,
                    1 => RetroFrameStage::Expired,
                    _ => return None,
                };
                Some(RecordedEvent::RetroFrame(RetroFrameEvent {
                    frame_time,
                    stage,
                }))
            }
            TAG_DRAW_OUTCOME => {
                let frame_number = self.read_u64()?;
                let result = decode_draw_result(self.read_u8()?)?;
                Some(RecordedEvent::DrawOutcome(DrawOutcomeEvent {
                    frame_number,
                    result,
                }))
            }
            _ => None,
        }
    }
}
