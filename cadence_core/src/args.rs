// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The begin-frame tick value type.
//!
//! A [`BeginFrameArgs`] marks one frame production opportunity: the moment
//! the display pipeline would like a new frame to start (`frame_time`), the
//! latest useful submission point (`deadline`), and the nominal spacing
//! between opportunities (`interval`). Sources guarantee non-decreasing
//! `frame_time`; `deadline >= frame_time` is expected but not enforced, so
//! consumers clamp derived delays to zero rather than trusting it.

use crate::time::{Duration, HostTime};

/// Default production interval: 16.666667 ms in nanosecond ticks (60 Hz).
pub const DEFAULT_INTERVAL: Duration = Duration(16_666_667);

/// Whether a tick is current or a make-up delivery for a slot that already
/// passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BeginFrameKind {
    /// A regular, on-time frame opportunity.
    Normal,
    /// A tick re-delivered after its original slot was missed. Consumers may
    /// choose to handle missed ticks less eagerly.
    Missed,
}

/// One frame production opportunity delivered by a begin-frame source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BeginFrameArgs {
    /// The time this frame opportunity nominally began.
    pub frame_time: HostTime,
    /// Latest useful time to finish producing the frame.
    pub deadline: HostTime,
    /// Nominal spacing to the next opportunity.
    pub interval: Duration,
    /// Whether the tick is current or a missed-slot redelivery.
    pub kind: BeginFrameKind,
}

impl BeginFrameArgs {
    /// Creates args with an explicit deadline.
    #[must_use]
    pub const fn new(frame_time: HostTime, deadline: HostTime, interval: Duration) -> Self {
        Self {
            frame_time,
            deadline,
            interval,
            kind: BeginFrameKind::Normal,
        }
    }

    /// Creates args whose deadline is one interval past `frame_time`, the
    /// shape produced by periodic vsync-style sources.
    #[must_use]
    pub const fn for_interval(frame_time: HostTime, interval: Duration) -> Self {
        Self {
            frame_time,
            deadline: HostTime(frame_time.0 + interval.0),
            interval,
            kind: BeginFrameKind::Normal,
        }
    }

    /// Returns a copy marked as a missed-slot redelivery.
    #[must_use]
    pub const fn as_missed(mut self) -> Self {
        self.kind = BeginFrameKind::Missed;
        self
    }

    /// Returns a copy with the deadline pulled earlier by `amount`,
    /// saturating at `frame_time`.
    ///
    /// Used to reserve room for a downstream (parent) compositor's own draw.
    #[must_use]
    pub fn with_deadline_adjusted_by(mut self, amount: Duration) -> Self {
        self.deadline = self.deadline.saturating_sub(amount).max(self.frame_time);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_interval_derives_deadline() {
        let args = BeginFrameArgs::for_interval(HostTime(1_000), DEFAULT_INTERVAL);
        assert_eq!(args.deadline, HostTime(1_000) + DEFAULT_INTERVAL);
        assert_eq!(args.kind, BeginFrameKind::Normal);
    }

    #[test]
    fn as_missed_marks_kind() {
        let args = BeginFrameArgs::for_interval(HostTime(0), DEFAULT_INTERVAL).as_missed();
        assert_eq!(args.kind, BeginFrameKind::Missed);
    }

    #[test]
    fn deadline_adjustment_clamps_at_frame_time() {
        let args = BeginFrameArgs::new(HostTime(1_000), HostTime(1_500), Duration(1_000));
        let adjusted = args.with_deadline_adjusted_by(Duration(300));
        assert_eq!(adjusted.deadline, HostTime(1_200));

        // Over-large adjustments stop at frame_time, never before it.
        let clamped = args.with_deadline_adjusted_by(Duration(10_000));
        assert_eq!(clamped.deadline, HostTime(1_000));
    }
}
