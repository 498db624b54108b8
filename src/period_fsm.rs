//! Period State Machine (SPEC_FULL.md §4.2): drives one Period of the
//! presentation through setup, segmenting, draining and the handoff to the
//! next Period.

use tracing::{debug, info};

use crate::arena::StreamIdx;
use crate::stream::Done;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodState {
    Idle,
    Configuring,
    Segmenting,
    Draining,
    Switching,
    Terminal,
}

/// One Period's lifecycle, including the bookkeeping needed to compute where
/// the next Period starts (§4.2 "next period start").
#[derive(Debug, Clone)]
pub struct PeriodFsm {
    pub id: Option<String>,
    pub state: PeriodState,
    pub start: Option<f64>,
    pub duration: Option<f64>,
    pub streams: Vec<StreamIdx>,
    pending_callbacks: u32,
}

impl PeriodFsm {
    pub fn new(id: Option<String>, start: Option<f64>, duration: Option<f64>) -> Self {
        Self {
            id,
            state: PeriodState::Idle,
            start,
            duration,
            streams: Vec::new(),
            pending_callbacks: 0,
        }
    }

    pub fn add_stream(&mut self, idx: StreamIdx) {
        self.streams.push(idx);
    }

    /// `configuring -> segmenting` on first successful grouping.
    pub fn mark_grouped(&mut self) {
        if self.state == PeriodState::Idle || self.state == PeriodState::Configuring {
            self.state = PeriodState::Segmenting;
            debug!(period = ?self.id, "period entered segmenting");
        }
    }

    pub fn register_pending_callback(&mut self) {
        self.pending_callbacks += 1;
    }

    pub fn resolve_callback(&mut self) {
        self.pending_callbacks = self.pending_callbacks.saturating_sub(1);
    }

    /// `segmenting -> draining` once every non-done stream has emitted EOS or
    /// hit its subdur budget.
    pub fn maybe_drain(&mut self, is_done: impl Fn(StreamIdx) -> Done) {
        if self.state != PeriodState::Segmenting {
            return;
        }
        let all_done = self
            .streams
            .iter()
            .all(|&s| !matches!(is_done(s), Done::Running));
        if all_done {
            self.state = PeriodState::Draining;
            info!(period = ?self.id, "period draining");
        }
    }

    /// `draining -> switching` once every pending segment-size callback (§6)
    /// has been received.
    pub fn maybe_switch(&mut self) {
        if self.state == PeriodState::Draining && self.pending_callbacks == 0 {
            self.state = PeriodState::Switching;
        }
    }

    /// `switching -> segmenting` after rebuild, or `-> terminal` if no
    /// further streams remain.
    pub fn rebuild_or_terminate(&mut self, has_next_period: bool) {
        if self.state != PeriodState::Switching {
            return;
        }
        self.state = if has_next_period {
            PeriodState::Segmenting
        } else {
            PeriodState::Terminal
        };
    }
}

/// An explicit start always wins over an ordinal one; among explicit starts
/// the smallest wins; among ordinal ones the most negative comes first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PeriodStart {
    Explicit(f64),
    Ordinal(i32),
}

impl PeriodStart {
    fn rank(&self) -> (i32, f64) {
        match *self {
            PeriodStart::Explicit(v) => (0, v),
            PeriodStart::Ordinal(v) => (1, -(v as f64)),
        }
    }
}

/// Picks the anchor Period among several candidate starts (§4.2).
pub fn next_period_start(candidates: &[PeriodStart]) -> Option<PeriodStart> {
    candidates
        .iter()
        .copied()
        .min_by(|a, b| a.rank().partial_cmp(&b.rank()).unwrap())
}
