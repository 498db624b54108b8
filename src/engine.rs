//! `DasherEngine`: the top-level object that owns the Stream Registry, the
//! Period state machines, and the configuration, and drives them through the
//! `process` re-entrant step function (§4.5, §5, §9).

use std::collections::HashMap;

use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

use crate::arena::StreamIdx;
use crate::config::DasherConfig;
use crate::period_fsm::{PeriodFsm, PeriodState};
use crate::persistence::{DasherContext, EngineSnapshot, PeriodSnapshot, StatePersister};
use crate::scheduler::{process_stream, PacketSource, StreamStep};
use crate::stream::{Done, Registry, StreamProps};
use crate::Result;

/// Installs a `tracing-subscriber` formatter reading `RUST_LOG`, the same
/// convention the sibling repos in this family use for their binaries.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
}

/// Back-pressure/outcome of one `process()` call, matching the "return
/// values communicate back-pressure" note of §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Progressed,
    NoPacket,
    AllDone,
}

pub struct DasherEngine {
    pub config: DasherConfig,
    pub registry: Registry,
    pub periods: Vec<PeriodFsm>,
    pub current_period: usize,
    persister: Option<Box<dyn StatePersister>>,
}

impl DasherEngine {
    pub fn new(config: DasherConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            periods: Vec::new(),
            current_period: 0,
            persister: None,
        }
    }

    pub fn with_persister(mut self, persister: Box<dyn StatePersister>) -> Self {
        self.persister = Some(persister);
        self
    }

    pub fn add_stream(&mut self, props: StreamProps) -> StreamIdx {
        let period_id = props.period_id.clone();
        let idx = self.registry.insert(props);

        let period_index = self
            .periods
            .iter()
            .position(|p| p.id == period_id)
            .unwrap_or_else(|| {
                self.periods.push(PeriodFsm::new(period_id, None, None));
                self.periods.len() - 1
            });
        self.periods[period_index].add_stream(idx);
        // First stream registered for a period counts as its first successful
        // grouping (§4.2); per-Representation regrouping on later property
        // changes is handled by `stream::Registry::configure` instead.
        self.periods[period_index].mark_grouped();
        idx
    }

    pub fn current_period_fsm(&self) -> Option<&PeriodFsm> {
        self.periods.get(self.current_period)
    }

    /// Restores engine state from the configured persister, per §4.8's
    /// restore path. A no-op if no persister/state file is configured, or if
    /// none has been saved yet. Applies the resumed Period's per-Representation
    /// contexts onto the matching live streams and sets `noinit` so the
    /// caller reopens their muxer with the trash-init flag instead of
    /// re-emitting the init segment (§4.4).
    #[instrument(skip(self, live_reps))]
    pub fn restore(&mut self, live_reps: impl Fn(&str) -> bool) -> Result<()> {
        let Some(persister) = &self.persister else {
            return Ok(());
        };
        let Some(snapshot) = persister.load()? else {
            return Ok(());
        };
        let plan = crate::persistence::plan_restore(&snapshot, &live_reps);
        let removed = plan.removed_representations.len();

        let Some(resume_period) = plan.resume_period else {
            info!(removed, resumed = false, "restored engine snapshot");
            return Ok(());
        };

        for (rep_id, ctx) in &resume_period.representations {
            if !live_reps(rep_id) {
                continue;
            }
            let Some(stream) = self
                .registry
                .streams_mut()
                .iter_mut()
                .find(|s| s.props.id.as_deref() == Some(rep_id.as_str()))
            else {
                continue;
            };
            stream.seg_number = ctx.seg_number;
            stream.next_seg_start = ctx.next_seg_start;
            stream.adjusted_next_seg_start = ctx.next_seg_start;
            stream.first_cts = ctx.first_cts;
            stream.nb_pck = ctx.last_pck_idx;
            stream.rep_init = true;
            stream.init_seg = ctx.init_seg.clone();
            stream.noinit = ctx.init_seg.is_some();
            stream.done = if ctx.done { Done::Eos } else { Done::Running };
            if let Some(template) = &ctx.template_seg {
                stream.props.template = Some(template.clone());
            }
        }

        if let Some(period_index) = self.periods.iter().position(|p| p.id == resume_period.period_id) {
            self.current_period = period_index;
        }

        info!(removed, resumed = true, "restored engine snapshot");
        Ok(())
    }

    /// Builds the per-Representation dasher-context for every Period seen so
    /// far (§4.8), keyed by Representation id.
    pub fn snapshot(&self) -> EngineSnapshot {
        let streams = self.registry.streams();
        let periods = self
            .periods
            .iter()
            .map(|fsm| {
                let representations = fsm
                    .streams
                    .iter()
                    .map(|&idx| {
                        let stream = &streams[idx.index()];
                        let muxed_comp_id = stream
                            .props
                            .muxed_base
                            .and_then(|base| streams.get(base))
                            .and_then(|base| base.props.id.clone());
                        let multi_pids = streams
                            .iter()
                            .filter(|s| s.props.muxed_base == Some(idx.index()))
                            .filter_map(|s| s.props.id.clone())
                            .collect();
                        let ctx = DasherContext {
                            done: stream.done != Done::Running,
                            init_seg: stream.init_seg.clone(),
                            src_url: stream.props.source_url.clone(),
                            template_seg: stream.props.template.clone(),
                            pid_id: stream.props.id.clone(),
                            muxed_comp_id,
                            period_start: stream.props.period_start,
                            period_duration: stream.props.period_duration,
                            period_id: stream.props.period_id.clone(),
                            multi_pids,
                            dash_dur: stream.props.dash_dur,
                            owns_set: !stream.is_muxed_component(),
                            last_pck_idx: stream.nb_pck,
                            seg_number: stream.seg_number,
                            next_seg_start: stream.next_seg_start,
                            first_cts: stream.first_cts,
                        };
                        (stream.props.id.clone().unwrap_or_default(), ctx)
                    })
                    .collect();
                PeriodSnapshot {
                    period_id: fsm.id.clone(),
                    representations,
                }
            })
            .collect();
        EngineSnapshot { periods }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(persister) = &self.persister {
            persister.save(&self.snapshot())?;
        }
        Ok(())
    }

    /// One re-entrant step: drive every non-done stream in the current
    /// period's `PacketSource` map as far as packets are immediately
    /// available, then yield (§5, §9).
    #[instrument(skip(self, sources))]
    pub fn process(&mut self, sources: &mut HashMap<StreamIdx, Box<dyn PacketSource>>) -> ProcessOutcome {
        let Some(fsm) = self.periods.get(self.current_period).cloned() else {
            return ProcessOutcome::AllDone;
        };

        let mut progressed = false;
        let mut saw_no_packet = false;

        for &stream_idx in &fsm.streams {
            let Some(source) = sources.get_mut(&stream_idx) else {
                continue;
            };

            // A muxed component must not advance past its base stream's
            // current position (§4.5 step 6).
            let base_last_cts = self
                .registry
                .get(stream_idx)
                .props
                .muxed_base
                .map(|base| self.registry.streams()[base].last_cts);

            let stream = self.registry.get_mut(stream_idx);
            let target_dash_dur = stream
                .props
                .dash_dur
                .map(|d| (d * stream.props.timescale as f64) as u64)
                .unwrap_or(0);
            let subdur_ticks = self
                .config
                .subdur
                .map(|d| (d * stream.props.timescale as f64) as u64);

            loop {
                match process_stream(
                    stream,
                    source.as_mut(),
                    self.config.sap,
                    target_dash_dur,
                    subdur_ticks,
                    base_last_cts,
                ) {
                    StreamStep::Consumed => progressed = true,
                    StreamStep::SegmentFlushed => {
                        progressed = true;
                        let _ = crate::scheduler::flush_segment(stream, target_dash_dur, None, self.config.skip_seg);
                        break;
                    }
                    StreamStep::Eos => break,
                    StreamStep::NoPacket => {
                        saw_no_packet = true;
                        break;
                    }
                }
            }
        }

        // Cross-representation laggard cutoff (§4.5 step 6): once one stream
        // in the Period finishes, cap the still-running siblings at its
        // boundary, rescaled to each one's own timescale.
        if self.config.check_dur {
            if let Some(&finished_idx) = fsm.streams.iter().find(|&&idx| self.registry.get(idx).done == Done::Eos) {
                let finished = self.registry.get(finished_idx);
                let (finished_cts, finished_ts) = (finished.last_cts, finished.props.timescale);
                for &idx in &fsm.streams {
                    if idx == finished_idx {
                        continue;
                    }
                    let stream = self.registry.get_mut(idx);
                    if stream.done != Done::Running {
                        continue;
                    }
                    let bound = crate::scheduler::force_end_for_laggards(finished_cts, finished_ts, stream.props.timescale);
                    stream.force_rep_end = Some(stream.force_rep_end.map_or(bound, |existing| existing.min(bound)));
                }
            }
        }

        let registry = &self.registry;
        let fsm = &mut self.periods[self.current_period];
        fsm.maybe_drain(|idx| registry.get(idx).done);
        fsm.maybe_switch();

        if fsm.state == PeriodState::Switching {
            let has_next = self.current_period + 1 < self.periods.len();
            fsm.rebuild_or_terminate(has_next);
            if has_next {
                self.current_period += 1;
            }
        }

        if progressed {
            ProcessOutcome::Progressed
        } else if saw_no_packet {
            ProcessOutcome::NoPacket
        } else {
            ProcessOutcome::AllDone
        }
    }
}
