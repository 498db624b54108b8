//! Segment Scheduler (SPEC_FULL.md §4.5): the per-packet hot loop and
//! `flush_segment`, grounded directly in `dasher_flush_segment` and the
//! boundary test of the original filter's packet-processing function.

use tracing::warn;

use crate::stream::{Done, Stream};
use crate::types::StreamAccessPoint;

fn boundary_sap(sap: Option<StreamAccessPoint>) -> Option<StreamAccessPoint> {
    sap.filter(|s| s.is_sap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStep {
    Consumed,
    NoPacket,
    Eos,
    SegmentFlushed,
}

#[derive(Debug, Clone)]
pub struct Packet {
    pub cts: u64,
    pub duration: u64,
    pub sap: Option<StreamAccessPoint>,
    pub payload: Vec<u8>,
}

/// Outcome of closing one segment: the boundary timestamps the Timeline
/// Builder (§4.6) needs, plus any demotion the caller must apply.
#[derive(Debug, Clone, PartialEq)]
pub struct FlushResult {
    pub seg_start_time: u64,
    pub first_cts_in_seg: u64,
    pub first_cts_in_next_seg: u64,
    pub seg_number: u32,
    pub duration_out_of_range: bool,
    pub demote_to_full: bool,
    /// Duration carried over from a sample split at this segment's closing
    /// boundary (§4.5 step 5); belongs to the new segment, not this one.
    pub carried_duration: u64,
}

/// Fetches the next packet for a stream, or reports back-pressure/EOS; the
/// real implementation is a cooperative fetcher outside this crate's scope.
pub trait PacketSource {
    fn next_packet(&mut self) -> Option<Packet>;
    fn is_eos(&self) -> bool;
}

/// Drives one stream through the numbered steps of §4.5 for a single fetched
/// packet. `sap_required`/`subdur_ticks` mirror `DasherConfig::sap`/`subdur`
/// (the latter already converted to this stream's timescale); `base_last_cts`
/// is the owning base stream's `last_cts`, rescaled to this stream's
/// timescale, for a muxed component waiting on its base (§4.5 step 6).
pub fn process_stream(
    stream: &mut Stream,
    source: &mut dyn PacketSource,
    sap_required: bool,
    target_dash_dur: u64,
    subdur_ticks: Option<u64>,
    base_last_cts: Option<u64>,
) -> StreamStep {
    if stream.done != Done::Running {
        return StreamStep::Eos;
    }

    if let Some(budget) = subdur_ticks {
        if stream.cumulated_dur >= budget {
            stream.done = Done::SubdurExceeded;
            return StreamStep::Eos;
        }
    }

    if let Some(force_end) = stream.force_rep_end {
        if stream.last_cts >= force_end {
            stream.done = Done::Eos;
            return StreamStep::Eos;
        }
    }

    if let Some(limit) = base_last_cts {
        if stream.last_cts >= limit {
            return StreamStep::NoPacket;
        }
    }

    let Some(packet) = source.next_packet() else {
        if source.is_eos() {
            stream.done = Done::Eos;
            return StreamStep::Eos;
        }
        return StreamStep::NoPacket;
    };

    if !stream.rep_init {
        let is_sap = matches!(packet.sap, Some(sap) if sap.is_sap());
        if !is_sap {
            return StreamStep::Consumed;
        }
        stream.rep_init = true;
        stream.first_cts = packet.cts;
        stream.first_cts_in_seg = 0;
        stream.next_seg_start = target_dash_dur;
        stream.adjusted_next_seg_start = target_dash_dur;
    }

    let relative_cts = packet.cts.saturating_sub(stream.first_cts);

    if let Some(force_end) = stream.force_rep_end {
        if relative_cts >= force_end {
            stream.done = Done::Eos;
            return StreamStep::Eos;
        }
    }

    if stream.splitable {
        if let Some((first, second)) = split_at_boundary(relative_cts, packet.duration, stream.adjusted_next_seg_start) {
            stream.last_cts = relative_cts + first;
            stream.nb_pck += 1;
            stream.cumulated_dur += packet.duration;
            stream.pending_split_remainder = second;
            stream.first_cts_in_next_seg = stream.adjusted_next_seg_start;
            stream.last_boundary_sap = boundary_sap(packet.sap);
            return StreamStep::SegmentFlushed;
        }
    }

    if relative_cts >= stream.adjusted_next_seg_start {
        let boundary_is_segment_over = if !sap_required {
            true
        } else {
            match packet.sap {
                Some(sap) if sap.is_sap() => {
                    stream.adjusted_next_seg_start = relative_cts;
                    true
                }
                _ => false,
            }
        };

        if boundary_is_segment_over {
            stream.first_cts_in_next_seg = relative_cts;
            stream.last_boundary_sap = boundary_sap(packet.sap);
            return StreamStep::SegmentFlushed;
        }
    }

    stream.last_cts = relative_cts;
    stream.nb_pck += 1;
    stream.cumulated_dur += packet.duration;
    StreamStep::Consumed
}

/// Splits a sample that straddles the segment boundary (§4.5 step 5,
/// splitable stream types only). Returns `(first_half_duration,
/// second_half_duration)`; the second half is replayed as SAP *redundant*.
pub fn split_at_boundary(cts: u64, duration: u64, adjusted_next_seg_start: u64) -> Option<(u64, u64)> {
    if cts >= adjusted_next_seg_start || cts + duration <= adjusted_next_seg_start {
        return None;
    }
    let first = adjusted_next_seg_start - cts;
    Some((first, duration - first))
}

/// `flush_segment` (§4.5). Validates duration against `[dur/2, 3*dur/2]`,
/// advances `next_seg_start` while skipping would-be-empty segments, and
/// reports whether an alignment mismatch forces profile demotion.
pub fn flush_segment(
    stream: &mut Stream,
    target_dash_dur: u64,
    as_target_dash_dur: Option<u64>,
    skip_seg: bool,
) -> FlushResult {
    let seg_start_time = stream.first_cts_in_seg;
    let duration = stream.first_cts_in_next_seg.saturating_sub(stream.first_cts_in_seg);

    let duration_out_of_range = target_dash_dur > 0
        && (duration < target_dash_dur / 2 || duration > target_dash_dur * 3 / 2);
    if duration_out_of_range {
        warn!(
            seg_number = stream.seg_number,
            duration, target_dash_dur, "segment duration out of [dur/2, 3*dur/2] range"
        );
    }

    // 1ms expressed in this stream's timescale ticks, not a fraction of the
    // target duration (§4.5 step 8 / invariant §8.2).
    let one_ms_ticks = (stream.props.timescale as u64 / 1000).max(1);
    let alignment_mismatch =
        as_target_dash_dur.is_some_and(|target| target.abs_diff(duration) > one_ms_ticks);
    let weak_sap_boundary = matches!(
        stream.last_boundary_sap,
        Some(StreamAccessPoint::Type3) | Some(StreamAccessPoint::Type4)
    );
    let demote_to_full = alignment_mismatch || weak_sap_boundary;

    stream.next_seg_start += target_dash_dur;
    while target_dash_dur > 0 && stream.next_seg_start <= stream.adjusted_next_seg_start {
        stream.next_seg_start += target_dash_dur;
        if skip_seg {
            stream.seg_number += 1;
        }
    }
    stream.adjusted_next_seg_start = stream.next_seg_start;

    stream.seg_number += 1;
    let carried_duration = stream.pending_split_remainder;
    stream.pending_split_remainder = 0;
    stream.last_boundary_sap = None;

    let result = FlushResult {
        seg_start_time,
        first_cts_in_seg: stream.first_cts_in_seg,
        first_cts_in_next_seg: stream.first_cts_in_next_seg,
        seg_number: stream.seg_number,
        duration_out_of_range,
        demote_to_full,
        carried_duration,
    };
    stream.first_cts_in_seg = stream.first_cts_in_next_seg;
    result
}

/// Cross-representation truncation (§4.5): once one Representation in the AS
/// finishes while siblings are still running, force the laggards to stop at
/// the finished one's boundary, rescaled to their own timescale.
pub fn force_end_for_laggards(
    finished_first_cts_in_next_seg: u64,
    finished_timescale: u32,
    laggard_timescale: u32,
) -> u64 {
    if finished_timescale == laggard_timescale || finished_timescale == 0 {
        return finished_first_cts_in_next_seg;
    }
    ((finished_first_cts_in_next_seg as u128 * laggard_timescale as u128) / finished_timescale as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::StreamType;
    use crate::stream::StreamProps;

    struct FixedSource(std::collections::VecDeque<Packet>, bool);

    impl PacketSource for FixedSource {
        fn next_packet(&mut self) -> Option<Packet> {
            self.0.pop_front()
        }
        fn is_eos(&self) -> bool {
            self.1
        }
    }

    fn sap_packet(cts: u64, sap: bool) -> Packet {
        Packet {
            cts,
            duration: 10,
            sap: sap.then_some(StreamAccessPoint::Type1),
            payload: vec![],
        }
    }

    #[test]
    fn test_scheduler_drops_packets_until_first_sap() {
        let mut stream = Stream::new(StreamProps {
            stream_type: StreamType::Video,
            ..Default::default()
        });
        let mut source = FixedSource(vec![sap_packet(0, false)].into(), false);
        let step = process_stream(&mut stream, &mut source, true, 100, None, None);
        assert_eq!(step, StreamStep::Consumed);
        assert!(!stream.rep_init);
    }

    #[test]
    fn test_scheduler_initializes_on_first_sap() {
        let mut stream = Stream::new(StreamProps {
            stream_type: StreamType::Video,
            ..Default::default()
        });
        let mut source = FixedSource(vec![sap_packet(5, true)].into(), false);
        let step = process_stream(&mut stream, &mut source, true, 100, None, None);
        assert_eq!(step, StreamStep::Consumed);
        assert!(stream.rep_init);
        assert_eq!(stream.first_cts, 5);
    }

    #[test]
    fn test_scheduler_no_packet_when_source_empty_and_not_eos() {
        let mut stream = Stream::new(StreamProps::default());
        stream.rep_init = true;
        let mut source = FixedSource(Default::default(), false);
        assert_eq!(
            process_stream(&mut stream, &mut source, true, 100, None, None),
            StreamStep::NoPacket
        );
    }

    #[test]
    fn test_scheduler_eos_when_source_empty_and_eos() {
        let mut stream = Stream::new(StreamProps::default());
        stream.rep_init = true;
        let mut source = FixedSource(Default::default(), true);
        assert_eq!(
            process_stream(&mut stream, &mut source, true, 100, None, None),
            StreamStep::Eos
        );
        assert_eq!(stream.done, Done::Eos);
    }

    #[test]
    fn test_scheduler_boundary_flushes_on_sap() {
        let mut stream = Stream::new(StreamProps::default());
        stream.rep_init = true;
        stream.first_cts = 0;
        stream.adjusted_next_seg_start = 20;
        let mut source = FixedSource(vec![sap_packet(25, true)].into(), false);
        let step = process_stream(&mut stream, &mut source, true, 20, None, None);
        assert_eq!(step, StreamStep::SegmentFlushed);
        assert_eq!(stream.adjusted_next_seg_start, 25);
    }

    #[test]
    fn test_scheduler_boundary_waits_for_sap_when_required() {
        let mut stream = Stream::new(StreamProps::default());
        stream.rep_init = true;
        stream.first_cts = 0;
        stream.adjusted_next_seg_start = 20;
        let mut source = FixedSource(vec![sap_packet(25, false)].into(), false);
        let step = process_stream(&mut stream, &mut source, true, 20, None, None);
        assert_eq!(step, StreamStep::Consumed);
    }

    #[test]
    fn test_scheduler_subdur_budget_marks_stream_exceeded() {
        let mut stream = Stream::new(StreamProps::default());
        stream.rep_init = true;
        stream.first_cts = 0;
        stream.cumulated_dur = 100;
        let mut source = FixedSource(vec![sap_packet(0, true)].into(), false);
        let step = process_stream(&mut stream, &mut source, true, 100, Some(100), None);
        assert_eq!(step, StreamStep::Eos);
        assert_eq!(stream.done, Done::SubdurExceeded);
    }

    #[test]
    fn test_scheduler_muxed_component_waits_on_base_last_cts() {
        let mut stream = Stream::new(StreamProps::default());
        stream.rep_init = true;
        stream.first_cts = 0;
        stream.last_cts = 10;
        let mut source = FixedSource(vec![sap_packet(20, true)].into(), false);
        let step = process_stream(&mut stream, &mut source, true, 100, None, Some(10));
        assert_eq!(step, StreamStep::NoPacket);
    }

    #[test]
    fn test_scheduler_splitable_stream_straddling_sample_flushes_with_remainder() {
        let mut stream = Stream::new(StreamProps {
            stream_type: StreamType::Text,
            ..Default::default()
        });
        stream.rep_init = true;
        stream.first_cts = 0;
        stream.adjusted_next_seg_start = 20;
        let mut source = FixedSource(
            vec![Packet {
                cts: 18,
                duration: 10,
                sap: Some(StreamAccessPoint::Type1),
                payload: vec![],
            }]
            .into(),
            false,
        );
        let step = process_stream(&mut stream, &mut source, true, 20, None, None);
        assert_eq!(step, StreamStep::SegmentFlushed);
        assert_eq!(stream.first_cts_in_next_seg, 20);
        assert_eq!(stream.pending_split_remainder, 8);
    }

    #[test]
    fn test_scheduler_split_at_boundary_computes_remainder() {
        let split = split_at_boundary(18, 10, 20);
        assert_eq!(split, Some((2, 8)));
    }

    #[test]
    fn test_scheduler_split_at_boundary_none_when_not_straddling() {
        assert_eq!(split_at_boundary(25, 10, 20), None);
    }

    #[test]
    fn test_scheduler_flush_segment_advances_and_skips_empty() {
        let mut stream = Stream::new(StreamProps::default());
        stream.first_cts_in_seg = 0;
        stream.first_cts_in_next_seg = 20;
        stream.next_seg_start = 20;
        stream.adjusted_next_seg_start = 65;

        let result = flush_segment(&mut stream, 20, None, false);
        assert_eq!(result.seg_number, 1);
        assert_eq!(stream.next_seg_start, 80);
        assert!(!result.duration_out_of_range);
    }

    #[test]
    fn test_scheduler_flush_segment_flags_out_of_range_duration() {
        let mut stream = Stream::new(StreamProps::default());
        stream.first_cts_in_seg = 0;
        stream.first_cts_in_next_seg = 5;
        stream.next_seg_start = 20;
        stream.adjusted_next_seg_start = 20;

        let result = flush_segment(&mut stream, 20, None, false);
        assert!(result.duration_out_of_range);
    }

    #[test]
    fn test_scheduler_flush_segment_detects_alignment_mismatch() {
        let mut stream = Stream::new(StreamProps::default());
        stream.first_cts_in_seg = 0;
        stream.first_cts_in_next_seg = 20;
        stream.next_seg_start = 20;
        stream.adjusted_next_seg_start = 20;

        let result = flush_segment(&mut stream, 20, Some(23), false);
        assert!(result.demote_to_full);
    }

    #[test]
    fn test_scheduler_force_end_for_laggards_rescales() {
        assert_eq!(force_end_for_laggards(90_000, 90_000, 1_000), 1_000);
    }

    #[test]
    fn test_scheduler_flush_segment_promotes_on_weak_sap_boundary() {
        let mut stream = Stream::new(StreamProps::default());
        stream.first_cts_in_seg = 0;
        stream.first_cts_in_next_seg = 20;
        stream.next_seg_start = 20;
        stream.adjusted_next_seg_start = 20;
        stream.last_boundary_sap = Some(StreamAccessPoint::Type3);

        let result = flush_segment(&mut stream, 20, None, false);
        assert!(result.demote_to_full);
    }

    #[test]
    fn test_scheduler_flush_segment_carries_split_remainder_into_next_segment() {
        let mut stream = Stream::new(StreamProps::default());
        stream.first_cts_in_seg = 0;
        stream.first_cts_in_next_seg = 20;
        stream.next_seg_start = 20;
        stream.adjusted_next_seg_start = 20;
        stream.pending_split_remainder = 8;

        let result = flush_segment(&mut stream, 20, None, false);
        assert_eq!(result.carried_duration, 8);
        assert_eq!(stream.pending_split_remainder, 0);
    }
}
