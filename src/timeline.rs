//! Segment-Timeline Builder (SPEC_FULL.md §4.6): turns a closed segment's
//! boundary timestamps into a `<S>` entry, rescaling to the manifest
//! timescale and coalescing repeats via `SegmentTimeline::push_closed_segment`.

use crate::element::segment::SegmentTimeline;

/// Where a timeline entry is recorded, per the "AS-level when alignment
/// holds" rule in §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineOwner {
    AdaptationSet,
    Representation,
}

/// Appends one closed segment to `timeline`. `first_cts_in_seg`/
/// `first_cts_in_next_seg` are in the stream's own timescale;
/// `stream_timescale`/`manifest_timescale` rescale the duration so the
/// timeline is expressed in the manifest's declared timescale.
pub fn record_closed_segment(
    timeline: &mut SegmentTimeline,
    seg_start_time: u64,
    first_cts_in_seg: u64,
    first_cts_in_next_seg: u64,
    stream_timescale: u32,
    manifest_timescale: u32,
) {
    let raw_duration = first_cts_in_next_seg.saturating_sub(first_cts_in_seg);
    let duration = rescale(raw_duration, stream_timescale, manifest_timescale);
    timeline.push_closed_segment(seg_start_time, duration);
}

fn rescale(value: u64, from: u32, to: u32) -> u64 {
    if from == to || from == 0 {
        return value;
    }
    ((value as u128 * to as u128) / from as u128) as u64
}

/// On a profile demotion to `full` (§4.5/§7), the shared AS-level timeline is
/// deep-copied into each Representation so they can diverge independently.
pub fn fork_per_representation(shared: &SegmentTimeline, count: usize) -> Vec<SegmentTimeline> {
    (0..count).map(|_| shared.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_record_closed_segment_rescales_duration() {
        let mut timeline = SegmentTimeline::default();
        record_closed_segment(&mut timeline, 0, 0, 180_000, 90_000, 1_000);
        assert_eq!(timeline.segments().first().unwrap().duration, 2_000);
    }

    #[test]
    fn test_timeline_record_closed_segment_coalesces_repeats() {
        let mut timeline = SegmentTimeline::default();
        record_closed_segment(&mut timeline, 0, 0, 2_000, 1_000, 1_000);
        record_closed_segment(&mut timeline, 2_000, 2_000, 4_000, 1_000, 1_000);
        assert_eq!(timeline.segments().len(), 1);
        assert_eq!(timeline.segments()[0].repeat_count, Some(1));
    }

    #[test]
    fn test_timeline_fork_per_representation_deep_copies() {
        let mut shared = SegmentTimeline::default();
        shared.push_closed_segment(0, 2_000);
        let forks = fork_per_representation(&shared, 3);
        assert_eq!(forks.len(), 3);
        assert_eq!(forks[1].segments().len(), 1);
    }
}
