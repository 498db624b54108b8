use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::element::*;
use crate::error::DasherError;
use crate::types::*;

#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct SegmentBase {
    #[serde(rename = "@timescale")]
    pub timescale: Option<u32>,
    #[serde(rename = "@presentationTimeOffset")]
    pub presentation_time_offset: Option<u64>,
    #[serde(rename = "@indexRange")]
    pub index_range: Option<SingleRFC7233Range>,
    #[serde(rename = "@indexRangeExact")]
    pub index_range_exact: Option<bool>,
    #[serde(rename = "@availabilityTimeOffset")]
    pub availability_time_offset: Option<f64>,
    #[serde(rename = "@availabilityTimeComplete")]
    pub availability_time_complete: Option<bool>,
    #[serde(rename = "Initialization")]
    pub initialization: Option<Url>,
    #[serde(rename = "FailoverContent")]
    pub failover_content: Option<FailoverContent>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct SegmentList {
    #[serde(rename = "@duration")]
    pub duration: Option<u32>,
    #[serde(rename = "@startNumber")]
    pub start_number: Option<u32>,
    #[serde(rename = "@timescale")]
    pub timescale: Option<u32>,
    #[serde(rename = "@presentationTimeOffset")]
    pub presentation_time_offset: Option<u64>,
    #[serde(rename = "Initialization")]
    pub initialization: Option<Url>,
    #[serde(rename = "SegmentTimeline")]
    pub segment_timeline: Option<SegmentTimeline>,
    #[serde(rename = "SegmentURL", skip_serializing_if = "Vec::is_empty", default)]
    pub segment_url: Vec<SegmentUrl>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct SegmentTemplate {
    #[serde(rename = "@duration")]
    pub duration: Option<u32>,
    #[serde(rename = "@startNumber")]
    pub start_number: Option<u32>,
    #[serde(rename = "@timescale")]
    pub timescale: Option<u32>,
    #[serde(rename = "@presentationTimeOffset")]
    pub presentation_time_offset: Option<u64>,
    #[serde(rename = "Initialization")]
    pub initialization_element: Option<Url>,
    #[serde(rename = "SegmentTimeline")]
    pub segment_timeline: Option<SegmentTimeline>,
    #[serde(rename = "@media")]
    pub media: Option<String>,
    #[serde(rename = "@initialization")]
    pub initialization_attribute: Option<String>,
}

/// Attribute name is `SegmentTimeline`. Owns the append/coalesce rule from
/// `dasher_insert_timeline_entry`: a new `(t, d, r)` is only appended when it
/// cannot extend the tail entry's repeat count.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct SegmentTimeline {
    #[builder(setter(custom))]
    #[serde(rename = "S", skip_serializing_if = "Vec::is_empty", default)]
    segments: Vec<Segment>,
}

impl SegmentTimelineBuilder {
    pub fn segment(&mut self, segment: Segment) -> &mut Self {
        self.segments.get_or_insert_with(Vec::new).push(segment);
        self
    }

    pub fn segments<S>(&mut self, segments: S) -> &mut Self
    where
        S: IntoIterator<Item = Segment>,
    {
        self.segments.get_or_insert_with(Vec::new).extend(segments);
        self
    }
}

impl SegmentTimeline {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Append a closed segment's `(start_time, duration)` pair, coalescing into
    /// the tail entry's repeat count when the cadence continues unbroken.
    ///
    /// Mirrors `dasher_insert_timeline_entry`'s tail-matching condition exactly:
    /// `duration == tail.duration && tail.start_time + (tail.repeat_count+1)*tail.duration == start_time`.
    pub fn push_closed_segment(&mut self, start_time: u64, duration: u64) {
        if let Some(tail) = self.segments.last_mut() {
            let tail_start = tail.start_time.unwrap_or(0);
            let tail_repeat = tail.repeat_count.unwrap_or(0);
            if tail.duration == duration
                && tail_start + (tail_repeat as u64 + 1) * tail.duration == start_time
            {
                tail.repeat_count = Some(tail_repeat + 1);
                return;
            }
        }

        self.segments.push(Segment {
            start_time: Some(start_time),
            number: None,
            duration,
            repeat_count: None,
        });
    }
}

/// Attribute name is `S`
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate", error = "DasherError")
)]
#[serde(rename = "S")]
pub struct Segment {
    #[serde(rename = "@t")]
    pub start_time: Option<u64>,
    #[serde(rename = "@n")]
    pub number: Option<u64>,
    #[serde(rename = "@d")]
    pub duration: u64,
    #[serde(rename = "@r")]
    pub repeat_count: Option<i32>,
}

impl SegmentBuilder {
    fn validate(&self) -> Result<(), DasherError> {
        if self.duration.is_none() || self.duration == Some(0) {
            Err(DasherError::Validation(
                "Segment duration must be set longer than 0".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_segment_valid() {
        assert!(SegmentBuilder::default().duration(1u64).build().is_ok());
        assert!(SegmentBuilder::default().build().is_err());
    }

    #[test]
    fn test_element_segment_timeline_coalesces_repeats() {
        let mut timeline = SegmentTimelineBuilder::default().build().unwrap();
        timeline.push_closed_segment(0, 5);
        timeline.push_closed_segment(5, 5);
        timeline.push_closed_segment(10, 5);

        assert_eq!(timeline.segments().len(), 1);
        assert_eq!(timeline.segments()[0].start_time, Some(0));
        assert_eq!(timeline.segments()[0].repeat_count, Some(2));
    }

    #[test]
    fn test_element_segment_timeline_breaks_on_duration_change() {
        let mut timeline = SegmentTimelineBuilder::default().build().unwrap();
        timeline.push_closed_segment(0, 5);
        timeline.push_closed_segment(5, 5);
        timeline.push_closed_segment(10, 7);

        assert_eq!(timeline.segments().len(), 2);
        assert_eq!(timeline.segments()[0].repeat_count, Some(1));
        assert_eq!(timeline.segments()[1].duration, 7);
        assert_eq!(timeline.segments()[1].repeat_count, None);
    }

    #[test]
    fn test_element_segment_timeline_serialize() {
        let mut timeline = SegmentTimelineBuilder::default().build().unwrap();
        timeline.push_closed_segment(0, 5);
        timeline.push_closed_segment(5, 5);

        let mut xml = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut xml);
        ser.indent(' ', 2);
        timeline.serialize(ser).unwrap();

        let se = r#"<SegmentTimeline>
  <S t="0" d="5" r="1"/>
</SegmentTimeline>"#;

        assert_eq!(&xml, se);
    }

    #[test]
    fn test_element_segment_base_serde_roundtrip() {
        let segment_base = SegmentBaseBuilder::default()
            .timescale(3000u32)
            .availability_time_offset(10.1)
            .initialization(Url {
                source_url: Some("http://example.com/video.mp4".to_string()),
                range: Some(SingleRFC7233Range {
                    start: Some(0),
                    end: Some(200),
                }),
            })
            .build()
            .unwrap();

        let mut xml = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut xml);
        ser.indent(' ', 2);
        segment_base.serialize(ser).unwrap();

        let der = quick_xml::de::from_str::<SegmentBase>(&xml).unwrap();

        assert_eq!(segment_base, der);
    }

    #[test]
    fn test_element_segment_list_serde_roundtrip() {
        let mut timeline = SegmentTimelineBuilder::default().build().unwrap();
        timeline.push_closed_segment(0, 5);

        let segment_list = SegmentListBuilder::default()
            .duration(5000u32)
            .start_number(1u32)
            .segment_timeline(timeline)
            .build()
            .unwrap();

        let mut xml = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut xml);
        ser.indent(' ', 2);
        segment_list.serialize(ser).unwrap();

        let der = quick_xml::de::from_str::<SegmentList>(&xml).unwrap();

        assert_eq!(segment_list, der);
    }

    #[test]
    fn test_element_segment_template_serde_roundtrip() {
        let mut timeline = SegmentTimelineBuilder::default().build().unwrap();
        timeline.push_closed_segment(0, 5);

        let segment_template = SegmentTemplateBuilder::default()
            .start_number(1u32)
            .presentation_time_offset(1000u32)
            .segment_timeline(timeline)
            .build()
            .unwrap();

        let mut xml = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut xml);
        ser.indent(' ', 2);
        segment_template.serialize(ser).unwrap();

        let der = quick_xml::de::from_str::<SegmentTemplate>(&xml).unwrap();

        assert_eq!(segment_template, der);
    }
}
