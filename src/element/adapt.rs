use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::element::*;
use crate::types::*;

use super::{
    repr::Representation,
    segment::{SegmentBase, SegmentList, SegmentTemplate},
};

/// A group of interchangeable Representations (§3.1), populated by the
/// Adaptation-Set Grouper (§4.3). `segment_alignment`/`bitstream_switching` are
/// set by the grouper, not hand-authored, and may be demoted later by
/// `flush_segment`'s cross-representation duration check (§4.5).
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct AdaptationSet {
    #[serde(rename = "@id")]
    pub id: Option<u32>,
    #[serde(rename = "@group")]
    pub group: Option<u32>,
    #[serde(rename = "@lang")]
    pub lang: Option<String>,
    #[serde(rename = "@contentType")]
    pub content_type: Option<RFC6838ContentType>,
    #[serde(rename = "@par")]
    pub par: Option<AspectRatio>,
    #[serde(rename = "@minBandwidth")]
    pub min_bandwidth: Option<u32>,
    #[serde(rename = "@maxBandwidth")]
    pub max_bandwidth: Option<u32>,
    #[serde(rename = "@maxWidth")]
    pub max_width: Option<u32>,
    #[serde(rename = "@maxHeight")]
    pub max_height: Option<u32>,
    #[serde(rename = "@maxFrameRate")]
    pub max_framerate: Option<FrameRate>,
    #[serde(rename = "@mimeType")]
    pub mime_type: Option<String>,
    #[serde(rename = "@startWithSAP")]
    pub start_with_sap: Option<StreamAccessPoint>,
    #[serde(rename = "@segmentAlignment")]
    pub segment_alignment: Option<bool>,
    #[serde(rename = "@bitstreamSwitching")]
    pub bitstream_switching: Option<bool>,
    #[serde(rename = "@subsegmentAlignment")]
    pub subsegment_alignment: Option<bool>,
    #[serde(rename = "Accessibility")]
    pub accessibility: Option<Vec<Descriptor>>,
    #[serde(rename = "Role")]
    pub role: Option<Vec<Descriptor>>,
    #[serde(rename = "EssentialProperty")]
    pub essential_property: Option<Vec<Descriptor>>,
    #[serde(rename = "SupplementalProperty")]
    pub supplemental_property: Option<Vec<Descriptor>>,
    #[serde(rename = "ContentProtection")]
    pub content_protection: Option<Vec<ContentProtection>>,
    #[serde(rename = "BaseURL")]
    pub base_url: Option<Vec<BaseURL>>,
    #[serde(rename = "SegmentBase")]
    pub segment_base: Option<SegmentBase>,
    #[serde(rename = "SegmentList")]
    pub segment_list: Option<SegmentList>,
    #[serde(rename = "SegmentTemplate")]
    pub segment_template: Option<SegmentTemplate>,
    #[serde(rename = "Representation")]
    pub representation: Option<Vec<Representation>>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{
        element::{
            repr::RepresentationBuilder,
            segment::{SegmentTemplateBuilder, SegmentTimelineBuilder},
        },
        types::StringNoWhitespace,
    };

    use super::*;

    #[test]
    fn test_element_adaptation_set_serialize() {
        let mut timeline = SegmentTimelineBuilder::default().build().unwrap();
        timeline.push_closed_segment(0, 15000);

        let segment_template = SegmentTemplateBuilder::default()
            .initialization_attribute("$RepresentationID$.cmfi")
            .media("$RepresentationID$/$Time$.cmfv")
            .timescale(3000u32)
            .segment_timeline(timeline)
            .build()
            .unwrap();

        let representation = RepresentationBuilder::default()
            .id(StringNoWhitespace::from_str("720p").unwrap())
            .codecs("avc1.4d0028")
            .bandwidth(4_000_000u32)
            .width(1280u32)
            .height(720u32)
            .build()
            .unwrap();

        let role = DescriptorBuilder::default()
            .scheme_id_uri(crate::definition::ROLE_SCHEME)
            .value("main")
            .build()
            .unwrap();

        let adapt = AdaptationSetBuilder::default()
            .content_type(RFC6838ContentType::Video)
            .segment_alignment(true)
            .mime_type("video/mp4")
            .start_with_sap(StreamAccessPoint::Type1)
            .role(vec![role])
            .segment_template(segment_template)
            .representation(vec![representation])
            .build()
            .unwrap();

        let mut xml = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut xml);
        ser.indent(' ', 2);
        adapt.serialize(ser).unwrap();

        assert!(xml.contains("<Representation"));
        assert!(xml.contains("segmentAlignment=\"true\""));
    }
}
