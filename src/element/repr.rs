use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::element::*;
use crate::types::*;

use super::segment::{SegmentBase, SegmentList, SegmentTemplate};

/// One exposed deliverable of an Adaptation Set (§3.1). Exactly one of
/// `segment_base` / `segment_list` / `segment_template` is populated, chosen by
/// the Template & Destination Resolver (§4.4) according to the active profile.
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct Representation {
    #[serde(rename = "@id")]
    pub id: StringNoWhitespace,
    #[serde(rename = "@bandwidth")]
    pub bandwidth: u32,
    #[serde(rename = "@qualityRanking")]
    pub quality_ranking: Option<u32>,
    #[serde(rename = "@dependencyId")]
    pub dependency_id: Option<StringVector>,
    #[serde(rename = "@width")]
    pub width: Option<u32>,
    #[serde(rename = "@height")]
    pub height: Option<u32>,
    #[serde(rename = "@sar")]
    pub sar: Option<AspectRatio>,
    #[serde(rename = "@frameRate")]
    pub framerate: Option<FrameRate>,
    #[serde(rename = "@audioSamplingRate")]
    pub audio_sampling_rate: Option<u32>,
    #[serde(rename = "@mimeType")]
    pub mime_type: Option<String>,
    /// RFC 6381 codec string; the engine never computes this itself (§1 Non-goals),
    /// it is supplied by the external codec-parameter extractor at configure time.
    #[serde(rename = "@codecs")]
    pub codecs: Option<String>,
    #[serde(rename = "@startWithSAP")]
    pub start_with_sap: Option<StreamAccessPoint>,
    #[serde(rename = "ContentProtection")]
    pub content_protection: Option<Vec<ContentProtection>>,
    #[serde(rename = "EssentialProperty")]
    pub essential_property: Option<Vec<Descriptor>>,
    #[serde(rename = "SupplementalProperty")]
    pub supplemental_property: Option<Vec<Descriptor>>,
    #[serde(rename = "InbandEventStream")]
    pub inband_event_stream: Option<Vec<EventStream>>,
    #[serde(rename = "ProducerReferenceTime")]
    pub producer_reference_time: Option<Vec<ProducerReferenceTime>>,
    #[serde(rename = "BaseURL")]
    pub base_url: Option<Vec<BaseURL>>,
    #[serde(rename = "SegmentBase")]
    pub segment_base: Option<SegmentBase>,
    #[serde(rename = "SegmentList")]
    pub segment_list: Option<SegmentList>,
    #[serde(rename = "SegmentTemplate")]
    pub segment_template: Option<SegmentTemplate>,
}

impl NeedValidater for RepresentationBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.id.is_none() || self.bandwidth.is_none() {
            Err("Representation must be set @id and @bandwidth".to_string())
        } else {
            Ok(())
        }
    }
}
