pub mod adapt;
pub mod period;
pub mod presentation;
pub mod repr;
pub mod segment;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::types::*;

pub trait NeedValidater {
    fn validate(&self) -> Result<(), String>;
}

/// Program Information, ISO/IEC 23009-1 5.3.2.
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct ProgramInformation {
    #[serde(rename = "@lang")]
    lang: Option<String>,
    #[serde(rename = "@moreInformationURL")]
    more_information_url: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Source")]
    source: Option<String>,
    #[serde(rename = "Copyright")]
    copyright: Option<String>,
}

/// Generic scheme-identified descriptor, table 32 of ISO/IEC 23009-1. Used as-is
/// for Role/Accessibility/Rating/Viewpoint/EssentialProperty/SupplementalProperty.
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct Descriptor {
    #[serde(rename = "@schemeIdUri")]
    scheme_id_uri: String,
    #[serde(rename = "@value", skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl NeedValidater for DescriptorBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.scheme_id_uri.is_none() {
            Err("Descriptor must be set @schemeIdUri".to_string())
        } else {
            Ok(())
        }
    }
}

/// ContentProtection, table 33. `ref` and `ref_id` are mutually exclusive.
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct ContentProtection {
    #[serde(flatten)]
    descriptor: Descriptor,
    #[serde(rename = "@ref")]
    r#ref: Option<String>,
    #[serde(rename = "@refId")]
    ref_id: Option<String>,
    #[serde(rename = "@robustness")]
    robustness: Option<StringNoWhitespace>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Event {
    #[serde(rename = "@presentationTime")]
    presentation_time: Option<u64>,
    #[serde(rename = "@duration")]
    duration: Option<u64>,
    #[serde(rename = "@id")]
    id: Option<u32>,
    /// Deprecated in favor of carrying the message information in the value space of the event
    #[serde(rename = "@messageData")]
    message_data: Option<String>,
}

/// EventStream, table 30. Used to carry the MPD validity / manifest update events.
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct EventStream {
    #[serde(rename = "@xlink:href")]
    href: Option<String>,
    #[serde(rename = "@schemeIdUri")]
    scheme_id_uri: String,
    #[serde(rename = "@value")]
    value: Option<String>,
    #[serde(rename = "@timescale")]
    timescale: Option<u32>,
    #[serde(rename = "@presentationTimeOffset")]
    presentation_time_offset: Option<u64>,
    #[serde(rename = "Event")]
    events: Option<Vec<Event>>,
}

impl NeedValidater for EventStreamBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.scheme_id_uri.is_none() {
            Err("EventStream must be set @schemeIdUri".to_string())
        } else {
            Ok(())
        }
    }
}

/// Switching, table 39 — advertises that a client may seamlessly switch into this
/// representation from another within the given interval (§4.3 bitstream-switching check).
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct Switching {
    #[serde(rename = "@interval")]
    interval: u32,
    #[serde(rename = "@type")]
    r#type: Option<String>,
}

impl NeedValidater for SwitchingBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.interval.is_none() {
            Err("Switching must be set @interval".to_string())
        } else {
            Ok(())
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct RandomAccess {
    #[serde(rename = "@interval")]
    interval: u32,
    #[serde(rename = "@type")]
    r#type: Option<String>,
    #[serde(rename = "@minBufferTime")]
    min_buffer_time: Option<XsDuration>,
    #[serde(rename = "@bandwidth")]
    bandwidth: Option<u32>,
}

impl NeedValidater for RandomAccessBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.interval.is_none() {
            Err("RandomAccess must be set @interval".to_string())
        } else {
            Ok(())
        }
    }
}

/// ProducerReferenceTime, table 37 — anchors a representation's encoder wall-clock
/// reference, optionally signalled inband for live NTP stamping (§6 `SenderNTP`).
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct ProducerReferenceTime {
    #[serde(rename = "@id")]
    id: u32,
    #[serde(rename = "@inband")]
    inband: Option<bool>,
    #[serde(rename = "@type")]
    r#type: Option<String>,
    #[serde(rename = "@wallClockTime")]
    wall_clock_time: String,
    #[serde(rename = "@presentationTime")]
    presentation_time: u64,
    #[serde(rename = "UTCTiming")]
    utc_timing: Option<Descriptor>,
}

impl NeedValidater for ProducerReferenceTimeBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.id.is_none() || self.wall_clock_time.is_none() || self.presentation_time.is_none() {
            Err(
                "ProducerReferenceTime must be set @id, @wallClockTime and @presentationTime"
                    .to_string(),
            )
        } else {
            Ok(())
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct PopularityRate {
    #[serde(rename = "@popularityRate")]
    popularity_rate: u32,
    #[serde(rename = "@start")]
    start: Option<u64>,
    #[serde(rename = "@r")]
    repeat_count: Option<i32>,
}

impl NeedValidater for PopularityRateBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.popularity_rate.as_ref() {
            Some(rate) if !(1..=100).contains(rate) => {
                Err("The value shall be in the range of 1 to 100.".to_string())
            }
            Some(_) => Ok(()),
            None => Err("PopularityRate must be set @popularityRate".to_string()),
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct ContentPopularityRate {
    #[serde(rename = "@source")]
    source: String,
    #[serde(rename = "PR")]
    popularity_rates: Vec<PopularityRate>,
}

impl NeedValidater for ContentPopularityRateBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.source.is_none() {
            Err("ContentPopularityRate must be set @source".to_string())
        } else if !self
            .popularity_rates
            .as_ref()
            .is_some_and(|rates| !rates.is_empty())
        {
            Err("ContentPopularityRate must be set PR longer than 0".to_string())
        } else {
            Ok(())
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct BaseURL {
    #[serde(rename = "$text")]
    base: String,
    #[serde(rename = "@serviceLocation")]
    service_location: Option<String>,
    #[serde(rename = "@byteRange")]
    byte_range: Option<String>,
    #[serde(rename = "@availabilityTimeOffset")]
    availability_time_offset: Option<f64>,
    #[serde(rename = "@availabilityTimeComplete")]
    availability_time_complete: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct Fcs {
    #[serde(rename = "@t")]
    pub start_time: u64,
    #[serde(rename = "@d")]
    pub duration: Option<u64>,
}

impl NeedValidater for FcsBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.start_time.is_none() {
            Err("FCS must be set @t".to_string())
        } else {
            Ok(())
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct FailoverContent {
    #[serde(rename = "@valid")]
    pub valid: Option<bool>,
    #[serde(rename = "FCS")]
    pub fcs_list: Vec<Fcs>,
}

impl NeedValidater for FailoverContentBuilder {
    fn validate(&self) -> Result<(), String> {
        if !self.fcs_list.as_ref().is_some_and(|list| !list.is_empty()) {
            Err("FailoverContent must be set FCS longer than 0".to_string())
        } else {
            Ok(())
        }
    }
}
