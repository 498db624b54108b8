use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::definition::*;
use crate::element::*;
use crate::types::*;

use crate::element::period::Period;

/// The top-level manifest tree assembled by the Manifest Emitter (§4.7). This
/// crate only builds and validates the tree; handing it to a `ManifestSerializer`
/// (§6) for XML encoding is the caller's job.
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Builder)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct Presentation {
    #[serde(rename = "@xmlns")]
    #[builder(default = "Some(MPD_NAMESPACE.into())")]
    pub xmlns: Option<String>,
    #[serde(rename = "@xmlns:xsi")]
    #[builder(default = "Some(MPD_SCHEMA_INSTANCE.into())")]
    pub xmlns_xsi: Option<String>,
    #[serde(rename = "@xmlns:xlink")]
    pub xmlns_xlink: Option<String>,
    #[serde(rename = "@xsi:schemaLocation")]
    #[builder(default = "Some(vec![MPD_NAMESPACE.to_string(), MPD_SCHEMA_FILE.to_string()].into())")]
    pub xsi_schema_location: Option<StringVector>,
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "@profiles")]
    pub profiles: StringVector,
    #[serde(rename = "@type")]
    pub r#type: Option<PresentationType>,
    /// required when @type='dynamic'
    #[serde(rename = "@availabilityStartTime")]
    pub availability_start_time: Option<DateTime<Utc>>,
    /// required when @type='dynamic'
    #[serde(rename = "@publishTime")]
    pub publish_time: Option<DateTime<Utc>>,
    #[serde(rename = "@mediaPresentationDuration")]
    pub media_presentation_duration: Option<XsDuration>,
    #[serde(rename = "@minimumUpdatePeriod")]
    pub minimum_update_period: Option<XsDuration>,
    #[serde(rename = "@minBufferTime")]
    pub min_buffer_time: XsDuration,
    #[serde(rename = "@timeShiftBufferDepth")]
    pub time_shift_buffer_depth: Option<XsDuration>,
    #[serde(rename = "ProgramInformation")]
    pub program_information: Option<Vec<ProgramInformation>>,
    #[serde(rename = "BaseURL")]
    pub base_url: Option<Vec<BaseURL>>,
    #[serde(rename = "Location")]
    pub location: Option<Vec<String>>,
    #[serde(rename = "Period")]
    pub period: Vec<Period>,
}

impl NeedValidater for PresentationBuilder {
    fn validate(&self) -> Result<(), String> {
        if !self
            .profiles
            .as_ref()
            .is_some_and(|profiles| !profiles.to_string().is_empty())
        {
            return Err("Presentation must be set profiles.".to_string());
        }

        if self
            .r#type
            .as_ref()
            .is_some_and(|typ| typ == &Some(PresentationType::Dynamic))
            && (self.availability_start_time.is_none() || self.publish_time.is_none())
        {
            return Err("For @type='dynamic', @availabilityStartTime and @publishTime attribute shall be present".to_string());
        }

        Ok(())
    }
}
