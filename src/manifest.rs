//! Manifest Emitter (SPEC_FULL.md §4.7): assembles the `Presentation` tree
//! and defines the `ManifestSerializer` trait the engine hands it to.

use chrono::{DateTime, Utc};

use crate::definition::{PresentationType, Profile};
use crate::element::period::Period;
use crate::element::presentation::PresentationBuilder;
use crate::types::StringVector;
use crate::Result;

/// Inputs the Emitter needs beyond the already-built `Period` tree.
#[derive(Debug, Clone)]
pub struct PresentationMeta {
    pub profiles: Vec<Profile>,
    pub presentation_type: PresentationType,
    pub availability_start_time: Option<DateTime<Utc>>,
    pub publish_time: Option<DateTime<Utc>>,
    pub minimum_update_period_secs: f64,
    pub min_buffer_time_secs: f64,
    pub time_shift_buffer_depth_secs: Option<f64>,
}

/// Assembles the top-level `Presentation` object from already-built Periods.
pub fn build_presentation(
    periods: Vec<Period>,
    meta: &PresentationMeta,
) -> Result<crate::element::presentation::Presentation> {
    let profiles: Vec<String> = meta.profiles.iter().map(|p| p.to_string()).collect();

    let mut builder = PresentationBuilder::default();
    builder
        .profiles(StringVector::from(profiles))
        .r#type(meta.presentation_type)
        .min_buffer_time(crate::types::XsDuration::from(std::time::Duration::from_secs_f64(
            meta.min_buffer_time_secs,
        )))
        .minimum_update_period(crate::types::XsDuration::from(std::time::Duration::from_secs_f64(
            meta.minimum_update_period_secs,
        )))
        .period(periods);

    if meta.presentation_type == PresentationType::Dynamic {
        if let Some(availability_start_time) = meta.availability_start_time {
            builder.availability_start_time(availability_start_time);
        }
        if let Some(publish_time) = meta.publish_time {
            builder.publish_time(publish_time);
        }
    }

    if let Some(depth) = meta.time_shift_buffer_depth_secs {
        builder.time_shift_buffer_depth(crate::types::XsDuration::from(
            std::time::Duration::from_secs_f64(depth),
        ));
    }

    builder
        .build()
        .map_err(|e| crate::error::DasherError::Validation(e.to_string()))
}

/// Delegates the in-memory tree to bytes; this crate only supplies the tree
/// and this trait, not an XML writer (§4.7).
pub trait ManifestSerializer {
    fn serialize(&self, presentation: &crate::element::presentation::Presentation) -> Result<Vec<u8>>;
}

/// Reference implementation backed by `quick_xml`, suitable for tests and
/// simple callers; production callers may supply their own.
#[derive(Debug, Default)]
pub struct QuickXmlManifestSerializer;

impl ManifestSerializer for QuickXmlManifestSerializer {
    fn serialize(&self, presentation: &crate::element::presentation::Presentation) -> Result<Vec<u8>> {
        let mut xml = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut xml);
        ser.indent(' ', 2);
        serde::Serialize::serialize(presentation, ser)
            .map_err(|e| crate::error::DasherError::BadParam(e.to_string()))?;
        Ok(xml.into_bytes())
    }
}
