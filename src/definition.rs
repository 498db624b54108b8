use std::str::FromStr;

use strum_macros::{Display, EnumString};

use crate::{define_regex, entity::*, error::DasherError, Result};

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub const MPD_NAMESPACE: &str = "urn:mpeg:dash:schema:mpd:2011";
pub const XML_LINKING_LANGUAGE: &str = "http://www.w3.org/1999/xlink";
pub const MPD_SCHEMA_FILE: &str = "DASH-MPD.xsd";
pub const MPD_SCHEMA_INSTANCE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const DASH_DVB_EXTENTION: &str = "urn:dvb:dash-extentions:2014-1";

pub const ROLE_SCHEME: &str = "urn:mpeg:dash:role:2011";

/// Presentation type, ISO/IEC 23009-1 5.3.1.2.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PresentationType {
    #[default]
    Static,
    Dynamic,
}

/// DASH conformance profile advertised in the presentation's `profiles` attribute.
///
/// `Full` is the fallback profile the engine demotes to when a representation
/// violates the alignment or SAP invariants of a stricter profile (§4.5 flush_segment).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum Profile {
    #[strum(serialize = "urn:mpeg:dash:profile:full:2011")]
    Full,
    #[strum(serialize = "urn:mpeg:dash:profile:isoff-on-demand:2011")]
    IsoOnDemand,
    #[strum(serialize = "urn:mpeg:dash:profile:isoff-live:2011")]
    IsoLive,
    #[strum(serialize = "urn:mpeg:dash:profile:isoff-main:2011")]
    IsoMain,
    #[strum(serialize = "urn:mpeg:dash:profile:cmaf:2019")]
    Cmaf,
    #[strum(serialize = "urn:hbbtv:dash:profile:isoff-live:2012")]
    HbbTv15,
    #[strum(serialize = "{0}")]
    Other(String),
}

impl Profile {
    /// The Open Question in SPEC_FULL.md §9 resolves HbbTV-1.5 as live-equivalent:
    /// the caller should additionally force `check_main_role` and `bs_switch=multi`.
    pub fn is_hbbtv15(&self) -> bool {
        matches!(self, Profile::HbbTv15)
    }
}

impl FromStr for Profile {
    type Err = DasherError;

    fn from_str(s: &str) -> Result<Self> {
        if PATTERN_PROFILE.is_match(s) {
            Ok(match s {
                "urn:mpeg:dash:profile:full:2011" => Profile::Full,
                "urn:mpeg:dash:profile:isoff-on-demand:2011" => Profile::IsoOnDemand,
                "urn:mpeg:dash:profile:isoff-live:2011" => Profile::IsoLive,
                "urn:mpeg:dash:profile:isoff-main:2011" => Profile::IsoMain,
                "urn:mpeg:dash:profile:cmaf:2019" => Profile::Cmaf,
                "urn:hbbtv:dash:profile:isoff-live:2012" => Profile::HbbTv15,
                other => Profile::Other(other.to_string()),
            })
        } else {
            Err(DasherError::UnmatchedPattern)
        }
    }
}

/// Segment template substitution tokens, ISO/IEC 23009-1 5.3.9.4.4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, Display)]
pub enum Identifier {
    #[strum(serialize = "$RepresentationID$")]
    RepresentationID,
    #[strum(serialize = "$Number$")]
    Number,
    #[strum(serialize = "$Bandwidth$")]
    Bandwidth,
    #[strum(serialize = "$Time$")]
    Time,
    #[strum(serialize = "$SubNumber$")]
    SubNumber,
}

define_regex!(
    PATTERN_URL_TEMPLATE,
    r"(?P<identifier>\$RepresentationID\$|\$Number\$|\$Bandwidth\$|\$Time\$|\$SubNumber\$)",
);

/// Bitstream-switching mode, §4.3 (mirrors dasher.c's `GF_DasherBitstreamSwitching`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum BitstreamSwitchingMode {
    Off,
    #[default]
    Inband,
    On,
    Multi,
}

/// Stream type carried on every Stream Descriptor (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StreamType {
    Video,
    Audio,
    Text,
    Metadata,
    Scene,
    #[strum(serialize = "od")]
    ObjectDescriptor,
    File,
}

impl StreamType {
    /// Only these stream types are eligible for sample splitting at a segment
    /// boundary (§4.5 step 5).
    pub fn is_splitable_kind(self) -> bool {
        matches!(
            self,
            StreamType::Text | StreamType::Metadata | StreamType::Scene | StreamType::ObjectDescriptor
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_profile_parse() {
        let input = "urn:mpeg:dash:profile:full:2011";
        let profile = Profile::from_str(input).unwrap();
        assert_eq!(profile, Profile::Full);

        let input = "https://example.com";
        let profile = Profile::from_str(input).unwrap();
        assert_eq!(profile, Profile::Other(input.to_string()));
    }

    #[test]
    fn test_definition_url_template_pattern_matching() {
        let input = format!(
            "{}/{}/{}.cmfv",
            Identifier::RepresentationID,
            Identifier::Bandwidth,
            Identifier::Time
        );

        let replace_str = PATTERN_URL_TEMPLATE
            .replace_all(&input, |caps: &regex::Captures| {
                if let Some(m) = caps.name("identifier") {
                    match Identifier::from_str(m.as_str()) {
                        Ok(Identifier::RepresentationID) => return "720p".to_string(),
                        Ok(Identifier::Bandwidth) => return "2000000".to_string(),
                        Ok(Identifier::Time) => return "1000".to_string(),
                        _ => {}
                    }
                }

                caps.get(0).unwrap().as_str().to_string()
            })
            .to_string();

        assert_eq!(replace_str, "720p/2000000/1000.cmfv".to_string())
    }

    #[test]
    fn test_definition_stream_type_splitable() {
        assert!(StreamType::Text.is_splitable_kind());
        assert!(!StreamType::Video.is_splitable_kind());
    }
}
