use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::element::*;
use crate::error::DasherError;
use crate::types::*;

use super::adapt::AdaptationSet;

/// A contiguous time interval with a fixed set of Adaptation Sets (§3.1).
/// `href`/`actuate` carry a remote (xlink) period reference for `file`-typed
/// streams that never produce media themselves (§4.1, §8 scenario 4).
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Builder)]
#[builder(setter(into, strip_option), default, build_fn(error = "DasherError"))]
pub struct Period {
    #[serde(rename = "@xlink:href")]
    pub href: Option<String>,
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "@start")]
    pub start: Option<XsDuration>,
    #[serde(rename = "@duration")]
    pub duration: Option<XsDuration>,
    #[serde(rename = "@bitstreamSwitching")]
    pub bitstream_switching: Option<bool>,
    #[serde(rename = "BaseURL")]
    pub base_url: Option<Vec<BaseURL>>,
    #[serde(rename = "EventStream")]
    pub event_stream: Option<Vec<EventStream>>,
    #[serde(rename = "ContentProtection")]
    pub content_protection: Option<Vec<ContentProtection>>,
    #[serde(rename = "AdaptationSet")]
    pub adaptation_set: Option<Vec<AdaptationSet>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_period_default_builds() {
        assert!(PeriodBuilder::default()
            .id("p0")
            .start(XsDuration::from("PT0S"))
            .build()
            .is_ok());
    }
}
