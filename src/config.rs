//! Engine-wide configuration, layered the way the sibling segmenter in this
//! family does it: a `DasherConfig` that deserializes from TOML and is then
//! overridable by CLI flags (see `demos/run_segmenter.rs`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::definition::BitstreamSwitchingMode;
use crate::error::DasherError;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DasherConfig {
    /// Target duration of a segment, in seconds. ISO/IEC 23009-1 leaves the
    /// unit to the caller; the engine works in stream timescale ticks
    /// internally and only uses this to derive `dash_dur` per stream.
    pub segment_duration_secs: f64,
    /// Cross-representation alignment requirement (§3.2 invariant, §4.5).
    pub align: bool,
    /// Require SAP-aligned segment boundaries (§4.5 step 8).
    pub sap: bool,
    /// Non-compliant: advance `seg_number` across skipped empty segments (§3.2).
    pub skip_seg: bool,
    /// Allow differing audio codecs within one Adaptation Set (§4.3).
    pub mix_codecs: bool,
    pub bs_switch: BitstreamSwitchingMode,
    /// Stamp `SenderNTP` on the first packet of a new segment (§6).
    pub ntp: bool,
    /// Budget, in seconds of media time, after which streams mark
    /// `subdur-exceeded` and the engine stops producing further segments (§5).
    pub subdur: Option<f64>,
    /// Truncate laggard representations to a finished sibling's boundary (§4.5).
    pub check_dur: bool,
    pub start_number: u32,
    /// Path to the persisted dasher-context used to resume a dynamic
    /// presentation across restarts (§4.8).
    pub state_file: Option<String>,
    pub minimum_update_period_secs: f64,
    pub time_shift_buffer_depth_secs: Option<f64>,
    pub min_buffer_time_secs: f64,
}

impl Default for DasherConfig {
    fn default() -> Self {
        Self {
            segment_duration_secs: 2.0,
            align: true,
            sap: true,
            skip_seg: false,
            mix_codecs: false,
            bs_switch: BitstreamSwitchingMode::Inband,
            ntp: false,
            subdur: None,
            check_dur: true,
            start_number: 1,
            state_file: None,
            minimum_update_period_secs: 2.0,
            time_shift_buffer_depth_secs: None,
            min_buffer_time_secs: 2.0,
        }
    }
}

impl DasherConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(DasherError::from)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_is_live_dash_friendly() {
        let config = DasherConfig::default();
        assert!(config.align);
        assert!(config.sap);
        assert!(!config.skip_seg);
    }

    #[test]
    fn test_config_from_toml_overrides_defaults() {
        let toml = r#"
            segment_duration_secs = 4.0
            align = false
            skip_seg = true
        "#;
        let config = DasherConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.segment_duration_secs, 4.0);
        assert!(!config.align);
        assert!(config.skip_seg);
        assert!(config.sap, "fields absent from the TOML keep their default");
    }
}
