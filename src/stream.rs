//! Stream Descriptor Registry (SPEC_FULL.md §4.1): per-input-stream identity,
//! codec/timescale/role properties, and the live counters the Segment
//! Scheduler advances on every packet.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::arena::{AsIdx, RepIdx};
use crate::definition::{BitstreamSwitchingMode, StreamType};
use crate::types::StreamAccessPoint;

/// Decoder-config fingerprint. A CRC-32-shaped hash computed the same way the
/// teacher's value types derive `Hash` over their inner bytes: the Registry
/// never interprets decoder-config bytes, only fingerprints them, since
/// extracting RFC 6381 codec parameters from them is out of scope (§1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ConfigFingerprint(u64);

impl ConfigFingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// Input per-stream properties, as handed down by upstream configuration (§6).
#[derive(Debug, Clone, PartialEq)]
pub struct StreamProps {
    pub stream_type: StreamType,
    pub codec_id: String,
    pub timescale: u32,
    pub bitrate: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sar: Option<(u32, u32)>,
    pub fps: Option<(u32, u32)>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
    pub id: Option<String>,
    pub dep_id: Option<String>,
    pub decoder_config: Vec<u8>,
    pub source_url: Option<String>,
    pub template: Option<String>,
    pub language: Option<String>,
    pub interlaced: bool,
    pub role: Option<String>,
    pub period_id: Option<String>,
    pub period_start: Option<f64>,
    pub period_duration: Option<f64>,
    pub xlink: Option<String>,
    pub dash_dur: Option<f64>,
    pub muxed_base: Option<usize>,
    /// Free-form descriptors the Grouper/Emitter consult by key (`srd`,
    /// `view_id`, `as_desc`, `as_any_desc`, `rep_desc`, `period_desc`) —
    /// the "small extension map" of SPEC_FULL.md §9, in place of an
    /// open-ended per-pid property dictionary.
    pub extensions: BTreeMap<String, String>,
}

impl Default for StreamProps {
    fn default() -> Self {
        Self {
            stream_type: StreamType::Video,
            codec_id: String::new(),
            timescale: 1,
            bitrate: 0,
            width: None,
            height: None,
            sar: None,
            fps: None,
            sample_rate: None,
            channels: None,
            id: None,
            dep_id: None,
            decoder_config: Vec::new(),
            source_url: None,
            template: None,
            language: None,
            interlaced: false,
            role: None,
            period_id: None,
            period_start: None,
            period_duration: None,
            xlink: None,
            dash_dur: None,
            muxed_base: None,
            extensions: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Done {
    Running,
    Eos,
    SubdurExceeded,
}

/// Result of `Registry::configure` (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureOutcome {
    Ok,
    Unsupported,
    PeriodSwitch,
}

/// One input media track, with the runtime counters the scheduler drives.
#[derive(Debug, Clone)]
pub struct Stream {
    pub props: StreamProps,
    pub fingerprint: ConfigFingerprint,
    pub owning_rep: Option<RepIdx>,
    pub owning_as: Option<AsIdx>,
    pub splitable: bool,

    pub rep_init: bool,
    pub first_cts: u64,
    pub last_cts: u64,
    pub nb_pck: u64,
    pub cumulated_dur: u64,
    pub seg_number: u32,
    pub next_seg_start: u64,
    pub adjusted_next_seg_start: u64,
    pub first_cts_in_seg: u64,
    pub first_cts_in_next_seg: u64,
    pub force_rep_end: Option<u64>,
    pub done: Done,
    /// Name of the init segment produced for this Representation, persisted
    /// and restored across restarts (§4.2/§4.8).
    pub init_seg: Option<String>,
    /// Set on restore so the caller reopens the muxer with a trash-init flag
    /// instead of re-emitting the init segment (§4.2 "Restore path",
    /// `resolver::MuxerOpenFlags::noinit`).
    pub noinit: bool,
    /// Duration of a splitable sample's second half, carried over from a
    /// `split_at_boundary` split so the caller can attribute it to the new
    /// segment (§4.5 step 5).
    pub pending_split_remainder: u64,
    /// SAP type that closed the current segment, consulted by
    /// `flush_segment` to auto-promote SAP-3/SAP-4 boundaries to profile
    /// *full* (§4.5 step 8).
    pub last_boundary_sap: Option<StreamAccessPoint>,
}

impl Stream {
    pub fn new(props: StreamProps) -> Self {
        let fingerprint = ConfigFingerprint::of(&props.decoder_config);
        let splitable = props.stream_type.is_splitable_kind();
        Self {
            props,
            fingerprint,
            owning_rep: None,
            owning_as: None,
            splitable,
            rep_init: false,
            first_cts: 0,
            last_cts: 0,
            nb_pck: 0,
            cumulated_dur: 0,
            seg_number: 0,
            next_seg_start: 0,
            adjusted_next_seg_start: 0,
            first_cts_in_seg: 0,
            first_cts_in_next_seg: 0,
            force_rep_end: None,
            done: Done::Running,
            init_seg: None,
            noinit: false,
            pending_split_remainder: 0,
            last_boundary_sap: None,
        }
    }

    /// Codecs that carry their parameter sets inband (AVC/SVC/MVC/HEVC/LHVC)
    /// can tolerate a decoder-config change without forcing a period switch,
    /// per the `dasher_same_adaptation_set` family of checks in the original
    /// filter (§4.1).
    pub fn codec_supports_inband_params(&self) -> bool {
        matches!(
            self.props.codec_id.as_str(),
            "avc" | "svc" | "mvc" | "hevc" | "lhvc"
        )
    }

    pub fn is_muxed_component(&self) -> bool {
        self.props.muxed_base.is_some()
    }
}

/// Owns the arena of input streams and decides, on every property update,
/// whether the stream needs to move to the next Period.
#[derive(Debug, Default)]
pub struct Registry {
    streams: Vec<Stream>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn streams_mut(&mut self) -> &mut [Stream] {
        &mut self.streams
    }

    pub fn get(&self, idx: crate::arena::StreamIdx) -> &Stream {
        &self.streams[idx.index()]
    }

    pub fn get_mut(&mut self, idx: crate::arena::StreamIdx) -> &mut Stream {
        &mut self.streams[idx.index()]
    }

    /// Register a brand-new stream, returning its arena index.
    pub fn insert(&mut self, props: StreamProps) -> crate::arena::StreamIdx {
        if props.stream_type == StreamType::File
            && props.xlink.is_none()
            && props.period_start.is_none()
            && props.period_duration.is_none()
        {
            debug!("file-typed stream without xlink/period hints will be ignored");
        }
        self.streams.push(Stream::new(props));
        crate::arena::StreamIdx::from(self.streams.len() - 1)
    }

    /// Re-configure an existing stream. Returns whether the change requires a
    /// period switch, per the field list in §4.1. `bs_switch` gates the
    /// inband-codec config-change exception: even AVC/HEVC-family codecs
    /// force a period switch on a decoder-config change once bitstream
    /// switching is off.
    pub fn configure(
        &mut self,
        idx: crate::arena::StreamIdx,
        new_props: StreamProps,
        bs_switch: BitstreamSwitchingMode,
    ) -> ConfigureOutcome {
        let new_fingerprint = ConfigFingerprint::of(&new_props.decoder_config);
        let stream = &mut self.streams[idx.index()];
        let old = &stream.props;

        if old.stream_type == StreamType::File
            && old.xlink.is_none()
            && old.period_start.is_none()
            && old.period_duration.is_none()
        {
            stream.done = Done::Eos;
            return ConfigureOutcome::Unsupported;
        }

        let structural_change = old.stream_type != new_props.stream_type
            || old.codec_id != new_props.codec_id
            || old.timescale != new_props.timescale
            || old.width != new_props.width
            || old.height != new_props.height
            || old.sar != new_props.sar
            || old.fps != new_props.fps
            || old.sample_rate != new_props.sample_rate
            || old.channels != new_props.channels
            || old.id != new_props.id
            || old.dep_id != new_props.dep_id
            || old.source_url != new_props.source_url
            || old.template != new_props.template
            || old.language != new_props.language
            || old.interlaced != new_props.interlaced
            || old.role != new_props.role
            || old.period_id != new_props.period_id
            || old.extensions != new_props.extensions;

        let inband_tolerated =
            bs_switch != BitstreamSwitchingMode::Off && stream.codec_supports_inband_params();
        let config_changed = stream.fingerprint != new_fingerprint
            && !new_props.decoder_config.is_empty()
            && !inband_tolerated;

        stream.props = new_props;
        stream.fingerprint = new_fingerprint;

        if structural_change || config_changed {
            debug!(stream = idx.0, "property change triggers period switch");
            ConfigureOutcome::PeriodSwitch
        } else {
            ConfigureOutcome::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_props() -> StreamProps {
        StreamProps {
            stream_type: StreamType::Video,
            codec_id: "avc".to_string(),
            timescale: 90_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_stream_registry_insert_assigns_indices() {
        let mut registry = Registry::new();
        let a = registry.insert(base_props());
        let b = registry.insert(base_props());
        assert_eq!(a.0, 0);
        assert_eq!(b.0, 1);
    }

    #[test]
    fn test_stream_registry_configure_no_change_is_ok() {
        let mut registry = Registry::new();
        let idx = registry.insert(base_props());
        assert_eq!(
            registry.configure(idx, base_props(), BitstreamSwitchingMode::Inband),
            ConfigureOutcome::Ok
        );
    }

    #[test]
    fn test_stream_registry_configure_timescale_change_triggers_switch() {
        let mut registry = Registry::new();
        let idx = registry.insert(base_props());
        let mut changed = base_props();
        changed.timescale = 48_000;
        assert_eq!(
            registry.configure(idx, changed, BitstreamSwitchingMode::Inband),
            ConfigureOutcome::PeriodSwitch
        );
    }

    #[test]
    fn test_stream_registry_configure_extensions_change_triggers_switch() {
        let mut registry = Registry::new();
        let idx = registry.insert(base_props());
        let mut changed = base_props();
        changed
            .extensions
            .insert("srd".to_string(), "0,0,0,1,1,1,1".to_string());
        assert_eq!(
            registry.configure(idx, changed, BitstreamSwitchingMode::Inband),
            ConfigureOutcome::PeriodSwitch
        );
    }

    #[test]
    fn test_stream_registry_inband_codec_tolerates_config_change() {
        let mut registry = Registry::new();
        let mut props = base_props();
        props.decoder_config = vec![1, 2, 3];
        let idx = registry.insert(props);

        let mut changed = base_props();
        changed.decoder_config = vec![9, 9, 9];
        assert_eq!(
            registry.configure(idx, changed, BitstreamSwitchingMode::Inband),
            ConfigureOutcome::Ok
        );
    }

    #[test]
    fn test_stream_registry_inband_codec_still_switches_when_bs_switch_off() {
        let mut registry = Registry::new();
        let mut props = base_props();
        props.decoder_config = vec![1, 2, 3];
        let idx = registry.insert(props);

        let mut changed = base_props();
        changed.decoder_config = vec![9, 9, 9];
        assert_eq!(
            registry.configure(idx, changed, BitstreamSwitchingMode::Off),
            ConfigureOutcome::PeriodSwitch
        );
    }

    #[test]
    fn test_stream_registry_non_inband_codec_config_change_triggers_switch() {
        let mut registry = Registry::new();
        let mut props = base_props();
        props.codec_id = "vp9".to_string();
        props.decoder_config = vec![1, 2, 3];
        let idx = registry.insert(props);

        let mut changed = base_props();
        changed.codec_id = "vp9".to_string();
        changed.decoder_config = vec![9, 9, 9];
        assert_eq!(
            registry.configure(idx, changed, BitstreamSwitchingMode::Inband),
            ConfigureOutcome::PeriodSwitch
        );
    }

    #[test]
    fn test_stream_registry_unsupported_file_stream() {
        let mut registry = Registry::new();
        let mut props = base_props();
        props.stream_type = StreamType::File;
        let idx = registry.insert(props);

        let outcome = registry.configure(
            idx,
            {
                let mut p = base_props();
                p.stream_type = StreamType::File;
                p
            },
            BitstreamSwitchingMode::Inband,
        );
        assert_eq!(outcome, ConfigureOutcome::Unsupported);
        assert_eq!(registry.get(idx).done, Done::Eos);
    }
}
