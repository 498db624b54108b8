//! Adaptation-Set Grouper (SPEC_FULL.md §4.3): decides which Representations
//! share an Adaptation Set and whether the set qualifies for bitstream
//! switching.

use crate::config::DasherConfig;
use crate::definition::BitstreamSwitchingMode;
use crate::stream::Stream;

fn role_or_main(role: &Option<String>) -> &str {
    role.as_deref().unwrap_or("main")
}

fn pixel_aspect(stream: &Stream) -> Option<(u64, u64)> {
    let (w, h) = (stream.props.width?, stream.props.height?);
    let (sar_w, sar_h) = stream.props.sar.unwrap_or((1, 1));
    Some((w as u64 * sar_w as u64, h as u64 * sar_h as u64))
}

/// `same_adaptation_set(a, b)` from §4.3. Muxed streams always attach to
/// their base's Adaptation Set and never reach this comparison directly.
pub fn same_adaptation_set(a: &Stream, b: &Stream, config: &DasherConfig, no_sar: bool) -> bool {
    if a.props.stream_type != b.props.stream_type {
        return false;
    }
    if role_or_main(&a.props.role) != role_or_main(&b.props.role) {
        return false;
    }
    if a.props.extensions.get("as_desc") != b.props.extensions.get("as_desc") {
        return false;
    }
    if config.align && a.props.dash_dur != b.props.dash_dur {
        return false;
    }
    if a.props.extensions.get("srd") != b.props.extensions.get("srd")
        || a.props.extensions.get("view_id") != b.props.extensions.get("view_id")
    {
        return false;
    }
    if a.props.language != b.props.language {
        return false;
    }
    if a.props.channels != b.props.channels {
        return false;
    }

    if a.props.stream_type == crate::definition::StreamType::Video {
        if !no_sar && pixel_aspect(a) != pixel_aspect(b) {
            return false;
        }
    } else if !config.mix_codecs && a.props.codec_id != b.props.codec_id {
        return false;
    }

    if let Some(dep) = &a.props.dep_id {
        let complementary = b
            .props
            .extensions
            .get("complementary_reps")
            .map(|list| list.split(',').any(|id| id == dep))
            .unwrap_or(false);
        if !complementary {
            return false;
        }
    }

    true
}

/// Bitstream-switching eligibility check (§4.3). `reference` is the base
/// Representation's stream; `members` are the rest of the Adaptation Set.
pub fn bitstream_switching_eligible<'a>(
    mode: BitstreamSwitchingMode,
    reference: &Stream,
    members: impl IntoIterator<Item = &'a Stream>,
) -> bool {
    if mode == BitstreamSwitchingMode::Off {
        return false;
    }
    let inband_modes = matches!(
        mode,
        BitstreamSwitchingMode::Inband | BitstreamSwitchingMode::Multi
    );
    members.into_iter().all(|member| {
        let same_codec_and_config =
            member.props.codec_id == reference.props.codec_id && member.fingerprint == reference.fingerprint;
        same_codec_and_config || (inband_modes && member.codec_supports_inband_params())
    })
}

/// Representations whose timescale differs from the reference need their
/// packet timestamps rescaled once bitstream switching is enabled (§4.3).
pub fn force_timescale_for<'a>(
    reference_timescale: u32,
    members: impl IntoIterator<Item = &'a Stream>,
) -> Vec<(usize, u32)> {
    members
        .into_iter()
        .enumerate()
        .filter(|(_, member)| member.props.timescale != reference_timescale)
        .map(|(index, _)| (index, reference_timescale))
        .collect()
}
