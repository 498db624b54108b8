//! Template & Destination Resolver (SPEC_FULL.md §4.4): picks segment
//! templates/init-segment names per Representation or Adaptation Set, and
//! defines the `Muxer`/`TemplateExpander` trait seam the engine drives
//! downstream media production through.

use crate::error::DasherError;
use crate::Result;

/// Flags the Resolver rewrites into a downstream connection string when it
/// opens the base stream's muxer (§4.4).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MuxerOpenFlags {
    pub fragmented: bool,
    pub single_segment: bool,
    pub inband_params: InbandParams,
    pub noinit: bool,
    pub no_frags_def: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InbandParams {
    #[default]
    All,
    No,
}

/// One segment-size callback (§6 "Upstream event").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSizeEvent {
    pub is_init: bool,
    pub media_range: (u64, u64),
    pub idx_range: (u64, u64),
}

/// The downstream media producer, one instance per Representation (or
/// shared across muxed components of the same Representation).
pub trait Muxer {
    fn open(&mut self, connection: &str, flags: &MuxerOpenFlags) -> Result<()>;
    fn write_sample(&mut self, pid: usize, payload: &[u8], cts: u64) -> Result<()>;
    fn close_segment(&mut self) -> Result<SegmentSizeEvent>;
    fn attach_pid(&mut self, pid: usize);
}

/// Expands the template tokens listed in §6 against a Representation's
/// resolved values. Kept separate from the Resolver so a caller can swap
/// token-expansion without touching template *selection*.
pub trait TemplateExpander {
    fn expand(&self, template: &str, ctx: &TemplateContext) -> Result<String>;
}

#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub representation_id: String,
    pub bandwidth: u32,
    pub number: Option<u64>,
    pub time: Option<u64>,
    pub source_path: Option<String>,
}

/// Reference `TemplateExpander`: substitutes the token set honoured by §6,
/// including the `$Number%0Nd$` padded-width form.
#[derive(Debug, Default)]
pub struct DefaultTemplateExpander;

impl TemplateExpander for DefaultTemplateExpander {
    fn expand(&self, template: &str, ctx: &TemplateContext) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find('$') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('$') else {
                return Err(DasherError::BadParam(format!(
                    "unterminated template token in `{template}`"
                )));
            };
            let token = &after[..end];
            out.push_str(&expand_token(token, ctx)?);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn expand_token(token: &str, ctx: &TemplateContext) -> Result<String> {
    if token.is_empty() {
        return Ok("$".to_string());
    }
    let (name, format) = token.split_once('%').unwrap_or((token, ""));
    match name {
        "RepresentationID" => Ok(ctx.representation_id.clone()),
        "Bandwidth" => Ok(ctx.bandwidth.to_string()),
        "Number" => format_numeric(ctx.number, format, "Number"),
        "Time" => format_numeric(ctx.time, format, "Time"),
        "File" | "FSRC" | "SourcePath" | "FURL" | "URL" => ctx
            .source_path
            .clone()
            .ok_or_else(|| DasherError::BadParam(format!("`${name}$` needs a source path"))),
        other => Err(DasherError::NotSupported(format!("template token `${other}$`"))),
    }
}

fn format_numeric(value: Option<u64>, format: &str, name: &str) -> Result<String> {
    let value = value.ok_or_else(|| DasherError::BadParam(format!("`${name}$` has no value in this context")))?;
    if format.is_empty() {
        return Ok(value.to_string());
    }
    let width: usize = format
        .trim_start_matches('0')
        .trim_end_matches('d')
        .parse()
        .map_err(|_| DasherError::BadParam(format!("bad width spec `%{format}` in `${name}$`")))?;
    Ok(format!("{value:0width$}"))
}

/// One Representation's resolved destination (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentAddressing {
    Template { media: String, init: String },
    SingleFileIndexed { path: String },
    ExplicitList { init: String, urls: Vec<String> },
}

/// Chooses an AS-level template when one template string can serve every
/// Representation: same string, no per-source substitution tokens, and
/// either a single Representation or a token that already disambiguates by
/// Representation (`$Bandwidth$`/`$RepresentationID$`).
pub fn resolve_template_scope(templates: &[&str]) -> TemplateScope {
    let Some(first) = templates.first() else {
        return TemplateScope::PerRepresentation;
    };
    let all_same = templates.iter().all(|t| *t == *first);
    let per_source_tokens = ["$File$", "$FSRC$", "$URL$"];
    let has_per_source_token = per_source_tokens.iter().any(|tok| first.contains(tok));
    let disambiguates = first.contains("$Bandwidth$") || first.contains("$RepresentationID$");

    if all_same && !has_per_source_token && (templates.len() == 1 || disambiguates) {
        TemplateScope::AdaptationSet
    } else {
        TemplateScope::PerRepresentation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateScope {
    AdaptationSet,
    PerRepresentation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_expands_number_and_bandwidth() {
        let expander = DefaultTemplateExpander;
        let ctx = TemplateContext {
            representation_id: "v0".into(),
            bandwidth: 512_000,
            number: Some(7),
            ..Default::default()
        };
        let out = expander
            .expand("chunk-$RepresentationID$-$Bandwidth$-$Number%05d$.m4s", &ctx)
            .unwrap();
        assert_eq!(out, "chunk-v0-512000-00007.m4s");
    }

    #[test]
    fn test_resolver_rejects_unterminated_token() {
        let expander = DefaultTemplateExpander;
        let ctx = TemplateContext::default();
        assert!(expander.expand("chunk-$Number.m4s", &ctx).is_err());
    }

    #[test]
    fn test_resolver_template_scope_shared_with_bandwidth_token() {
        let scope = resolve_template_scope(&["chunk-$Bandwidth$-$Number$.m4s", "chunk-$Bandwidth$-$Number$.m4s"]);
        assert_eq!(scope, TemplateScope::AdaptationSet);
    }

    #[test]
    fn test_resolver_template_scope_per_representation_with_file_token() {
        let scope = resolve_template_scope(&["chunk-$File$-$Number$.m4s", "chunk-$File$-$Number$.m4s"]);
        assert_eq!(scope, TemplateScope::PerRepresentation);
    }

    #[test]
    fn test_resolver_template_scope_single_representation() {
        let scope = resolve_template_scope(&["chunk-$Number$.m4s"]);
        assert_eq!(scope, TemplateScope::AdaptationSet);
    }
}
