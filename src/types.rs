use core::str;
use std::{fmt, ops::Deref, result, str::FromStr};

use num::integer::gcd;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{error::DasherError, Result};

#[derive(Debug, Default, Clone, SerializeDisplay, DeserializeFromStr, PartialEq, Eq, Hash)]
pub struct StringNoWhitespace {
    value: String,
}

impl fmt::Display for StringNoWhitespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for StringNoWhitespace {
    type Err = DasherError;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        let re = Regex::new(r"^[^\r\n\t \p{Z}]*$").unwrap();
        if !re.is_match(s) {
            return Err(DasherError::UnmatchedPattern);
        }

        Ok(Self {
            value: s.to_string(),
        })
    }
}

impl From<&str> for StringNoWhitespace {
    fn from(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, SerializeDisplay, DeserializeFromStr, PartialEq, Eq, Hash)]
pub struct WhitespaceSeparatedList<T: fmt::Display + FromStr> {
    value: Vec<T>,
}

impl<T: fmt::Display + FromStr> fmt::Display for WhitespaceSeparatedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .value
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "{joined}")
    }
}

impl<T: fmt::Display + FromStr> FromStr for WhitespaceSeparatedList<T> {
    type Err = DasherError;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        let items = s
            .split_whitespace()
            .map(|item| T::from_str(item).map_err(|_| DasherError::UnmatchedPattern))
            .collect::<Result<Vec<T>>>()?;
        Ok(Self { value: items })
    }
}

impl<T: fmt::Display + FromStr> From<Vec<T>> for WhitespaceSeparatedList<T> {
    fn from(value: Vec<T>) -> Self {
        Self { value }
    }
}

pub type StringVector = WhitespaceSeparatedList<String>;

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AspectRatio {
    horizontal: u64,
    vertical: u64,
}

impl From<(u64, u64)> for AspectRatio {
    fn from(value: (u64, u64)) -> Self {
        let (numer, denom) = value;
        let divisor = gcd(numer, denom);

        Self {
            horizontal: numer / divisor,
            vertical: denom / divisor,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.horizontal, self.vertical)
    }
}

impl FromStr for AspectRatio {
    type Err = DasherError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();

        if parts.len() != 2 {
            return Err(DasherError::InvalidData("Aspect ratio format `_:_`"));
        }

        let horizontal = parts[0].parse::<u64>()?;
        let vertical = parts[1].parse::<u64>()?;

        Ok(Self {
            horizontal,
            vertical,
        })
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FrameRate {
    frame: u64,
    denom: Option<u64>,
}

impl FrameRate {
    pub fn as_f64(&self) -> f64 {
        self.frame as f64 / self.denom.unwrap_or(1) as f64
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.frame, self.denom.unwrap_or(1))
    }
}

impl FromStr for FrameRate {
    type Err = DasherError;

    fn from_str(s: &str) -> Result<Self> {
        let re = Regex::new(r"^[0-9]+(/[1-9][0-9]*)?$").unwrap();
        if !re.is_match(s) {
            return Err(DasherError::UnmatchedPattern);
        }

        let parts: Vec<&str> = s.split('/').collect();
        let frame = parts[0].parse::<u64>()?;
        let denom = if let Some(s) = parts.get(1) {
            Some(s.parse::<u64>()?)
        } else {
            None
        };

        Ok(Self { frame, denom })
    }
}

/// Top-level media type of an Adaptation Set, mirrors RFC 6838.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RFC6838ContentType {
    Text,
    Image,
    Audio,
    #[default]
    Video,
    Application,
    Font,
}

/// Stream Access Point type, ISO/IEC 23009-1 table 5.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StreamAccessPoint {
    #[default]
    /// Closed GoP random access point: Tept = Tdec = Tsap = Tptf
    Type1 = 1,
    /// Closed GoP random access point: Tept = Tdec = Tsap < Tptf
    Type2 = 2,
    /// Open GoP random access point: Tept < Tdec = Tsap <= Tptf
    Type3 = 3,
    /// Gradual Decoding Refresh (GDR): Tept <= Tptf < Tdec = Tsap
    Type4 = 4,
    /// Tept = Tdec < Tsap
    Type5 = 5,
    /// Tept < Tdec < Tsap
    Type6 = 6,
}

impl StreamAccessPoint {
    pub fn is_sap(self) -> bool {
        true
    }
}

impl TryFrom<u8> for StreamAccessPoint {
    type Error = DasherError;

    fn try_from(value: u8) -> result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Type1),
            2 => Ok(Self::Type2),
            3 => Ok(Self::Type3),
            4 => Ok(Self::Type4),
            5 => Ok(Self::Type5),
            6 => Ok(Self::Type6),
            _ => Err(DasherError::InvalidData("SAP values must be 1 to 6")),
        }
    }
}

impl fmt::Display for StreamAccessPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

impl FromStr for StreamAccessPoint {
    type Err = DasherError;

    fn from_str(s: &str) -> Result<Self> {
        StreamAccessPoint::try_from(s.parse::<u8>()?)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct XsDuration(iso8601::Duration);

impl Deref for XsDuration {
    type Target = iso8601::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&[u8]> for XsDuration {
    fn from(value: &[u8]) -> Self {
        Self(
            iso8601::parsers::parse_duration(value)
                .map(|(_, duration)| duration)
                .unwrap_or_default(),
        )
    }
}

impl From<String> for XsDuration {
    fn from(value: String) -> Self {
        Self::from(value.as_bytes())
    }
}

impl From<&str> for XsDuration {
    fn from(value: &str) -> Self {
        Self::from(value.as_bytes())
    }
}

impl From<std::time::Duration> for XsDuration {
    fn from(value: std::time::Duration) -> Self {
        Self::from(iso8601_duration_string(value))
    }
}

fn iso8601_duration_string(value: std::time::Duration) -> String {
    let total_millis = value.as_millis();
    let secs = total_millis as f64 / 1000.0;
    format!("PT{secs}S")
}

impl Serialize for XsDuration {
    fn serialize<S>(&self, serializer: S) -> result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for XsDuration {
    fn deserialize<D>(deserializer: D) -> result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let duration = s
            .parse::<iso8601::Duration>()
            .map_err(serde::de::Error::custom)?;
        Ok(XsDuration(duration))
    }
}

#[derive(Debug, Default, Clone, SerializeDisplay, DeserializeFromStr, PartialEq, Eq, Hash)]
pub struct SingleRFC7233Range {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl From<(Option<u64>, Option<u64>)> for SingleRFC7233Range {
    fn from(value: (Option<u64>, Option<u64>)) -> Self {
        Self {
            start: value.0,
            end: value.1,
        }
    }
}

impl fmt::Display for SingleRFC7233Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start_str = self.start.map_or("".to_string(), |s| s.to_string());
        let end_str = self.end.map_or("".to_string(), |e| e.to_string());
        let s = if self.end.is_some() || !start_str.is_empty() {
            format!("{}-{}", start_str, end_str)
        } else {
            "".to_string()
        };

        write!(f, "{s}")
    }
}

impl FromStr for SingleRFC7233Range {
    type Err = DasherError;

    fn from_str(s: &str) -> Result<Self> {
        let re = Regex::new(r"^([0-9]*)(-([0-9]*))?$").unwrap();

        if let Some(caps) = re.captures(s) {
            let start = caps.get(1).and_then(|m| {
                if m.as_str().is_empty() {
                    None
                } else {
                    m.as_str().parse::<u64>().ok()
                }
            });
            let end = caps.get(3).and_then(|m| {
                if m.as_str().is_empty() {
                    None
                } else {
                    m.as_str().parse::<u64>().ok()
                }
            });
            Ok(SingleRFC7233Range { start, end })
        } else {
            Err(DasherError::UnmatchedPattern)
        }
    }
}

type AnyUri = String;

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Url {
    #[serde(rename = "@sourceURL", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<AnyUri>,
    #[serde(rename = "@range", skip_serializing_if = "Option::is_none")]
    pub range: Option<SingleRFC7233Range>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename = "SegmentURL")]
pub struct SegmentUrl {
    #[serde(rename = "@media", skip_serializing_if = "Option::is_none")]
    pub media: Option<AnyUri>,
    #[serde(rename = "@mediaRange", skip_serializing_if = "Option::is_none")]
    pub media_range: Option<SingleRFC7233Range>,
    #[serde(rename = "@index", skip_serializing_if = "Option::is_none")]
    pub index: Option<AnyUri>,
    #[serde(rename = "@indexRange", skip_serializing_if = "Option::is_none")]
    pub index_range: Option<SingleRFC7233Range>,
}
