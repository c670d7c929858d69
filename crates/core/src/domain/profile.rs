use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Self-reported spinal curvature pattern.
///
/// Parsing never fails: values outside the known set are kept verbatim as
/// [`PosturalProfile::Unrecognized`] and simply match no postural rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PosturalProfile {
    Balanced,
    AccentuatedLordosis,
    AccentuatedKyphosis,
    MildAsymmetry,
    Unrecognized(String),
}

impl PosturalProfile {
    pub const KNOWN: [PosturalProfile; 4] = [
        PosturalProfile::Balanced,
        PosturalProfile::AccentuatedLordosis,
        PosturalProfile::AccentuatedKyphosis,
        PosturalProfile::MildAsymmetry,
    ];

    /// Accepts the canonical kebab-case names and the legacy questionnaire values.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "balanced" | "equilibrado" => Self::Balanced,
            "accentuated-lordosis" | "lordose-acentuada" => Self::AccentuatedLordosis,
            "accentuated-kyphosis" | "cifose-acentuada" => Self::AccentuatedKyphosis,
            "mild-asymmetry" | "assimetria-leve" => Self::MildAsymmetry,
            _ => Self::Unrecognized(raw.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Balanced => "balanced",
            Self::AccentuatedLordosis => "accentuated-lordosis",
            Self::AccentuatedKyphosis => "accentuated-kyphosis",
            Self::MildAsymmetry => "mild-asymmetry",
            Self::Unrecognized(raw) => raw.as_str(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Balanced => "Balanced",
            Self::AccentuatedLordosis => "Accentuated lordosis",
            Self::AccentuatedKyphosis => "Accentuated kyphosis",
            Self::MildAsymmetry => "Mild asymmetry",
            Self::Unrecognized(raw) => raw.as_str(),
        }
    }
}

/// An absent answer; matches no postural rule and fails lead validation.
impl Default for PosturalProfile {
    fn default() -> Self {
        Self::Unrecognized(String::new())
    }
}

impl From<String> for PosturalProfile {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for PosturalProfile {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<PosturalProfile> for String {
    fn from(value: PosturalProfile) -> Self {
        match value {
            PosturalProfile::Unrecognized(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for PosturalProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine input. Height and weight are `None` when missing or non-numeric,
/// which makes every threshold comparison on them evaluate false.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, alias = "altura", deserialize_with = "deserialize_measurement")]
    pub height_cm: Option<i32>,
    #[serde(default, alias = "peso", deserialize_with = "deserialize_measurement")]
    pub weight_kg: Option<i32>,
    #[serde(default, alias = "perfilPostural")]
    pub postural_profile: PosturalProfile,
}

impl UserProfile {
    pub fn new(height_cm: i32, weight_kg: i32, postural_profile: PosturalProfile) -> Self {
        Self { height_cm: Some(height_cm), weight_kg: Some(weight_kg), postural_profile }
    }

    /// Builds a profile from raw form strings.
    pub fn from_raw(height: &str, weight: &str, postural_profile: &str) -> Self {
        Self {
            height_cm: parse_leading_int(height),
            weight_kg: parse_leading_int(weight),
            postural_profile: PosturalProfile::parse(postural_profile),
        }
    }

    pub fn height_at_least(&self, threshold: i32) -> bool {
        self.height_cm.is_some_and(|height| height >= threshold)
    }

    pub fn weight_at_least(&self, threshold: i32) -> bool {
        self.weight_kg.is_some_and(|weight| weight >= threshold)
    }
}

/// Integer-prefix parsing: skips leading whitespace, takes an optional sign
/// and the run of ASCII digits that follows. `"185cm"` yields 185, `"cm"` yields
/// `None`. Values past the `i32` range saturate.
pub fn parse_leading_int(raw: &str) -> Option<i32> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest.bytes().position(|byte| !byte.is_ascii_digit()).unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.bytes().fold(0_i64, |acc, byte| {
        acc.saturating_mul(10).saturating_add(i64::from(byte - b'0'))
    });
    let value = if negative { -magnitude } else { magnitude };
    Some(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

fn deserialize_measurement<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMeasurement {
        Integer(i64),
        Float(f64),
        Text(String),
        Other(IgnoredAny),
    }

    let raw = Option::<RawMeasurement>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(RawMeasurement::Integer(value)) => {
            Some(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
        }
        Some(RawMeasurement::Float(value)) if value.is_finite() => Some(value.trunc() as i32),
        Some(RawMeasurement::Float(_)) => None,
        Some(RawMeasurement::Text(text)) => parse_leading_int(&text),
        Some(RawMeasurement::Other(_)) => None,
    })
}
