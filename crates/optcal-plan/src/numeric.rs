//! Dynamically-typed fields of structured plan responses.
//!
//! The same field can arrive as `12.5`, `"12.5"` or something else entirely
//! depending on server version. Decoding tries a native number first, then a
//! numeric string.

use serde::Deserialize;

/// Cost/telemetry figure. Never fails to decode; unusable values read as zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl NumericField {
    pub fn as_f64(&self) -> f64 {
        self.try_f64().unwrap_or(0.0)
    }

    pub fn try_f64(&self) -> Option<f64> {
        match self {
            NumericField::Number(n) if n.is_finite() => Some(*n),
            NumericField::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Row counts are whole and non-negative; fractions truncate.
    pub fn as_rows(&self) -> u64 {
        let v = self.as_f64();
        if v > 0.0 {
            v as u64
        } else {
            0
        }
    }
}

/// Operator identity. Unlike `NumericField` there is no fallback: a node
/// without a usable identity cannot be classified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdentityField {
    Text(String),
    Number(serde_json::Number),
}

impl IdentityField {
    /// `None` for blank identities.
    pub fn into_label(self) -> Option<String> {
        let s = match self {
            IdentityField::Text(s) => s.trim().to_string(),
            IdentityField::Number(n) => n.to_string(),
        };
        (!s.is_empty()).then_some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(json: &str) -> NumericField {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_number_then_string() {
        assert_eq!(field("12.5").as_f64(), 12.5);
        assert_eq!(field("\"12.5\"").as_f64(), 12.5);
        assert_eq!(field("\" 7 \"").as_rows(), 7);
    }

    #[test]
    fn test_unusable_values_read_as_zero() {
        assert_eq!(field("\"N/A\"").as_f64(), 0.0);
        assert_eq!(field("null").as_f64(), 0.0);
        assert_eq!(field("true").as_f64(), 0.0);
        assert_eq!(field("[1]").as_f64(), 0.0);
        assert_eq!(field("-3").as_rows(), 0);
    }

    #[test]
    fn test_identity_forms() {
        let id: IdentityField = serde_json::from_str("\"TableReader_7\"").unwrap();
        assert_eq!(id.into_label().as_deref(), Some("TableReader_7"));
        let id: IdentityField = serde_json::from_str("42").unwrap();
        assert_eq!(id.into_label().as_deref(), Some("42"));
        let id: IdentityField = serde_json::from_str("\"  \"").unwrap();
        assert_eq!(id.into_label(), None);
        assert!(serde_json::from_str::<IdentityField>("null").is_err());
    }
}
