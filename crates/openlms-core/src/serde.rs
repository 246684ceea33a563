//! Custom serde helpers for query-string parameters.

use serde::{Deserialize, Deserializer};

/// Treats an empty string the same as a missing value.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` (any case) as well as JSON booleans.
pub fn deserialize_flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(false),
        Some(BoolOrString::Bool(b)) => Ok(b),
        Some(BoolOrString::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean value: {}",
                other
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        backend: Option<String>,
        #[serde(default, deserialize_with = "deserialize_flexible_bool")]
        is_proctored: bool,
    }

    #[test]
    fn test_empty_string_is_none() {
        let params: Params = serde_json::from_str(r#"{"backend": ""}"#).unwrap();
        assert!(params.backend.is_none());
        assert!(!params.is_proctored);
    }

    #[test]
    fn test_string_booleans() {
        let params: Params =
            serde_json::from_str(r#"{"backend": "mock", "is_proctored": "True"}"#).unwrap();
        assert_eq!(params.backend.as_deref(), Some("mock"));
        assert!(params.is_proctored);

        let params: Params = serde_json::from_str(r#"{"is_proctored": "0"}"#).unwrap();
        assert!(!params.is_proctored);
    }

    #[test]
    fn test_json_boolean() {
        let params: Params = serde_json::from_str(r#"{"is_proctored": true}"#).unwrap();
        assert!(params.is_proctored);
    }

    #[test]
    fn test_garbage_boolean_rejected() {
        assert!(serde_json::from_str::<Params>(r#"{"is_proctored": "maybe"}"#).is_err());
    }
}
