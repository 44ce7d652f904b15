//! Serialization helpers shared by the resource modules.

use netedge_core::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

/// Accept either `"10"` or `10` and keep the textual form.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

/// Parse a textual number, reporting the field on failure.
pub(crate) fn parse_number<T>(field: &str, value: Option<&str>) -> netedge_core::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|err| {
                Error::DecodeError(format!("field `{field}` value `{raw}` is not a number: {err}"))
            })
        })
        .transpose()
}

/// Placeholder for secrets in change diagnostics.
pub(crate) const REDACTED: &str = "********";

/// Render a change value for diagnostics.
pub(crate) fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "string_or_number")]
        value: Option<String>,
    }

    #[test]
    fn test_accepts_strings_and_numbers() {
        let h: Holder = serde_json::from_str(r#"{"value":"500"}"#).unwrap();
        assert_eq!(h.value.as_deref(), Some("500"));

        let h: Holder = serde_json::from_str(r#"{"value":500}"#).unwrap();
        assert_eq!(h.value.as_deref(), Some("500"));

        let h: Holder = serde_json::from_str("{}").unwrap();
        assert!(h.value.is_none());

        let h: Holder = serde_json::from_str(r#"{"value":null}"#).unwrap();
        assert!(h.value.is_none());
    }

    #[test]
    fn test_parse_failure_is_decode_error() {
        assert_eq!(parse_number::<i64>("throughput", Some("500")).unwrap(), Some(500));
        assert_eq!(parse_number::<i64>("throughput", None).unwrap(), None);

        let err = parse_number::<i64>("throughput", Some("fast")).unwrap_err();
        assert!(matches!(err, Error::DecodeError(ref msg) if msg.contains("throughput")));
    }
}
