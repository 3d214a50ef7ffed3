// ABOUTME: Lenient deserializers for query-string filters
// ABOUTME: Blank or unparsable values read as absent instead of rejecting the request

use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// `?x=` and `?x=garbage` both become `None`.
///
/// Use with `#[serde(default, deserialize_with = "lenient_option")]`.
pub fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok()))
}

/// Like [`lenient_option`], falling back to `T::default()`
pub fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    Ok(lenient_option(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Debug, Default, Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "lenient_option")]
        day: Option<NaiveDate>,
        #[serde(default, deserialize_with = "lenient_or_default")]
        count: u32,
    }

    fn parse(json: &str) -> Params {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_values_are_parsed() {
        let params = parse(r#"{"day": " 2025-01-06 ", "count": "3"}"#);
        assert_eq!(params.day, NaiveDate::from_ymd_opt(2025, 1, 6));
        assert_eq!(params.count, 3);
    }

    #[test]
    fn test_blank_and_invalid_values_are_ignored() {
        let params = parse(r#"{"day": "", "count": "many"}"#);
        assert_eq!(params.day, None);
        assert_eq!(params.count, 0);

        let params = parse(r#"{"day": "2025-13-40"}"#);
        assert_eq!(params.day, None);

        let params = parse("{}");
        assert_eq!(params.day, None);
    }
}
