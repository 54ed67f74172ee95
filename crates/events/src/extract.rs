//! Field extraction helpers with documented fallbacks.
//!
//! Every helper here answers "what value do we use when the payload field is
//! missing or unusable". The fallbacks are the contract:
//!
//! | Field | Fallback |
//! |-------|----------|
//! | any optional payload field of the wrong JSON type | absent |
//! | start / created time that does not parse | absent |
//! | duration | absent; otherwise rounded to whole units |
//! | repository homepage that does not parse as a URL | `""` |

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

use crate::Timestamp;

// ---------------------------------------------------------------------------
// Lenient serde adapters
// ---------------------------------------------------------------------------

/// Deserialises an optional field, treating a value of the wrong shape as absent.
///
/// Used with `#[serde(default, deserialize_with = "lenient")]` so one odd
/// field never rejects the whole payload.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Deserialises an integer identifier that may arrive as a JSON number or as
/// a string of digits.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(integer_value))
}

/// Reads a JSON value as a non-negative integer.
///
/// Accepts numbers and strings of digits; anything else is `None`.
pub fn integer_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Parses a platform timestamp.
///
/// The platform sends `"YYYY-MM-DD HH:MM:SS <zone>"` where the zone is either
/// a name (`UTC`, `GMT`) or a numeric offset (`+0000`). RFC 3339 is accepted as
/// well. Returns `None` when nothing matches.
pub fn parse_platform_time(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z") {
        return Some(Timestamp::from_utc(dt.with_timezone(&Utc)));
    }

    if let Some((local, zone)) = raw.rsplit_once(' ') {
        if matches!(zone, "UTC" | "GMT" | "Z") {
            if let Ok(naive) = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S") {
                return Some(Timestamp::from_utc(naive.and_utc()));
            }
        }
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| Timestamp::from_utc(dt.with_timezone(&Utc)))
}

// ---------------------------------------------------------------------------
// Duration
// ---------------------------------------------------------------------------

/// Rounds a reported duration to a whole number of units (half away from zero).
///
/// Non-finite values are treated as absent.
pub fn round_duration(raw: f64) -> Option<i64> {
    if raw.is_finite() {
        Some(raw.round() as i64)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// URLs
// ---------------------------------------------------------------------------

/// Returns the path component of an absolute URL, or `None` if `raw` is not
/// an absolute URL with a hierarchical path.
///
/// Query string and fragment are not part of the path.
pub fn url_path(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if url.cannot_be_a_base() {
        return None;
    }
    Some(url.path().to_string())
}

/// Derives `"namespace/project"` from a repository homepage URL.
///
/// Strips the leading slash of the URL path. Falls back to `""` when the URL
/// cannot be parsed.
pub fn project_path_from_homepage(homepage: &str) -> String {
    match url_path(homepage) {
        Some(path) => path.strip_prefix('/').unwrap_or(&path).to_string(),
        None => {
            tracing::debug!(homepage, "Could not parse repository homepage; using empty project path");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_zone() {
        let ts = parse_platform_time("2016-08-12 15:23:28 UTC").unwrap();
        assert_eq!(ts.as_epoch_millis(), 1_471_015_408_000);
    }

    #[test]
    fn parses_numeric_offset() {
        let ts = parse_platform_time("2016-08-12 17:23:28 +0200").unwrap();
        assert_eq!(ts.as_epoch_millis(), 1_471_015_408_000);
    }

    #[test]
    fn parses_rfc3339() {
        let ts = parse_platform_time("2016-08-12T15:23:28Z").unwrap();
        assert_eq!(ts.as_epoch_millis(), 1_471_015_408_000);
    }

    #[test]
    fn rejects_garbage_time() {
        assert!(parse_platform_time("yesterday").is_none());
        assert!(parse_platform_time("2016-08-12 15:23:28 Mars").is_none());
        assert!(parse_platform_time("").is_none());
    }

    #[test]
    fn rounds_duration_half_up() {
        assert_eq!(round_duration(120.0), Some(120));
        assert_eq!(round_duration(12.5), Some(13));
        assert_eq!(round_duration(12.49), Some(12));
        assert_eq!(round_duration(f64::NAN), None);
    }

    #[test]
    fn homepage_path_strips_leading_slash() {
        assert_eq!(project_path_from_homepage("https://x/ns/proj"), "ns/proj");
        assert_eq!(project_path_from_homepage("http://gitlab.example.com:8080/group/sub/proj?x=1"), "group/sub/proj");
    }

    #[test]
    fn homepage_without_path_or_scheme_is_empty() {
        assert_eq!(project_path_from_homepage("https://x"), "");
        assert_eq!(project_path_from_homepage("not a url"), "");
        assert_eq!(project_path_from_homepage("mailto:dev@example.com"), "");
        assert_eq!(project_path_from_homepage("/ns/proj"), "");
    }

    #[test]
    fn url_path_drops_query_and_fragment() {
        assert_eq!(url_path("https://x/ns/proj?tab=1#top").as_deref(), Some("/ns/proj"));
        assert_eq!(url_path("ftp://x").as_deref(), Some("/"));
        assert_eq!(url_path("data:text/plain,hi"), None);
    }

    #[test]
    fn integer_value_accepts_digits_in_strings() {
        assert_eq!(integer_value(&Value::from(42)), Some(42));
        assert_eq!(integer_value(&Value::from("42")), Some(42));
        assert_eq!(integer_value(&Value::from("2f3a9c")), None);
        assert_eq!(integer_value(&Value::Null), None);
    }
}
