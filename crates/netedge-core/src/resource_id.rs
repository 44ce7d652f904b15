//! Extraction of created resource identifiers.
//!
//! Some creation endpoints return the new identifier in a JSON body, others
//! only in the `Location` response header.

use crate::{Error, Result};
use serde::Deserialize;
use url::Url;

#[derive(Deserialize)]
struct CreatedBody {
    #[serde(default)]
    uuid: Option<String>,
}

/// Resolve the identifier of a created resource.
///
/// The body `uuid` field wins when present; otherwise the trailing path
/// segment of the single `Location` header value is used.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] when the body carries no identifier and
/// the `Location` header is missing, repeated, or has no trailing segment.
pub fn resource_id<S>(body: &[u8], locations: &[S]) -> Result<String>
where
    S: AsRef<str>,
{
    if let Some(uuid) = id_from_body(body) {
        return Ok(uuid);
    }
    let location = single_location(locations)?;
    id_from_location(location)
}

fn id_from_body(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<CreatedBody>(body)
        .ok()
        .and_then(|created| created.uuid)
        .filter(|uuid| !uuid.is_empty())
}

/// Pick the only `Location` header value.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] if there is not exactly one value.
pub fn single_location<S>(locations: &[S]) -> Result<&str>
where
    S: AsRef<str>,
{
    match locations {
        [one] => Ok(one.as_ref()),
        [] => Err(Error::InvalidResponse(
            "response has no Location header".to_string(),
        )),
        many => Err(Error::InvalidResponse(format!(
            "response has {} Location header values, expected one",
            many.len()
        ))),
    }
}

/// Trailing path segment of a `Location` value such as `/ne/v1/publicKeys/{id}`.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] unless the path has a parent segment and
/// a non-empty trailing segment.
pub fn id_from_location(location: &str) -> Result<String> {
    let path = match Url::parse(location) {
        Ok(url) => url.path().to_string(),
        Err(_) => location.to_string(),
    };
    let segments: Vec<&str> = path
        .strip_prefix('/')
        .map(|rest| rest.split('/').collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [parents @ .., last] if !parents.is_empty() && !last.is_empty() => {
            Ok((*last).to_string())
        }
        _ => Err(Error::InvalidResponse(format!(
            "cannot parse resource identifier from Location header `{location}`"
        ))),
    }
}
