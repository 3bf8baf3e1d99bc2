//
//  lighthouse-cli
//  api/common/envelope.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/19.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! JSON envelopes used by every Lighthouse endpoint.
//!
//! Lighthouse wraps each object in a single-key object named after the
//! resource:
//!
//! ```json
//! {"ticket": {"number": 1, "title": "..."}}
//! {"tickets": [{"ticket": {"number": 1}}, {"ticket": {"number": 2}}]}
//! ```

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ApiError;

/// Wraps `value` as `{"<key>": value}`.
pub fn wrap<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Value, ApiError> {
    let mut envelope = Map::new();
    envelope.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(Value::Object(envelope))
}

/// Decodes `{"<key>": {...}}` into the inner object.
pub fn unwrap_one<T: DeserializeOwned>(key: &str, body: &[u8]) -> Result<T, ApiError> {
    let mut envelope: Map<String, Value> = serde_json::from_slice(body)?;
    let inner = envelope.remove(key).ok_or_else(|| missing(key))?;
    Ok(serde_json::from_value(inner)?)
}

/// Decodes `{"<plural>": [{"<key>": {...}}, ...]}` into the inner objects.
///
/// A missing or `null` list decodes as empty.
pub fn unwrap_list<T: DeserializeOwned>(
    plural: &str,
    key: &str,
    body: &[u8],
) -> Result<Vec<T>, ApiError> {
    let mut envelope: Map<String, Value> = serde_json::from_slice(body)?;
    let items = match envelope.remove(plural) {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Ok(Vec::new()),
        Some(_) => {
            return Err(ApiError::Decode(serde_json::Error::custom(format!(
                "expected `{plural}` to be an array"
            ))))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(mut wrapper) => {
                let inner = wrapper.remove(key).ok_or_else(|| missing(key))?;
                Ok(serde_json::from_value(inner)?)
            }
            _ => Err(missing(key)),
        })
        .collect()
}

/// `deserialize_with` helper that reads `null` as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn missing(key: &str) -> ApiError {
    ApiError::Decode(serde_json::Error::custom(format!("missing `{key}` envelope")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Bin {
        id: u64,
        name: String,
    }

    #[test]
    fn test_wrap_uses_key() {
        let bin = Bin { id: 1, name: "Mine".into() };
        assert_eq!(
            wrap("ticket_bin", &bin).unwrap(),
            json!({"ticket_bin": {"id": 1, "name": "Mine"}})
        );
    }

    #[test]
    fn test_unwrap_one() {
        let bin: Bin = unwrap_one("ticket_bin", br#"{"ticket_bin":{"id":3,"name":"Open"}}"#).unwrap();
        assert_eq!(bin, Bin { id: 3, name: "Open".into() });
    }

    #[test]
    fn test_unwrap_one_missing_key() {
        let err = unwrap_one::<Bin>("ticket_bin", br#"{"bin":{"id":3,"name":"x"}}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.to_string().contains("ticket_bin"));
    }

    #[test]
    fn test_unwrap_list() {
        let body = br#"{"ticket_bins":[{"ticket_bin":{"id":1,"name":"a"}},{"ticket_bin":{"id":2,"name":"b"}}]}"#;
        let bins: Vec<Bin> = unwrap_list("ticket_bins", "ticket_bin", body).unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[1].name, "b");
    }

    #[test]
    fn test_unwrap_list_missing_is_empty() {
        let bins: Vec<Bin> = unwrap_list("ticket_bins", "ticket_bin", b"{}").unwrap();
        assert!(bins.is_empty());
        let bins: Vec<Bin> = unwrap_list("ticket_bins", "ticket_bin", br#"{"ticket_bins":null}"#).unwrap();
        assert!(bins.is_empty());
    }

    #[test]
    fn test_unwrap_list_rejects_non_array() {
        let err = unwrap_list::<Bin>("ticket_bins", "ticket_bin", br#"{"ticket_bins":1}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
