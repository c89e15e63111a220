//! Extraction of record lists from catalog API responses.
//!
//! The catalog API is inconsistent about how it wraps lists: sometimes a bare
//! JSON array, sometimes a paginated object with a `results` array, sometimes
//! an object with a `data` array, and occasionally some other object that
//! happens to carry an array field. Every page that consumes the API goes
//! through [`normalize`] (usually via [`decode_records`]) instead of guessing
//! the shape itself.
//!
//! Recognized envelopes, checked in this order:
//!
//! | Variant | Shape |
//! |---------|-------|
//! | [`Envelope::Bare`] | `[...]` |
//! | [`Envelope::Paginated`] | `{"count": n, "next": ..., "results": [...]}` |
//! | [`Envelope::DataWrapped`] | `{"data": [...]}` |
//! | [`Envelope::FirstArrayField`] | `{"anything": [...]}` (first array field in document order) |
//! | [`Envelope::Unrecognized`] | anything else, including `null` and scalars |
//!
//! None of these functions fail: an unrecognized payload yields no records.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// The envelope shape of a catalog API response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope<'a> {
    /// The payload is the record array itself.
    Bare(&'a [Value]),
    /// Paginated list with the records under `results`.
    Paginated(&'a [Value]),
    /// Records wrapped under `data`.
    DataWrapped(&'a [Value]),
    /// Heuristic fallback: the first array-valued field of an unknown object.
    FirstArrayField {
        key: &'a str,
        records: &'a [Value],
    },
    /// No array anywhere the normalizer looks.
    Unrecognized,
}

impl<'a> Envelope<'a> {
    /// Classify a payload.
    #[must_use]
    pub fn detect(payload: &'a Value) -> Self {
        if let Value::Array(records) = payload {
            return Self::Bare(records);
        }

        let Value::Object(fields) = payload else {
            return Self::Unrecognized;
        };

        if let Some(Value::Array(records)) = fields.get("results") {
            return Self::Paginated(records);
        }

        if let Some(Value::Array(records)) = fields.get("data") {
            return Self::DataWrapped(records);
        }

        let mut array_fields = fields.iter().filter_map(|(key, value)| match value {
            Value::Array(records) => Some((key.as_str(), records.as_slice())),
            _ => None,
        });

        match array_fields.next() {
            Some((key, records)) => {
                let ignored: Vec<&str> = array_fields.map(|(other, _)| other).collect();
                if !ignored.is_empty() {
                    // First match wins; which field that is depends on the
                    // key order the API happened to emit.
                    warn!(
                        chosen = key,
                        ignored = ?ignored,
                        "Ambiguous envelope: multiple array fields"
                    );
                }
                Self::FirstArrayField { key, records }
            }
            None => Self::Unrecognized,
        }
    }

    /// The records this envelope carries (empty for [`Envelope::Unrecognized`]).
    #[must_use]
    pub const fn records(&self) -> &'a [Value] {
        match *self {
            Self::Bare(records)
            | Self::Paginated(records)
            | Self::DataWrapped(records)
            | Self::FirstArrayField { records, .. } => records,
            Self::Unrecognized => &[],
        }
    }

    /// Short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bare(_) => "bare",
            Self::Paginated(_) => "paginated",
            Self::DataWrapped(_) => "data",
            Self::FirstArrayField { .. } => "first_array_field",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Extract the list of records from any catalog API payload.
///
/// Always returns a list; see the module docs for the recognized shapes.
#[must_use]
pub fn normalize(payload: &Value) -> Vec<Value> {
    let envelope = Envelope::detect(payload);
    match envelope {
        Envelope::Unrecognized => {
            warn!(
                payload_type = json_type(payload),
                "Could not normalize API response"
            );
        }
        _ => {
            debug!(
                envelope = envelope.kind(),
                records = envelope.records().len(),
                "Normalized API response"
            );
        }
    }
    envelope.records().to_vec()
}

/// Map `f` over `data` if it is an array; otherwise return an empty list.
///
/// Rendering code uses this so a malformed value degrades to an empty view
/// instead of an error.
pub fn safe_map<T, F>(data: &Value, f: F) -> Vec<T>
where
    F: FnMut(&Value) -> T,
{
    match data {
        Value::Array(items) => items.iter().map(f).collect(),
        other => {
            warn!(
                data_type = json_type(other),
                "Attempted to map non-array data"
            );
            Vec::new()
        }
    }
}

/// Normalize a payload and decode each record, skipping records that do not
/// decode as `T`.
#[must_use]
pub fn decode_records<T: DeserializeOwned>(payload: &Value) -> Vec<T> {
    let records = Value::Array(normalize(payload));
    safe_map(&records, |record| {
        serde_json::from_value::<T>(record.clone())
            .map_err(|e| {
                warn!(error = %e, "Skipping record that failed to decode");
            })
            .ok()
    })
    .into_iter()
    .flatten()
    .collect()
}

/// Locate the single record in a detail-endpoint payload.
///
/// An object with an `id` field is the record itself; `{"data": {...}}` is
/// unwrapped one level; anything else goes through [`normalize`] and yields
/// its first record.
#[must_use]
pub fn unwrap_single(payload: &Value) -> Option<&Value> {
    if let Value::Object(fields) = payload {
        if fields.contains_key("id") {
            return Some(payload);
        }
        if let Some(inner) = fields.get("data").filter(|v| v.is_object()) {
            return unwrap_single(inner);
        }
    }
    Envelope::detect(payload).records().first()
}

/// Pagination metadata from a paginated envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageInfo {
    /// Total records across all pages, when the API reports it.
    pub count: Option<u64>,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Read `count`/`next`/`previous` from a paginated envelope.
///
/// Returns `None` for any other envelope shape.
#[must_use]
pub fn page_info(payload: &Value) -> Option<PageInfo> {
    if !matches!(Envelope::detect(payload), Envelope::Paginated(_)) {
        return None;
    }
    let link_present = |key: &str| {
        payload
            .get(key)
            .is_some_and(|v| v.as_str().is_some_and(|s| !s.is_empty()))
    };
    Some(PageInfo {
        count: payload.get("count").and_then(Value::as_u64),
        has_next: link_present("next"),
        has_previous: link_present("previous"),
    })
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
