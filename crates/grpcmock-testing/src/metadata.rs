//! Request metadata helpers.
//!
//! Mocked handlers see request metadata as their first argument, a
//! `Value::Map` of lowercase header names to string values.

use std::collections::BTreeMap;

use grpcmock_core::{Arg, Matcher, Value};
use tonic::Request;
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue};

/// Matches metadata containing every configured entry; other entries are ignored.
#[derive(Debug, Clone, Default)]
pub struct MetadataMatcher {
    expected: BTreeMap<String, String>,
}

impl MetadataMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.expected.insert(key.to_ascii_lowercase(), value.into());
        self
    }
}

impl Matcher for MetadataMatcher {
    fn matches(&self, candidate: &Value) -> bool {
        let Some(entries) = candidate.as_map() else {
            return false;
        };
        self.expected
            .iter()
            .all(|(key, value)| entries.get(key).and_then(Value::as_str) == Some(value.as_str()))
    }

    fn describe(&self) -> String {
        let entries: Vec<String> = self
            .expected
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        format!("metadata containing {{{}}}", entries.join(", "))
    }
}

impl From<MetadataMatcher> for Arg {
    fn from(m: MetadataMatcher) -> Self {
        Arg::matching(m)
    }
}

pub fn metadata_with(key: &str, value: impl Into<String>) -> MetadataMatcher {
    MetadataMatcher::new().with(key, value)
}

/// Wrap `message` in a request carrying the given ASCII metadata.
///
/// Panics on keys or values that are not valid metadata.
pub fn request_with_metadata<M>(message: M, entries: &[(&str, &str)]) -> Request<M> {
    let mut request = Request::new(message);
    for (key, value) in entries {
        let key = AsciiMetadataKey::from_bytes(key.as_bytes())
            .unwrap_or_else(|e| panic!("invalid metadata key {key:?}: {e}"));
        let value: AsciiMetadataValue = value
            .parse()
            .unwrap_or_else(|e| panic!("invalid metadata value {value:?}: {e}"));
        request.metadata_mut().insert(key, value);
    }
    request
}
