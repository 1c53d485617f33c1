use grpcmock_core::Value;
use tonic::metadata::MetadataMap;

/// Request metadata as a `Value::Map` of header name to text value.
///
/// Binary (`-bin`) entries keep their base64 wire form. Values that are not
/// valid visible ASCII are dropped; for repeated keys the last value wins.
pub fn metadata_value(metadata: &MetadataMap) -> Value {
    let headers = metadata.clone().into_headers();
    Value::map(headers.iter().filter_map(|(name, value)| {
        value
            .to_str()
            .ok()
            .map(|value| (name.as_str().to_owned(), value.to_owned()))
    }))
}
