use std::io;
use std::path::PathBuf;

/// Fixture discovery and resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum StubError {
    #[error("stat stubs directory {}: {source}", .path.display())]
    Directory { path: PathBuf, source: io::Error },
    #[error("path {} for stubs must be a directory", .path.display())]
    NotADirectory { path: PathBuf },
    #[error("walk stubs directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(
        "found request file {}, but expected response file {} wasn't found",
        .request.display(),
        .response.display()
    )]
    MissingResponse { request: PathBuf, response: PathBuf },
    #[error(
        "request file {file_name:?} doesn't contain a method name. Request file must be in the \
         following format: [description__]<RPC method name>__request.json. For example: \
         \"some description__CreateAccount__request.json\""
    )]
    InvalidFileName { file_name: String },
    #[error("read stub file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("stub file {} contains an invalid JSON: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("marshal request JSON: {0}")]
    SerializeRequest(#[source] serde_json::Error),
    #[error(
        "unmarshal stub response {} into provided response type: {source}",
        .path.display()
    )]
    DeserializeResponse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no matching stub found for method {method} with the provided request")]
    NoMatchingStub { method: String },
}

impl StubError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Directory { .. } => "STUBS_DIRECTORY",
            Self::NotADirectory { .. } => "STUBS_NOT_A_DIRECTORY",
            Self::Walk(_) => "STUBS_WALK",
            Self::MissingResponse { .. } => "MISSING_RESPONSE_FIXTURE",
            Self::InvalidFileName { .. } => "INVALID_FIXTURE_FILE_NAME",
            Self::Read { .. } => "FIXTURE_READ",
            Self::InvalidJson { .. } => "INVALID_FIXTURE_JSON",
            Self::SerializeRequest(_) => "SERIALIZE_REQUEST",
            Self::DeserializeResponse { .. } => "DESERIALIZE_RESPONSE",
            Self::NoMatchingStub { .. } => "NO_MATCHING_STUB",
        }
    }

    /// The stubs directory itself is malformed, as opposed to the live
    /// request not matching any fixture.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            Self::SerializeRequest(_) | Self::NoMatchingStub { .. }
        )
    }
}
