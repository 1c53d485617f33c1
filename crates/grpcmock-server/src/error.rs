use grpcmock_core::MockError;
use grpcmock_stub::StubError;
use tonic::Status;

/// Errors raised while serving a mocked RPC.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Mock(#[from] MockError),
    #[error(transparent)]
    Stub(#[from] StubError),
    #[error("method {method} resolved to a return value that is not {expected}")]
    UnexpectedReturn {
        method: String,
        expected: &'static str,
    },
    #[error("no messages received for method {method}")]
    EmptyStream { method: String },
    #[error("stub resolution task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl ServerError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mock(e) => e.kind(),
            Self::Stub(e) => e.kind(),
            Self::UnexpectedReturn { .. } => "UNEXPECTED_RETURN",
            Self::EmptyStream { .. } => "EMPTY_STREAM",
            Self::Blocking(_) => "BLOCKING_TASK",
            Self::Transport(_) => "TRANSPORT",
        }
    }

    fn is_internal(&self) -> bool {
        match self {
            Self::Stub(e) => matches!(e, StubError::SerializeRequest(_)),
            Self::UnexpectedReturn { .. } | Self::Blocking(_) | Self::Transport(_) => true,
            Self::Mock(_) | Self::EmptyStream { .. } => false,
        }
    }
}

impl From<ServerError> for Status {
    fn from(err: ServerError) -> Self {
        // Mismatches are expected during tests; only log what points at a bug.
        if err.is_internal() {
            tracing::error!(error = %err, kind = err.kind(), "internal mock server error");
        }
        let message = err.to_string();
        match &err {
            ServerError::Mock(MockError::NoMatchingCall { .. }) => Status::not_found(message),
            ServerError::Mock(MockError::ArityMismatch { .. }) => {
                Status::invalid_argument(message)
            }
            ServerError::Mock(MockError::UnmetExpectations(_)) => {
                Status::failed_precondition(message)
            }
            ServerError::Stub(StubError::NoMatchingStub { .. }) => Status::not_found(message),
            ServerError::Stub(e) if e.is_configuration_error() => {
                Status::failed_precondition(message)
            }
            ServerError::EmptyStream { .. } => Status::invalid_argument(message),
            _ => Status::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use tonic::Code;

    use super::*;

    fn status(err: impl Into<ServerError>) -> Status {
        Status::from(err.into())
    }

    #[test]
    fn should_map_no_matching_call_to_not_found() {
        let s = status(MockError::NoMatchingCall {
            method: "ExampleMethod".into(),
        });
        assert_eq!(s.code(), Code::NotFound);
        assert!(s.message().contains(
            "no matching expected call nor default return for method ExampleMethod"
        ));
    }

    #[test]
    fn should_map_arity_mismatch_to_invalid_argument() {
        let s = status(MockError::ArityMismatch {
            method: "M".into(),
            expected: 2,
            got: 1,
        });
        assert_eq!(s.code(), Code::InvalidArgument);
    }

    #[test]
    fn should_map_fixture_errors() {
        let s = status(StubError::NoMatchingStub { method: "M".into() });
        assert_eq!(s.code(), Code::NotFound);

        let s = status(StubError::InvalidFileName {
            file_name: "bad.json".into(),
        });
        assert_eq!(s.code(), Code::FailedPrecondition);
    }

    #[test]
    fn should_map_unexpected_return_to_internal() {
        let err = ServerError::UnexpectedReturn {
            method: "M".into(),
            expected: "a response message",
        };
        assert_eq!(err.kind(), "UNEXPECTED_RETURN");
        assert_eq!(Status::from(err).code(), Code::Internal);
    }

    #[test]
    fn should_map_empty_stream_to_invalid_argument() {
        let s = status(ServerError::EmptyStream { method: "M".into() });
        assert_eq!(s.code(), Code::InvalidArgument);
    }
}
