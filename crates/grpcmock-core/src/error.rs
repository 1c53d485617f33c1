use std::fmt;

use crate::call::CallId;

/// Engine error variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    #[error(
        "no matching expected call nor default return for method {method} with given arguments"
    )]
    NoMatchingCall { method: String },
    #[error(
        "got unexpected number of arguments for method {method}: expected {expected}, got {got}"
    )]
    ArityMismatch {
        method: String,
        expected: usize,
        got: usize,
    },
    #[error("{} expectation(s) not met: {}", .0.len(), join(.0))]
    UnmetExpectations(Vec<UnmetExpectation>),
}

impl MockError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoMatchingCall { .. } => "NO_MATCHING_CALL",
            Self::ArityMismatch { .. } => "ARITY_MISMATCH",
            Self::UnmetExpectations(_) => "UNMET_EXPECTATIONS",
        }
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            Self::NoMatchingCall { method } | Self::ArityMismatch { method, .. } => Some(method),
            Self::UnmetExpectations(_) => None,
        }
    }
}

/// An expectation registered with an expected call count that was selected a
/// different number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmetExpectation {
    pub method: String,
    pub id: CallId,
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for UnmetExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} call {} expected to be called {} times, but actually called {} times",
            self.method, self.id, self.expected, self.actual
        )
    }
}

fn join(unmet: &[UnmetExpectation]) -> String {
    unmet
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_method_in_no_matching_call() {
        let err = MockError::NoMatchingCall {
            method: "ExampleMethod".into(),
        };
        assert_eq!(err.kind(), "NO_MATCHING_CALL");
        assert_eq!(err.method(), Some("ExampleMethod"));
        assert!(err.to_string().contains(
            "no matching expected call nor default return for method ExampleMethod with given arguments"
        ));
    }

    #[test]
    fn should_report_arity_counts() {
        let err = MockError::ArityMismatch {
            method: "M".into(),
            expected: 2,
            got: 1,
        };
        assert_eq!(err.kind(), "ARITY_MISMATCH");
        assert!(err.to_string().contains("expected 2, got 1"));
    }

    #[test]
    fn should_list_every_unmet_expectation() {
        let id = CallId(uuid::Uuid::nil());
        let err = MockError::UnmetExpectations(vec![
            UnmetExpectation {
                method: "A".into(),
                id,
                expected: 2,
                actual: 1,
            },
            UnmetExpectation {
                method: "B".into(),
                id,
                expected: 1,
                actual: 0,
            },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 expectation(s) not met"));
        assert!(msg.contains("A call"));
        assert!(msg.contains("B call"));
        assert_eq!(err.method(), None);
    }
}
