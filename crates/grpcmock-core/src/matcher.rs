//! Argument matchers.
//!
//! Each declared argument of an expected call is an [`Arg`]: either a literal
//! value compared with [`Value`] equality or an explicit [`Matcher`].

use std::fmt;
use std::sync::Arc;

use crate::value::{DynMessage, ProtoMessage, Value};

/// Decides whether a supplied argument is acceptable. Must be pure.
pub trait Matcher: fmt::Debug + Send + Sync {
    fn matches(&self, candidate: &Value) -> bool;

    /// Human-readable form used in diagnostics.
    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

/// Matches every value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyMatcher;

impl Matcher for AnyMatcher {
    fn matches(&self, _candidate: &Value) -> bool {
        true
    }

    fn describe(&self) -> String {
        "any value".to_owned()
    }
}

/// Matches values equal to the expected one.
#[derive(Debug, Clone, PartialEq)]
pub struct EqMatcher {
    expected: Value,
}

impl Matcher for EqMatcher {
    fn matches(&self, candidate: &Value) -> bool {
        self.expected == *candidate
    }

    fn describe(&self) -> String {
        format!("equal to {:?}", self.expected)
    }
}

/// Adapts a closure into a [`Matcher`].
pub struct FnMatcher<F> {
    description: String,
    predicate: F,
}

impl<F> fmt::Debug for FnMatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMatcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F> Matcher for FnMatcher<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn matches(&self, candidate: &Value) -> bool {
        (self.predicate)(candidate)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

pub fn any() -> AnyMatcher {
    AnyMatcher
}

pub fn eq(expected: impl Into<Value>) -> EqMatcher {
    EqMatcher {
        expected: expected.into(),
    }
}

/// Custom matcher from a predicate, e.g. `matcher_fn("positive", |v| v.as_i64() > Some(0))`.
pub fn matcher_fn<F>(description: impl Into<String>, predicate: F) -> FnMatcher<F>
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    FnMatcher {
        description: description.into(),
        predicate,
    }
}

/// Expected-argument descriptor for one position.
#[derive(Debug, Clone)]
pub enum Arg {
    Literal(Value),
    Matcher(Arc<dyn Matcher>),
}

impl Arg {
    pub fn matching(matcher: impl Matcher + 'static) -> Self {
        Self::Matcher(Arc::new(matcher))
    }

    pub fn message<M: ProtoMessage>(message: M) -> Self {
        Self::Literal(Value::message(message))
    }

    /// Literals behave as an implicit `eq` matcher.
    pub fn matches(&self, candidate: &Value) -> bool {
        match self {
            Self::Literal(expected) => expected == candidate,
            Self::Matcher(matcher) => matcher.matches(candidate),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Literal(expected) => format!("equal to {expected:?}"),
            Self::Matcher(matcher) => matcher.describe(),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Self::Literal(v)
    }
}

impl From<DynMessage> for Arg {
    fn from(m: DynMessage) -> Self {
        Self::Literal(Value::Message(m))
    }
}

impl From<Arc<dyn Matcher>> for Arg {
    fn from(m: Arc<dyn Matcher>) -> Self {
        Self::Matcher(m)
    }
}

impl From<AnyMatcher> for Arg {
    fn from(m: AnyMatcher) -> Self {
        Self::matching(m)
    }
}

impl From<EqMatcher> for Arg {
    fn from(m: EqMatcher) -> Self {
        Self::matching(m)
    }
}

impl<F> From<FnMatcher<F>> for Arg
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    fn from(m: FnMatcher<F>) -> Self {
        Self::matching(m)
    }
}

macro_rules! literal_arg {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Self::Literal(Value::from(v))
                }
            }
        )+
    };
}

literal_arg!(bool, i32, i64, u32, u64, f64, &str, String);
