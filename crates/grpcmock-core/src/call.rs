//! A single registered expectation and its call-tracking state.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::matcher::Arg;
use crate::value::Value;

/// Identifies one registered expectation. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallId(pub Uuid);

impl CallId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CallId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

pub type ReturnGenerator = Arc<dyn Fn() -> Vec<Value> + Send + Sync>;

/// What a matched call hands back.
#[derive(Clone)]
pub enum Returns {
    Static(Vec<Value>),
    /// Recomputed on every dispatch.
    Generator(ReturnGenerator),
}

impl Returns {
    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Static(values.into_iter().map(Into::into).collect())
    }

    pub fn generator<F>(f: F) -> Self
    where
        F: Fn() -> Vec<Value> + Send + Sync + 'static,
    {
        Self::Generator(Arc::new(f))
    }

    fn produce(&self) -> Vec<Value> {
        match self {
            Self::Static(values) => values.clone(),
            Self::Generator(generate) => generate(),
        }
    }
}

impl fmt::Debug for Returns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(values) => f.debug_tuple("Static").field(values).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

impl From<Vec<Value>> for Returns {
    fn from(values: Vec<Value>) -> Self {
        Self::Static(values)
    }
}

/// Registration options for a non-default expectation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub expected_times: Option<usize>,
}

impl CallOptions {
    /// Require exactly `n` selections; checked by `assert_expectations`.
    pub fn expected_times(mut self, n: usize) -> Self {
        self.expected_times = Some(n);
        self
    }
}

#[derive(Debug, Default)]
struct CallState {
    times_called: usize,
    last_returns: Option<Vec<Value>>,
    /// Bumped per dispatch; only the latest dispatch may store its returns.
    generation: u64,
}

#[derive(Debug)]
pub(crate) struct ExpectedCall {
    id: CallId,
    args: Vec<Arg>,
    returns: Returns,
    is_default: bool,
    expected_times: Option<usize>,
    state: Mutex<CallState>,
}

impl ExpectedCall {
    pub(crate) fn new(args: Vec<Arg>, returns: Returns, options: CallOptions) -> Self {
        Self {
            id: CallId::generate(),
            args,
            returns,
            is_default: false,
            expected_times: options.expected_times,
            state: Mutex::default(),
        }
    }

    pub(crate) fn new_default(returns: Returns) -> Self {
        Self {
            id: CallId::generate(),
            args: Vec::new(),
            returns,
            is_default: true,
            expected_times: None,
            state: Mutex::default(),
        }
    }

    pub(crate) fn id(&self) -> CallId {
        self.id
    }

    pub(crate) fn arity(&self) -> usize {
        self.args.len()
    }

    pub(crate) fn is_default(&self) -> bool {
        self.is_default
    }

    pub(crate) fn expected_times(&self) -> Option<usize> {
        self.expected_times
    }

    /// Positional match; the caller has already checked arity.
    pub(crate) fn matches(&self, args: &[Value]) -> bool {
        self.args
            .iter()
            .zip(args)
            .all(|(descriptor, arg)| descriptor.matches(arg))
    }

    /// Mark the record as selected and produce its return values.
    ///
    /// Generators run with no lock held and may use the record's own handle.
    /// When dispatches overlap, the memo keeps the latest dispatch's values.
    pub(crate) fn record_call(&self) -> Vec<Value> {
        let generation = {
            let mut state = self.lock_state();
            state.times_called += 1;
            state.last_returns = None;
            state.generation += 1;
            state.generation
        };

        let values = self.returns.produce();

        let mut state = self.lock_state();
        if state.generation == generation {
            state.last_returns = Some(values.clone());
        }
        values
    }

    pub(crate) fn times_called(&self) -> usize {
        self.lock_state().times_called
    }

    pub(crate) fn last_returns(&self) -> Option<Vec<Value>> {
        self.lock_state().last_returns.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, CallState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
