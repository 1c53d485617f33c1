//! Call-expectation engine for gRPC mock servers.
//!
//! A [`Mocker`] owns, per method name, an ordered list of expected calls and an
//! optional default. Serving code hands it the call arguments as [`Value`]s and
//! gets back the registered return values. Registration happens out-of-band,
//! usually from test setup, while resolution runs on serving tasks.
//!
//! This crate contains no transport code; see `grpcmock-server` for the tonic shim.

pub mod call;
pub mod error;
pub mod handle;
pub mod matcher;
pub mod mocker;
pub mod value;

pub use call::{CallId, CallOptions, Returns};
pub use error::{MockError, UnmetExpectation};
pub use handle::CallHandle;
pub use matcher::{AnyMatcher, Arg, EqMatcher, FnMatcher, Matcher, any, eq, matcher_fn};
pub use mocker::{Dispatch, Mocker};
pub use value::{DynMessage, Opaque, ProtoMessage, Value};

/// Build a `Vec<Arg>` from literals and matchers.
///
/// ```
/// use grpcmock_core::{any, args};
/// let descriptors = args![any(), "req-1", 42];
/// assert_eq!(descriptors.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}
