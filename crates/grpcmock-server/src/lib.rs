//! tonic shim over the call-expectation engine.
//!
//! A hand-written or generated service implementation keeps one
//! [`MethodMock`] per RPC and forwards each call to the matching
//! `handle_*` function. Test code configures the same mocks through
//! [`MockService`].

pub mod config;
pub mod error;
pub mod metadata;
pub mod method;
pub mod reply;
pub mod service;
pub mod tracing;

pub use config::MockServerConfig;
pub use error::ServerError;
pub use metadata::metadata_value;
pub use method::{
    BidiStreamMethod, CallBuilder, ClientStreamMethod, MethodMock, ResponseStream,
    ServerStreamMethod, UnaryMethod,
};
pub use service::{MockService, serve};
