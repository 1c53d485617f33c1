//! Test utilities for mocked gRPC services.
//!
//! Provides a temporary stubs directory, a metadata matcher, and helpers to
//! run a mock server in-process. Use from tests only.

pub mod fixture;
pub mod grpc;
pub mod metadata;

pub use fixture::StubDir;
pub use grpc::{connect, serve_routes};
pub use metadata::{MetadataMatcher, metadata_with, request_with_metadata};
