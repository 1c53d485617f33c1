//! File-backed stubs.
//!
//! A stubs directory holds request/response fixture pairs named
//! `[<description>__]<Method>__request.json` and `..._response.json`. A live
//! request resolves to the response of the first pair, in traversal order,
//! whose request fixture is equal to or a subset of the request's JSON form.

pub mod compare;
pub mod error;
pub mod index;

pub use compare::{JsonMatch, compare};
pub use error::StubError;
pub use index::{
    FixturePair, REQUEST_SUFFIX, RESPONSE_SUFFIX, StubIndex, map_stub_files,
    method_from_file_name, resolve_from_dir,
};
