use std::path::{Path, PathBuf};
use std::sync::Arc;

use grpcmock_core::{MockError, Mocker, ProtoMessage};
use tonic::service::Routes;
use tracing::info;

use crate::config::MockServerConfig;
use crate::error::ServerError;
use crate::method::{
    BidiStreamMethod, ClientStreamMethod, MethodMock, ServerStreamMethod, UnaryMethod,
};
use crate::reply::{single, streamed};

/// Entry point for configuring a mocked gRPC service.
///
/// All method mocks created from one `MockService` share its [`Mocker`], so
/// resets and expectation checks cover the whole service.
#[derive(Debug, Clone, Default)]
pub struct MockService {
    mocker: Mocker,
    stubs_dir: Option<Arc<Path>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MockServerConfig) -> Self {
        match &config.stubs_dir {
            Some(dir) => Self::new().with_stubs_dir(dir),
            None => Self::new(),
        }
    }

    /// Fall back to the fixture files under `dir` for unary calls that no
    /// expectation matches.
    pub fn with_stubs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir: PathBuf = dir.into();
        self.stubs_dir = Some(Arc::from(dir));
        self
    }

    pub fn mocker(&self) -> &Mocker {
        &self.mocker
    }

    pub fn stubs_dir(&self) -> Option<&Path> {
        self.stubs_dir.as_deref()
    }

    pub fn unary<Req, Res>(&self, method: &str) -> UnaryMethod<Req, Res>
    where
        Req: ProtoMessage + Clone,
        Res: ProtoMessage + Clone,
    {
        MethodMock::new(method, self.mocker.clone(), self.stubs_dir.clone(), single())
    }

    pub fn client_stream<Req, Res>(&self, method: &str) -> ClientStreamMethod<Req, Res>
    where
        Req: ProtoMessage + Clone,
        Res: ProtoMessage + Clone,
    {
        MethodMock::new(method, self.mocker.clone(), None, single())
    }

    pub fn server_stream<Req, Res>(&self, method: &str) -> ServerStreamMethod<Req, Res>
    where
        Req: ProtoMessage + Clone,
        Res: ProtoMessage + Clone,
    {
        MethodMock::new(method, self.mocker.clone(), None, streamed())
    }

    pub fn bidi_stream<Req, Res>(&self, method: &str) -> BidiStreamMethod<Req, Res>
    where
        Req: ProtoMessage + Clone,
        Res: ProtoMessage + Clone,
    {
        MethodMock::new(method, self.mocker.clone(), None, streamed())
    }

    pub fn reset_all(&self) {
        self.mocker.reset_all();
    }

    pub fn assert_expectations(&self) -> Result<(), MockError> {
        self.mocker.assert_expectations()
    }
}

/// Serve `routes` on the configured port until the process is stopped.
pub async fn serve(config: &MockServerConfig, routes: Routes) -> Result<(), ServerError> {
    let addr = config.addr();
    info!(
        stubs_dir = ?config.stubs_dir,
        "gRPC mock server listening on {addr}"
    );
    tonic::transport::Server::builder()
        .add_routes(routes)
        .serve(addr)
        .await?;
    Ok(())
}
