//! Mock implementation of `example.ExampleService`.
//!
//! Each RPC forwards to a [`MethodMock`](grpcmock_server::MethodMock) named
//! after the RPC, so fixture files use the proto method names
//! (`ExampleMethod__request.json`, ...).

use grpcmock_example_proto::example::example_service_server::{
    ExampleService, ExampleServiceServer,
};
use grpcmock_example_proto::example::{ExampleMethodRequest, ExampleMethodResponse};
use grpcmock_server::{
    BidiStreamMethod, ClientStreamMethod, MockService, ResponseStream, ServerStreamMethod,
    UnaryMethod,
};
use tonic::service::Routes;
use tonic::{Request, Response, Status, Streaming};

pub const EXAMPLE_METHOD: &str = "ExampleMethod";
pub const EXAMPLE_STREAM_RESPONSE: &str = "ExampleStreamResponse";
pub const EXAMPLE_STREAM_REQUEST: &str = "ExampleStreamRequest";
pub const EXAMPLE_STREAM_REQUEST_RESPONSE: &str = "ExampleStreamRequestResponse";

#[derive(Debug, Clone)]
pub struct ExampleMock {
    pub example_method: UnaryMethod<ExampleMethodRequest, ExampleMethodResponse>,
    pub example_stream_response: ServerStreamMethod<ExampleMethodRequest, ExampleMethodResponse>,
    pub example_stream_request: ClientStreamMethod<ExampleMethodRequest, ExampleMethodResponse>,
    pub example_stream_request_response:
        BidiStreamMethod<ExampleMethodRequest, ExampleMethodResponse>,
}

impl ExampleMock {
    pub fn new(service: &MockService) -> Self {
        Self {
            example_method: service.unary(EXAMPLE_METHOD),
            example_stream_response: service.server_stream(EXAMPLE_STREAM_RESPONSE),
            example_stream_request: service.client_stream(EXAMPLE_STREAM_REQUEST),
            example_stream_request_response: service
                .bidi_stream(EXAMPLE_STREAM_REQUEST_RESPONSE),
        }
    }

    pub fn routes(&self) -> Routes {
        Routes::new(ExampleServiceServer::new(self.clone()))
    }
}

#[tonic::async_trait]
impl ExampleService for ExampleMock {
    async fn example_method(
        &self,
        request: Request<ExampleMethodRequest>,
    ) -> Result<Response<ExampleMethodResponse>, Status> {
        self.example_method.handle_unary(request).await
    }

    type ExampleStreamResponseStream = ResponseStream<ExampleMethodResponse>;

    async fn example_stream_response(
        &self,
        request: Request<ExampleMethodRequest>,
    ) -> Result<Response<Self::ExampleStreamResponseStream>, Status> {
        self.example_stream_response
            .handle_server_stream(request)
            .await
    }

    async fn example_stream_request(
        &self,
        request: Request<Streaming<ExampleMethodRequest>>,
    ) -> Result<Response<ExampleMethodResponse>, Status> {
        self.example_stream_request
            .handle_client_stream(request)
            .await
    }

    type ExampleStreamRequestResponseStream = ResponseStream<ExampleMethodResponse>;

    async fn example_stream_request_response(
        &self,
        request: Request<Streaming<ExampleMethodRequest>>,
    ) -> Result<Response<Self::ExampleStreamRequestResponseStream>, Status> {
        self.example_stream_request_response
            .handle_bidi(request)
            .await
    }
}
