use grpcmock_example_mock::ExampleMock;
use grpcmock_example_proto::example::example_service_client::ExampleServiceClient;
use grpcmock_example_proto::example::{ExampleMethodRequest, ExampleMethodResponse};
use grpcmock_server::MockService;
use tonic::transport::Channel;

pub const NO_MATCH: &str = "no matching expected call nor default return for method";

pub struct Harness {
    pub service: MockService,
    pub mock: ExampleMock,
    pub client: ExampleServiceClient<Channel>,
}

/// Serve a fresh mock on an ephemeral port and connect a client to it.
pub async fn start(service: MockService) -> Harness {
    let mock = ExampleMock::new(&service);
    let addr = grpcmock_testing::serve_routes(mock.routes()).await;
    let client = ExampleServiceClient::new(grpcmock_testing::connect(addr).await);
    Harness {
        service,
        mock,
        client,
    }
}

pub fn req(req: &str) -> ExampleMethodRequest {
    ExampleMethodRequest {
        req: req.into(),
        request_id: String::new(),
    }
}

pub fn res(res: &str) -> ExampleMethodResponse {
    ExampleMethodResponse { res: res.into() }
}
