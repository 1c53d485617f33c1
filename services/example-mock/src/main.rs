use grpcmock_example_mock::ExampleMock;
use grpcmock_server::tracing::init_tracing;
use grpcmock_server::{MockServerConfig, MockService, serve};
use tracing::info;

/// Serves `example.ExampleService` from the fixtures in `GRPCMOCK_STUBS_DIR`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = MockServerConfig::from_env();
    if config.stubs_dir.is_none() {
        info!("GRPCMOCK_STUBS_DIR unset; unary calls will fail with NOT_FOUND");
    }

    let service = MockService::from_config(&config);
    let mock = ExampleMock::new(&service);
    serve(&config, mock.routes()).await?;
    Ok(())
}
