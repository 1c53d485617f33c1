use grpcmock_server::MockService;
use grpcmock_testing::StubDir;
use serde_json::json;
use tonic::Code;

use crate::helpers::{req, res, start};

fn stubs() -> StubDir {
    let stubs = StubDir::new();
    stubs
        .pair(
            "exact__ExampleMethod",
            &json!({"req": "hello", "requestId": "1"}),
            &json!({"res": "exact"}),
        )
        .pair(
            "loose__ExampleMethod",
            &json!({"req": "hello"}),
            &json!({"res": "loose"}),
        )
        .file("README.md", "not a fixture");
    stubs
}

#[tokio::test]
async fn should_serve_matching_fixture() {
    let stubs = stubs();
    let mut h = start(MockService::new().with_stubs_dir(stubs.path())).await;

    let mut request = req("hello");
    request.request_id = "1".into();
    let reply = h.client.example_method(request).await.unwrap();
    assert_eq!(reply.into_inner(), res("exact"));

    // Fixture fields are a subset of the request.
    let mut request = req("hello");
    request.request_id = "2".into();
    let reply = h.client.example_method(request).await.unwrap();
    assert_eq!(reply.into_inner(), res("loose"));
}

#[tokio::test]
async fn should_prefer_registered_calls_over_fixtures() {
    let stubs = stubs();
    let mut h = start(MockService::new().with_stubs_dir(stubs.path())).await;
    h.mock
        .example_method
        .on_request(req("hello"))
        .returns(res("registered"));

    let reply = h.client.example_method(req("hello")).await.unwrap();
    assert_eq!(reply.into_inner(), res("registered"));
}

#[tokio::test]
async fn should_fail_without_matching_fixture() {
    let stubs = stubs();
    let mut h = start(MockService::new().with_stubs_dir(stubs.path())).await;

    let status = h.client.example_method(req("bye")).await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert!(status.message().contains("no matching stub found"));
}

#[tokio::test]
async fn should_reject_request_fixture_without_response() {
    let stubs = StubDir::new();
    stubs.file("orphan__ExampleMethod__request.json", "{}");
    let mut h = start(MockService::new().with_stubs_dir(stubs.path())).await;

    let status = h.client.example_method(req("x")).await.unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);
}

#[tokio::test]
async fn should_reject_response_fixture_with_unknown_field() {
    let stubs = StubDir::new();
    stubs.pair(
        "typo__ExampleMethod",
        &json!({"req": "hello"}),
        &json!({"response": "oops"}),
    );
    let mut h = start(MockService::new().with_stubs_dir(stubs.path())).await;

    let status = h.client.example_method(req("hello")).await.unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);
    assert!(
        status.message().contains("typo__ExampleMethod__response.json"),
        "unexpected message: {}",
        status.message()
    );
}
