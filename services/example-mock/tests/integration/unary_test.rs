use grpcmock_core::{any, eq};
use grpcmock_server::MockService;
use grpcmock_testing::{metadata_with, request_with_metadata};
use tonic::Code;

use crate::helpers::{NO_MATCH, req, res, start};

#[tokio::test]
async fn should_serve_default_response() {
    let mut h = start(MockService::new()).await;
    h.mock.example_method.default_return(res("default"));

    let reply = h.client.example_method(req("anything")).await.unwrap();
    assert_eq!(reply.into_inner(), res("default"));
    assert_eq!(h.mock.example_method.times_called(), 1);
}

#[tokio::test]
async fn should_prefer_registered_call_over_default() {
    let mut h = start(MockService::new()).await;
    h.mock.example_method.default_return(res("default"));
    let handle = h
        .mock
        .example_method
        .on_request(req("hello"))
        .returns(res("world"));

    let reply = h.client.example_method(req("hello")).await.unwrap();
    assert_eq!(reply.into_inner(), res("world"));
    let reply = h.client.example_method(req("other")).await.unwrap();
    assert_eq!(reply.into_inner(), res("default"));

    assert_eq!(handle.times_called(), 1);
    assert_eq!(h.mock.example_method.times_called(), 2);
}

#[tokio::test]
async fn should_fall_back_to_default_after_delete() {
    let mut h = start(MockService::new()).await;
    h.mock.example_method.default_return(res("default"));
    let handle = h
        .mock
        .example_method
        .on(any(), any())
        .returns(res("registered"));

    let reply = h.client.example_method(req("x")).await.unwrap();
    assert_eq!(reply.into_inner(), res("registered"));

    handle.delete();
    let reply = h.client.example_method(req("x")).await.unwrap();
    assert_eq!(reply.into_inner(), res("default"));
    assert_eq!(handle.times_called(), 0);
}

#[tokio::test]
async fn should_fail_after_reset() {
    let mut h = start(MockService::new()).await;
    h.mock.example_method.default_return(res("default"));
    h.client.example_method(req("x")).await.unwrap();

    h.mock.example_method.reset();
    assert_eq!(h.mock.example_method.times_called(), 0);

    let status = h.client.example_method(req("x")).await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert!(
        status.message().contains(NO_MATCH),
        "unexpected message: {}",
        status.message()
    );
}

#[tokio::test]
async fn should_return_registered_status() {
    let mut h = start(MockService::new()).await;
    h.mock
        .example_method
        .on(any(), eq(grpcmock_core::Value::message(req("fail"))))
        .returns_error(tonic::Status::permission_denied("nope"));

    let status = h.client.example_method(req("fail")).await.unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
    assert_eq!(status.message(), "nope");
}

#[tokio::test]
async fn should_match_request_metadata() {
    let mut h = start(MockService::new()).await;
    h.mock
        .example_method
        .on(metadata_with("x-tenant", "acme"), any())
        .returns(res("acme"));
    h.mock.example_method.default_return(res("default"));

    let reply = h
        .client
        .example_method(request_with_metadata(req("x"), &[("x-tenant", "acme")]))
        .await
        .unwrap();
    assert_eq!(reply.into_inner(), res("acme"));

    let reply = h
        .client
        .example_method(request_with_metadata(req("x"), &[("x-tenant", "other")]))
        .await
        .unwrap();
    assert_eq!(reply.into_inner(), res("default"));
}

#[tokio::test]
async fn should_report_unmet_expectations() {
    let mut h = start(MockService::new()).await;
    h.mock
        .example_method
        .on_request(req("twice"))
        .times(2)
        .returns(res("ok"));

    h.client.example_method(req("twice")).await.unwrap();
    let err = h.service.assert_expectations().unwrap_err();
    assert!(
        err.to_string()
            .contains("expected to be called 2 times, but actually called 1 times"),
        "unexpected error: {err}"
    );

    h.client.example_method(req("twice")).await.unwrap();
    h.service.assert_expectations().unwrap();
}
