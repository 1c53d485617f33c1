use grpcmock_example_proto::example::ExampleMethodRequest;
use grpcmock_server::MockService;
use tonic::Code;

use crate::helpers::{req, res, start};

#[tokio::test]
async fn should_reply_with_default_at_end_of_stream() {
    let mut h = start(MockService::new()).await;
    h.mock.example_stream_request.default_return(res("default"));

    let requests = tokio_stream::iter(vec![req("a"), req("b"), req("c")]);
    let reply = h.client.example_stream_request(requests).await.unwrap();

    assert_eq!(reply.into_inner(), res("default"));
    assert_eq!(h.mock.example_stream_request.times_called(), 3);
}

#[tokio::test]
async fn should_reply_at_first_registered_match() {
    let mut h = start(MockService::new()).await;
    h.mock.example_stream_request.default_return(res("default"));
    let handle = h
        .mock
        .example_stream_request
        .on_request(req("stop"))
        .returns(res("stopped"));

    let requests = tokio_stream::iter(vec![req("a"), req("stop"), req("b"), req("stop")]);
    let reply = h.client.example_stream_request(requests).await.unwrap();

    assert_eq!(reply.into_inner(), res("stopped"));
    assert_eq!(handle.times_called(), 1);
    // Messages after the match are not resolved.
    assert_eq!(h.mock.example_stream_request.times_called(), 2);
}

#[tokio::test]
async fn should_fail_stream_without_match() {
    let mut h = start(MockService::new()).await;
    h.mock
        .example_stream_request
        .on_request(req("known"))
        .returns(res("ok"));

    let requests = tokio_stream::iter(vec![req("unknown")]);
    let status = h.client.example_stream_request(requests).await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn should_fail_empty_stream() {
    let mut h = start(MockService::new()).await;
    h.mock.example_stream_request.default_return(res("default"));

    let requests = tokio_stream::iter(Vec::<ExampleMethodRequest>::new());
    let status = h.client.example_stream_request(requests).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(h.mock.example_stream_request.times_called(), 0);
}
