use grpcmock_server::MockService;
use tokio_stream::StreamExt;
use tonic::Code;

use crate::helpers::{req, res, start};

#[tokio::test]
async fn should_answer_each_message() {
    let mut h = start(MockService::new()).await;
    h.mock
        .example_stream_request_response
        .default_return(vec![res("echo")]);
    h.mock
        .example_stream_request_response
        .on_request(req("pair"))
        .returns(vec![res("one"), res("two")]);

    let requests = tokio_stream::iter(vec![req("a"), req("pair"), req("b")]);
    let stream = h
        .client
        .example_stream_request_response(requests)
        .await
        .unwrap()
        .into_inner();
    let replies: Vec<_> = stream.map(|r| r.unwrap().res).collect().await;

    assert_eq!(replies, vec!["echo", "one", "two", "echo"]);
    assert_eq!(h.mock.example_stream_request_response.times_called(), 3);
}

#[tokio::test]
async fn should_end_stream_on_unmatched_message() {
    let mut h = start(MockService::new()).await;
    h.mock
        .example_stream_request_response
        .on_request(req("known"))
        .returns(vec![res("ok")]);

    let requests = tokio_stream::iter(vec![req("known"), req("unknown"), req("known")]);
    let mut stream = h
        .client
        .example_stream_request_response(requests)
        .await
        .unwrap()
        .into_inner();

    assert_eq!(stream.next().await.unwrap().unwrap(), res("ok"));
    let status = stream.next().await.unwrap().unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}
