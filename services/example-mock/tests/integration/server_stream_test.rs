use grpcmock_server::MockService;
use tokio_stream::StreamExt;
use tonic::{Code, Status};

use crate::helpers::{NO_MATCH, req, res, start};

#[tokio::test]
async fn should_stream_registered_responses() {
    let mut h = start(MockService::new()).await;
    h.mock
        .example_stream_response
        .on_request(req("count"))
        .returns(vec![res("1"), res("2"), res("3")]);

    let stream = h
        .client
        .example_stream_response(req("count"))
        .await
        .unwrap()
        .into_inner();
    let replies: Vec<_> = stream.map(|r| r.unwrap().res).collect().await;
    assert_eq!(replies, vec!["1", "2", "3"]);
    assert_eq!(h.mock.example_stream_response.times_called(), 1);
}

#[tokio::test]
async fn should_stream_default_responses() {
    let mut h = start(MockService::new()).await;
    h.mock
        .example_stream_response
        .default_return(vec![res("d1"), res("d2")]);

    let stream = h
        .client
        .example_stream_response(req("x"))
        .await
        .unwrap()
        .into_inner();
    let replies: Vec<_> = stream.map(|r| r.unwrap().res).collect().await;
    assert_eq!(replies, vec!["d1", "d2"]);
}

#[tokio::test]
async fn should_fail_stream_without_match() {
    let mut h = start(MockService::new()).await;

    // The status may arrive with the response headers or as the first item.
    let status: Status = match h.client.example_stream_response(req("x")).await {
        Err(status) => status,
        Ok(response) => {
            let mut stream = response.into_inner();
            match stream.next().await {
                Some(Err(status)) => status,
                other => panic!("expected an error, got {other:?}"),
            }
        }
    };
    assert_eq!(status.code(), Code::NotFound);
    assert!(status.message().contains(NO_MATCH));
}
