//! Typed per-method configurators and handlers.
//!
//! Every mocked call is resolved with two arguments: the request metadata (as
//! a `Value::Map`, see [`metadata_value`]) and the request message.

use std::marker::PhantomData;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use grpcmock_core::{
    Arg, CallHandle, CallOptions, Dispatch, MockError, Mocker, ProtoMessage, Returns, Value, any,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status};

use crate::error::ServerError;
use crate::metadata::metadata_value;
use crate::reply::ReplyCodec;

pub type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send + 'static>>;

/// Buffered replies per bidirectional stream before the resolver waits on the client.
const BIDI_BUFFER: usize = 16;

/// Expectations for one RPC method. `Out` is the registered reply: the
/// response message, or a `Vec` of them for server-streaming methods.
pub struct MethodMock<Req, Out> {
    name: Arc<str>,
    mocker: Mocker,
    stubs_dir: Option<Arc<Path>>,
    codec: ReplyCodec<Out>,
    _request: PhantomData<fn(Req)>,
}

pub type UnaryMethod<Req, Res> = MethodMock<Req, Res>;
pub type ClientStreamMethod<Req, Res> = MethodMock<Req, Res>;
pub type ServerStreamMethod<Req, Res> = MethodMock<Req, Vec<Res>>;
pub type BidiStreamMethod<Req, Res> = MethodMock<Req, Vec<Res>>;

impl<Req, Out> Clone for MethodMock<Req, Out> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            mocker: self.mocker.clone(),
            stubs_dir: self.stubs_dir.clone(),
            codec: self.codec,
            _request: PhantomData,
        }
    }
}

impl<Req, Out> std::fmt::Debug for MethodMock<Req, Out> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodMock")
            .field("name", &self.name)
            .field("stubs_dir", &self.stubs_dir)
            .finish_non_exhaustive()
    }
}

impl<Req, Out> MethodMock<Req, Out>
where
    Req: ProtoMessage + Clone,
    Out: 'static,
{
    pub(crate) fn new(
        name: &str,
        mocker: Mocker,
        stubs_dir: Option<Arc<Path>>,
        codec: ReplyCodec<Out>,
    ) -> Self {
        Self {
            name: Arc::from(name),
            mocker,
            stubs_dir,
            codec,
            _request: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start an expectation on `(metadata, request)`.
    pub fn on(&self, metadata: impl Into<Arg>, request: impl Into<Arg>) -> CallBuilder<'_, Req, Out> {
        CallBuilder {
            method: self,
            args: vec![metadata.into(), request.into()],
            options: CallOptions::default(),
        }
    }

    /// Expect exactly `request`, with any metadata.
    pub fn on_request(&self, request: Req) -> CallBuilder<'_, Req, Out> {
        self.on(any(), Arg::message(request))
    }

    pub fn default_return(&self, reply: Out) {
        self.mocker
            .set_default(&self.name, Returns::Static(self.codec.encode(Ok(reply))));
    }

    pub fn default_error(&self, status: Status) {
        self.mocker
            .set_default(&self.name, Returns::Static(self.codec.encode(Err(status))));
    }

    pub fn default_return_with<F>(&self, reply: F)
    where
        F: Fn() -> Result<Out, Status> + Send + Sync + 'static,
    {
        self.mocker
            .set_default(&self.name, generated(self.codec, reply));
    }

    pub fn unset_default(&self) {
        self.mocker.unset_default_call(&self.name);
    }

    /// Calls served by this method since the last reset, default included.
    pub fn times_called(&self) -> usize {
        self.mocker.get_call_count(&self.name)
    }

    pub fn reset(&self) {
        self.mocker.reset_call(&self.name);
    }

    fn dispatch(&self, metadata: &MetadataMap, request: &Req) -> Result<Dispatch, MockError> {
        self.mocker.dispatch(
            &self.name,
            &[metadata_value(metadata), Value::message(request.clone())],
        )
    }

    fn resolve(&self, metadata: &MetadataMap, request: &Req) -> Result<Out, Status> {
        let dispatch = self
            .dispatch(metadata, request)
            .map_err(ServerError::from)?;
        self.codec.decode(&self.name, dispatch.returns)
    }
}

fn generated<Out, F>(codec: ReplyCodec<Out>, reply: F) -> Returns
where
    Out: 'static,
    F: Fn() -> Result<Out, Status> + Send + Sync + 'static,
{
    Returns::generator(move || codec.encode(reply()))
}

/// Pending expectation; finish it with one of the `returns*` calls.
#[must_use = "an expectation is only registered once a return is set"]
pub struct CallBuilder<'a, Req, Out> {
    method: &'a MethodMock<Req, Out>,
    args: Vec<Arg>,
    options: CallOptions,
}

impl<Req, Out> CallBuilder<'_, Req, Out>
where
    Req: ProtoMessage + Clone,
    Out: 'static,
{
    /// Expect this call to be served exactly `n` times.
    pub fn times(mut self, n: usize) -> Self {
        self.options = self.options.expected_times(n);
        self
    }

    pub fn returns(self, reply: Out) -> CallHandle {
        let returns = Returns::Static(self.method.codec.encode(Ok(reply)));
        self.register(returns)
    }

    pub fn returns_error(self, status: Status) -> CallHandle {
        let returns = Returns::Static(self.method.codec.encode(Err(status)));
        self.register(returns)
    }

    /// Compute the reply on every matching call.
    pub fn returns_with<F>(self, reply: F) -> CallHandle
    where
        F: Fn() -> Result<Out, Status> + Send + Sync + 'static,
    {
        let returns = generated(self.method.codec, reply);
        self.register(returns)
    }

    fn register(self, returns: Returns) -> CallHandle {
        self.method
            .mocker
            .add_call(&self.method.name, self.args, returns, self.options)
    }
}

impl<Req, Res> MethodMock<Req, Res>
where
    Req: ProtoMessage + Clone + Serialize,
    Res: ProtoMessage + Clone + DeserializeOwned,
{
    /// Serve a unary call.
    ///
    /// When nothing is registered that matches and a stubs directory is
    /// configured, the request is resolved against the fixture files instead.
    pub async fn handle_unary(&self, request: Request<Req>) -> Result<Response<Res>, Status> {
        let (metadata, _, message) = request.into_parts();
        match self.dispatch(&metadata, &message) {
            Ok(dispatch) => self
                .codec
                .decode(&self.name, dispatch.returns)
                .map(Response::new),
            Err(MockError::NoMatchingCall { method }) => match &self.stubs_dir {
                Some(dir) => self
                    .resolve_stub(Arc::clone(dir), message)
                    .await
                    .map(Response::new),
                None => Err(ServerError::from(MockError::NoMatchingCall { method }).into()),
            },
            Err(err) => Err(ServerError::from(err).into()),
        }
    }

    /// Serve a client-streaming call.
    ///
    /// Messages are resolved in arrival order. The first one matched by a
    /// registered expectation ends the call with its reply; messages served
    /// by the default only do so once the client closes the stream, with the
    /// default reply of the last message.
    pub async fn handle_client_stream<S>(&self, request: Request<S>) -> Result<Response<Res>, Status>
    where
        S: Stream<Item = Result<Req, Status>> + Unpin + Send,
    {
        let (metadata, _, mut inbound) = request.into_parts();
        let mut last: Option<Result<Vec<Value>, MockError>> = None;

        while let Some(message) = inbound.next().await {
            let message = message?;
            match self.dispatch(&metadata, &message) {
                Ok(dispatch) if !dispatch.is_default => {
                    return self
                        .codec
                        .decode(&self.name, dispatch.returns)
                        .map(Response::new);
                }
                Ok(dispatch) => last = Some(Ok(dispatch.returns)),
                Err(err) => last = Some(Err(err)),
            }
        }

        match last {
            Some(Ok(returns)) => self.codec.decode(&self.name, returns).map(Response::new),
            Some(Err(err)) => Err(ServerError::from(err).into()),
            None => Err(ServerError::EmptyStream {
                method: self.name.to_string(),
            }
            .into()),
        }
    }

    async fn resolve_stub(&self, dir: Arc<Path>, message: Req) -> Result<Res, Status> {
        let method = Arc::clone(&self.name);
        let reply = tokio::task::spawn_blocking(move || {
            grpcmock_stub::resolve_from_dir::<Req, Res>(&dir, &method, &message)
        })
        .await
        .map_err(ServerError::from)?
        .map_err(ServerError::from)?;
        Ok(reply)
    }
}

impl<Req, Res> MethodMock<Req, Vec<Res>>
where
    Req: ProtoMessage + Clone,
    Res: ProtoMessage + Clone,
{
    /// Serve a server-streaming call with the registered list of replies.
    pub async fn handle_server_stream(
        &self,
        request: Request<Req>,
    ) -> Result<Response<ResponseStream<Res>>, Status> {
        let (metadata, _, message) = request.into_parts();
        let replies = self.resolve(&metadata, &message)?;
        let outbound: ResponseStream<Res> =
            Box::pin(tokio_stream::iter(replies.into_iter().map(Ok::<Res, Status>)));
        Ok(Response::new(outbound))
    }

    /// Serve a bidirectional call: every inbound message is resolved on its
    /// own and its replies are streamed back in order. A message that cannot
    /// be resolved ends the stream with the corresponding error.
    pub async fn handle_bidi<S>(
        &self,
        request: Request<S>,
    ) -> Result<Response<ResponseStream<Res>>, Status>
    where
        S: Stream<Item = Result<Req, Status>> + Unpin + Send + 'static,
    {
        let (metadata, _, mut inbound) = request.into_parts();
        let (tx, rx) = mpsc::channel(BIDI_BUFFER);
        let method = self.clone();

        tokio::spawn(async move {
            while let Some(message) = inbound.next().await {
                let replies = message.and_then(|message| method.resolve(&metadata, &message));
                match replies {
                    Ok(replies) => {
                        for reply in replies {
                            if tx.send(Ok(reply)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(status) => {
                        let _ = tx.send(Err(status)).await;
                        return;
                    }
                }
            }
        });

        let outbound: ResponseStream<Res> = Box::pin(ReceiverStream::new(rx));
        Ok(Response::new(outbound))
    }
}
