//! How typed replies are stored as engine return values.
//!
//! A registered reply is `[reply, error]`: the response (a message, or a list
//! of messages for streaming methods) and `Null`, or `Null` and the `Status`
//! to fail the RPC with.

use grpcmock_core::{ProtoMessage, Value};
use tonic::Status;

use crate::error::ServerError;

/// Encoder/decoder pair for one reply shape.
pub struct ReplyCodec<Out> {
    pub(crate) encode: fn(Result<Out, Status>) -> Vec<Value>,
    pub(crate) decode: fn(&str, Vec<Value>) -> Result<Out, Status>,
}

impl<Out> Clone for ReplyCodec<Out> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Out> Copy for ReplyCodec<Out> {}

impl<Out> ReplyCodec<Out> {
    pub fn encode(&self, reply: Result<Out, Status>) -> Vec<Value> {
        (self.encode)(reply)
    }

    pub fn decode(&self, method: &str, returns: Vec<Value>) -> Result<Out, Status> {
        (self.decode)(method, returns)
    }
}

pub fn single<Res: ProtoMessage + Clone>() -> ReplyCodec<Res> {
    ReplyCodec {
        encode: encode_single::<Res>,
        decode: decode_single::<Res>,
    }
}

pub fn streamed<Res: ProtoMessage + Clone>() -> ReplyCodec<Vec<Res>> {
    ReplyCodec {
        encode: encode_streamed::<Res>,
        decode: decode_streamed::<Res>,
    }
}

fn encode_single<Res: ProtoMessage>(reply: Result<Res, Status>) -> Vec<Value> {
    match reply {
        Ok(res) => vec![Value::message(res), Value::Null],
        Err(status) => vec![Value::Null, Value::opaque(status)],
    }
}

fn encode_streamed<Res: ProtoMessage>(reply: Result<Vec<Res>, Status>) -> Vec<Value> {
    match reply {
        Ok(items) => vec![
            Value::List(items.into_iter().map(Value::message).collect()),
            Value::Null,
        ],
        Err(status) => vec![Value::Null, Value::opaque(status)],
    }
}

/// Split `[reply, error?]`, surfacing a registered `Status` as the error.
fn split(method: &str, returns: &[Value], expected: &'static str) -> Result<Value, Status> {
    let unexpected = || {
        Status::from(ServerError::UnexpectedReturn {
            method: method.to_owned(),
            expected,
        })
    };
    match returns {
        [reply] => Ok(reply.clone()),
        [reply, error] => match error.as_opaque::<Status>() {
            Some(status) => Err(status.clone()),
            None if error.is_null() => Ok(reply.clone()),
            None => Err(unexpected()),
        },
        _ => Err(unexpected()),
    }
}

fn decode_single<Res: ProtoMessage + Clone>(
    method: &str,
    returns: Vec<Value>,
) -> Result<Res, Status> {
    const EXPECTED: &str = "a response message";
    split(method, &returns, EXPECTED)?
        .to_message::<Res>()
        .ok_or_else(|| {
            Status::from(ServerError::UnexpectedReturn {
                method: method.to_owned(),
                expected: EXPECTED,
            })
        })
}

fn decode_streamed<Res: ProtoMessage + Clone>(
    method: &str,
    returns: Vec<Value>,
) -> Result<Vec<Res>, Status> {
    const EXPECTED: &str = "a list of response messages";
    let unexpected = || {
        Status::from(ServerError::UnexpectedReturn {
            method: method.to_owned(),
            expected: EXPECTED,
        })
    };
    let reply = split(method, &returns, EXPECTED)?;
    let items = reply.as_list().ok_or_else(unexpected)?;
    items
        .iter()
        .map(|item| item.to_message::<Res>().ok_or_else(unexpected))
        .collect()
}
