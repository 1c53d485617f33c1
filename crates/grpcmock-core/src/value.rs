//! Argument and return values handled by the engine.
//!
//! `Value` is a closed set of categories. Equality is loose across
//! representations that describe the same datum (integer widths, integral
//! floats, strings vs UTF-8 bytes) and delegates to protobuf structural
//! equality for messages.

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A protobuf message usable as a [`Value`].
///
/// Implemented for every `prost::Message + PartialEq + Debug`. Equality compares the
/// decoded structs, so unset and default-valued proto3 fields compare equal and
/// unknown fields (dropped by prost on decode) never cause a mismatch.
pub trait ProtoMessage: fmt::Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn message_eq(&self, other: &dyn ProtoMessage) -> bool;
}

impl<T> ProtoMessage for T
where
    T: prost::Message + PartialEq + fmt::Debug + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn message_eq(&self, other: &dyn ProtoMessage) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// Shared handle to a protobuf message.
#[derive(Clone)]
pub struct DynMessage(Arc<dyn ProtoMessage>);

impl DynMessage {
    pub fn new<M: ProtoMessage>(message: M) -> Self {
        Self(Arc::new(message))
    }

    pub fn downcast_ref<M: ProtoMessage>(&self) -> Option<&M> {
        self.0.as_any().downcast_ref::<M>()
    }
}

impl fmt::Debug for DynMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for DynMessage {
    fn eq(&self, other: &Self) -> bool {
        self.0.message_eq(other.0.as_ref())
    }
}

/// Any other Rust value, compared by identity.
///
/// Used by serving shims to carry values that have no structural category,
/// such as a `tonic::Status` registered as an error return.
#[derive(Clone)]
pub struct Opaque {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque<{}>", self.type_name)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Message(DynMessage),
    Opaque(Opaque),
}

impl Value {
    pub fn message<M: ProtoMessage>(message: M) -> Self {
        Self::Message(DynMessage::new(message))
    }

    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(Opaque::new(value))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_message<M: ProtoMessage>(&self) -> Option<&M> {
        match self {
            Self::Message(m) => m.downcast_ref::<M>(),
            _ => None,
        }
    }

    /// Clone the message out if this value holds an `M`.
    pub fn to_message<M: ProtoMessage + Clone>(&self) -> Option<M> {
        self.as_message::<M>().cloned()
    }

    pub fn as_opaque<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(o) => o.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;

        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (UInt(a), UInt(b)) => a == b,
            (Int(i), UInt(u)) | (UInt(u), Int(i)) => u64::try_from(*i).is_ok_and(|i| i == *u),
            (Float(a), Float(b)) => a == b,
            (Float(f), Int(i)) | (Int(i), Float(f)) => float_eq_integer(*f, i128::from(*i)),
            (Float(f), UInt(u)) | (UInt(u), Float(f)) => float_eq_integer(*f, i128::from(*u)),
            (String(a), String(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (String(s), Bytes(b)) | (Bytes(b), String(s)) => s.as_bytes() == b.as_slice(),
            (List(a), List(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Message(a), Message(b)) => a == b,
            (Opaque(a), Opaque(b)) => a == b,
            _ => false,
        }
    }
}

fn float_eq_integer(f: f64, i: i128) -> bool {
    f.is_finite() && f.fract() == 0.0 && f as i128 == i
}

macro_rules! impl_from {
    ($variant:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )+
    };
}

impl_from!(Bool: bool);
impl_from!(Int: i8, i16, i32, i64);
impl_from!(UInt: u8, u16, u32, u64);
impl_from!(Float: f32, f64);
impl_from!(String: &str, String, &String);

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

// Saturates on targets wider than 64 bits.
impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::UInt(u64::try_from(v).unwrap_or(u64::MAX))
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(if v < 0 { i64::MIN } else { i64::MAX }))
    }
}

impl From<DynMessage> for Value {
    fn from(m: DynMessage) -> Self {
        Self::Message(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
            serde_json::Value::Object(entries) => {
                Self::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
