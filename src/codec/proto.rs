//! Protocol-Buffers encoding of requests and responses.
//!
//! The native [`Value`] has no schema, so the dynamic parts of a message
//! (arguments and result data) travel as `google.protobuf.Value`. The
//! functions below map between the two representations and are the only
//! place that knows about the translation.

use crate::{
    codec::{CodecError, Serializer},
    frame::{CompressType, SerializeType},
    rpc::{RpcRequest, RpcResponse, Value},
};
use prost::Message;
use prost_types::{ListValue, Struct, value::Kind};
use std::collections::BTreeMap;

// Largest magnitude at which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: u64 = 1 << 53;

#[derive(Clone, PartialEq, Message)]
pub struct ProtoRequest {
    #[prost(uint64, tag = "1")]
    pub request_id: u64,
    #[prost(string, tag = "2")]
    pub service_name: String,
    #[prost(string, tag = "3")]
    pub method_name: String,
    #[prost(message, repeated, tag = "4")]
    pub args: Vec<prost_types::Value>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoResponse {
    #[prost(uint64, tag = "1")]
    pub request_id: u64,
    #[prost(uint32, tag = "2")]
    pub code: u32,
    #[prost(string, tag = "3")]
    pub message: String,
    #[prost(uint32, tag = "4")]
    pub compress_type: u32,
    #[prost(uint32, tag = "5")]
    pub serialize_type: u32,
    #[prost(message, optional, tag = "6")]
    pub data: Option<prost_types::Value>,
}

/// Maps a [`Value`] onto `google.protobuf.Value`.
///
/// Numbers are doubles on this side, so an `Int` outside ±2^53 cannot be
/// carried exactly and is rejected with [`CodecError::InvalidField`].
pub fn value_to_proto(value: &Value) -> Result<prost_types::Value, CodecError> {
    let kind = match value {
        Value::Null => Kind::NullValue(prost_types::NullValue::NullValue as i32),
        Value::Bool(b) => Kind::BoolValue(*b),
        Value::Int(i) => {
            if i.unsigned_abs() > MAX_SAFE_INTEGER {
                return Err(CodecError::InvalidField(format!(
                    "integer {} is outside the range a protobuf number holds exactly",
                    i
                )));
            }
            Kind::NumberValue(*i as f64)
        }
        Value::Float(f) => Kind::NumberValue(*f),
        Value::Str(s) => Kind::StringValue(s.clone()),
        Value::List(items) => Kind::ListValue(ListValue {
            values: items.iter().map(value_to_proto).collect::<Result<_, _>>()?,
        }),
        Value::Map(map) => Kind::StructValue(Struct {
            fields: map
                .iter()
                .map(|(k, v)| Ok((k.clone(), value_to_proto(v)?)))
                .collect::<Result<_, CodecError>>()?,
        }),
    };

    Ok(prost_types::Value { kind: Some(kind) })
}

/// Inverse of [`value_to_proto`]. Numbers come back as `Int` when they are
/// integral and exactly representable, otherwise as `Float`.
pub fn value_from_proto(value: prost_types::Value) -> Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::NumberValue(n)) => {
            if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER as f64 {
                Value::Int(n as i64)
            } else {
                Value::Float(n)
            }
        }
        Some(Kind::StringValue(s)) => Value::Str(s),
        Some(Kind::ListValue(list)) => {
            Value::List(list.values.into_iter().map(value_from_proto).collect())
        }
        Some(Kind::StructValue(st)) => Value::Map(
            st.fields
                .into_iter()
                .map(|(k, v)| (k, value_from_proto(v)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}

pub fn request_to_proto(request: &RpcRequest) -> Result<ProtoRequest, CodecError> {
    Ok(ProtoRequest {
        request_id: request.request_id,
        service_name: request.service_name.clone(),
        method_name: request.method_name.clone(),
        args: request
            .args
            .iter()
            .map(value_to_proto)
            .collect::<Result<_, _>>()?,
    })
}

pub fn request_from_proto(proto: ProtoRequest) -> RpcRequest {
    RpcRequest {
        request_id: proto.request_id,
        service_name: proto.service_name,
        method_name: proto.method_name,
        args: proto.args.into_iter().map(value_from_proto).collect(),
    }
}

pub fn response_to_proto(response: &RpcResponse) -> Result<ProtoResponse, CodecError> {
    Ok(ProtoResponse {
        request_id: response.request_id,
        code: response.code as u32,
        message: response.message.clone(),
        compress_type: u8::from(response.compress_type) as u32,
        serialize_type: u8::from(response.serialize_type) as u32,
        data: Some(value_to_proto(&response.data)?),
    })
}

pub fn response_from_proto(proto: ProtoResponse) -> Result<RpcResponse, CodecError> {
    let code = u16::try_from(proto.code)
        .map_err(|_| CodecError::InvalidField(format!("response code {}", proto.code)))?;

    let compress_type = u8::try_from(proto.compress_type)
        .ok()
        .and_then(|b| CompressType::try_from(b).ok())
        .ok_or_else(|| CodecError::InvalidField(format!("compress type {}", proto.compress_type)))?;

    let serialize_type = u8::try_from(proto.serialize_type)
        .ok()
        .and_then(|b| SerializeType::try_from(b).ok())
        .ok_or_else(|| {
            CodecError::InvalidField(format!("serialize type {}", proto.serialize_type))
        })?;

    Ok(RpcResponse {
        request_id: proto.request_id,
        code,
        message: proto.message,
        compress_type,
        serialize_type,
        data: proto.data.map(value_from_proto).unwrap_or_default(),
    })
}

/// Schema-based encoding through [`ProtoRequest`] and [`ProtoResponse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufSerializer;

impl Serializer<RpcRequest> for ProtobufSerializer {
    fn serialize(&self, message: &RpcRequest) -> Result<Vec<u8>, CodecError> {
        Ok(request_to_proto(message)?.encode_to_vec())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<RpcRequest, CodecError> {
        Ok(request_from_proto(ProtoRequest::decode(bytes)?))
    }
}

impl Serializer<RpcResponse> for ProtobufSerializer {
    fn serialize(&self, message: &RpcResponse) -> Result<Vec<u8>, CodecError> {
        Ok(response_to_proto(message)?.encode_to_vec())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<RpcResponse, CodecError> {
        response_from_proto(ProtoResponse::decode(bytes)?)
    }
}
