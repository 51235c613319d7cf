use qrpc::rpc::{FromValue, IntoValue, Value, ValueError, take_field};
use qrpc_service_endpoint::{RpcService, error::RpcServiceEndpointError};
use std::collections::BTreeMap;
use thiserror::Error;

pub const GOODS_SERVICE: &str = "goods";
pub const FIND_METHOD: &str = "Find";

#[derive(Debug, Clone, PartialEq)]
pub struct Goods {
    pub id: i64,
    pub name: String,
}

/// Envelope returned by `Find`.
#[derive(Debug, Clone, PartialEq)]
pub struct GoodsResult {
    pub code: i64,
    pub msg: String,
    pub data: Goods,
}

#[derive(Debug, Error)]
pub enum GoodsError {
    #[error("goods {0} not found")]
    NotFound(i64),
}

impl IntoValue for Goods {
    fn into_value(self) -> Value {
        Value::Map(BTreeMap::from([
            ("id".to_string(), self.id.into_value()),
            ("name".to_string(), self.name.into_value()),
        ]))
    }
}

impl FromValue for Goods {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut map = BTreeMap::<String, Value>::from_value(value)?;
        Ok(Goods {
            id: take_field(&mut map, "id")?,
            name: take_field(&mut map, "name")?,
        })
    }
}

impl IntoValue for GoodsResult {
    fn into_value(self) -> Value {
        Value::Map(BTreeMap::from([
            ("code".to_string(), self.code.into_value()),
            ("msg".to_string(), self.msg.into_value()),
            ("data".to_string(), self.data.into_value()),
        ]))
    }
}

impl FromValue for GoodsResult {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut map = BTreeMap::<String, Value>::from_value(value)?;
        Ok(GoodsResult {
            code: take_field(&mut map, "code")?,
            msg: take_field(&mut map, "msg")?,
            data: take_field(&mut map, "data")?,
        })
    }
}

/// Looks up one goods record. Ids must be positive.
pub async fn find(id: i64) -> Result<GoodsResult, GoodsError> {
    if id <= 0 {
        return Err(GoodsError::NotFound(id));
    }

    Ok(GoodsResult {
        code: 200,
        msg: "success".to_string(),
        data: Goods {
            id,
            name: "goods center 9222".to_string(),
        },
    })
}

/// Builds the `goods` service with its `Find` method registered.
pub fn goods_service() -> Result<RpcService, RpcServiceEndpointError> {
    let mut service = RpcService::new();
    service.register(FIND_METHOD, |(id,): (i64,)| find(id))?;
    Ok(service)
}
