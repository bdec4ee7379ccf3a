use serde::{
    de::{self, Unexpected},
    Deserialize, Deserializer, Serialize,
};
use serde_json::{value::RawValue, Value};
use std::fmt;
use thiserror::Error;

/// A JSON-RPC 2.0 error
///
/// Frame does not always populate `code`, so it defaults to `0` when missing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Error)]
pub struct JsonRpcError {
    /// The error code
    #[serde(default)]
    pub code: i64,
    /// The error message
    pub message: String,
    /// Additional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Builds an error with the given message and no code
    pub fn new(message: impl Into<String>) -> Self {
        Self { code: 0, message: message.into(), data: None }
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(code: {}, message: {}, data: {:?})", self.code, self.message, self.data)
    }
}

fn is_zst<T>(_t: &T) -> bool {
    std::mem::size_of::<T>() == 0
}

#[derive(Serialize, Deserialize, Debug)]
/// A JSON-RPC request
pub struct Request<'a, T> {
    id: u64,
    jsonrpc: &'a str,
    method: &'a str,
    #[serde(skip_serializing_if = "is_zst")]
    params: T,
}

impl<'a, T> Request<'a, T> {
    /// Creates a new JSON RPC request
    pub fn new(id: u64, method: &'a str, params: T) -> Self {
        Self { id, jsonrpc: "2.0", method, params }
    }
}

/// A JSON-RPC response, carrying either a `result` or an `error`.
#[derive(Deserialize, Debug)]
pub struct Response<'a> {
    #[serde(rename = "jsonrpc", deserialize_with = "jsonrpc_version")]
    _jsonrpc: (),
    /// The id of the request this answers
    pub id: u64,
    #[serde(borrow, default)]
    result: Option<&'a RawValue>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

impl<'a> Response<'a> {
    /// The raw result, `None` when it is `null` or absent
    pub fn into_result(self) -> Result<Option<&'a RawValue>, JsonRpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}

fn jsonrpc_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<(), D::Error> {
    let version = <&str>::deserialize(deserializer)?;
    if version != "2.0" {
        return Err(de::Error::invalid_value(Unexpected::Str(version), &"2.0"))
    }
    Ok(())
}
