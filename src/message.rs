//! The shapes of data Frame can be asked to sign.

use crate::FrameError;
use ethers_core::{
    types::{
        transaction::eip712::{Eip712, TypedData},
        Bytes, RecoveryMessage, Signature, H256, U256,
    },
    utils::keccak256,
};
use serde_json::Value;
use std::convert::TryFrom;

/// Version byte of an EIP-191 personal message (`"E"`)
pub const PERSONAL_MESSAGE_VERSION: u8 = 0x45;

/// An EIP-191 message whose signable body has already been assembled.
///
/// Only the `body` is sent to Frame, which applies its own personal-message prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignableMessage {
    /// The EIP-191 version byte
    pub version: u8,
    /// Version specific header
    pub header: Bytes,
    /// The message body
    pub body: Bytes,
}

impl SignableMessage {
    /// Builds a `0x45` personal message, i.e. what Frame signs for `eth_sign`
    pub fn personal(body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let header = format!("thereum Signed Message:\n{}", body.len());
        Self { version: PERSONAL_MESSAGE_VERSION, header: header.into_bytes().into(), body }
    }

    /// `keccak256(0x19 || version || header || body)`
    pub fn hash(&self) -> H256 {
        let mut buf = Vec::with_capacity(2 + self.header.len() + self.body.len());
        buf.push(0x19);
        buf.push(self.version);
        buf.extend_from_slice(&self.header);
        buf.extend_from_slice(&self.body);
        keccak256(buf).into()
    }
}

/// Something Frame can sign.
#[derive(Clone, Debug)]
pub enum SignableInput {
    /// UTF-8 text, signed as a personal message
    Text(String),
    /// An integer, signed as its minimal big-endian bytes
    Integer(U256),
    /// Raw bytes, signed as a personal message
    Bytes(Bytes),
    /// A pre-built EIP-191 message, only its body is sent
    Prehashed(SignableMessage),
    /// EIP-712 typed data
    TypedData(Box<TypedData>),
}

/// Minimal big-endian encoding of `value`, zero encodes as a single `0x00` byte.
pub fn integer_bytes(value: U256) -> Vec<u8> {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    let start = buf.iter().position(|b| *b != 0).unwrap_or(31);
    buf[start..].to_vec()
}

impl SignableInput {
    /// A short name for the kind of input, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            SignableInput::Text(_) => "text",
            SignableInput::Integer(_) => "integer",
            SignableInput::Bytes(_) => "bytes",
            SignableInput::Prehashed(_) => "signable message",
            SignableInput::TypedData(_) => "typed data",
        }
    }

    /// The message the signature is recovered against, normalized the same way it was
    /// before signing.
    ///
    /// With `recover_using_eip191` unset, raw bytes must be a 32 byte hash.
    pub fn recovery_message(
        &self,
        recover_using_eip191: bool,
    ) -> Result<RecoveryMessage, FrameError> {
        let message = match self {
            SignableInput::Text(text) => RecoveryMessage::Data(text.as_bytes().to_vec()),
            SignableInput::Integer(value) => RecoveryMessage::Data(integer_bytes(*value)),
            SignableInput::Bytes(bytes) if recover_using_eip191 => {
                RecoveryMessage::Data(bytes.to_vec())
            }
            SignableInput::Bytes(bytes) if bytes.len() == 32 => {
                RecoveryMessage::Hash(H256::from_slice(bytes))
            }
            SignableInput::Bytes(bytes) => {
                return Err(FrameError::UnsupportedMessageType(format!(
                    "raw hash must be 32 bytes, got {}",
                    bytes.len()
                )))
            }
            // Frame signs the body as a personal message
            SignableInput::Prehashed(msg) => RecoveryMessage::Data(msg.body.to_vec()),
            SignableInput::TypedData(data) => RecoveryMessage::Hash(
                data.encode_eip712().map_err(|err| FrameError::Eip712(err.to_string()))?.into(),
            ),
        };
        Ok(message)
    }
}

impl From<&str> for SignableInput {
    fn from(s: &str) -> Self {
        SignableInput::Text(s.to_string())
    }
}

impl From<String> for SignableInput {
    fn from(s: String) -> Self {
        SignableInput::Text(s)
    }
}

impl From<U256> for SignableInput {
    fn from(value: U256) -> Self {
        SignableInput::Integer(value)
    }
}

impl From<u64> for SignableInput {
    fn from(value: u64) -> Self {
        SignableInput::Integer(value.into())
    }
}

impl From<Bytes> for SignableInput {
    fn from(bytes: Bytes) -> Self {
        SignableInput::Bytes(bytes)
    }
}

impl From<Vec<u8>> for SignableInput {
    fn from(bytes: Vec<u8>) -> Self {
        SignableInput::Bytes(bytes.into())
    }
}

impl From<&[u8]> for SignableInput {
    fn from(bytes: &[u8]) -> Self {
        SignableInput::Bytes(bytes.to_vec().into())
    }
}

impl From<SignableMessage> for SignableInput {
    fn from(msg: SignableMessage) -> Self {
        SignableInput::Prehashed(msg)
    }
}

impl From<TypedData> for SignableInput {
    fn from(data: TypedData) -> Self {
        SignableInput::TypedData(Box::new(data))
    }
}

/// Classifies dynamically typed input: strings are text, non-negative integers are
/// integers, objects must be EIP-712 typed data. Everything else is rejected.
impl TryFrom<Value> for SignableInput {
    type Error = FrameError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(SignableInput::Text(text)),
            Value::Number(ref n) => n.as_u64().map(SignableInput::from).ok_or_else(|| {
                FrameError::UnsupportedMessageType(format!("number {value} is not unsigned"))
            }),
            Value::Object(_) => serde_json::from_value::<TypedData>(value)
                .map(SignableInput::from)
                .map_err(|err| FrameError::UnsupportedMessageType(format!("object: {err}"))),
            Value::Null => Err(FrameError::UnsupportedMessageType("null".to_string())),
            Value::Bool(_) => Err(FrameError::UnsupportedMessageType("bool".to_string())),
            Value::Array(_) => Err(FrameError::UnsupportedMessageType("array".to_string())),
        }
    }
}

/// Splits the 65 raw bytes Frame returns into a [`Signature`].
///
/// `r` is `bytes[0..32]`, `s` is `bytes[32..64]` and `v` is `bytes[64]`, passed through
/// without normalization.
pub fn decode_signature(raw: &[u8]) -> Result<Signature, FrameError> {
    if raw.len() != 65 {
        return Err(FrameError::MalformedSignature(raw.len()))
    }
    Ok(Signature {
        r: U256::from_big_endian(&raw[0..32]),
        s: U256::from_big_endian(&raw[32..64]),
        v: raw[64].into(),
    })
}
