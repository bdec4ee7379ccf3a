use crate::transports::{HttpBuildError, JsonRpcError};
use ethers_core::types::SignatureError;
use serde_json::Value;
use std::{error::Error, fmt::Debug};
use thiserror::Error;

/// The message Frame replies with when the user rejects a request in its UI.
///
/// Compared exactly, on both the in-band JSON-RPC error and the HTTP error body.
pub const USER_DECLINED: &str = "User declined transaction";

/// An `RpcError` is an abstraction over error types returned by a
/// [`crate::JsonRpcClient`].
///
/// Frame surfaces failures through two channels: a JSON-RPC error object inside an
/// otherwise successful HTTP response, and an HTTP-level failure whose body may itself
/// carry a JSON-RPC error. This trait exposes both so that [`translate`] can collapse
/// them into a single outcome.
pub trait RpcError: Error + Debug + Send + Sync {
    /// Access an underlying in-band [`JsonRpcError`] (if any)
    fn as_error_response(&self) -> Option<&JsonRpcError>;

    /// Returns `true` if the underlying error is a JSON-RPC error response
    fn is_error_response(&self) -> bool {
        self.as_error_response().is_some()
    }

    /// Access the JSON body of an HTTP-level failure (if the transport got one)
    fn as_http_error_body(&self) -> Option<&Value> {
        None
    }

    /// Access an underlying `serde_json` error (if any)
    fn as_serde_error(&self) -> Option<&serde_json::Error>;

    /// Returns `true` if the endpoint could not be reached at all
    fn is_connection_error(&self) -> bool {
        false
    }
}

#[derive(Debug, Error)]
/// Errors surfaced by the Frame account and provider
pub enum FrameError {
    /// The endpoint is unreachable or is not Frame
    #[error("not connected to Frame: {0}")]
    NotConnected(String),

    /// A JSON-RPC or transport failure other than a user decline
    #[error("{message}")]
    ProviderFailure {
        /// Human readable message extracted from the failure
        message: String,
        /// The original error
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    /// Signing produced nothing usable and no decline was reported
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Frame only broadcasts to the public mempool
    #[error("Private Mempool not supported by Frame")]
    PrivateSubmissionUnsupported,

    /// The input to sign or verify has no recognized shape
    #[error("unsupported message type: {0}")]
    UnsupportedMessageType(String),

    /// Frame returned a signature that is not 65 bytes long
    #[error("malformed signature: expected 65 bytes, got {0}")]
    MalformedSignature(usize),

    /// Frame did not switch to the requested chain
    #[error("Frame is on chain {actual}, expected {expected}")]
    ChainMismatch {
        /// The chain id the provider was configured for
        expected: u64,
        /// The chain id Frame reported after switching
        actual: u64,
    },

    /// Connecting failed after Frame was switched, and switching it back failed too
    #[error("{error}; restoring Frame's original chain failed: {restore}")]
    RestoreFailed {
        /// Why connecting failed
        error: Box<FrameError>,
        /// Why the original chain could not be restored
        restore: Box<FrameError>,
    },

    /// Signature recovery failed
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// EIP-712 encoding of typed data failed
    #[error("eip712 error: {0}")]
    Eip712(String),

    /// Error in underlying lib `serde_json`
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// The HTTP transport could not be built
    #[error(transparent)]
    HttpBuild(#[from] HttpBuildError),
}

impl FrameError {
    /// Wraps any error raised while setting up a session as a connection failure
    pub(crate) fn connect_failed(err: FrameError) -> Self {
        match err {
            FrameError::NotConnected(_) => err,
            err => FrameError::ProviderFailure {
                message: format!("Failed to connect to Frame.\n{err:?}"),
                source: Box::new(err),
            },
        }
    }

    /// Returns `true` for [`FrameError::ProviderFailure`]
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, FrameError::ProviderFailure { .. })
    }
}

/// Outcome of a failed signer request, before it reaches the public boundary.
#[derive(Debug)]
pub(crate) enum SignError {
    /// The user rejected the request in Frame
    Declined,
    Failed(FrameError),
}

impl From<FrameError> for SignError {
    fn from(err: FrameError) -> Self {
        SignError::Failed(err)
    }
}

impl SignError {
    /// Collapses a decline into an empty result
    pub(crate) fn into_option<T>(res: Result<T, SignError>) -> Result<Option<T>, FrameError> {
        match res {
            Ok(value) => Ok(Some(value)),
            Err(SignError::Declined) => Ok(None),
            Err(SignError::Failed(err)) => Err(err),
        }
    }

    /// Treats a decline as a provider failure carrying the decline message
    pub(crate) fn into_failure(self) -> FrameError {
        match self {
            SignError::Declined => FrameError::ProviderFailure {
                message: USER_DECLINED.to_string(),
                source: Box::new(JsonRpcError::new(USER_DECLINED)),
            },
            SignError::Failed(err) => err,
        }
    }
}

/// Extracts the message of an `{"error": ...}` HTTP error body, if it has one.
fn http_error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    let message = match error {
        Value::Object(obj) => match obj.get("message").and_then(Value::as_str) {
            Some(msg) => msg.to_string(),
            None => error.to_string(),
        },
        Value::String(msg) => msg.clone(),
        other => other.to_string(),
    };
    Some(message)
}

/// Translates a transport failure into a decline or a typed [`FrameError`].
pub(crate) fn translate<E: RpcError + 'static>(err: E) -> SignError {
    let message = err
        .as_error_response()
        .map(|rpc| rpc.message.clone())
        .or_else(|| err.as_http_error_body().and_then(http_error_message));

    let message = match message {
        Some(message) => message,
        // no JSON-RPC payload at all, keep the transport's own text
        None => {
            return SignError::Failed(FrameError::ProviderFailure {
                message: err.to_string(),
                source: Box::new(err),
            })
        }
    };

    if message == USER_DECLINED {
        tracing::debug!("request declined in Frame");
        return SignError::Declined
    }

    SignError::Failed(FrameError::ProviderFailure { message, source: Box::new(err) })
}

/// Like [`translate`], but an unreachable endpoint is reported as
/// [`FrameError::NotConnected`].
pub(crate) fn translate_unreachable<E: RpcError + 'static>(err: E) -> SignError {
    if err.is_connection_error() {
        return SignError::Failed(FrameError::NotConnected(err.to_string()))
    }
    translate(err)
}
