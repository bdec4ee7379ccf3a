// Code adapted from: https://github.com/althea-net/guac_rs/tree/master/web3/src/jsonrpc

use super::common::{JsonRpcError, Request, Response};
use crate::{errors::RpcError, JsonRpcClient};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, ORIGIN, USER_AGENT},
    Client, Error as ReqwestError, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{value::RawValue, Value};
use std::{
    fmt::Debug,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};
use thiserror::Error;
use tracing::trace;
use url::Url;

/// A low-level JSON-RPC Client over HTTP.
///
/// # Example
///
/// ```no_run
/// use ethers_core::types::U64;
/// use ethers_frame::{JsonRpcClient, Http};
/// use std::str::FromStr;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Http::from_str("http://127.0.0.1:1248")?;
/// let chain_id: U64 = provider.request("eth_chainId", ()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Provider {
    id: AtomicU64,
    client: Client,
    url: Url,
}

#[derive(Error, Debug)]
/// Error thrown when sending an HTTP request
pub enum ClientError {
    /// Thrown if the request failed
    #[error(transparent)]
    ReqwestError(#[from] ReqwestError),

    #[error(transparent)]
    /// Thrown if the response carried a JSON-RPC error object
    JsonRpcError(#[from] JsonRpcError),

    /// Thrown if the server answered with a non-success status code
    #[error("HTTP error {status}: {text}")]
    HttpError {
        /// Response status
        status: StatusCode,
        /// The response body, if it was JSON
        body: Option<Value>,
        /// The raw response body
        text: String,
    },

    #[error("Deserialization Error: {err}. Response: {text}")]
    /// Serde JSON Error
    SerdeJson {
        /// Underlying error
        err: serde_json::Error,
        /// The contents of the HTTP response that could not be deserialized
        text: String,
    },
}

impl RpcError for ClientError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        if let ClientError::JsonRpcError(err) = self {
            Some(err)
        } else {
            None
        }
    }

    fn as_http_error_body(&self) -> Option<&Value> {
        match self {
            ClientError::HttpError { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            ClientError::SerdeJson { err, .. } => Some(err),
            _ => None,
        }
    }

    fn is_connection_error(&self) -> bool {
        matches!(self, ClientError::ReqwestError(err) if err.is_connect() || err.is_timeout())
    }
}

#[async_trait]
impl JsonRpcClient for Provider {
    type Error = ClientError;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, ClientError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let next_id = self.id.fetch_add(1, Ordering::SeqCst);
        let payload = Request::new(next_id, method, params);

        let res = self.client.post(self.url.as_ref()).json(&payload).send().await?;
        let status = res.status();
        let body = res.bytes().await?;

        if !status.is_success() {
            trace!(%status, "http error");
            return Err(ClientError::HttpError {
                status,
                body: serde_json::from_slice(&body).ok(),
                text: String::from_utf8_lossy(&body).to_string(),
            })
        }

        let raw = match serde_json::from_slice::<Response<'_>>(&body) {
            Ok(response) => response.into_result()?,
            Err(err) => {
                return Err(ClientError::SerdeJson {
                    err,
                    text: String::from_utf8_lossy(&body).to_string(),
                })
            }
        };

        let raw = raw.map(RawValue::get).unwrap_or("null");
        let res = serde_json::from_str(raw)
            .map_err(|err| ClientError::SerdeJson { err, text: raw.to_string() })?;

        Ok(res)
    }
}

impl Provider {
    /// Initializes a new HTTP Client
    ///
    /// # Example
    ///
    /// ```
    /// use ethers_frame::Http;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://127.0.0.1:1248").unwrap();
    /// let provider = Http::new(url);
    /// ```
    pub fn new(url: impl Into<Url>) -> Self {
        Self::new_with_client(url, Client::new())
    }

    /// The Url to which requests are made
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Initializes a new HTTP Client which sends the given identifying headers with every
    /// request, alongside `Content-Type: application/json`.
    ///
    /// # Example
    ///
    /// ```
    /// use ethers_frame::Http;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://127.0.0.1:1248").unwrap();
    /// let provider = Http::new_with_headers(url, "ethers-frame", "ethers-frame/0.1.0").unwrap();
    /// ```
    pub fn new_with_headers(
        url: impl Into<Url>,
        origin: &str,
        user_agent: &str,
    ) -> Result<Self, HttpBuildError> {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_str(origin)?);
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self::new_with_client(url, client))
    }

    /// Allows to customize the provider by providing your own http client
    pub fn new_with_client(url: impl Into<Url>, client: reqwest::Client) -> Self {
        Self { id: AtomicU64::new(1), client, url: url.into() }
    }
}

impl FromStr for Provider {
    type Err = url::ParseError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(src)?;
        Ok(Provider::new(url))
    }
}

impl Clone for Provider {
    fn clone(&self) -> Self {
        Self { id: AtomicU64::new(1), client: self.client.clone(), url: self.url.clone() }
    }
}

#[derive(Error, Debug)]
/// Error thrown when dealing with Http clients
pub enum HttpBuildError {
    /// Thrown if unable to build headers for client
    #[error(transparent)]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Thrown if unable to build client
    #[error(transparent)]
    ClientBuild(#[from] reqwest::Error),
}
