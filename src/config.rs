use crate::{transports::Http, FrameError};
use std::time::Duration;
use url::Url;

/// Where Frame listens by default
pub const DEFAULT_FRAME_URL: &str = "http://127.0.0.1:1248";

/// The default interval at which a submitted transaction's receipt is polled for
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(7000);

/// The local Frame endpoint and the headers identifying this client to it.
///
/// Two endpoints with the same fields address the same signer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignerEndpoint {
    url: Url,
    origin: String,
    user_agent: String,
}

impl Default for SignerEndpoint {
    fn default() -> Self {
        Self {
            // the constant is a well-formed url
            url: Url::parse(DEFAULT_FRAME_URL).expect("valid default url"),
            origin: env!("CARGO_PKG_NAME").to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SignerEndpoint {
    /// An endpoint at `url` with the default identifying headers
    pub fn new(url: Url) -> Self {
        Self { url, ..Default::default() }
    }

    /// Sets the `Origin` header
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Sets the `User-Agent` header
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The url requests are sent to
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Builds the HTTP transport for this endpoint
    pub fn connect(&self) -> Result<Http, FrameError> {
        let (origin, user_agent) = self.headers();
        Ok(Http::new_with_headers(self.url.clone(), origin, user_agent)?)
    }

    /// The `Origin` and `User-Agent` header values
    pub fn headers(&self) -> (&str, &str) {
        (&self.origin, &self.user_agent)
    }
}

/// How [`crate::Account::sign_transaction`] obtains a signature.
///
/// The two strategies return different things and are never mixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransactionStrategy {
    /// Ask Frame to `eth_sign` the transaction's sighash and return the signed
    /// transaction without broadcasting it.
    SignDigest,
    /// Ask Frame to sign and broadcast with `eth_sendTransaction`, then wait for the receipt.
    #[default]
    SendTransaction,
}

/// Configuration shared by the Frame account and provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameConfig {
    /// The Frame endpoint
    pub endpoint: SignerEndpoint,
    /// How transactions are signed
    pub strategy: TransactionStrategy,
    /// How often to poll for the receipt of a submitted transaction
    pub poll_interval: Duration,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            endpoint: SignerEndpoint::default(),
            strategy: TransactionStrategy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl FrameConfig {
    /// Sets the endpoint
    #[must_use]
    pub fn endpoint(mut self, endpoint: SignerEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the transaction signing strategy
    #[must_use]
    pub fn strategy(mut self, strategy: TransactionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the receipt poll interval
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
