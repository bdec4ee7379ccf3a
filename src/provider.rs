use crate::{
    config::SignerEndpoint,
    errors::{translate, translate_unreachable},
    middleware::{ExtraDataToPoa, ResponseMiddleware},
    networks::{is_poa_chain, Network},
    transports::{send, Http},
    ChainProvider, FrameError, JsonRpcClient, UpstreamProvider,
};
use async_trait::async_trait;
use ethers_core::types::U64;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::fmt::Debug;
use tracing::{debug, instrument, warn};

/// Frame's `web3_clientVersion` contains this marker
pub const FRAME_CLIENT_MARKER: &str = "Frame";

/// Where a [`FrameProvider`] is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session
    Disconnected,
    /// Identifying Frame and negotiating the chain
    Connecting,
    /// Frame is on the configured chain
    Connected,
}

/// State that only exists while connected
#[derive(Debug)]
struct Session {
    /// The chain Frame was on before this session switched it
    original_chain_id: u64,
    chain_id: u64,
    middleware: Vec<Box<dyn ResponseMiddleware>>,
}

#[derive(Debug)]
enum State {
    Disconnected,
    Connecting,
    Connected(Session),
}

/// Frame as a JSON-RPC provider for one network.
///
/// Connecting makes sure Frame is on the provider's network, switching it if needed, and
/// disconnecting switches Frame back to the chain it was on before.
///
/// ```no_run
/// use ethers_core::types::U64;
/// use ethers_frame::{ChainProvider, FrameProvider, Network};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let mut provider = FrameProvider::new(Network::sepolia())?;
/// provider.connect().await?;
/// let block: U64 = provider.request("eth_blockNumber", ()).await?;
/// provider.disconnect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FrameProvider<C = Http> {
    client: C,
    network: Network,
    state: State,
}

impl FrameProvider<Http> {
    /// A provider for `network` at Frame's default endpoint
    pub fn new(network: Network) -> Result<Self, FrameError> {
        Self::with_endpoint(network, &SignerEndpoint::default())
    }

    /// A provider for `network` at the given endpoint
    pub fn with_endpoint(network: Network, endpoint: &SignerEndpoint) -> Result<Self, FrameError> {
        Ok(Self::new_with_client(endpoint.connect()?, network))
    }

    /// The url of the Frame endpoint
    pub fn uri(&self) -> &url::Url {
        self.client.url()
    }
}

impl<C: JsonRpcClient> FrameProvider<C> {
    /// Uses the provided transport to talk to Frame
    pub fn new_with_client(client: C, network: Network) -> Self {
        Self { client, network, state: State::Disconnected }
    }

    /// The network this provider serves
    pub fn network(&self) -> Network {
        self.network
    }

    /// The lifecycle state of the provider
    pub fn state(&self) -> ConnectionState {
        match self.state {
            State::Disconnected => ConnectionState::Disconnected,
            State::Connecting => ConnectionState::Connecting,
            State::Connected(_) => ConnectionState::Connected,
        }
    }

    /// The chain Frame was on when this provider connected
    pub fn original_chain_id(&self) -> Option<u64> {
        self.session().map(|s| s.original_chain_id)
    }

    /// Names of the response middleware installed for this session
    pub fn middleware(&self) -> Vec<&'static str> {
        self.session()
            .map(|s| s.middleware.iter().map(|m| m.name()).collect())
            .unwrap_or_default()
    }

    /// Make a typed RPC request through [`ChainProvider::make_request`].
    pub async fn request<T, R>(&self, method: &str, params: T) -> Result<R, FrameError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        let res = self.make_request(method, params).await?;
        Ok(serde_json::from_value(res)?)
    }

    fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Connected(session) => Some(session),
            _ => None,
        }
    }

    async fn query<T, R>(&self, method: &str, params: T) -> Result<R, FrameError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        send(&self.client, method, params).await.map_err(|err| translate(err).into_failure())
    }

    async fn query_chain_id(&self) -> Result<u64, FrameError> {
        let chain_id: U64 = self.query("eth_chainId", ()).await?;
        Ok(chain_id.as_u64())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), FrameError> {
        debug!(chain_id, "switching Frame's chain");
        let params = [json!({ "chainId": format!("{chain_id:#x}") })];
        let _: Value = self.query("wallet_switchEthereumChain", params).await?;
        Ok(())
    }

    async fn open_session(&self) -> Result<Session, FrameError> {
        let client_version: String = send(&self.client, "web3_clientVersion", ())
            .await
            .map_err(|err| translate_unreachable(err).into_failure())?;
        if !client_version.contains(FRAME_CLIENT_MARKER) {
            return Err(FrameError::NotConnected(format!(
                "endpoint identifies as {client_version:?}, not Frame"
            )))
        }

        let original_chain_id = self.query_chain_id().await?;
        let chain_id = self.network.chain_id;

        if original_chain_id != chain_id {
            self.switch_chain(chain_id).await?;
            // Frame may have switched already, so it is put back before failing
            if let Err(err) = self.confirm_chain(chain_id).await {
                return Err(self.restore_chain(original_chain_id, err).await)
            }
        }

        let mut middleware: Vec<Box<dyn ResponseMiddleware>> = Vec::new();
        if is_poa_chain(chain_id) {
            middleware.push(Box::new(ExtraDataToPoa));
        }

        Ok(Session { original_chain_id, chain_id, middleware })
    }

    async fn confirm_chain(&self, expected: u64) -> Result<(), FrameError> {
        let chain_id = self.query_chain_id().await?;
        if chain_id != expected {
            warn!(chain_id, expected, "Frame did not switch to the requested chain");
            return Err(FrameError::ChainMismatch { expected, actual: chain_id })
        }
        Ok(())
    }

    /// Switches Frame back after a failed connect, returning the error to report
    async fn restore_chain(&self, original_chain_id: u64, err: FrameError) -> FrameError {
        debug!(chain_id = original_chain_id, "restoring Frame's original chain");
        match self.switch_chain(original_chain_id).await {
            Ok(()) => err,
            Err(restore) => {
                warn!(%restore, "failed to restore Frame's original chain");
                FrameError::RestoreFailed { error: Box::new(err), restore: Box::new(restore) }
            }
        }
    }
}

#[async_trait]
impl<C: JsonRpcClient> ChainProvider for FrameProvider<C> {
    type Error = FrameError;

    #[instrument(skip(self), fields(network = %self.network))]
    async fn connect(&mut self) -> Result<(), FrameError> {
        if self.is_connected() {
            return Ok(())
        }

        self.state = State::Connecting;
        match self.open_session().await {
            Ok(session) => {
                debug!(
                    original_chain_id = session.original_chain_id,
                    chain_id = session.chain_id,
                    "connected to Frame"
                );
                self.state = State::Connected(session);
                Ok(())
            }
            Err(err) => {
                self.state = State::Disconnected;
                Err(FrameError::connect_failed(err))
            }
        }
    }

    #[instrument(skip(self), fields(network = %self.network))]
    async fn disconnect(&mut self) -> Result<(), FrameError> {
        let session = match std::mem::replace(&mut self.state, State::Disconnected) {
            State::Connected(session) => session,
            _ => return Ok(()),
        };

        debug!(chain_id = session.original_chain_id, "restoring Frame's original chain");
        self.switch_chain(session.original_chain_id).await
    }

    fn is_connected(&self) -> bool {
        self.session().is_some()
    }

    fn chain_id(&self) -> Option<u64> {
        self.session().map(|s| s.chain_id)
    }

    async fn make_request(&self, method: &str, params: Value) -> Result<Value, FrameError> {
        let session = self
            .session()
            .ok_or_else(|| FrameError::NotConnected("provider is not connected".to_string()))?;
        let params = if params.is_null() { Value::Array(Vec::new()) } else { params };

        let result: Value = send(&self.client, method, params)
            .await
            .map_err(|err| translate(err).into_failure())?;

        Ok(session.middleware.iter().fold(result, |result, m| m.process(method, result)))
    }
}

impl<C: JsonRpcClient> UpstreamProvider for FrameProvider<C> {}
