//! An in-process stand-in for Frame, holding a real key.

use async_trait::async_trait;
use ethers_core::types::{transaction::eip712::TypedData, Address, Bytes, U64};
use ethers_frame::{JsonRpcClient, JsonRpcError, MockError, USER_DECLINED};
use ethers_signers::{LocalWallet, Signer};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::{
    fmt::Debug,
    sync::{Arc, Mutex},
};

const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

#[derive(Debug)]
struct State {
    client_version: String,
    chain_id: u64,
    /// Ignores `wallet_switchEthereumChain` when unset
    switchable: bool,
    decline: bool,
    methods: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct FrameStub {
    wallet: LocalWallet,
    state: Arc<Mutex<State>>,
}

impl FrameStub {
    pub fn new(chain_id: u64) -> Self {
        let wallet: LocalWallet = KEY.parse().unwrap();
        let state = State {
            client_version: "Frame/v0.6.9".to_string(),
            chain_id,
            switchable: true,
            decline: false,
            methods: Vec::new(),
        };
        Self { wallet, state: Arc::new(Mutex::new(state)) }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.state.lock().unwrap().chain_id
    }

    pub fn methods(&self) -> Vec<String> {
        self.state.lock().unwrap().methods.clone()
    }

    pub fn set_client_version(&self, version: &str) {
        self.state.lock().unwrap().client_version = version.to_string();
    }

    pub fn set_switchable(&self, switchable: bool) {
        self.state.lock().unwrap().switchable = switchable;
    }

    pub fn set_decline(&self, decline: bool) {
        self.state.lock().unwrap().decline = decline;
    }

    fn declines(&self) -> bool {
        self.state.lock().unwrap().decline
    }

    async fn handle(&self, method: &str, params: Value) -> Result<Value, MockError> {
        self.state.lock().unwrap().methods.push(method.to_string());

        match method {
            "web3_clientVersion" => Ok(json!(self.state.lock().unwrap().client_version)),
            "eth_chainId" => Ok(json!(U64::from(self.chain_id()))),
            "eth_accounts" => Ok(json!([self.address()])),
            "wallet_switchEthereumChain" => {
                let requested = params[0]["chainId"].as_str().unwrap_or_default();
                let chain_id = u64::from_str_radix(requested.trim_start_matches("0x"), 16)
                    .map_err(rpc_error)?;
                let mut state = self.state.lock().unwrap();
                if state.switchable {
                    state.chain_id = chain_id;
                }
                Ok(Value::Null)
            }
            "eth_sign" => {
                if self.declines() {
                    return Err(MockError::JsonRpcError(JsonRpcError::new(USER_DECLINED)))
                }
                let data: Bytes = serde_json::from_value(params[1].clone())?;
                let signature =
                    self.wallet.sign_message(data.as_ref()).await.map_err(rpc_error)?;
                Ok(json!(Bytes::from(signature.to_vec())))
            }
            "eth_signTypedData_v4" => {
                if self.declines() {
                    return Err(MockError::JsonRpcError(JsonRpcError::new(USER_DECLINED)))
                }
                let data: TypedData = serde_json::from_value(params[1].clone())?;
                let signature = self.wallet.sign_typed_data(&data).await.map_err(rpc_error)?;
                Ok(json!(Bytes::from(signature.to_vec())))
            }
            _ => Err(MockError::JsonRpcError(JsonRpcError {
                code: -32601,
                message: format!("method {method} not supported"),
                data: None,
            })),
        }
    }
}

fn rpc_error(err: impl ToString) -> MockError {
    MockError::JsonRpcError(JsonRpcError::new(err.to_string()))
}

#[async_trait]
impl JsonRpcClient for FrameStub {
    type Error = MockError;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, MockError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let params = serde_json::to_value(params)?;
        let result = self.handle(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }
}
