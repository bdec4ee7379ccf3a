use crate::stub::FrameStub;
use ethers_core::types::U64;
use ethers_frame::{
    middleware::ExtraDataToPoa, ChainProvider, ConnectionState, FrameError, FrameProvider,
    Network,
};
use serde_json::Value;
use tracing_test::traced_test;

const SEPOLIA: u64 = 11_155_111;

#[tokio::test]
async fn switches_chain_for_the_session() {
    let stub = FrameStub::new(1);
    let mut provider = FrameProvider::new_with_client(stub.clone(), Network::sepolia());
    assert_eq!(provider.state(), ConnectionState::Disconnected);

    provider.connect().await.unwrap();
    assert_eq!(provider.state(), ConnectionState::Connected);
    assert_eq!(stub.chain_id(), SEPOLIA);
    assert_eq!(provider.chain_id(), Some(SEPOLIA));
    assert_eq!(provider.original_chain_id(), Some(1));
    assert_eq!(provider.middleware(), vec![ExtraDataToPoa::NAME]);

    let chain_id: U64 = provider.request("eth_chainId", ()).await.unwrap();
    assert_eq!(chain_id.as_u64(), SEPOLIA);

    provider.disconnect().await.unwrap();
    assert_eq!(stub.chain_id(), 1);
    assert!(!provider.is_connected());
    assert_eq!(provider.chain_id(), None);
}

#[tokio::test]
async fn mainnet_session_needs_no_switch() {
    let stub = FrameStub::new(1);
    let mut provider = FrameProvider::new_with_client(stub.clone(), Network::mainnet());

    provider.connect().await.unwrap();
    assert!(provider.middleware().is_empty());
    assert!(!stub.methods().contains(&"wallet_switchEthereumChain".to_string()));
}

#[tokio::test]
async fn refuses_non_frame_servers() {
    let stub = FrameStub::new(1);
    stub.set_client_version("anvil/v0.2.0");
    let mut provider = FrameProvider::new_with_client(stub.clone(), Network::sepolia());

    let err = provider.connect().await.unwrap_err();
    assert!(matches!(err, FrameError::NotConnected(_)));
    assert_eq!(stub.methods(), vec!["web3_clientVersion"]);
    assert_eq!(stub.chain_id(), 1);
}

#[tokio::test]
async fn stuck_chain_fails_to_connect() {
    let stub = FrameStub::new(1);
    stub.set_switchable(false);
    let mut provider = FrameProvider::new_with_client(stub.clone(), Network::sepolia());

    let err = provider.connect().await.unwrap_err();
    assert!(err.is_provider_failure());
    assert!(err.to_string().contains("ChainMismatch"));
    assert_eq!(provider.state(), ConnectionState::Disconnected);

    // asked to switch to sepolia, then back to mainnet
    let switches = stub.methods().iter().filter(|m| *m == "wallet_switchEthereumChain").count();
    assert_eq!(switches, 2);
    assert_eq!(stub.chain_id(), 1);
}

#[tokio::test]
async fn unsupported_methods_are_provider_failures() {
    let stub = FrameStub::new(1);
    let mut provider = FrameProvider::new_with_client(stub, Network::mainnet());
    provider.connect().await.unwrap();

    let err = provider.make_request("debug_traceCall", Value::Null).await.unwrap_err();
    assert!(err.is_provider_failure());
    assert_eq!(err.to_string(), "method debug_traceCall not supported");
}

#[traced_test]
#[tokio::test]
async fn logs_chain_switches() {
    let stub = FrameStub::new(137);
    let mut provider = FrameProvider::new_with_client(stub, Network::sepolia());

    provider.connect().await.unwrap();
    provider.disconnect().await.unwrap();
    assert!(logs_contain("switching Frame's chain"));
    assert!(logs_contain("restoring Frame's original chain"));
}
