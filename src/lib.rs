#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::type_complexity)]
//! # Frame desktop signer integration
//!
//! This crate talks to a locally running [Frame](https://frame.sh) wallet over its JSON-RPC
//! endpoint. Frame holds the keys and shows every request to its user, who may approve or
//! decline it.
//!
//! Two components are provided:
//!
//! - [`FrameAccount`], an [`Account`] that asks Frame to sign messages, typed data and
//!   transactions. A request the user declines resolves to `Ok(None)`.
//! - [`FrameProvider`], a [`ChainProvider`] that forwards JSON-RPC requests to Frame after
//!   switching Frame to the provider's network.
//!
//! # Examples
//!
//! ```no_run
//! use ethers_frame::{Account, ChainProvider, FrameAccount, FrameProvider, Network};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut provider = FrameProvider::new(Network::sepolia())?;
//! provider.connect().await?;
//!
//! let account = FrameAccount::new()?;
//! match account.sign_message("hello world").await? {
//!     Some(signature) => println!("signed: {signature}"),
//!     None => println!("declined in Frame"),
//! }
//!
//! provider.disconnect().await?;
//! # Ok(())
//! # }
//! ```
mod account;
pub use account::{
    FrameAccount, FrameAccounts, SignedTransaction, TransactionOutcome, FRAME_ALIAS,
};

mod config;
pub use config::{
    FrameConfig, SignerEndpoint, TransactionStrategy, DEFAULT_FRAME_URL, DEFAULT_POLL_INTERVAL,
};

mod errors;
pub use errors::{FrameError, RpcError, USER_DECLINED};

pub mod message;
pub use message::{SignableInput, SignableMessage};

pub mod middleware;

pub mod networks;
pub use networks::Network;

mod provider;
pub use provider::{ConnectionState, FrameProvider, FRAME_CLIENT_MARKER};

mod transports;
pub use transports::*;

use async_trait::async_trait;
use auto_impl::auto_impl;
use ethers_core::types::{transaction::eip2718::TypedTransaction, Address, Signature};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{error::Error, fmt::Debug};

#[async_trait]
#[auto_impl(&, Box, Arc)]
/// Trait which must be implemented by data transports used to reach Frame.
pub trait JsonRpcClient: Debug + Send + Sync {
    /// A JSON-RPC Error
    type Error: RpcError + 'static;

    /// Sends a request with the provided JSON-RPC and parameters serialized as JSON
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send;
}

/// A named account that can sign on behalf of one address.
///
/// A signing request the user declines is not an error: it resolves to `Ok(None)`.
#[async_trait]
pub trait Account: Debug + Send + Sync {
    type Error: Error + Send + Sync;

    /// The alias the account is registered under
    fn alias(&self) -> &str;

    /// The account's address
    async fn address(&self) -> Result<Address, Self::Error>;

    /// Signs a message, see [`SignableInput`] for the accepted shapes
    async fn sign_message<M: Into<SignableInput> + Send>(
        &self,
        message: M,
    ) -> Result<Option<Signature>, Self::Error>;

    /// Signs or submits the transaction. `private` asks for private mempool submission.
    async fn sign_transaction(
        &self,
        tx: TypedTransaction,
        private: bool,
    ) -> Result<Option<TransactionOutcome>, Self::Error>;

    /// Returns `true` if `signature` over `data` recovers to this account's address.
    ///
    /// Text, integers and pre-built messages are always recovered as EIP-191 personal
    /// messages. Only raw bytes depend on `recover_using_eip191`: when it is unset they must
    /// be a 32 byte digest, recovered without a prefix.
    async fn check_signature<M: Into<SignableInput> + Send>(
        &self,
        data: M,
        signature: &Signature,
        recover_using_eip191: bool,
    ) -> Result<bool, Self::Error>;
}

/// A registry of accounts provided by one signer.
pub trait AccountContainer: Debug + Send + Sync {
    type Account: Account;

    /// The container's name
    fn name(&self) -> &str;

    /// The aliases of all accounts in the container
    fn aliases(&self) -> Vec<&str>;

    /// The number of accounts in the container
    fn len(&self) -> usize;

    /// Returns `true` if the container holds no accounts
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The accounts in the container
    fn accounts(&self) -> Vec<Self::Account>;
}

/// A connection to a chain that JSON-RPC requests can be made through.
#[async_trait]
pub trait ChainProvider: Debug + Send + Sync {
    type Error: Error + Send + Sync;

    /// Opens a session
    async fn connect(&mut self) -> Result<(), Self::Error>;

    /// Closes the session, undoing whatever `connect` changed
    async fn disconnect(&mut self) -> Result<(), Self::Error>;

    /// Returns `true` while a session is open
    fn is_connected(&self) -> bool;

    /// The chain id of the open session
    fn chain_id(&self) -> Option<u64>;

    /// Sends a raw JSON-RPC request, `null` params are sent as `[]`
    async fn make_request(&self, method: &str, params: Value) -> Result<Value, Self::Error>;
}

/// Marks a [`ChainProvider`] backed by a remote node rather than a local test chain.
pub trait UpstreamProvider: ChainProvider {}
