use crate::{
    config::{FrameConfig, TransactionStrategy},
    errors::{translate, translate_unreachable, SignError},
    message::{decode_signature, integer_bytes, SignableInput},
    transports::{send, Http},
    Account, AccountContainer, FrameError, JsonRpcClient,
};
use async_trait::async_trait;
use ethers_core::{
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, Signature, TransactionReceipt,
        H256,
    },
    utils::keccak256,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use tracing::{debug, trace};

/// The alias under which the Frame account is registered
pub const FRAME_ALIAS: &str = "frame";

/// A transaction signed by Frame but not broadcast.
///
/// Frame signs the sighash with the personal-message prefix and its `v` is the raw
/// 27/28, so [`SignedTransaction::rlp`] does not recover to the Frame account and cannot
/// be broadcast as-is. Verify it against the sighash as a personal message instead.
#[derive(Clone, Debug, PartialEq)]
pub struct SignedTransaction {
    /// The transaction, with `from` set to the Frame account
    pub tx: TypedTransaction,
    /// The signature Frame produced over the transaction's sighash
    pub signature: Signature,
}

impl SignedTransaction {
    /// The RLP encoding of the transaction with Frame's signature attached, not a valid
    /// network encoding
    pub fn rlp(&self) -> Bytes {
        self.tx.rlp_signed(&self.signature)
    }

    /// The hash of the signed transaction
    pub fn hash(&self) -> H256 {
        keccak256(self.rlp()).into()
    }
}

/// What [`Account::sign_transaction`] produced, depending on the configured
/// [`TransactionStrategy`].
#[derive(Clone, Debug, PartialEq)]
pub enum TransactionOutcome {
    /// [`TransactionStrategy::SignDigest`]
    Signed(SignedTransaction),
    /// [`TransactionStrategy::SendTransaction`]
    Submitted(Box<TransactionReceipt>),
}

/// The single account Frame exposes.
///
/// Frame holds the key; every signature is requested over JSON-RPC and the user may
/// decline it in Frame's UI, in which case signing returns `Ok(None)`.
///
/// ```no_run
/// use ethers_frame::{Account, FrameAccount};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let account = FrameAccount::new()?;
/// if let Some(signature) = account.sign_message("hello world").await? {
///     assert!(account.check_signature("hello world", &signature, true).await?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct FrameAccount<C = Http> {
    client: C,
    config: FrameConfig,
}

impl FrameAccount<Http> {
    /// Connects to Frame at the default endpoint
    pub fn new() -> Result<Self, FrameError> {
        Self::with_config(FrameConfig::default())
    }

    /// Connects to Frame with the given configuration
    pub fn with_config(config: FrameConfig) -> Result<Self, FrameError> {
        let client = config.endpoint.connect()?;
        Ok(Self::new_with_client(client, config))
    }
}

impl<C: JsonRpcClient> FrameAccount<C> {
    /// Uses the provided transport to talk to Frame
    pub fn new_with_client(client: C, config: FrameConfig) -> Self {
        Self { client, config }
    }

    /// The account's configuration
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// The transport used to talk to Frame
    pub fn client(&self) -> &C {
        &self.client
    }

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, SignError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        send(&self.client, method, params).await.map_err(translate)
    }

    /// Asks Frame to `eth_sign` the data, which it prefixes as a personal message
    async fn eth_sign(
        &self,
        address: Address,
        data: Bytes,
    ) -> Result<Option<Signature>, FrameError> {
        let raw: Option<Option<Bytes>> =
            SignError::into_option(self.request("eth_sign", (address, data)).await)?;
        decode_response(raw.flatten())
    }

    async fn sign_typed_data(
        &self,
        address: Address,
        data: &Value,
    ) -> Result<Option<Signature>, FrameError> {
        let raw: Option<Option<Bytes>> =
            SignError::into_option(self.request("eth_signTypedData_v4", (address, data)).await)?;
        decode_response(raw.flatten())
    }

    async fn sign_digest(
        &self,
        mut tx: TypedTransaction,
    ) -> Result<Option<SignedTransaction>, FrameError> {
        let address = self.address().await?;
        let sighash = tx.sighash();
        debug!(?sighash, "requesting transaction signature from Frame");

        let signature = match self.eth_sign(address, sighash.as_bytes().to_vec().into()).await? {
            Some(signature) => signature,
            None => return Ok(None),
        };
        tx.set_from(address);
        Ok(Some(SignedTransaction { tx, signature }))
    }

    async fn submit(&self, tx: TypedTransaction) -> Result<TransactionReceipt, FrameError> {
        let mut request = serde_json::to_value(&tx)?;
        // Frame picks the sender
        if let Value::Object(fields) = &mut request {
            fields.remove("from");
        }
        debug!("submitting transaction through Frame");

        let hash: Option<Option<H256>> =
            SignError::into_option(self.request("eth_sendTransaction", [request]).await)?;
        let hash = hash
            .flatten()
            .ok_or_else(|| FrameError::SigningFailed("The transaction was not signed.".into()))?;

        self.wait_for_receipt(hash).await
    }

    async fn wait_for_receipt(&self, hash: H256) -> Result<TransactionReceipt, FrameError> {
        loop {
            let receipt: Option<TransactionReceipt> = self
                .request("eth_getTransactionReceipt", [hash])
                .await
                .map_err(SignError::into_failure)?;
            if let Some(receipt) = receipt {
                return Ok(receipt)
            }
            trace!(?hash, "receipt not available yet");
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

/// A null or empty result means the request was declined.
fn decode_response(raw: Option<Bytes>) -> Result<Option<Signature>, FrameError> {
    match raw {
        Some(raw) if !raw.is_empty() => decode_signature(&raw).map(Some),
        _ => Ok(None),
    }
}

#[async_trait]
impl<C: JsonRpcClient> Account for FrameAccount<C> {
    type Error = FrameError;

    fn alias(&self) -> &str {
        FRAME_ALIAS
    }

    async fn address(&self) -> Result<Address, FrameError> {
        let accounts: Vec<Address> = send(&self.client, "eth_accounts", ())
            .await
            .map_err(|err| translate_unreachable(err).into_failure())?;
        accounts
            .first()
            .copied()
            .ok_or_else(|| FrameError::NotConnected("Frame reported no accounts".to_string()))
    }

    async fn sign_message<M: Into<SignableInput> + Send>(
        &self,
        message: M,
    ) -> Result<Option<Signature>, FrameError> {
        let message = message.into();
        let address = self.address().await?;
        debug!(kind = message.kind(), %address, "requesting message signature from Frame");

        match message {
            SignableInput::Text(text) => self.eth_sign(address, text.into_bytes().into()).await,
            SignableInput::Integer(value) => {
                self.eth_sign(address, integer_bytes(value).into()).await
            }
            SignableInput::Bytes(bytes) => self.eth_sign(address, bytes).await,
            SignableInput::Prehashed(msg) => self.eth_sign(address, msg.body).await,
            SignableInput::TypedData(data) => {
                let data = serde_json::to_value(&*data)?;
                self.sign_typed_data(address, &data).await
            }
        }
    }

    async fn sign_transaction(
        &self,
        tx: TypedTransaction,
        private: bool,
    ) -> Result<Option<TransactionOutcome>, FrameError> {
        if private {
            return Err(FrameError::PrivateSubmissionUnsupported)
        }

        match self.config.strategy {
            TransactionStrategy::SignDigest => {
                Ok(self.sign_digest(tx).await?.map(TransactionOutcome::Signed))
            }
            TransactionStrategy::SendTransaction => {
                let receipt = self.submit(tx).await?;
                Ok(Some(TransactionOutcome::Submitted(Box::new(receipt))))
            }
        }
    }

    async fn check_signature<M: Into<SignableInput> + Send>(
        &self,
        data: M,
        signature: &Signature,
        recover_using_eip191: bool,
    ) -> Result<bool, FrameError> {
        let message = data.into().recovery_message(recover_using_eip191)?;
        let recovered = signature.recover(message)?;
        Ok(recovered == self.address().await?)
    }
}

/// The container Frame's single account is registered in.
#[derive(Clone, Debug)]
pub struct FrameAccounts<C = Http> {
    client: C,
    config: FrameConfig,
}

impl FrameAccounts<Http> {
    /// A container for the account at the configured endpoint
    pub fn with_config(config: FrameConfig) -> Result<Self, FrameError> {
        let client = config.endpoint.connect()?;
        Ok(Self { client, config })
    }
}

impl<C: JsonRpcClient + Clone> FrameAccounts<C> {
    /// A container whose account uses the provided transport
    pub fn new_with_client(client: C, config: FrameConfig) -> Self {
        Self { client, config }
    }
}

impl<C: JsonRpcClient + Clone> AccountContainer for FrameAccounts<C> {
    type Account = FrameAccount<C>;

    fn name(&self) -> &str {
        FRAME_ALIAS
    }

    fn aliases(&self) -> Vec<&str> {
        vec![FRAME_ALIAS]
    }

    fn len(&self) -> usize {
        1
    }

    fn accounts(&self) -> Vec<FrameAccount<C>> {
        vec![FrameAccount::new_with_client(self.client.clone(), self.config.clone())]
    }
}
