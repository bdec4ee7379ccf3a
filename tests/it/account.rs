use crate::stub::FrameStub;
use ethers_core::types::{
    transaction::{eip2718::TypedTransaction, eip712::TypedData},
    Bytes, RecoveryMessage, TransactionRequest, U256,
};
use ethers_frame::{
    Account, FrameAccount, FrameConfig, SignableInput, SignableMessage, TransactionOutcome,
    TransactionStrategy,
};
use serde_json::{json, Value};

fn account(stub: &FrameStub) -> FrameAccount<FrameStub> {
    FrameAccount::new_with_client(stub.clone(), FrameConfig::default())
}

fn mail() -> Value {
    json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" }
            ],
            "Person": [
                { "name": "name", "type": "string" },
                { "name": "wallet", "type": "address" }
            ],
            "Mail": [
                { "name": "from", "type": "Person" },
                { "name": "to", "type": "Person" },
                { "name": "contents", "type": "string" }
            ]
        },
        "primaryType": "Mail",
        "domain": {
            "name": "Ether Mail",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        },
        "message": {
            "from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
            "to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
            "contents": "Hello, Bob!"
        }
    })
}

#[tokio::test]
async fn reports_frame_address() {
    let stub = FrameStub::new(1);
    let account = account(&stub);
    assert_eq!(account.alias(), "frame");
    assert_eq!(account.address().await.unwrap(), stub.address());
}

#[tokio::test]
async fn text_signature_verifies() {
    let stub = FrameStub::new(1);
    let account = account(&stub);

    let sig = account.sign_message("hello world").await.unwrap().unwrap();
    assert!(account.check_signature("hello world", &sig, true).await.unwrap());
    assert!(account.check_signature("hello world", &sig, false).await.unwrap());
    assert!(!account.check_signature("hello there", &sig, true).await.unwrap());
}

#[tokio::test]
async fn integer_signature_verifies() {
    let stub = FrameStub::new(1);
    let account = account(&stub);

    let sig = account.sign_message(U256::from(258)).await.unwrap().unwrap();
    assert!(account.check_signature(258u64, &sig, true).await.unwrap());
    assert!(!account.check_signature(259u64, &sig, true).await.unwrap());

    // signed as the bytes [0x01, 0x02]
    assert!(account.check_signature(vec![0x01u8, 0x02], &sig, true).await.unwrap());
}

#[tokio::test]
async fn bytes_and_prebuilt_messages_verify() {
    let stub = FrameStub::new(1);
    let account = account(&stub);

    let data = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
    let sig = account.sign_message(data.clone()).await.unwrap().unwrap();
    assert!(account.check_signature(data.clone(), &sig, true).await.unwrap());

    let msg = SignableMessage::personal(data);
    let sig = account.sign_message(msg.clone()).await.unwrap().unwrap();
    assert!(account.check_signature(msg, &sig, false).await.unwrap());
}

#[tokio::test]
async fn prebuilt_message_with_custom_header_verifies() {
    let stub = FrameStub::new(1);
    let account = account(&stub);

    let msg = SignableMessage {
        version: 0x00,
        header: Bytes::from(stub.address().as_bytes().to_vec()),
        body: Bytes::from(b"hello".to_vec()),
    };
    let sig = account.sign_message(msg.clone()).await.unwrap().unwrap();
    assert!(account.check_signature(msg.clone(), &sig, false).await.unwrap());
    assert!(account.check_signature(msg, &sig, true).await.unwrap());
}

#[tokio::test]
async fn typed_data_signature_verifies() {
    let stub = FrameStub::new(1);
    let account = account(&stub);

    let typed: TypedData = serde_json::from_value(mail()).unwrap();
    let sig = account.sign_message(typed.clone()).await.unwrap().unwrap();
    assert!(account.check_signature(typed, &sig, false).await.unwrap());

    let input = SignableInput::try_from(mail()).unwrap();
    assert!(account.check_signature(input, &sig, false).await.unwrap());
    assert!(stub.methods().contains(&"eth_signTypedData_v4".to_string()));
}

#[tokio::test]
async fn declines_resolve_to_none() {
    let stub = FrameStub::new(1);
    stub.set_decline(true);
    let account = account(&stub);

    assert_eq!(account.sign_message("hello world").await.unwrap(), None);
    let typed: TypedData = serde_json::from_value(mail()).unwrap();
    assert_eq!(account.sign_message(typed).await.unwrap(), None);
}

#[tokio::test]
async fn digest_strategy_signs_sighash() {
    let stub = FrameStub::new(1);
    let config = FrameConfig::default().strategy(TransactionStrategy::SignDigest);
    let account = FrameAccount::new_with_client(stub.clone(), config);

    let tx: TypedTransaction = TransactionRequest::pay(stub.address(), 100)
        .nonce(3)
        .gas(21_000)
        .gas_price(1_000_000_000u64)
        .chain_id(1)
        .into();
    let sighash = tx.sighash();

    let signed = match account.sign_transaction(tx, false).await.unwrap() {
        Some(TransactionOutcome::Signed(signed)) => signed,
        other => panic!("expected a signed transaction, got {other:?}"),
    };
    assert_eq!(signed.tx.from(), Some(&stub.address()));

    // Frame signs the digest as a personal message
    let digest = RecoveryMessage::Data(sighash.as_bytes().to_vec());
    assert_eq!(signed.signature.recover(digest).unwrap(), stub.address());
    assert!(!signed.rlp().is_empty());
    assert!(!stub.methods().contains(&"eth_sendTransaction".to_string()));
}
