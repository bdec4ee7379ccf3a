use serde_json::Value;
use std::fmt::Debug;

/// Rewrites raw JSON-RPC results before they are handed back to the caller.
///
/// Installed per session by [`crate::ChainProvider::connect`] on [`crate::FrameProvider`].
pub trait ResponseMiddleware: Debug + Send + Sync {
    /// A stable name, used to report which middleware is active
    fn name(&self) -> &'static str;

    /// Processes the `result` of `method`
    fn process(&self, method: &str, result: Value) -> Value;
}

/// Moves the `extraData` of block headers into `proofOfAuthorityData`.
///
/// Chains that began as proof-of-authority carry signer data in `extraData` that is
/// longer than the 32 bytes a regular header allows.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtraDataToPoa;

impl ExtraDataToPoa {
    /// Name under which this middleware is reported
    pub const NAME: &'static str = "extradata_to_poa";
}

impl ResponseMiddleware for ExtraDataToPoa {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, method: &str, mut result: Value) -> Value {
        if !matches!(method, "eth_getBlockByHash" | "eth_getBlockByNumber") {
            return result
        }

        if let Value::Object(block) = &mut result {
            if let Some(extra_data) = block.remove("extraData") {
                block.insert("proofOfAuthorityData".to_string(), extra_data);
            }
        }
        result
    }
}
