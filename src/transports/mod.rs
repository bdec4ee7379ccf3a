pub(crate) mod common;
pub use common::JsonRpcError;

mod http;
pub use self::http::{ClientError as HttpClientError, HttpBuildError, Provider as Http};

mod mock;
pub use mock::{MockError, MockProvider, MockResponse};

use crate::JsonRpcClient;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::{trace, trace_span, Instrument};

/// Sends a request through `client` inside an `rpc` tracing span.
pub(crate) async fn send<C, T, R>(client: &C, method: &str, params: T) -> Result<R, C::Error>
where
    C: JsonRpcClient,
    T: Debug + Serialize + Send + Sync,
    R: DeserializeOwned + Send,
{
    let span = trace_span!("rpc", method = method);
    // https://docs.rs/tracing/0.1.22/tracing/span/struct.Span.html#in-asynchronous-code
    async move {
        trace!(?params, "tx");
        let res = client.request(method, params).await;
        trace!(ok = res.is_ok(), "rx");
        res
    }
    .instrument(span)
    .await
}
