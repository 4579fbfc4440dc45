use crate::error::ExchangeError;
use crate::jsonrpc::message::{Request, Response};
use awc::http::header;
use awc::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Responses we expect are a few hundred bytes, this only guards against a misbehaving node
const RESPONSE_SIZE_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct HttpClient {
    id_counter: Arc<AtomicU64>,
    url: String,
    client: Client,
}

impl HttpClient {
    pub fn new(url: &str) -> Self {
        Self {
            id_counter: Arc::new(AtomicU64::new(0)),
            url: url.to_string(),
            client: Client::default(),
        }
    }

    fn next_id(&self) -> u64 {
        self.id_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn request_method<T, R>(
        &self,
        method: &str,
        params: T,
        timeout: Duration,
    ) -> Result<R, ExchangeError>
    where
        R: 'static,
        for<'de> R: Deserialize<'de>,
        T: Serialize,
        T: std::fmt::Debug,
        R: std::fmt::Debug,
    {
        trace!("Making request {} {:?}", method, params);
        let payload = Request::new(self.next_id(), method, params);
        let mut res = self
            .client
            .post(&self.url)
            .append_header((header::CONTENT_TYPE, "application/json"))
            .timeout(timeout)
            .send_json(&payload)
            .await?;

        let body_bytes = match res.body().limit(RESPONSE_SIZE_LIMIT).await {
            Ok(val) => val,
            Err(e) => {
                return Err(ExchangeError::BadResponse(format!(
                    "Size Limit {RESPONSE_SIZE_LIMIT} Web3 Error {e}"
                )))
            }
        };

        let decoded: Response<R> = match serde_json::from_slice(&body_bytes) {
            Ok(val) => val,
            Err(e) => {
                let body_str = String::from_utf8_lossy(&body_bytes);
                return Err(ExchangeError::BadResponse(format!(
                    "Failed to parse {method} response: {e}\nRaw response: {body_str}"
                )));
            }
        };
        trace!("got web3 response {:#?}", decoded);
        decoded.into_result()
    }
}
