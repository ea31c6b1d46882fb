use crate::error::{Result, ShellyError};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for a device's `/rpc` endpoint
///
/// Every call is a single `GET /rpc/{method}?{params}`; there are no retries.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
}

impl RpcClient {
    /// Create a client for the device at `authority` (`host` or `host:port`)
    pub fn new(authority: impl AsRef<str>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: format!("http://{}/rpc", authority.as_ref()),
        })
    }

    /// Base URL of the RPC endpoint
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `method` and parse the JSON body into `T`
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<T> {
        let body = self.get(method, params).await?;
        let value = serde_json::from_slice(&body)?;
        Ok(value)
    }

    /// Call `method` and only check that the device accepted it
    pub async fn send(&self, method: &str, params: &[(&str, String)]) -> Result<()> {
        self.get(method, params).await?;
        Ok(())
    }

    async fn get(&self, method: &str, params: &[(&str, String)]) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.base_url, method);
        tracing::debug!("GET {} {:?}", url, params);

        let response = self.http.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShellyError::Status {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        tracing::debug!("{} response: {}", method, String::from_utf8_lossy(&body));

        Ok(body.to_vec())
    }
}
