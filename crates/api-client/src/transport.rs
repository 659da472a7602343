use crate::error::ApiError;
use crate::HttpTransport;
use async_trait::async_trait;
use configuration::HttpConfig;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

/// The production `HttpTransport`, a thin wrapper around one shared
/// `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the client once; every request inherits the configured timeout,
    /// which is the only bound on a hung endpoint.
    pub fn new(config: &HttpConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    fn checked(url: &str, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }

    async fn decode(url: &str, response: Response) -> Result<Value, ApiError> {
        let text = Self::checked(url, response)?.text().await?;
        serde_json::from_str::<Value>(&text).map_err(|e| {
            ApiError::Deserialization(format!("{} from {}", e, url))
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        Self::decode(url, response).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ApiError> {
        debug!(url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        Self::decode(url, response).await
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        debug!(url, "GET bytes");
        let response = self.client.get(url).send().await?;
        let bytes = Self::checked(url, response)?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
