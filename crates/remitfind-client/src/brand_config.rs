//! Client for the brand-configuration service.

use remitfind_engine::BrandConfigOverride;

use crate::error::ClientError;
use crate::http::ServiceHttp;

const CONFIG_PATH: &str = "brands/config";

#[derive(Debug, Clone)]
pub struct BrandConfigClient {
    http: ServiceHttp,
}

impl BrandConfigClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: ServiceHttp::new(base_url, timeout_secs, user_agent)?,
        })
    }

    /// Fetch the current brand overrides.
    ///
    /// Returns `Ok(None)` when the service has neither brands nor aliases
    /// configured (including a `null` body).
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or timeout.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ClientError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn fetch(&self) -> Result<Option<BrandConfigOverride>, ClientError> {
        let body = self.http.get_text(CONFIG_PATH).await?;
        // Decoded straight from text: going through `serde_json::Value` would
        // lose the alias map's document order.
        let config: Option<BrandConfigOverride> =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: CONFIG_PATH.to_string(),
                source: e,
            })?;
        Ok(config.filter(|c| !c.is_empty()))
    }
}
