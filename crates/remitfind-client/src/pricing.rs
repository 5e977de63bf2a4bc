//! Client for the pricing service.

use remitfind_engine::{parse_pricing_channels, PricedChannel, PricingRequest};

use crate::error::ClientError;
use crate::http::{parse_json, shape_error, ServiceHttp};

const QUOTE_PATH: &str = "pricing/quote";

/// Fetches priced channels for a transfer.
#[derive(Debug, Clone)]
pub struct PricingClient {
    http: ServiceHttp,
}

impl PricingClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: ServiceHttp::new(base_url, timeout_secs, user_agent)?,
        })
    }

    /// Quote every store in `request`.
    ///
    /// Malformed channel entries are skipped; a body without `channels`
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or timeout.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ClientError::Deserialize`] if the body is not a JSON object.
    pub async fn quote(&self, request: &PricingRequest) -> Result<Vec<PricedChannel>, ClientError> {
        let body = self.http.post_json(QUOTE_PATH, request).await?;
        let value = parse_json(&body, QUOTE_PATH)?;
        let channels =
            parse_pricing_channels(&value).ok_or_else(|| shape_error(QUOTE_PATH, "a JSON object"))?;
        tracing::debug!(
            stores = request.stores.len(),
            channels = channels.len(),
            "pricing quote received"
        );
        Ok(channels)
    }
}
