//! Client for the recommendation advisor.

use remitfind_engine::{AdvisorRequest, AdvisorResponse};

use crate::error::ClientError;
use crate::http::{parse_json, shape_error, ServiceHttp};

const OPTIMIZE_PATH: &str = "ai/optimize";

#[derive(Debug, Clone)]
pub struct AdvisorClient {
    http: ServiceHttp,
}

impl AdvisorClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: ServiceHttp::new(base_url, timeout_secs, user_agent)?,
        })
    }

    /// Ask the advisor to rank channels for `request`.
    ///
    /// A reply without a usable `best` pick still succeeds; deciding whether
    /// it is structured is left to the caller.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or timeout.
    /// - [`ClientError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ClientError::Deserialize`] if the body is not a JSON object.
    pub async fn optimize(&self, request: &AdvisorRequest) -> Result<AdvisorResponse, ClientError> {
        let body = self.http.post_json(OPTIMIZE_PATH, request).await?;
        let value = parse_json(&body, OPTIMIZE_PATH)?;
        AdvisorResponse::from_value(&value).ok_or_else(|| shape_error(OPTIMIZE_PATH, "a JSON object"))
    }
}
