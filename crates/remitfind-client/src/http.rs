//! Shared `reqwest` plumbing for the service clients.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::ClientError;

/// An HTTP client bound to one service base URL.
#[derive(Debug, Clone)]
pub(crate) struct ServiceHttp {
    client: Client,
    base_url: Url,
}

impl ServiceHttp {
    pub(crate) fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so relative endpoints append to the
        // base path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// GET `path` and return the body text of a 2xx response.
    pub(crate) async fn get_text(&self, path: &str) -> Result<String, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        Self::success_body(response, &url).await
    }

    /// POST `body` as JSON to `path` and return the body text of a 2xx response.
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");
        let response = self.client.post(url.clone()).json(body).send().await?;
        Self::success_body(response, &url).await
    }

    async fn success_body(response: reqwest::Response, url: &Url) -> Result<String, ClientError> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "service returned an error status");
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Parse `body` as JSON, attributing failures to `context`.
pub(crate) fn parse_json(body: &str, context: &str) -> Result<serde_json::Value, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

/// A [`ClientError::Deserialize`] for a body that parsed but had the wrong shape.
pub(crate) fn shape_error(context: &str, expected: &str) -> ClientError {
    ClientError::Deserialize {
        context: context.to_string(),
        source: <serde_json::Error as serde::de::Error>::custom(format!("expected {expected}")),
    }
}
