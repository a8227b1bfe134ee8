use crate::types::{ScanError, ScanVerdict};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Thin client for the remote classification endpoint.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection
/// pool across clones.
#[derive(Clone)]
pub struct PredictClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PredictClient {
    /// Build a client for `endpoint` (scheme://host[:port], no trailing
    /// path). `timeout` bounds the whole request; hitting it surfaces as a
    /// transport error.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ScanError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| ScanError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// POST the candidate URL as the single form field `url` and decode the
    /// JSON verdict.
    ///
    /// Cooperative cancellation: the request races against `cancel`; once the
    /// token fires, the local result is discarded and `ScanError::Cancelled`
    /// is returned. The remote call may still run to completion server-side.
    pub async fn predict(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ScanVerdict, ScanError> {
        let request = self
            .http
            .post(format!("{}/predict", self.endpoint))
            .form(&[("url", url)]);

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ScanError::Cancelled),
            res = request.send() => res.map_err(|e| ScanError::Transport(e.to_string()))?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Transport(format!(
                "unexpected status {}",
                status.as_u16()
            )));
        }

        let verdict = tokio::select! {
            _ = cancel.cancelled() => return Err(ScanError::Cancelled),
            body = response.json::<ScanVerdict>() => {
                body.map_err(|e| ScanError::Transport(format!("invalid verdict body: {e}")))?
            }
        };
        Ok(verdict)
    }
}
