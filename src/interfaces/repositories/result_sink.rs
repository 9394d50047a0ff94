use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    entities::media::{SaveResultRequest, SaveResultResponse},
    errors::AppError,
};

/// Destination of the automatic uploads that follow an analysis.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn save(&self, request: &SaveResultRequest) -> Result<SaveResultResponse, AppError>;
}

/// Posts results to a running server's `/api/save-result`.
pub struct HttpResultSink {
    http: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpResultSink {
    pub fn new(server_url: &str) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(HttpResultSink {
            http,
            endpoint: format!("{}/api/save-result", server_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ResultSink for HttpResultSink {
    async fn save(&self, request: &SaveResultRequest) -> Result<SaveResultResponse, AppError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("Save request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(match status.as_u16() {
                400 => AppError::InvalidInput(message),
                404 => AppError::NotFound(message),
                _ => AppError::InternalError(message),
            });
        }

        response
            .json::<SaveResultResponse>()
            .await
            .map_err(|e| AppError::BadGateway(format!("Unexpected save response: {}", e)))
    }
}
