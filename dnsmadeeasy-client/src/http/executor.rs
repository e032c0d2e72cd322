//! Default executor over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;

use super::{ApiRequest, ApiResponse, HttpExecutor};
use crate::error::{ClientError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// 默认连接超时（秒）
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 360;

/// Sends requests with a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::NetworkError {
                detail: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ClientError::NetworkError {
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        log::debug!("[dnsmadeeasy] Response Status: {}", status.as_u16());

        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkError {
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!("[dnsmadeeasy] Response Body: {}", truncate_for_log(&body));

        Ok(ApiResponse {
            status,
            headers,
            body,
            signed_request_date: None,
        })
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        log::debug!("[dnsmadeeasy] {} {}", request.method, request.url);

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.send(request) => result,
        }
    }
}
