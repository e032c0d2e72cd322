//! Maps failed responses onto [`ClientError`].

use async_trait::async_trait;
use chrono::TimeDelta;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, DATE};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::{ApiRequest, ApiResponse, HttpExecutor};
use crate::error::{ClientError, Result};
use crate::utils::datetime::parse_http_date;
use crate::utils::log_sanitizer::truncate_for_log;

/// Largest tolerated distance between the signed request date and server time.
const MAX_CLOCK_SKEW_SECS: i64 = 30;

/// Turns every non-success response into an error. Success passes through.
pub struct ErrorLayer<E> {
    inner: E,
}

impl<E> ErrorLayer<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<Vec<String>>,
}

fn non_empty(body: &str) -> Option<String> {
    (!body.trim().is_empty()).then(|| body.to_string())
}

fn clock_skew(response: &ApiResponse) -> Option<ClientError> {
    let request_date = response.signed_request_date.as_deref()?;
    let server_date = response.header(DATE.as_str())?;
    let skew = parse_http_date(server_date)? - parse_http_date(request_date)?;

    (skew.abs() > TimeDelta::seconds(MAX_CLOCK_SKEW_SECS)).then(|| ClientError::ClockSkew {
        request_date: request_date.to_string(),
        server_date: server_date.to_string(),
    })
}

fn is_json(response: &ApiResponse) -> bool {
    response
        .header(CONTENT_TYPE.as_str())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
}

/// Classifies a non-success response.
pub(crate) fn classify(response: &ApiResponse) -> ClientError {
    let status = response.status;

    if status == StatusCode::FORBIDDEN {
        if let Some(skew) = clock_skew(response) {
            return skew;
        }
    }

    match status {
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => ClientError::InvalidCredentials {
            raw_message: non_empty(&response.body),
        },
        StatusCode::NOT_FOUND => ClientError::NotFound {
            raw_message: non_empty(&response.body),
        },
        _ if is_json(response) => {
            let messages = serde_json::from_str::<ErrorEnvelope>(&response.body)
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or_default();
            match messages.len() {
                0 => ClientError::UnparseableFailure {
                    status: status.as_u16(),
                    body: response.body.clone(),
                },
                1 => ClientError::Remote {
                    message: messages.into_iter().next().unwrap_or_default(),
                },
                _ => ClientError::AggregateRemote { messages },
            }
        }
        _ => ClientError::UnparseableFailure {
            status: status.as_u16(),
            body: response.body.clone(),
        },
    }
}

#[async_trait]
impl<E: HttpExecutor> HttpExecutor for ErrorLayer<E> {
    async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        let response = self.inner.execute(request, cancel).await?;
        if response.status.is_success() {
            return Ok(response);
        }

        let error = classify(&response);
        if error.is_expected() {
            log::warn!("[dnsmadeeasy] Request failed: {error}");
        } else {
            log::error!(
                "[dnsmadeeasy] Request failed: {error}, body: {}",
                truncate_for_log(&response.body)
            );
        }
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: StatusCode, body: &str) -> ApiResponse {
        ApiResponse::new(status, body)
    }

    fn json(status: StatusCode, body: &str) -> ApiResponse {
        response(status, body).with_header("content-type", "application/json; charset=utf-8")
    }

    fn signed(mut response: ApiResponse, request_date: &str, server_date: &str) -> ApiResponse {
        response.signed_request_date = Some(request_date.to_string());
        response.with_header("date", server_date)
    }

    #[test]
    fn forbidden_with_large_skew_is_clock_skew() {
        let r = signed(
            response(StatusCode::FORBIDDEN, ""),
            "Tue, 15 Nov 1994 08:12:31 GMT",
            "Tue, 15 Nov 1994 08:13:02 GMT",
        );
        assert!(matches!(classify(&r), ClientError::ClockSkew { .. }));
    }

    #[test]
    fn forbidden_within_tolerance_is_invalid_credentials() {
        let r = signed(
            response(StatusCode::FORBIDDEN, ""),
            "Tue, 15 Nov 1994 08:12:31 GMT",
            "Tue, 15 Nov 1994 08:13:01 GMT",
        );
        assert!(matches!(
            classify(&r),
            ClientError::InvalidCredentials { raw_message: None }
        ));
    }

    #[test]
    fn forbidden_without_dates_is_invalid_credentials() {
        let r = response(StatusCode::FORBIDDEN, "denied");
        assert!(matches!(
            classify(&r),
            ClientError::InvalidCredentials { raw_message: Some(ref m) } if m == "denied"
        ));
    }

    #[test]
    fn unauthorized_and_not_found() {
        assert!(matches!(
            classify(&response(StatusCode::UNAUTHORIZED, "")),
            ClientError::InvalidCredentials { .. }
        ));
        assert!(matches!(
            classify(&response(StatusCode::NOT_FOUND, "")),
            ClientError::NotFound { .. }
        ));
    }

    #[test]
    fn single_json_error() {
        let r = json(StatusCode::BAD_REQUEST, r#"{"error":["Record name is invalid."]}"#);
        assert!(matches!(
            classify(&r),
            ClientError::Remote { ref message } if message == "Record name is invalid."
        ));
    }

    #[test]
    fn multiple_json_errors() {
        let r = json(StatusCode::BAD_REQUEST, r#"{"error":["one","two"]}"#);
        match classify(&r) {
            ClientError::AggregateRemote { messages } => assert_eq!(messages, ["one", "two"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_or_garbled_json_is_unparseable() {
        for body in [r#"{"error":[]}"#, r#"{"message":"x"}"#, "not json"] {
            let r = json(StatusCode::BAD_REQUEST, body);
            assert!(
                matches!(classify(&r), ClientError::UnparseableFailure { status: 400, .. }),
                "{body}"
            );
        }
    }

    #[test]
    fn non_json_keeps_raw_body() {
        let r = response(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        match classify(&r) {
            ClientError::UnparseableFailure { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
