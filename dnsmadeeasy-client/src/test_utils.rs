//! Test utilities: scripted executors and canned API payloads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::http::{ApiRequest, ApiResponse, HttpExecutor};

type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync>;

/// Answers requests from a closure and records everything it saw.
pub struct MockExecutor {
    responder: Responder,
    requests: RwLock<Vec<ApiRequest>>,
    calls: AtomicUsize,
}

impl MockExecutor {
    pub fn new(responder: impl Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            requests: RwLock::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replays `responses` in order; extra requests get a 500.
    pub fn sequence(responses: Vec<ApiResponse>) -> Self {
        let queue = std::sync::Mutex::new(VecDeque::from(responses));
        Self::new(move |_| {
            let next = queue.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "")))
        })
    }

    /// Always answers with `response`.
    pub fn always(response: ApiResponse) -> Self {
        Self::new(move |_| Ok(response.clone()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl HttpExecutor for MockExecutor {
    async fn execute(&self, request: ApiRequest, _cancel: &CancellationToken) -> Result<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = (self.responder)(&request);
        self.requests.write().await.push(request);
        response
    }
}

/// A 200 JSON response carrying rate-limit headers.
pub fn json_ok(body: &str, remaining: u32) -> ApiResponse {
    ApiResponse::new(StatusCode::OK, body)
        .with_header("content-type", "application/json")
        .with_header("x-dnsme-requestlimit", "150")
        .with_header("x-dnsme-requestsremaining", &remaining.to_string())
}

/// A paged envelope around `data`.
pub fn page_body(page: u32, total_pages: u32, data: &serde_json::Value) -> String {
    serde_json::json!({
        "page": page,
        "totalPages": total_pages,
        "totalRecords": 0,
        "data": data,
    })
    .to_string()
}
