//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::collections::VecDeque;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::StatusCode;

use dnsmadeeasy_client::{
    ApiRequest, ApiResponse, CancellationToken, DnsMadeEasyClient, DomainId,
    DomainName, HttpExecutor, REQUEST_LIMIT_HEADER, REQUESTS_REMAINING_HEADER, Result,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

// ============ Scripted executor ============

type Route = Box<dyn Fn(&ApiRequest) -> ApiResponse + Send + Sync>;

/// Replays canned responses in order and records every request it saw.
///
/// Requests beyond the script get a `500`.
#[derive(Default)]
pub struct ScriptedExecutor {
    script: Mutex<VecDeque<ApiResponse>>,
    route: Option<Route>,
    seen: Mutex<Vec<ApiRequest>>,
    calls: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new(responses: Vec<ApiResponse>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(responses.into()),
            ..Self::default()
        })
    }

    /// Answers each request with `route(request)`.
    pub fn routed(route: impl Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            route: Some(Box::new(route)),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpExecutor for ScriptedExecutor {
    async fn execute(&self, request: ApiRequest, _cancel: &CancellationToken) -> Result<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = match &self.route {
            Some(route) => Some(route(&request)),
            None => self.script.lock().unwrap().pop_front(),
        };
        self.seen.lock().unwrap().push(request);
        Ok(response.unwrap_or_else(|| ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "")))
    }
}

// ============ Canned responses ============

pub fn ok(body: &str, remaining: u32) -> ApiResponse {
    ApiResponse::new(StatusCode::OK, body)
        .with_header("content-type", "application/json")
        .with_header(REQUEST_LIMIT_HEADER, "150")
        .with_header(REQUESTS_REMAINING_HEADER, &remaining.to_string())
}

pub fn rate_limited() -> ApiResponse {
    ApiResponse::new(StatusCode::BAD_REQUEST, "")
        .with_header(REQUEST_LIMIT_HEADER, "150")
        .with_header(REQUESTS_REMAINING_HEADER, "0")
}

pub fn page(page: u32, total_pages: u32, data: &serde_json::Value) -> String {
    serde_json::json!({
        "page": page,
        "totalPages": total_pages,
        "totalRecords": 0,
        "data": data,
    })
    .to_string()
}

/// A client wired to `executor` with millisecond retry delays.
pub fn mock_client(executor: Arc<ScriptedExecutor>, retries: u32) -> DnsMadeEasyClient {
    DnsMadeEasyClient::builder("test-api-key", "test-secret-key")
        .base_url("https://api.test/V2.0/")
        .median_first_retry_delay(Duration::from_millis(1))
        .retry_count(retries)
        .executor(executor)
        .build()
        .unwrap()
}

// ============ Live API ============

/// 生成唯一的测试记录名称
pub fn generate_test_record_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}", &uuid.to_string()[..8])
}

/// 测试上下文 - 封装 sandbox 客户端和测试域名
pub struct TestContext {
    pub client: DnsMadeEasyClient,
    pub domain: DomainName,
    pub cancel: CancellationToken,
}

impl TestContext {
    /// 从 `DNSME_API_KEY`、`DNSME_SECRET_KEY` 和 `TEST_DOMAIN` 创建
    pub fn sandbox() -> Option<Self> {
        let api_key = env::var("DNSME_API_KEY").ok()?;
        let secret_key = env::var("DNSME_SECRET_KEY").ok()?;
        let domain = DomainName::parse(&env::var("TEST_DOMAIN").ok()?).ok()?;

        let client = DnsMadeEasyClient::builder(api_key, secret_key)
            .sandbox(true)
            .build()
            .ok()?;

        Some(Self {
            client,
            domain,
            cancel: CancellationToken::new(),
        })
    }

    pub async fn domain_id(&self) -> Option<DomainId> {
        self.client
            .get_domain_by_name(&self.domain, &self.cancel)
            .await
            .ok()
            .map(|domain| domain.id)
    }

    /// 查找并清理所有测试记录（以 _test- 开头的记录）
    pub async fn cleanup_all_test_records(&self, domain_id: DomainId) {
        let Ok(records) = self
            .client
            .list_records(domain_id, &self.cancel)
            .try_collect::<Vec<_>>()
            .await
        else {
            return;
        };
        let leftovers: Vec<_> = records
            .into_iter()
            .filter(|record| record.name.as_str().starts_with("_test-"))
            .collect();
        if !leftovers.is_empty() {
            let _ = self.client.delete_records(&leftovers, &self.cancel).await;
        }
    }
}
