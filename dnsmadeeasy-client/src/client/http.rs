//! Request helpers shared by the endpoint methods.

use futures::stream::BoxStream;
use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};
use crate::http::{ApiRequest, ApiResponse, HttpExecutor};
use crate::pagination::{self, ApiPage, Single};
use crate::utils::log_sanitizer::truncate_for_log;

use super::DnsMadeEasyClient;

impl DnsMadeEasyClient {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        body: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        log::debug!("[dnsmadeeasy] {method} {url}");
        let mut request = ApiRequest::new(method, url);
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            request = request.with_body(body);
        }
        self.inner.pipeline.execute(request, cancel).await
    }

    async fn get_url<T: DeserializeOwned>(
        &self,
        url: String,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let response = self.send(Method::GET, url, None, cancel).await?;
        decode(&response)
    }

    /// GET `path` and decode the response.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        self.get_url(self.url(path), cancel).await
    }

    /// GET a single item, unwrapping it if the API reports it as a page.
    pub(crate) async fn get_single<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        self.get_json::<Single<T>>(path, cancel).await?.into_item()
    }

    /// Streams every item of a paged listing at `path`.
    pub(crate) fn paged<T>(&self, path: &str, cancel: &CancellationToken) -> BoxStream<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        let fetch_cancel = cancel.clone();
        let fetch = move |url: String| {
            let client = client.clone();
            let cancel = fetch_cancel.clone();
            async move { client.get_url::<ApiPage<T>>(url, &cancel).await }
        };

        let budget = self.clone();
        pagination::paginate(
            self.url(path),
            fetch,
            move || budget.requests_remaining(),
            cancel.clone(),
        )
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.send(Method::POST, self.url(path), Some(encode(body)?), cancel)
            .await?;
        Ok(())
    }

    /// POST `body` and decode the response.
    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let response = self
            .send(Method::POST, self.url(path), Some(encode(body)?), cancel)
            .await?;
        decode(&response)
    }

    pub(crate) async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.send(Method::PUT, self.url(path), Some(encode(body)?), cancel)
            .await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str, cancel: &CancellationToken) -> Result<()> {
        self.send(Method::DELETE, self.url(path), None, cancel)
            .await?;
        Ok(())
    }

    pub(crate) async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.send(Method::DELETE, self.url(path), Some(encode(body)?), cancel)
            .await?;
        Ok(())
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<String> {
    serde_json::to_string(body).map_err(|e| ClientError::SerializationError {
        detail: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|e| {
        log::error!("[dnsmadeeasy] JSON 解析失败: {e}");
        log::error!(
            "[dnsmadeeasy] 原始响应: {}",
            truncate_for_log(&response.body)
        );
        ClientError::ParseError {
            detail: e.to_string(),
        }
    })
}
