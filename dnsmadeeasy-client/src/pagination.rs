//! Paged list endpoints.
//!
//! List endpoints answer with `{page, totalPages, totalRecords, data}`. The
//! first page is fetched on its own; the remaining pages are fetched with at
//! most [`PAGE_CONCURRENCY`] requests in flight.

use std::future::Future;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};

/// Maximum number of page requests in flight at once.
pub const PAGE_CONCURRENCY: usize = 10;

/// One page of a list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiPage<T> {
    #[allow(dead_code)]
    pub page: u32,
    pub total_pages: u32,
    #[allow(dead_code)]
    pub total_records: u32,
    pub data: Vec<T>,
}

impl<T> ApiPage<T> {
    /// Unwraps an endpoint that reports a single item as a one-element page.
    pub fn into_single(self) -> Result<T> {
        let count = self.data.len();
        let mut items = self.data.into_iter();
        match (items.next(), items.next()) {
            (Some(item), None) => Ok(item),
            _ => Err(ClientError::ParseError {
                detail: format!("expected exactly one item in response, got {count}"),
            }),
        }
    }
}

/// A single item, either bare or reported as a one-element page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Single<T> {
    Page(ApiPage<T>),
    Item(T),
}

impl<T> Single<T> {
    pub fn into_item(self) -> Result<T> {
        match self {
            Self::Page(page) => page.into_single(),
            Self::Item(item) => Ok(item),
        }
    }
}

fn page_url(url: &str, page: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}page={page}")
}

fn budget_exhausted(extra_pages: u32, remaining: Option<u32>) -> bool {
    remaining.is_some_and(|remaining| extra_pages > remaining)
}

/// Streams every item of a paged listing.
///
/// Nothing is requested until the stream is polled. Items of the first page
/// come first, followed by the items of pages `2..=totalPages` in page
/// order. Before fanning out, `remaining` (the last observed request budget)
/// is compared with the number of pages still to fetch; if the budget is
/// known to be too small the stream fails without issuing more requests.
///
/// The stream ends after the first error, and yields
/// [`ClientError::Cancelled`] once `cancel` fires.
pub(crate) fn paginate<T, F, Fut, R>(
    url: String,
    fetch: F,
    remaining: R,
    cancel: CancellationToken,
) -> BoxStream<'static, Result<T>>
where
    T: Send + 'static,
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiPage<T>>> + Send + 'static,
    R: FnOnce() -> Option<u32> + Send + 'static,
{
    let items = stream::once(async move {
        let first = fetch(url.clone()).await?;
        let first_items = stream::iter(first.data.into_iter().map(Ok::<T, ClientError>));

        if first.total_pages <= 1 {
            return Ok(first_items.boxed());
        }

        let extra_pages = first.total_pages - 1;
        if budget_exhausted(extra_pages, remaining()) {
            return Err(ClientError::RateLimited {
                retries: 0,
                detail: "There are not enough requests remaining to complete this operation without being rate limited.".to_string(),
            });
        }

        log::debug!("[dnsmadeeasy] Fetching {extra_pages} more page(s) of {url}");
        let rest = stream::iter(2..=first.total_pages)
            .map(move |page| fetch(page_url(&url, page)))
            .buffered(PAGE_CONCURRENCY)
            .map_ok(|page| stream::iter(page.data.into_iter().map(Ok::<T, ClientError>)))
            .try_flatten();

        Ok(first_items.chain(rest).boxed())
    })
    .try_flatten()
    .boxed();

    guard(items, cancel)
}

/// Ends `items` after its first error and turns every item produced after
/// `cancel` fires into [`ClientError::Cancelled`].
pub(crate) fn guard<T: Send + 'static>(
    items: BoxStream<'static, Result<T>>,
    cancel: CancellationToken,
) -> BoxStream<'static, Result<T>> {
    items
        .scan(false, move |failed, item| {
            if *failed {
                return futures::future::ready(None);
            }
            let item = if cancel.is_cancelled() {
                Err(ClientError::Cancelled)
            } else {
                item
            };
            *failed = item.is_err();
            futures::future::ready(Some(item))
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn page(page: u32, total_pages: u32, data: Vec<u32>) -> ApiPage<u32> {
        ApiPage {
            page,
            total_pages,
            total_records: 0,
            data,
        }
    }

    /// Serves `total_pages` pages of three items each, logging requested URLs.
    fn pages(
        total_pages: u32,
        log: Arc<Mutex<Vec<String>>>,
    ) -> impl Fn(String) -> futures::future::Ready<Result<ApiPage<u32>>> + Send + Sync + 'static
    {
        move |url: String| {
            let n = url
                .rsplit_once("page=")
                .map_or(1, |(_, n)| n.parse().unwrap());
            log.lock().unwrap().push(url);
            futures::future::ready(Ok(page(n, total_pages, vec![n * 10, n * 10 + 1, n * 10 + 2])))
        }
    }

    #[tokio::test]
    async fn single_page_is_fetched_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let items: Vec<u32> = paginate(
            "https://x.test/dns/managed".into(),
            pages(1, log.clone()),
            || Some(0),
            CancellationToken::new(),
        )
        .try_collect()
        .await
        .unwrap();

        assert_eq!(items, [10, 11, 12]);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn later_pages_follow_the_first_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let items: Vec<u32> = paginate(
            "https://x.test/dns/managed/1/records?type=A".into(),
            pages(12, log.clone()),
            || Some(100),
            CancellationToken::new(),
        )
        .try_collect()
        .await
        .unwrap();

        let expected: Vec<u32> = (1..=12).flat_map(|n| [n * 10, n * 10 + 1, n * 10 + 2]).collect();
        assert_eq!(items, expected);

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 12);
        assert_eq!(log[1], "https://x.test/dns/managed/1/records?type=A&page=2");
    }

    #[tokio::test]
    async fn page_query_starts_with_question_mark_when_url_has_none() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let _: Vec<u32> = paginate(
            "https://x.test/dns/managed".into(),
            pages(2, log.clone()),
            || None,
            CancellationToken::new(),
        )
        .try_collect()
        .await
        .unwrap();

        assert_eq!(log.lock().unwrap()[1], "https://x.test/dns/managed?page=2");
    }

    #[tokio::test]
    async fn insufficient_budget_fails_before_fan_out() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let result: Result<Vec<u32>> = paginate(
            "https://x.test/dns/managed".into(),
            pages(3, log.clone()),
            || Some(1),
            CancellationToken::new(),
        )
        .try_collect()
        .await;

        assert!(matches!(result, Err(ClientError::RateLimited { retries: 0, .. })));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn exact_budget_is_enough() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let items: Vec<u32> = paginate(
            "https://x.test/dns/managed".into(),
            pages(3, log.clone()),
            || Some(2),
            CancellationToken::new(),
        )
        .try_collect()
        .await
        .unwrap();
        assert_eq!(items.len(), 9);
    }

    #[tokio::test]
    async fn nothing_is_requested_until_polled() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let stream = paginate(
            "https://x.test/dns/managed".into(),
            pages(1, log.clone()),
            || None,
            CancellationToken::new(),
        );
        assert!(log.lock().unwrap().is_empty());
        drop(stream);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn in_flight_pages_never_exceed_the_window() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (counter, max) = (in_flight.clone(), peak.clone());

        let fetch = move |url: String| {
            let counter = counter.clone();
            let max = max.clone();
            async move {
                let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                counter.fetch_sub(1, Ordering::SeqCst);
                let n = url.rsplit_once("page=").map_or(1, |(_, n)| n.parse().unwrap());
                Ok(page(n, 40, vec![n]))
            }
        };

        let items: Vec<u32> = paginate(
            "https://x.test/dns/managed".into(),
            fetch,
            || None,
            CancellationToken::new(),
        )
        .try_collect()
        .await
        .unwrap();

        assert_eq!(items, (1..=40).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= PAGE_CONCURRENCY);
    }

    #[tokio::test]
    async fn stream_stops_after_first_error() {
        let fetch = |url: String| {
            let n: u32 = url.rsplit_once("page=").map_or(1, |(_, n)| n.parse().unwrap());
            futures::future::ready(if n == 2 {
                Err(ClientError::Remote {
                    message: "boom".into(),
                })
            } else {
                Ok(page(n, 3, vec![n]))
            })
        };

        let items: Vec<Result<u32>> = paginate(
            "https://x.test/dns/managed".into(),
            fetch,
            || None,
            CancellationToken::new(),
        )
        .collect()
        .await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Ok(1)));
        assert!(matches!(items[1], Err(ClientError::Remote { .. })));
    }

    #[tokio::test]
    async fn cancellation_is_checked_per_item() {
        let cancel = CancellationToken::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut stream = paginate(
            "https://x.test/dns/managed".into(),
            pages(1, log),
            || None,
            cancel.clone(),
        );

        assert_eq!(stream.next().await.unwrap().unwrap(), 10);
        cancel.cancel();
        assert!(matches!(stream.next().await, Some(Err(ClientError::Cancelled))));
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn single_item_envelope() {
        assert_eq!(page(1, 1, vec![7]).into_single().unwrap(), 7);
        assert!(matches!(
            page(1, 1, vec![]).into_single(),
            Err(ClientError::ParseError { .. })
        ));
        assert!(matches!(
            page(1, 1, vec![1, 2]).into_single(),
            Err(ClientError::ParseError { .. })
        ));
    }

    #[test]
    fn envelope_decodes_from_camel_case() {
        let page: ApiPage<u32> =
            serde_json::from_str(r#"{"page":1,"totalPages":4,"totalRecords":10,"data":[1,2]}"#)
                .unwrap();
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.data, [1, 2]);
    }
}
