use ethers::types::Address;
use reqwest::Client;
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

use super::query::{GraphQlRequest, GraphQlResponse, SubgraphFlavor, SwapPage, SwapsData, decode_response};
use crate::errors::Result;
use crate::models::SwapEvent;

pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Handle for pulling swap history of one pool from a Uniswap subgraph.
#[derive(Clone, Debug)]
pub struct SubgraphClient {
    http: Client,
    endpoint: Url,
    flavor: SubgraphFlavor,
    page_size: u32,
    max_pages: u32,
}

impl SubgraphClient {
    pub fn new(endpoint: Url, flavor: SubgraphFlavor) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            flavor,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// One page of swaps with `since <= timestamp <= before`, newest first.
    pub async fn fetch_page(&self, pool: Address, since: i64, before: i64) -> Result<SwapPage> {
        let request = GraphQlRequest::swaps(self.flavor, pool, since, before, self.page_size);
        let resp: GraphQlResponse<SwapsData> = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        decode_response(resp)
    }

    /// All swaps since `since`, oldest first.
    ///
    /// Pages walk backwards from the newest swap so that hitting `max_pages`
    /// drops the oldest history, never the latest close. Pages overlap on the
    /// boundary timestamp; ids already seen there are not returned twice.
    pub async fn fetch_swaps(&self, pool: Address, since: i64) -> Result<Vec<SwapEvent>> {
        let mut cursor = i64::MAX;
        let mut seen_at_cursor: HashSet<String> = HashSet::new();
        let mut swaps = Vec::new();

        for page_no in 0..self.max_pages {
            let page = self.fetch_page(pool, since, cursor).await?;
            let mut fresh = 0usize;
            for event in page.events {
                if event.timestamp < cursor {
                    cursor = event.timestamp;
                    seen_at_cursor.clear();
                }
                if event.timestamp == cursor {
                    if let Some(id) = &event.id {
                        if !seen_at_cursor.insert(id.clone()) {
                            continue;
                        }
                    }
                }
                fresh += 1;
                swaps.push(event);
            }
            debug!(page_no, fetched = page.fetched, fresh, cursor, "[SUBGRAPH] page received");

            if page.fetched < self.page_size as usize {
                break;
            }
            if fresh == 0 {
                warn!(
                    cursor,
                    page_size = self.page_size,
                    "[SUBGRAPH] full page with nothing new; more swaps share one timestamp than fit a page"
                );
                break;
            }
            if page_no + 1 == self.max_pages {
                warn!(
                    max_pages = self.max_pages,
                    cursor,
                    since,
                    "[SUBGRAPH] page limit reached; swaps older than cursor not fetched"
                );
            }
        }

        swaps.reverse();
        Ok(swaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::pipeline::{ChartSettings, build_snapshot};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POOL: &str = "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640";

    fn swap(id: &str, ts: i64, amount1: &str) -> serde_json::Value {
        json!({
            "id": id,
            "timestamp": ts.to_string(),
            "amount0": "-1",
            "amount1": amount1,
            "amountUSD": amount1,
        })
    }

    async fn mount_page(server: &MockServer, before: i64, swaps: Vec<serde_json::Value>) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "variables": { "before": before.to_string() } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "swaps": swaps } })))
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> SubgraphClient {
        let endpoint = Url::parse(&server.uri()).expect("mock uri");
        SubgraphClient::new(endpoint, SubgraphFlavor::V3).with_page_size(2)
    }

    #[tokio::test]
    async fn walks_back_from_newest_and_skips_boundary_duplicates() {
        let server = MockServer::start().await;
        mount_page(&server, i64::MAX, vec![swap("c", 300, "12"), swap("b", 200, "11")]).await;
        mount_page(&server, 200, vec![swap("b", 200, "11"), swap("a", 100, "10")]).await;
        mount_page(&server, 100, vec![swap("a", 100, "10")]).await;

        let pool: Address = POOL.parse().unwrap();
        let swaps = client(&server).fetch_swaps(pool, 100).await.unwrap();
        let ids: Vec<_> = swaps.iter().filter_map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn page_limit_keeps_the_newest_swaps() {
        let server = MockServer::start().await;
        mount_page(&server, i64::MAX, vec![swap("b", 1_704_153_600, "12")]).await;
        mount_page(&server, 1_704_153_600, vec![swap("a", 1_704_067_200, "10")]).await;

        let pool: Address = POOL.parse().unwrap();
        let client = client(&server).with_page_size(1).with_max_pages(1);
        let swaps = client.fetch_swaps(pool, 1_704_067_200).await.unwrap();
        let ids: Vec<_> = swaps.iter().filter_map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["b"]);

        let snapshot = build_snapshot(&swaps, &ChartSettings::default()).unwrap();
        assert_eq!(snapshot.reference_price, Some(12.0));
    }

    #[tokio::test]
    async fn stops_when_a_full_page_adds_nothing() {
        let server = MockServer::start().await;
        mount_page(&server, i64::MAX, vec![swap("b", 100, "11"), swap("a", 100, "10")]).await;
        mount_page(&server, 100, vec![swap("b", 100, "11"), swap("a", 100, "10")]).await;

        let pool: Address = POOL.parse().unwrap();
        let swaps = client(&server).fetch_swaps(pool, 100).await.unwrap();
        assert_eq!(swaps.len(), 2);
    }
    #[tokio::test]
    async fn graphql_errors_propagate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "errors": [{ "message": "bad pool" }] })),
            )
            .mount(&server)
            .await;

        let pool: Address = POOL.parse().unwrap();
        let err = client(&server).fetch_swaps(pool, 0).await.unwrap_err();
        assert!(matches!(err, AppError::Subgraph(msg) if msg == "bad pool"));
    }

    #[tokio::test]
    async fn http_failures_propagate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let pool: Address = POOL.parse().unwrap();
        let err = client(&server).fetch_page(pool, 0, i64::MAX).await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
    }
}
