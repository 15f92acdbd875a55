//! In-memory subgraph and fixture builders shared by the unit tests.

use crate::subgraph::{GraphQlRequest, SubgraphTransport};
use crate::types::{Pool, DEFAULT_WINDOW_START};
use alloy::primitives::Address;
use async_trait::async_trait;
use eyre::Result;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const DAY: i64 = 86_400;

pub(crate) fn address(index: u8) -> Address {
    format!("0x{:040x}", index).parse().unwrap()
}

/// A pool whose day records have the given `(fees_usd, tvl_usd)` values.
pub(crate) fn pool_json(index: u8, days: &[(f64, f64)]) -> Value {
    let day_data: Vec<Value> = days
        .iter()
        .enumerate()
        .map(|(i, (fees, tvl))| {
            json!({
                "date": DEFAULT_WINDOW_START + i as i64 * DAY,
                "liquidity": "1000000000000000000",
                "sqrtPrice": "79228162514264337593543950336",
                "token0Price": "1.0",
                "token1Price": "1.0",
                "volumeToken0": "500.0",
                "volumeToken1": "500.0",
                "feesUSD": fees.to_string(),
                "tvlUSD": tvl.to_string(),
            })
        })
        .collect();

    json!({
        "id": address(index).to_string(),
        "totalValueLockedUSD": "1000000.0",
        "volumeUSD": "250000.0",
        "txCount": "42",
        "token0": { "id": address(200).to_string(), "name": "Token A", "symbol": format!("TK{}A", index), "decimals": "18" },
        "token1": { "id": address(201).to_string(), "name": "Token B", "symbol": format!("TK{}B", index), "decimals": "6" },
        "poolDayData": day_data,
    })
}

pub(crate) fn pool(index: u8, days: &[(f64, f64)]) -> Pool {
    serde_json::from_value(pool_json(index, days)).unwrap()
}

pub(crate) fn page_json(pools: Vec<Value>) -> Vec<u8> {
    serde_json::to_vec(&json!({ "data": { "pools": pools } })).unwrap()
}

/// Serves page `skip / first` from `pages`; anything past the end is an empty page.
/// Day records are cut to `lpDayDataStartDate` / `lpDayDataDays` the way the subgraph does.
pub(crate) struct MockSubgraph {
    pages: Vec<Vec<Value>>,
    /// `(first page, body)`: raw body served for that page and every later one.
    body_from: Option<(usize, Vec<u8>)>,
    page_bodies: Vec<(usize, Vec<u8>)>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GraphQlRequest>>,
}

impl MockSubgraph {
    pub(crate) fn new(pages: Vec<Vec<Value>>) -> Self {
        Self {
            pages,
            body_from: None,
            page_bodies: Vec::new(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_raw_body(body: Vec<u8>) -> Self {
        Self::new(vec![]).with_body_from(0, body)
    }

    /// Serve `body` for page `page` and every page after it.
    pub(crate) fn with_body_from(mut self, page: usize, body: Vec<u8>) -> Self {
        self.body_from = Some((page, body));
        self
    }

    /// Serve `body` for page `page` only.
    pub(crate) fn with_page_body(mut self, page: usize, body: Vec<u8>) -> Self {
        self.page_bodies.push((page, body));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<GraphQlRequest> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort_by_key(|r| r.variables["skip"].as_u64());
        requests
    }
}

fn apply_day_window(mut pool: Value, start: i64, days: usize) -> Value {
    if let Some(day_data) = pool["poolDayData"].as_array_mut() {
        day_data.retain(|d| d["date"].as_i64().unwrap_or(0) >= start);
        day_data.truncate(days);
    }
    pool
}

#[async_trait]
impl SubgraphTransport for MockSubgraph {
    async fn send(&self, request: &GraphQlRequest) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let vars = &request.variables;
        let first = vars["first"].as_u64().unwrap_or(1).max(1);
        let skip = vars["skip"].as_u64().unwrap_or(0);
        let page = (skip / first) as usize;

        if let Some((_, body)) = self.page_bodies.iter().find(|(p, _)| *p == page) {
            return Ok(body.clone());
        }
        if let Some((from, body)) = &self.body_from {
            if page >= *from {
                return Ok(body.clone());
            }
        }

        let start = vars["lpDayDataStartDate"].as_i64().unwrap_or(i64::MIN);
        let days = vars["lpDayDataDays"].as_u64().unwrap_or(u64::MAX) as usize;
        let pools = self
            .pages
            .get(page)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|pool| apply_day_window(pool, start, days))
            .collect();
        Ok(page_json(pools))
    }
}
