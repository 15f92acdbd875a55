use crate::subgraph::{GraphQlRequest, SubgraphTransport};
use crate::types::Pool;
use eyre::{Result, WrapErr};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Pools created before `$lpCreationDateLimit`, each with its first
/// `$lpDayDataDays` day records on or after `$lpDayDataStartDate`.
const POOLS_WITH_DAY_DATA_QUERY: &str = r#"
query pools($first: Int!, $skip: Int!, $lpCreationDateLimit: BigInt!, $lpDayDataStartDate: Int!, $lpDayDataDays: Int!) {
    pools(
        first: $first
        skip: $skip
        where: { createdAtTimestamp_lt: $lpCreationDateLimit }
    ) {
        id
        totalValueLockedUSD
        volumeUSD
        txCount
        token0 { id name symbol decimals }
        token1 { id name symbol decimals }
        poolDayData(
            first: $lpDayDataDays
            orderBy: date
            where: { date_gte: $lpDayDataStartDate }
        ) {
            date
            liquidity
            sqrtPrice
            token0Price
            token1Price
            volumeToken0
            volumeToken1
            feesUSD
            tvlUSD
        }
    }
}
"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PoolsVariables {
    first: u32,
    skip: u64,
    lp_creation_date_limit: i64,
    lp_day_data_start_date: i64,
    lp_day_data_days: u32,
}

#[derive(Deserialize)]
struct PoolsResponse {
    data: Option<PoolsData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct PoolsData {
    pools: Vec<Pool>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// Decode one page of the pools query.
///
/// A GraphQL `errors` payload (e.g. the gateway's `skip` cap) yields whatever
/// pools came with it, usually none, which ends pagination.
pub fn decode_pools_page(body: &[u8]) -> Result<Vec<Pool>> {
    let response: PoolsResponse =
        serde_json::from_slice(body).wrap_err("failed to decode pools response")?;

    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        warn!("GraphQL errors from subgraph: {}", messages.join("; "));
        return Ok(response.data.map(|d| d.pools).unwrap_or_default());
    }

    let data = response
        .data
        .ok_or_else(|| eyre::eyre!("subgraph response has no data"))?;
    Ok(data.pools)
}

/// Walks the subgraph's pool list with offset pagination.
pub struct PoolFetcher<'a> {
    transport: &'a dyn SubgraphTransport,
    page_size: u32,
    page_concurrency: usize,
}

impl<'a> PoolFetcher<'a> {
    pub fn new(transport: &'a dyn SubgraphTransport, page_size: u32) -> Self {
        Self {
            transport,
            page_size,
            page_concurrency: 1,
        }
    }

    /// Request up to `pages` consecutive pages at once. Results are still consumed in page order.
    pub fn with_page_concurrency(mut self, pages: usize) -> Self {
        self.page_concurrency = pages.max(1);
        self
    }

    async fn fetch_page(
        &self,
        page: u64,
        creation_cutoff: i64,
        window_start: i64,
        window_days: u32,
    ) -> Result<Vec<Pool>> {
        let variables = PoolsVariables {
            first: self.page_size,
            skip: page * self.page_size as u64,
            lp_creation_date_limit: creation_cutoff,
            lp_day_data_start_date: window_start,
            lp_day_data_days: window_days,
        };
        let request = GraphQlRequest::new(POOLS_WITH_DAY_DATA_QUERY, &variables)?;
        let body = self.transport.send(&request).await?;
        decode_pools_page(&body).wrap_err_with(|| format!("page {} could not be decoded", page))
    }

    /// Fetch every pool created before `creation_cutoff`, each carrying at most
    /// `window_days` day records dated on or after `window_start`.
    /// Stops at the first empty page.
    pub async fn fetch_pools(
        &self,
        creation_cutoff: i64,
        window_start: i64,
        window_days: u32,
    ) -> Result<Vec<Pool>> {
        let mut pools = Vec::new();
        let mut page = 0u64;

        loop {
            let batch = (page..page + self.page_concurrency as u64)
                .map(|p| self.fetch_page(p, creation_cutoff, window_start, window_days));
            let results = join_all(batch).await;

            // Failures after the first empty page belong to pages past the end.
            for (offset, result) in results.into_iter().enumerate() {
                let page_pools = result?;
                if page_pools.is_empty() {
                    info!(
                        "Fetched {} pools in {} pages",
                        pools.len(),
                        page + offset as u64
                    );
                    return Ok(pools);
                }
                debug!("Page {}: {} pools", page + offset as u64, page_pools.len());
                pools.extend(page_pools);
            }

            page += self.page_concurrency as u64;
            info!("Fetched {} pools so far...", pools.len());
        }
    }
}
