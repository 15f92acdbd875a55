use alloy::primitives::{Address, U256};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Subgraph encodes BigInt/BigDecimal fields as JSON strings.
fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    s.parse::<T>().map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub id: Address,
    pub name: String,
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_from_str")]
    pub decimals: u8,
}

/// One day of aggregated activity for a pool.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDayData {
    /// Epoch seconds at the start of the day.
    pub date: i64,
    #[serde(deserialize_with = "deserialize_from_str")]
    pub liquidity: f64,
    #[serde(deserialize_with = "deserialize_from_str")]
    pub sqrt_price: U256,
    #[serde(deserialize_with = "deserialize_from_str")]
    pub token0_price: f64,
    #[serde(deserialize_with = "deserialize_from_str")]
    pub token1_price: f64,
    #[serde(deserialize_with = "deserialize_from_str")]
    pub volume_token0: f64,
    #[serde(deserialize_with = "deserialize_from_str")]
    pub volume_token1: f64,
    #[serde(rename = "feesUSD", deserialize_with = "deserialize_from_str")]
    pub fees_usd: f64,
    #[serde(rename = "tvlUSD", deserialize_with = "deserialize_from_str")]
    pub tvl_usd: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolStats {
    pub id: Address,
    pub average_profit_per_dollar: f64,
    /// Simple (non-compounded) yearly rate, in percent.
    pub apr: f64,
    pub days_with_info: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: Address,
    #[serde(rename = "totalValueLockedUSD", deserialize_with = "deserialize_from_str")]
    pub total_value_locked_usd: f64,
    #[serde(rename = "volumeUSD", deserialize_with = "deserialize_from_str")]
    pub volume_usd: f64,
    #[serde(deserialize_with = "deserialize_from_str")]
    pub tx_count: u64,
    pub token0: Token,
    pub token1: Token,
    #[serde(default)]
    pub pool_day_data: Vec<PoolDayData>,
    /// Filled in after fetch; zero until the pool passes the sample threshold.
    #[serde(skip)]
    pub stats: PoolStats,
}

pub const DEFAULT_SUBGRAPH_URL: &str = "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v3";
/// 2022-01-01 00:00:00 UTC
pub const DEFAULT_WINDOW_START: i64 = 1640995200;
/// 2022-02-28 23:59:59 UTC
pub const DEFAULT_WINDOW_END: i64 = 1646092799;
pub const DEFAULT_MINIMUM_DATA_SAMPLES_PERCENTAGE: f64 = 0.5;
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub subgraph_url: String,
    /// Epoch seconds.
    pub window_start: i64,
    /// Epoch seconds. Pools created at or after this are not fetched.
    pub window_end: i64,
    /// Fraction of window days a pool needs data for before it is ranked.
    pub minimum_data_samples_percentage: f64,
    pub page_size: u32,
    pub top_n: usize,
    /// Number of consecutive pages requested at once.
    pub page_concurrency: usize,
    pub request_timeout_secs: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            subgraph_url: DEFAULT_SUBGRAPH_URL.to_string(),
            window_start: DEFAULT_WINDOW_START,
            window_end: DEFAULT_WINDOW_END,
            minimum_data_samples_percentage: DEFAULT_MINIMUM_DATA_SAMPLES_PERCENTAGE,
            page_size: DEFAULT_PAGE_SIZE,
            top_n: DEFAULT_TOP_N,
            page_concurrency: 1,
            request_timeout_secs: None,
        }
    }
}
