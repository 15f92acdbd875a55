use crate::discovery::PoolFetcher;
use crate::stats::{compute_pool_stats, minimum_samples};
use crate::subgraph::SubgraphTransport;
use crate::types::{AnalysisConfig, Pool};
use chrono::{DateTime, Utc};
use eyre::Result;
use std::io::Write;
use tracing::info;

/// Analysis window resolved from epoch-second bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Whole days between `start` and `end`, truncated.
    pub days: u32,
}

impl AnalysisWindow {
    pub fn new(start: i64, end: i64) -> Result<Self> {
        let start_dt = DateTime::from_timestamp(start, 0)
            .ok_or_else(|| eyre::eyre!("window start {} is out of range", start))?;
        let end_dt = DateTime::from_timestamp(end, 0)
            .ok_or_else(|| eyre::eyre!("window end {} is out of range", end))?;
        let days = u32::try_from((end_dt - start_dt).num_days())
            .map_err(|_| eyre::eyre!("window end {} precedes start {}", end, start))?;
        Ok(Self {
            start: start_dt,
            end: end_dt,
            days,
        })
    }
}

/// Attach stats to every pool with more than `minimum_samples` day records.
/// Returns how many pools received stats.
pub fn attach_stats(pools: &mut [Pool], minimum_samples: usize) -> usize {
    let mut with_stats = 0;
    for pool in pools.iter_mut() {
        if pool.pool_day_data.len() > minimum_samples {
            pool.stats = compute_pool_stats(pool);
            with_stats += 1;
        }
    }
    with_stats
}

/// Sort by average profit per dollar, best first.
pub fn rank_pools(pools: &mut [Pool]) {
    pools.sort_by(|a, b| {
        b.stats
            .average_profit_per_dollar
            .total_cmp(&a.stats.average_profit_per_dollar)
    });
}

pub fn write_top_pools<W: Write>(out: &mut W, pools: &[Pool], top_n: usize) -> Result<()> {
    for pool in pools.iter().take(top_n) {
        writeln!(
            out,
            "{}\t{}/{}\t{:.6}\t{:.2}%",
            pool.id,
            pool.token0.symbol,
            pool.token1.symbol,
            pool.stats.average_profit_per_dollar,
            pool.stats.apr
        )?;
    }
    Ok(())
}

/// Fetches, scores and prints the most profitable pools for one window.
pub struct Reporter {
    config: AnalysisConfig,
}

impl Reporter {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run the whole analysis, writing the report to `out`. Returns every fetched pool, ranked.
    pub async fn run<W: Write>(
        &self,
        transport: &dyn SubgraphTransport,
        out: &mut W,
    ) -> Result<Vec<Pool>> {
        let window = AnalysisWindow::new(self.config.window_start, self.config.window_end)?;
        let min_samples = minimum_samples(self.config.minimum_data_samples_percentage, window.days);

        writeln!(
            out,
            "Calculating most profitable pools in a period of {} days starting from {}",
            window.days, window.start
        )?;
        writeln!(
            out,
            "Disregarding pools with less than {} day samples in the period",
            min_samples
        )?;
        writeln!(out)?;

        let fetcher = PoolFetcher::new(transport, self.config.page_size)
            .with_page_concurrency(self.config.page_concurrency);
        // Pools created after the window closes cannot have data inside it.
        let mut pools = fetcher
            .fetch_pools(self.config.window_end, self.config.window_start, window.days)
            .await?;

        let with_stats = attach_stats(&mut pools, min_samples);
        info!(
            "{} of {} pools have more than {} day samples",
            with_stats,
            pools.len(),
            min_samples
        );

        rank_pools(&mut pools);

        writeln!(
            out,
            "Top {} most profitable pools between {} and {}",
            self.config.top_n.min(pools.len()),
            window.start,
            window.end
        )?;
        writeln!(out)?;
        write_top_pools(out, &pools, self.config.top_n)?;

        Ok(pools)
    }
}
