use crate::types::{Pool, PoolDayData, PoolStats};

const DAYS_PER_YEAR: f64 = 365.0;

/// Fees earned per dollar locked on one day. `None` when the day has no
/// usable locked value to divide by.
pub fn daily_profit_per_dollar(day: &PoolDayData) -> Option<f64> {
    if !day.tvl_usd.is_finite() || day.tvl_usd <= 0.0 {
        return None;
    }
    let profit = day.fees_usd / day.tvl_usd;
    profit.is_finite().then_some(profit)
}

/// Number of day samples a pool must exceed to be ranked.
pub fn minimum_samples(minimum_data_samples_percentage: f64, window_days: u32) -> usize {
    (minimum_data_samples_percentage * window_days as f64).floor() as usize
}

/// Average daily fee return per dollar locked and its yearly rate.
///
/// Days without locked value are left out of the average. A pool with no
/// usable day at all gets zero stats.
pub fn compute_pool_stats(pool: &Pool) -> PoolStats {
    let daily: Vec<f64> = pool
        .pool_day_data
        .iter()
        .filter_map(daily_profit_per_dollar)
        .collect();

    let days = daily.len();
    if days == 0 {
        return PoolStats {
            id: pool.id,
            ..PoolStats::default()
        };
    }

    let average = daily.iter().sum::<f64>() / days as f64;
    // Uniswap v3 fees are not reinvested, so the rate is not compounded.
    let apr = average / days as f64 * DAYS_PER_YEAR * 100.0;

    PoolStats {
        id: pool.id,
        average_profit_per_dollar: average,
        apr,
        days_with_info: days,
    }
}
