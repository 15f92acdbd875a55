pub mod config;
pub mod discovery;
pub mod report;
pub mod stats;
pub mod subgraph;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use discovery::PoolFetcher;
pub use report::Reporter;
pub use subgraph::{SubgraphClient, SubgraphTransport};
pub use types::{AnalysisConfig, Pool, PoolStats};
