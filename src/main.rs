use dotenvy::dotenv;
use subgraph_pool_apr::config;
use subgraph_pool_apr::{Reporter, SubgraphClient};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging; stdout is reserved for the report
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    dotenv().ok();

    let config = config::load_analysis_config()?;
    let client = SubgraphClient::from_config(&config)?;

    info!("Querying {}", client.url());

    let mut stdout = std::io::stdout().lock();
    let pools = Reporter::new(config).run(&client, &mut stdout).await?;

    info!("Done, {} pools analysed", pools.len());

    Ok(())
}
