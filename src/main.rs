use dotenv::dotenv;
use fantasy_txn_feed::config::Config;
use fantasy_txn_feed::event_sink::UniqueSink;
use fantasy_txn_feed::logging::init_tracing;
use fantasy_txn_feed::poller;
use fantasy_txn_feed::yahoo_client::YahooClient;
use std::io;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    let league_key = config.require_league_key()?;

    let client = YahooClient::new(&config.oauth_token, config.base_url.as_ref())?;
    info!("Watching league {} for {}", league_key, config.event_types.to_query());

    // Each new transaction becomes one JSON line on stdout.
    let mut sink = UniqueSink::new(io::stdout().lock());

    poller::run(
        &client,
        league_key,
        &config.event_types,
        config.poll_interval,
        &mut sink,
    )
    .await?;

    Ok(())
}
