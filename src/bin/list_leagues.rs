use dotenv::dotenv;
use fantasy_txn_feed::config::Config;
use fantasy_txn_feed::logging::init_tracing;
use fantasy_txn_feed::yahoo_client::{LeagueApi, YahooClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    let client = YahooClient::new(&config.oauth_token, config.base_url.as_ref())?;

    let leagues = client.get_league_options().await?;
    if leagues.is_empty() {
        println!("No leagues found for this account.");
    }
    for league in &leagues {
        println!("{}\t{}", league.value, league.label);
    }

    Ok(())
}
