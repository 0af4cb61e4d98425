use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::error::FeedError;
use crate::event_sink::EventSink;
use crate::shared_types::{EmittedEvent, EventTypeFilter};
use crate::yahoo_client::LeagueApi;

/// One fetch of the league's transactions, each formatted and handed to the
/// sink in provider order. Returns how many events were new.
///
/// A fetch or normalization fault aborts the tick before anything is emitted.
pub async fn poll_once<A, S>(
    api: &A,
    league_key: &str,
    event_types: &EventTypeFilter,
    sink: &mut S,
) -> Result<usize, FeedError>
where
    A: LeagueApi + ?Sized,
    S: EventSink,
{
    let transactions = api.get_league_transactions(league_key, event_types).await?;
    debug!(league_key, count = transactions.len(), "fetched transactions");

    let mut emitted = 0;
    for txn in &transactions {
        debug!(id = %txn.transaction_key, tag = txn.kind.tag(), "formatting transaction");
        if sink.emit(EmittedEvent::from_transaction(txn))? {
            emitted += 1;
        }
    }
    Ok(emitted)
}

/// Polls on a fixed interval until Ctrl-C. Failed ticks are logged and the
/// next tick proceeds as usual.
pub async fn run<A, S>(
    api: &A,
    league_key: &str,
    event_types: &EventTypeFilter,
    every: Duration,
    sink: &mut S,
) -> Result<(), FeedError>
where
    A: LeagueApi + ?Sized,
    S: EventSink,
{
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        league_key,
        types = %event_types.to_query(),
        every_secs = every.as_secs(),
        "polling league transactions"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match poll_once(api, league_key, event_types, sink).await {
                    Ok(0) => debug!("no new transactions"),
                    Ok(n) => info!(new = n, "emitted transactions"),
                    Err(e) => error!("poll failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        }
    }
}
