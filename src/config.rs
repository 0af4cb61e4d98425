use lazy_static::lazy_static;
use regex::Regex;
use std::env;
use std::time::Duration;
use url::Url;

use crate::error::FeedError;
use crate::shared_types::EventTypeFilter;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 15 * 60;

lazy_static! {
    // e.g. `nfl.l.12345` or `423.l.12345`
    static ref RE_LEAGUE_KEY: Regex = Regex::new(r"^[a-z0-9]+\.l\.\d+$").unwrap();
}

#[derive(Debug, Clone)]
pub struct Config {
    pub oauth_token: String,
    pub league_key: Option<String>,
    pub event_types: EventTypeFilter,
    pub poll_interval: Duration,
    pub base_url: Option<Url>,
}

impl Config {
    /// Reads the process environment. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, FeedError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, FeedError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let oauth_token = lookup("YAHOO_OAUTH_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| FeedError::Config("YAHOO_OAUTH_TOKEN not set".to_string()))?;

        let league_key = match lookup("YAHOO_LEAGUE_KEY") {
            Some(key) if !key.trim().is_empty() => {
                let key = key.trim().to_string();
                if !RE_LEAGUE_KEY.is_match(&key) {
                    return Err(FeedError::Config(format!(
                        "YAHOO_LEAGUE_KEY `{}` is not a league key",
                        key
                    )));
                }
                Some(key)
            }
            _ => None,
        };

        let event_types = lookup("YAHOO_EVENT_TYPES")
            .map(|types| EventTypeFilter::from_list(types.split(',')))
            .unwrap_or_default();

        let poll_interval = match lookup("POLL_INTERVAL_SECS") {
            Some(secs) => {
                let secs = secs.trim().parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                    FeedError::Config(format!("POLL_INTERVAL_SECS `{}` is not a positive integer", secs))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        };

        let base_url = lookup("YAHOO_API_BASE_URL")
            .map(|u| {
                Url::parse(&u).map_err(|e| FeedError::Config(format!("YAHOO_API_BASE_URL: {}", e)))
            })
            .transpose()?;

        Ok(Self {
            oauth_token,
            league_key,
            event_types,
            poll_interval,
            base_url,
        })
    }

    /// League to poll; only the polling service needs one.
    pub fn require_league_key(&self) -> Result<&str, FeedError> {
        self.league_key
            .as_deref()
            .ok_or_else(|| FeedError::Config("YAHOO_LEAGUE_KEY not set".to_string()))
    }
}
