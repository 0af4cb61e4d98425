use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FeedError, NormalizeError};
use crate::normalization::{element, field, normalize, str_field};
use crate::shared_types::{EventTypeFilter, LeagueOption, Transaction};
use crate::transaction_summary::parse_transaction;

pub const DEFAULT_BASE_URL: &str = "https://fantasysports.yahooapis.com/fantasy/v2";

const LEAGUES_PATH: &str = "/users;use_login=1/games;game_keys=nfl/leagues/";

/// Read side of the fantasy API the poller depends on.
#[async_trait]
pub trait LeagueApi: Send + Sync {
    /// Leagues of the logged-in user, as picker options.
    async fn get_league_options(&self) -> Result<Vec<LeagueOption>, FeedError>;

    /// Transactions of one league, in provider order.
    async fn get_league_transactions(
        &self,
        league_key: &str,
        event_types: &EventTypeFilter,
    ) -> Result<Vec<Transaction>, FeedError>;
}

pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(oauth_token: &str, base_url: Option<&Url>) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", oauth_token))
            .map_err(|_| FeedError::Config("OAuth token is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(USER_AGENT, HeaderValue::from_static("FantasyTxnFeed/0.1"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base_url = base_url
            .map(|u| u.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full request URL for an API path, always asking for JSON.
    pub fn request_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}?format=json", self.base_url, path)
        } else {
            format!("{}/{}?format=json", self.base_url, path)
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, FeedError> {
        let url = self.request_url(path);
        debug!(%url, "GET");

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), %url, "request rejected");
            return Err(FeedError::Http {
                status: status.as_u16(),
                url,
            });
        }

        Ok(resp.json::<Value>().await?)
    }
}

#[async_trait]
impl LeagueApi for YahooClient {
    async fn get_league_options(&self) -> Result<Vec<LeagueOption>, FeedError> {
        let body = self.get_json(LEAGUES_PATH).await?;
        league_options_from_response(&body)
    }

    async fn get_league_transactions(
        &self,
        league_key: &str,
        event_types: &EventTypeFilter,
    ) -> Result<Vec<Transaction>, FeedError> {
        let path = format!(
            "/leagues;league_keys={}/transactions;types={}",
            league_key,
            event_types.to_query()
        );
        let body = self.get_json(&path).await?;
        transactions_from_response(&body)
    }
}

fn content_root(body: &Value, root: &str) -> Result<Value, NormalizeError> {
    normalize(field(field(body, "fantasy_content")?, root)?)
}

/// Extracts `users[0].games[0].leagues` from a users response.
pub fn league_options_from_response(body: &Value) -> Result<Vec<LeagueOption>, FeedError> {
    let users = content_root(body, "users")?;
    let games = field(element(&users, 0)?, "games")?;
    let leagues = field(element(games, 0)?, "leagues")?;

    let leagues = leagues.as_array().ok_or_else(|| NormalizeError::UnexpectedShape {
        at: "leagues".to_string(),
        expected: "sequence",
    })?;

    let options = leagues
        .iter()
        .map(|league| -> Result<LeagueOption, NormalizeError> {
            Ok(LeagueOption {
                value: str_field(league, "league_key")?,
                label: str_field(league, "name")?,
            })
        })
        .collect::<Result<Vec<_>, NormalizeError>>()?;

    Ok(options)
}

/// Extracts and parses `leagues[0].transactions` from a transactions response.
pub fn transactions_from_response(body: &Value) -> Result<Vec<Transaction>, FeedError> {
    let leagues = content_root(body, "leagues")?;
    let transactions = field(element(&leagues, 0)?, "transactions")?;

    let list = match transactions {
        Value::Array(list) => list,
        // an empty collection comes back as `[]`, which canonicalizes to `{}`
        Value::Object(map) if map.is_empty() => return Ok(Vec::new()),
        _ => {
            return Err(NormalizeError::UnexpectedShape {
                at: "transactions".to_string(),
                expected: "sequence",
            }
            .into())
        }
    };

    let parsed = list
        .iter()
        .map(parse_transaction)
        .collect::<Result<Vec<_>, NormalizeError>>()?;

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction_summary::summarize;
    use serde_json::json;

    #[test]
    fn test_request_url() {
        let client = YahooClient::new("tok", None).unwrap();
        assert_eq!(
            client.request_url("users;use_login=1"),
            "https://fantasysports.yahooapis.com/fantasy/v2/users;use_login=1?format=json"
        );

        let local = Url::parse("http://localhost:8080/").unwrap();
        let client = YahooClient::new("tok", Some(&local)).unwrap();
        assert_eq!(client.request_url("/leagues"), "http://localhost:8080/leagues?format=json");
    }

    #[test]
    fn test_bad_token_is_config_error() {
        assert!(matches!(
            YahooClient::new("line\nbreak", None),
            Err(FeedError::Config(_))
        ));
    }

    #[test]
    fn test_league_options() {
        let body = json!({"fantasy_content": {"users": {
            "0": {"user": [
                {"guid": "G"},
                {"games": {"0": {"game": [
                    {"game_key": "423"},
                    {"leagues": {
                        "0": {"league": [{"league_key": "423.l.10", "name": "Office"}]},
                        "1": {"league": [{"league_key": "423.l.11", "name": "Family"}]},
                        "count": 2
                    }}
                ]}, "count": 1}}
            ]},
            "count": 1
        }}});

        let options = league_options_from_response(&body).unwrap();
        assert_eq!(
            options,
            vec![
                LeagueOption { value: "423.l.10".to_string(), label: "Office".to_string() },
                LeagueOption { value: "423.l.11".to_string(), label: "Family".to_string() },
            ]
        );
    }

    #[test]
    fn test_transactions_in_provider_order() {
        let body = json!({"fantasy_content": {"leagues": {
            "0": {"league": [
                {"league_key": "423.l.10"},
                {"transactions": {
                    "0": {"transaction": [
                        {"transaction_key": "tr.2", "type": "commish", "timestamp": "200"}
                    ]},
                    "1": {"transaction": [
                        {"transaction_key": "tr.1", "type": "drop", "timestamp": "100"},
                        {"players": {"0": {"player": [
                            [{"name": {"full": "Jane Roe"}}, {"editorial_team_abbr": "BUF"}, {"display_position": "WR"}],
                            {"transaction_data": [{"source_team_name": "Team B"}]}
                        ]}, "count": 1}}
                    ]},
                    "count": 2
                }}
            ]},
            "count": 1
        }}});

        let txns = transactions_from_response(&body).unwrap();
        let keys: Vec<_> = txns.iter().map(|t| t.transaction_key.as_str()).collect();
        assert_eq!(keys, vec!["tr.2", "tr.1"]);
        assert_eq!(summarize(&txns[1]), "Drop: (-) Jane Roe, BUF - WR -- Team B");
    }

    #[test]
    fn test_no_transactions() {
        let body = json!({"fantasy_content": {"leagues": {
            "0": {"league": [{"league_key": "423.l.10"}, {"transactions": []}]},
            "count": 1
        }}});
        assert!(transactions_from_response(&body).unwrap().is_empty());
    }

    #[test]
    fn test_structural_fault_fails_whole_batch() {
        let body = json!({"fantasy_content": {"leagues": {
            "0": {"league": [{"league_key": "423.l.10"}, {"transactions": {
                "0": {"transaction": [{"transaction_key": "ok", "type": "commish", "timestamp": "1"}]},
                "count": 2
            }}]},
            "count": 1
        }}});
        assert!(matches!(
            transactions_from_response(&body),
            Err(FeedError::Normalize(NormalizeError::MissingIndex(1)))
        ));
    }
}
