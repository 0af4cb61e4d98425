use serde::Deserialize;
use serde_json::Value;

use crate::error::NormalizeError;
use crate::normalization::{field, str_field};
use crate::shared_types::{Player, Transaction, TransactionKind};

/// Builds a typed transaction from its canonical mapping.
///
/// On top of `parse_kind`, this reads the id and timestamp the emitted event
/// needs.
pub fn parse_transaction(canonical: &Value) -> Result<Transaction, NormalizeError> {
    let transaction_key = str_field(canonical, "transaction_key")?;
    let timestamp = parse_timestamp(field(canonical, "timestamp")?)?;
    let kind = parse_kind(canonical)?;

    Ok(Transaction {
        transaction_key,
        timestamp,
        kind,
        payload: canonical.clone(),
    })
}

/// Classifies a canonical transaction by its `type` tag.
///
/// Player arity and the team names each summary needs are checked here, so
/// `summarize` never indexes into anything. Commissioner events and unknown
/// tags do not look at players at all. A missing or non-string tag is
/// treated as unknown.
pub fn parse_kind(canonical: &Value) -> Result<TransactionKind, NormalizeError> {
    let tag = match canonical.get("type") {
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    let kind = match tag.as_str() {
        "add" => {
            let player = first_player(canonical)?;
            require(&player.transaction_data.destination_team_name, "destination_team_name")?;
            TransactionKind::Add { player }
        }
        "add/drop" => {
            let players = players(canonical)?;
            if players.len() < 2 {
                return Err(NormalizeError::InvalidField {
                    field: "players".to_string(),
                    reason: format!("add/drop needs two players, got {}", players.len()),
                });
            }
            let (added, dropped) = split_add_drop(players);
            require(&added.transaction_data.destination_team_name, "destination_team_name")?;
            TransactionKind::AddDrop { added, dropped }
        }
        "drop" => {
            let player = first_player(canonical)?;
            require(&player.transaction_data.source_team_name, "source_team_name")?;
            TransactionKind::Drop { player }
        }
        "commish" => TransactionKind::Commish,
        "trade" => TransactionKind::Trade {
            trader_team_key: str_field(canonical, "trader_team_key")?,
            tradee_team_key: str_field(canonical, "tradee_team_key")?,
            players: players(canonical)?,
        },
        _ => TransactionKind::Other { tag },
    };

    Ok(kind)
}

/// Summary of a canonical transaction, without needing its id or timestamp.
pub fn summarize_canonical(canonical: &Value) -> Result<String, NormalizeError> {
    Ok(summarize_kind(&parse_kind(canonical)?))
}

fn parse_timestamp(value: &Value) -> Result<i64, NormalizeError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    // must still fit once scaled to milliseconds
    parsed
        .filter(|secs| secs.checked_mul(1000).is_some())
        .ok_or_else(|| NormalizeError::InvalidField {
            field: "timestamp".to_string(),
            reason: format!("expected epoch seconds, got {}", value),
        })
}

fn players(canonical: &Value) -> Result<Vec<Player>, NormalizeError> {
    let list = field(canonical, "players")?
        .as_array()
        .ok_or_else(|| NormalizeError::UnexpectedShape {
            at: "players".to_string(),
            expected: "sequence",
        })?;

    list.iter()
        .enumerate()
        .map(|(i, p)| {
            Player::deserialize(p).map_err(|e| NormalizeError::InvalidField {
                field: format!("players[{}]", i),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn first_player(canonical: &Value) -> Result<Player, NormalizeError> {
    players(canonical)?
        .into_iter()
        .next()
        .ok_or(NormalizeError::MissingIndex(0))
}

fn require(value: &Option<String>, name: &str) -> Result<(), NormalizeError> {
    match value {
        Some(_) => Ok(()),
        None => Err(NormalizeError::MissingKey(name.to_string())),
    }
}

/// Picks the added player by its transaction data: it lands on a team and
/// leaves none. Falls back to listing order when that is ambiguous.
fn split_add_drop(mut players: Vec<Player>) -> (Player, Player) {
    let is_added = |p: &Player| {
        p.transaction_data.destination_team_name.is_some()
            && p.transaction_data.source_team_name.is_none()
    };

    let added_idx = if players.iter().filter(|p| is_added(*p)).count() == 1 {
        players.iter().position(is_added).unwrap_or(0)
    } else {
        0
    };

    let added = players.remove(added_idx);
    let dropped = players.remove(0);
    (added, dropped)
}

pub fn display_player(p: &Player) -> String {
    format!(
        "{}, {} - {}",
        p.name.full, p.editorial_team_abbr, p.display_position
    )
}

/// One-line summary of a transaction.
pub fn summarize(txn: &Transaction) -> String {
    summarize_kind(&txn.kind)
}

fn summarize_kind(kind: &TransactionKind) -> String {
    match kind {
        TransactionKind::Add { player } => format!(
            "Add: (+) {} -- {}",
            display_player(player),
            team_name(&player.transaction_data.destination_team_name)
        ),
        TransactionKind::AddDrop { added, dropped } => format!(
            "Add/Drop: (+) {} (-) {} -- {}",
            display_player(added),
            display_player(dropped),
            team_name(&added.transaction_data.destination_team_name)
        ),
        TransactionKind::Drop { player } => format!(
            "Drop: (-) {} -- {}",
            display_player(player),
            team_name(&player.transaction_data.source_team_name)
        ),
        TransactionKind::Commish => "Commish event".to_string(),
        TransactionKind::Trade {
            trader_team_key,
            tradee_team_key,
            players,
        } => format!(
            "Trade: {} -- {}",
            trade_side(players, trader_team_key),
            trade_side(players, tradee_team_key)
        ),
        TransactionKind::Other { .. } => "Unhandled transaction type".to_string(),
    }
}

fn team_name(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or_default()
}

// Players leaving `team_key`, in listing order.
fn trade_side(players: &[Player], team_key: &str) -> String {
    players
        .iter()
        .filter(|p| p.transaction_data.source_team_key.as_deref() == Some(team_key))
        .map(display_player)
        .collect::<Vec<_>>()
        .join(" / ")
}
