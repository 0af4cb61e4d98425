use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transaction types a league can be filtered on. `"*"` expands to these.
pub const ALL_EVENT_TYPES: [&str; 4] = ["add", "drop", "commish", "trade"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerName {
    pub full: String,
}

/// Team movement attached to each player of a transaction. Which keys are
/// present depends on the move: adds carry the destination, drops the source,
/// trades both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    pub source_team_key: Option<String>,
    pub source_team_name: Option<String>,
    pub destination_team_key: Option<String>,
    pub destination_team_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: PlayerName,
    pub editorial_team_abbr: String,
    pub display_position: String,
    #[serde(default)]
    pub transaction_data: TransactionData,
}

/// Type tag of a transaction together with the players its summary needs.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionKind {
    Add {
        player: Player,
    },
    AddDrop {
        added: Player,
        dropped: Player,
    },
    Drop {
        player: Player,
    },
    Commish,
    Trade {
        trader_team_key: String,
        tradee_team_key: String,
        players: Vec<Player>,
    },
    Other {
        tag: String,
    },
}

impl TransactionKind {
    pub fn tag(&self) -> &str {
        match self {
            TransactionKind::Add { .. } => "add",
            TransactionKind::AddDrop { .. } => "add/drop",
            TransactionKind::Drop { .. } => "drop",
            TransactionKind::Commish => "commish",
            TransactionKind::Trade { .. } => "trade",
            TransactionKind::Other { tag } => tag.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_key: String,
    /// Seconds since the epoch.
    pub timestamp: i64,
    pub kind: TransactionKind,
    /// Canonical record as returned by the provider, forwarded with the event.
    pub payload: Value,
}

/// One entry of the league picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueOption {
    pub value: String,
    pub label: String,
}

/// What gets handed to the sink for each transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedEvent {
    pub id: String,
    pub timestamp_ms: i64,
    pub summary: String,
    pub transaction: Value,
}

/// Ordered list of transaction types to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTypeFilter {
    types: Vec<String>,
}

impl EventTypeFilter {
    pub fn all() -> Self {
        Self {
            types: ALL_EVENT_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Builds a filter from user input. A `"*"` anywhere selects every
    /// declared type; otherwise the given order is kept. An empty list (or one
    /// of blank entries only) also selects every declared type rather than
    /// requesting `types=` with nothing in it.
    pub fn from_list<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = Vec::new();
        for t in types {
            let t = t.as_ref().trim();
            if t == "*" {
                return Self::all();
            }
            if !t.is_empty() {
                selected.push(t.to_string());
            }
        }

        if selected.is_empty() {
            Self::all()
        } else {
            Self { types: selected }
        }
    }

    /// Value for the `types=` path parameter.
    pub fn to_query(&self) -> String {
        self.types.join(",")
    }
}

impl Default for EventTypeFilter {
    fn default() -> Self {
        Self::all()
    }
}
