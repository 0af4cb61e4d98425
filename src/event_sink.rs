use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, info};

use crate::error::FeedError;
use crate::shared_types::{EmittedEvent, Transaction};
use crate::transaction_summary::summarize;

impl EmittedEvent {
    pub fn from_transaction(txn: &Transaction) -> Self {
        Self {
            id: txn.transaction_key.clone(),
            timestamp_ms: txn.timestamp.saturating_mul(1000),
            summary: summarize(txn),
            transaction: txn.payload.clone(),
        }
    }
}

/// Receives formatted transactions. Returns `true` when the event was new.
pub trait EventSink {
    fn emit(&mut self, event: EmittedEvent) -> Result<bool, FeedError>;
}

/// Writes each event once, as a JSON line, skipping ids it has already seen.
pub struct UniqueSink<W: Write> {
    out: W,
    seen: HashSet<String>,
}

impl<W: Write> UniqueSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            seen: HashSet::new(),
        }
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for UniqueSink<W> {
    fn emit(&mut self, event: EmittedEvent) -> Result<bool, FeedError> {
        if self.seen.contains(&event.id) {
            debug!(id = %event.id, "duplicate transaction skipped");
            return Ok(false);
        }

        serde_json::to_writer(&mut self.out, &event)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;

        let at = DateTime::<Utc>::from_timestamp_millis(event.timestamp_ms)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        info!(id = %event.id, %at, "{}", event.summary);

        self.seen.insert(event.id);
        Ok(true)
    }
}
