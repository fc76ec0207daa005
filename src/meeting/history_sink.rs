//! Destination for finished meeting records.

use anyhow::Result;
use uuid::Uuid;

use crate::scrum::History;

/// Receives the history record of a saved meeting. The record belongs at the
/// front of the owning scrum's history.
pub trait HistorySink: Send + Sync {
    fn record(&self, scrum_id: Uuid, history: &History) -> Result<()>;
}
