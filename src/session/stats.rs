use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::SessionState;

/// Snapshot of a recognition session's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Current lifecycle state
    pub state: SessionState,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Seconds since creation
    pub duration_secs: f64,

    /// Audio chunks forwarded to the service so far
    pub chunks_sent: usize,

    /// Normalized events delivered to the caller so far
    pub events_delivered: usize,
}
