//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/presence`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceDto {
    /// Online usernames, deduplicated and sorted
    pub usernames: Vec<String>,
    /// Live transport connections (joined or not)
    pub connections: usize,
    /// Sessions in the table, including those in their grace window
    pub sessions: usize,
}
