use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::JobStatus;

/// Immutable status event of a job; `id` is the store's monotonic sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    pub id: i32,
    /// Storage id of the owning job
    pub job_id: i32,
    pub status: JobStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
