use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::job::Job;

/// Tenant-owned container of the jobs of one logical transaction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub uuid: Uuid,
    pub tenant_id: String,
    pub jobs: Vec<Job>,
    pub created_at: DateTime<Utc>,
}
