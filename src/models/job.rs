//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::log::Log;
use super::status::JobStatus;
use super::transaction::EthTransaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "eth://ethereum/transaction")]
    EthereumTransaction,
    #[serde(rename = "eth://ethereum/rawTransaction")]
    EthereumRawTransaction,
    #[serde(rename = "eth://orion/eeaTransaction")]
    OrionEeaTransaction,
    #[serde(rename = "eth://orion/markingTransaction")]
    OrionMarkingTransaction,
    #[serde(rename = "eth://tessera/privateTransaction")]
    TesseraPrivateTransaction,
    #[serde(rename = "eth://tessera/markingTransaction")]
    TesseraMarkingTransaction,
}

impl JobType {
    pub const ALL: [JobType; 6] = [
        JobType::EthereumTransaction,
        JobType::EthereumRawTransaction,
        JobType::OrionEeaTransaction,
        JobType::OrionMarkingTransaction,
        JobType::TesseraPrivateTransaction,
        JobType::TesseraMarkingTransaction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobType::EthereumTransaction => "eth://ethereum/transaction",
            JobType::EthereumRawTransaction => "eth://ethereum/rawTransaction",
            JobType::OrionEeaTransaction => "eth://orion/eeaTransaction",
            JobType::OrionMarkingTransaction => "eth://orion/markingTransaction",
            JobType::TesseraPrivateTransaction => "eth://tessera/privateTransaction",
            JobType::TesseraMarkingTransaction => "eth://tessera/markingTransaction",
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown job type: {}", s))
    }
}

/// Orchestration metadata that is not part of the on-chain transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InternalData {
    /// Numeric chain id, resolved from the chain UUID at creation
    pub chain_id: String,
    /// Lineage back-reference: child of a parent job, or resend/retry of it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_job_uuid: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_nonce: Option<String>,
    pub one_time_key: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub priority: String,
    /// Retry policy picked up by the transaction sentry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_interval_secs: Option<u64>,
    pub gas_price_increment: f64,
    pub gas_price_limit: f64,
    /// Last time the transaction sentry acted on this lineage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_retry_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub uuid: Uuid,
    pub schedule_uuid: Uuid,
    pub chain_uuid: Uuid,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub next_job_uuid: Option<Uuid>,
    pub internal_data: InternalData,
    pub labels: HashMap<String, String>,
    pub transaction: EthTransaction,
    pub logs: Vec<Log>,
    /// Derived from `logs`, never persisted
    pub status: JobStatus,
    pub tenant_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn last_log(&self) -> Option<&Log> {
        self.logs.last()
    }

    /// Lineage key grouping this job with its competing attempts
    pub fn lineage_root(&self) -> Uuid {
        self.internal_data.parent_job_uuid.unwrap_or(self.uuid)
    }
}

/// Draft accepted by the create-job use-case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    /// Preassigned identity, used when a predecessor references this job
    #[serde(default)]
    pub uuid: Option<Uuid>,
    pub schedule_uuid: Uuid,
    pub chain_uuid: Uuid,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(default)]
    pub next_job_uuid: Option<Uuid>,
    #[serde(default)]
    pub internal_data: InternalData,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub transaction: EthTransaction,
}

impl NewJob {
    pub fn new(schedule_uuid: Uuid, chain_uuid: Uuid, job_type: JobType, transaction: EthTransaction) -> Self {
        Self {
            uuid: None,
            schedule_uuid,
            chain_uuid,
            job_type,
            next_job_uuid: None,
            internal_data: InternalData::default(),
            labels: HashMap::new(),
            transaction,
        }
    }
}

/// Patch accepted by the update-job use-case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub uuid: Uuid,
    #[serde(default)]
    pub transaction: Option<EthTransaction>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
    #[serde(default)]
    pub internal_data: Option<InternalData>,
}

impl JobUpdate {
    pub fn status(uuid: Uuid, status: JobStatus, message: impl Into<String>) -> Self {
        Self {
            uuid,
            status: Some(status),
            message: message.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilters {
    pub chain_uuid: Option<Uuid>,
    pub schedule_uuid: Option<Uuid>,
    /// Jobs of this lineage, including the lineage root itself
    pub parent_job_uuid: Option<Uuid>,
    /// Matched against the derived status
    pub status: Option<JobStatus>,
    pub only_parents: bool,
    pub tx_hashes: Vec<String>,
    pub updated_after: Option<DateTime<Utc>>,
}
