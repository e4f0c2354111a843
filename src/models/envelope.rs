//! Message handed to the downstream pipeline (signer, sender)
//!
//! The payload is JSON; consumers only rely on the metadata labels below.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::job::{Job, JobType};
use super::transaction::EthTransaction;

pub const JOB_UUID_LABEL: &str = "jobUUID";
pub const PARENT_JOB_UUID_LABEL: &str = "parentJobUUID";
pub const NEXT_JOB_UUID_LABEL: &str = "nextJobUUID";
pub const PRIORITY_LABEL: &str = "priority";
pub const ONE_TIME_KEY_LABEL: &str = "oneTimeKey";
pub const TX_HASH_LABEL: &str = "txHash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxEnvelope {
    pub schedule_uuid: Uuid,
    pub job_uuid: Uuid,
    pub chain_uuid: Uuid,
    pub chain_id: String,
    pub job_type: JobType,
    pub transaction: EthTransaction,
    /// Job labels merged with the orchestration metadata labels
    pub metadata: HashMap<String, String>,
}

impl TxEnvelope {
    pub fn from_job(job: &Job) -> Self {
        let mut metadata = job.labels.clone();
        metadata.insert(JOB_UUID_LABEL.to_string(), job.uuid.to_string());

        if let Some(parent) = job.internal_data.parent_job_uuid {
            metadata.insert(PARENT_JOB_UUID_LABEL.to_string(), parent.to_string());
        }
        if let Some(next) = job.next_job_uuid {
            metadata.insert(NEXT_JOB_UUID_LABEL.to_string(), next.to_string());
        }
        if !job.internal_data.priority.is_empty() {
            metadata.insert(PRIORITY_LABEL.to_string(), job.internal_data.priority.clone());
        }
        if job.internal_data.one_time_key {
            metadata.insert(ONE_TIME_KEY_LABEL.to_string(), "true".to_string());
        }
        if let Some(hash) = job.transaction.hash.as_ref().filter(|h| !h.is_empty()) {
            metadata.insert(TX_HASH_LABEL.to_string(), hash.clone());
        }

        Self {
            schedule_uuid: job.schedule_uuid,
            job_uuid: job.uuid,
            chain_uuid: job.chain_uuid,
            chain_id: job.internal_data.chain_id.clone(),
            job_type: job.job_type,
            transaction: job.transaction.clone(),
            metadata,
        }
    }

    /// Mark the envelope as a redelivery of `job_uuid`
    pub fn with_parent_job_uuid(mut self, job_uuid: Uuid) -> Self {
        self.metadata
            .insert(PARENT_JOB_UUID_LABEL.to_string(), job_uuid.to_string());
        self
    }

    pub fn parent_job_uuid(&self) -> Option<Uuid> {
        self.metadata
            .get(PARENT_JOB_UUID_LABEL)
            .and_then(|v| Uuid::parse_str(v).ok())
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
