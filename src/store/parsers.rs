//! Translation between storage rows and domain types

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use std::collections::HashMap;

use crate::entities::{jobs, logs, schedules, transactions};
use crate::error::{OrchestrateError, Result};
use crate::models::status::derive_status;
use crate::models::{EthTransaction, InternalData, Job, JobStatus, Log, Schedule};

/// A job row with everything needed to rebuild the domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub job: jobs::Model,
    pub schedule: schedules::Model,
    pub transaction: transactions::Model,
    /// Ordered by id
    pub logs: Vec<logs::Model>,
}

pub fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

pub fn job_from_record(record: JobRecord) -> Result<Job> {
    let JobRecord {
        job,
        schedule,
        transaction,
        logs,
    } = record;

    let job_type = job
        .job_type
        .parse()
        .map_err(OrchestrateError::data_error)?;
    let labels: HashMap<String, String> = serde_json::from_value(job.labels)
        .map_err(|e| OrchestrateError::data_error(format!("invalid job labels: {}", e)))?;
    let mut internal_data: InternalData = serde_json::from_value(job.internal_data)
        .map_err(|e| OrchestrateError::data_error(format!("invalid job internal data: {}", e)))?;
    // The indexed column is authoritative for lineage
    internal_data.parent_job_uuid = job.parent_job_uuid;

    let logs = logs
        .into_iter()
        .map(log_from_model)
        .collect::<Result<Vec<_>>>()?;
    let status = derive_status(&logs);

    Ok(Job {
        uuid: job.uuid,
        schedule_uuid: schedule.uuid,
        chain_uuid: job.chain_uuid,
        job_type,
        next_job_uuid: job.next_job_uuid,
        internal_data,
        labels,
        transaction: transaction_from_model(transaction),
        logs,
        status,
        tenant_id: schedule.tenant_id,
        created_at: job.created_at.with_timezone(&Utc),
        updated_at: job.updated_at.with_timezone(&Utc),
    })
}

/// Storage representation of a job; ids are those of the already persisted rows
pub fn record_from_job(job: &Job, job_id: i32, schedule_id: i32, transaction_id: i32) -> Result<JobRecord> {
    let labels = serde_json::to_value(&job.labels)
        .map_err(|e| OrchestrateError::data_error(format!("invalid job labels: {}", e)))?;
    let internal_data = serde_json::to_value(&job.internal_data)
        .map_err(|e| OrchestrateError::data_error(format!("invalid job internal data: {}", e)))?;

    let created_at = job.created_at.fixed_offset();
    let updated_at = job.updated_at.fixed_offset();

    Ok(JobRecord {
        job: jobs::Model {
            id: job_id,
            uuid: job.uuid,
            schedule_id,
            transaction_id,
            chain_uuid: job.chain_uuid,
            job_type: job.job_type.to_string(),
            next_job_uuid: job.next_job_uuid,
            parent_job_uuid: job.internal_data.parent_job_uuid,
            is_parent: job.internal_data.parent_job_uuid.is_none(),
            labels,
            internal_data,
            created_at,
            updated_at,
        },
        schedule: schedules::Model {
            id: schedule_id,
            uuid: job.schedule_uuid,
            tenant_id: job.tenant_id.clone(),
            created_at,
        },
        transaction: transaction_model(&job.transaction, transaction_id, created_at, updated_at),
        logs: job
            .logs
            .iter()
            .map(|log| logs::Model {
                id: log.id,
                job_id,
                status: log.status.to_string(),
                message: log.message.clone(),
                created_at: log.created_at.fixed_offset(),
            })
            .collect(),
    })
}

pub fn log_from_model(model: logs::Model) -> Result<Log> {
    let status: JobStatus = model
        .status
        .parse()
        .map_err(OrchestrateError::data_error)?;

    Ok(Log {
        id: model.id,
        job_id: model.job_id,
        status,
        message: model.message,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub fn transaction_from_model(model: transactions::Model) -> EthTransaction {
    EthTransaction {
        hash: model.hash,
        from: model.sender,
        to: model.recipient,
        nonce: model.nonce,
        value: model.value,
        gas_price: model.gas_price,
        gas_fee_cap: model.gas_fee_cap,
        gas_tip_cap: model.gas_tip_cap,
        gas: model.gas,
        data: model.data,
        raw: model.raw,
        transaction_type: model.tx_type.and_then(|t| t.parse().ok()),
        private_from: model.private_from,
        private_for: model
            .private_for
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
        privacy_group_id: model.privacy_group_id,
        enclave_key: model.enclave_key,
    }
}

fn transaction_model(
    tx: &EthTransaction,
    id: i32,
    created_at: DateTime<FixedOffset>,
    updated_at: DateTime<FixedOffset>,
) -> transactions::Model {
    transactions::Model {
        id,
        hash: tx.hash.clone(),
        sender: tx.from.clone(),
        recipient: tx.to.clone(),
        nonce: tx.nonce.clone(),
        value: tx.value.clone(),
        gas_price: tx.gas_price.clone(),
        gas_fee_cap: tx.gas_fee_cap.clone(),
        gas_tip_cap: tx.gas_tip_cap.clone(),
        gas: tx.gas.clone(),
        data: tx.data.clone(),
        raw: tx.raw.clone(),
        tx_type: tx.transaction_type.map(|t| t.to_string()),
        private_from: tx.private_from.clone(),
        private_for: private_for_json(&tx.private_for),
        privacy_group_id: tx.privacy_group_id.clone(),
        enclave_key: tx.enclave_key.clone(),
        created_at,
        updated_at,
    }
}

fn private_for_json(private_for: &[String]) -> Option<serde_json::Value> {
    if private_for.is_empty() {
        None
    } else {
        Some(serde_json::Value::from(private_for.to_vec()))
    }
}

/// Every transaction field as `Set`; id and created_at are left to the caller
pub fn transaction_active_model(tx: &EthTransaction) -> transactions::ActiveModel {
    transactions::ActiveModel {
        id: NotSet,
        hash: Set(tx.hash.clone()),
        sender: Set(tx.from.clone()),
        recipient: Set(tx.to.clone()),
        nonce: Set(tx.nonce.clone()),
        value: Set(tx.value.clone()),
        gas_price: Set(tx.gas_price.clone()),
        gas_fee_cap: Set(tx.gas_fee_cap.clone()),
        gas_tip_cap: Set(tx.gas_tip_cap.clone()),
        gas: Set(tx.gas.clone()),
        data: Set(tx.data.clone()),
        raw: Set(tx.raw.clone()),
        tx_type: Set(tx.transaction_type.map(|t| t.to_string())),
        private_from: Set(tx.private_from.clone()),
        private_for: Set(private_for_json(&tx.private_for)),
        privacy_group_id: Set(tx.privacy_group_id.clone()),
        enclave_key: Set(tx.enclave_key.clone()),
        created_at: NotSet,
        updated_at: Set(now()),
    }
}

pub fn schedule_from_model(model: schedules::Model, jobs: Vec<Job>) -> Schedule {
    Schedule {
        uuid: model.uuid,
        tenant_id: model.tenant_id,
        jobs,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobType, TransactionType};
    use chrono::Duration;
    use uuid::Uuid;

    fn sample_job() -> Job {
        let created_at = Utc::now();
        let logs = vec![
            Log {
                id: 10,
                job_id: 1,
                status: JobStatus::Created,
                message: String::new(),
                created_at,
            },
            Log {
                id: 11,
                job_id: 1,
                status: JobStatus::Started,
                message: String::new(),
                created_at: created_at + Duration::seconds(1),
            },
            Log {
                id: 12,
                job_id: 1,
                status: JobStatus::Warning,
                message: "gas estimation fallback".to_string(),
                created_at: created_at + Duration::seconds(2),
            },
        ];

        Job {
            uuid: Uuid::new_v4(),
            schedule_uuid: Uuid::new_v4(),
            chain_uuid: Uuid::new_v4(),
            job_type: JobType::TesseraPrivateTransaction,
            next_job_uuid: Some(Uuid::new_v4()),
            internal_data: InternalData {
                chain_id: "888".to_string(),
                parent_job_uuid: Some(Uuid::new_v4()),
                one_time_key: true,
                priority: "high".to_string(),
                retry_interval_secs: Some(30),
                gas_price_increment: 0.1,
                gas_price_limit: 0.5,
                ..Default::default()
            },
            labels: HashMap::from([("retryOrder".to_string(), "1".to_string())]),
            transaction: EthTransaction {
                from: Some("0x905B88EFf8Bda1543d4d6f4aA05afef143D27E18".to_string()),
                gas: Some("21000".to_string()),
                private_for: vec!["A1aVtMxLCUHmBVHXoZzzBgPbW/wj5axDpW9X8l91SGo=".to_string()],
                transaction_type: Some(TransactionType::Legacy),
                ..Default::default()
            },
            logs,
            status: JobStatus::Started,
            tenant_id: "tenantOne".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_job_storage_roundtrip() {
        let job = sample_job();
        let record = record_from_job(&job, 1, 2, 3).unwrap();

        assert!(!record.job.is_parent);
        assert_eq!(record.logs.len(), 3);

        let restored = job_from_record(record).unwrap();
        assert!(restored.logs.iter().all(|log| log.job_id == 1));
        assert_eq!(restored.uuid, job.uuid);
        assert_eq!(restored.chain_uuid, job.chain_uuid);
        assert_eq!(restored.job_type, job.job_type);
        assert_eq!(restored.labels, job.labels);
        assert_eq!(restored.internal_data, job.internal_data);
        assert_eq!(restored.logs, job.logs);
        assert_eq!(restored.transaction, job.transaction);
        assert_eq!(restored.status, JobStatus::Started);
    }

    #[test]
    fn test_unknown_status_is_data_error() {
        let model = logs::Model {
            id: 1,
            job_id: 1,
            status: "EXPLODED".to_string(),
            message: String::new(),
            created_at: now(),
        };
        let err = log_from_model(model).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::DataError);
    }
}
