use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::error::{OrchestrateError, Result};
use crate::models::transaction::parse_quantity;
use crate::models::{EthTransaction, Job, JobStatus, JobType};
use crate::store;
use crate::AppState;

use super::start_job;

const COMPONENT: &str = "use-cases.start-next-job";

/// Minimum gas of a Tessera marking transaction
pub const TESSERA_GAS_FLOOR: u64 = 60_000;

/// Data wiring from a STORED private transaction to its public marking transaction
struct MarkingRule {
    successor: JobType,
    predecessor: JobType,
    wire: fn(&EthTransaction, &mut EthTransaction),
}

const MARKING_RULES: [MarkingRule; 2] = [
    MarkingRule {
        successor: JobType::OrionMarkingTransaction,
        predecessor: JobType::OrionEeaTransaction,
        wire: wire_orion,
    },
    MarkingRule {
        successor: JobType::TesseraMarkingTransaction,
        predecessor: JobType::TesseraPrivateTransaction,
        wire: wire_tessera,
    },
];

fn wire_orion(previous: &EthTransaction, next: &mut EthTransaction) {
    next.data = previous.hash.clone();
}

fn wire_tessera(previous: &EthTransaction, next: &mut EthTransaction) {
    next.data = previous.enclave_key.clone();

    let previous_gas = previous.gas.as_deref().and_then(parse_quantity);
    next.gas = match previous_gas {
        Some(gas) if gas >= TESSERA_GAS_FLOOR => previous.gas.clone(),
        _ => Some(TESSERA_GAS_FLOOR.to_string()),
    };
}

/// Start the successor (`next_job_uuid`) of a completed job.
pub async fn start_next_job(state: &AppState, job_uuid: Uuid, tenants: &[String]) -> Result<Job> {
    execute(state, job_uuid, tenants)
        .await
        .map_err(|e| e.extend_component(COMPONENT))
}

async fn execute(state: &AppState, job_uuid: Uuid, tenants: &[String]) -> Result<Job> {
    tracing::debug!(job = %job_uuid, "starting next job");

    let job = store::jobs::find_one_by_uuid(&state.db, job_uuid, tenants)
        .await?
        .entity;
    let next_uuid = job.next_job_uuid.ok_or_else(|| {
        OrchestrateError::data_error(format!("job {} has no next job", job_uuid))
    })?;

    let txn = state.db.begin().await?;

    store::jobs::lock_one_by_uuid(&txn, next_uuid).await?;
    let next = store::jobs::find_one_by_uuid(&txn, next_uuid, tenants).await?;
    let mut successor = next.entity;

    if let Some(rule) = MARKING_RULES.iter().find(|r| r.successor == successor.job_type) {
        if job.job_type != rule.predecessor || job.status != JobStatus::Stored {
            return Err(OrchestrateError::data_error(format!(
                "expected a {} job at status {} before {}, got {} at status {}",
                rule.predecessor,
                JobStatus::Stored,
                rule.successor,
                job.job_type,
                job.status
            )));
        }

        (rule.wire)(&job.transaction, &mut successor.transaction);
        store::transactions::update(&txn, next.transaction_id, &successor.transaction).await?;
    }

    txn.commit().await?;

    start_job(state, next_uuid, tenants).await
}
