use uuid::Uuid;

use crate::error::{OrchestrateError, Result};
use crate::models::{EthTransaction, Job, JobFilters, JobStatus, JobType, NewJob};
use crate::store;
use crate::AppState;

use super::{create_job, start_job};

const COMPONENT: &str = "use-cases.retry-job-tx";
const RETRY_ORDER_LABEL: &str = "retryOrder";

/// Speed up a PENDING job by racing it with a new job carrying a higher gas price.
///
/// The new job is a lineage child of `job_uuid`; raw transactions are re-submitted unchanged.
pub async fn retry_job_tx(
    state: &AppState,
    job_uuid: Uuid,
    gas_increment: f64,
    data: Option<String>,
    tenants: &[String],
) -> Result<Job> {
    execute(state, job_uuid, gas_increment, data, tenants)
        .await
        .map_err(|e| e.extend_component(COMPONENT))
}

async fn execute(
    state: &AppState,
    job_uuid: Uuid,
    gas_increment: f64,
    data: Option<String>,
    tenants: &[String],
) -> Result<Job> {
    tracing::debug!(job = %job_uuid, gas_increment, "retrying job transaction");

    let job = store::jobs::find_one_by_uuid(&state.db, job_uuid, tenants)
        .await?
        .entity;

    if job.status != JobStatus::Pending {
        tracing::warn!(job = %job_uuid, status = %job.status, "cannot retry job");
        return Err(OrchestrateError::invalid_state(format!(
            "cannot retry job {} at status {}",
            job_uuid, job.status
        )));
    }

    let lineage = store::jobs::search(
        &state.db,
        &JobFilters {
            parent_job_uuid: Some(job.uuid),
            ..Default::default()
        },
        tenants,
    )
    .await?;
    let retries = lineage
        .iter()
        .filter(|stored| stored.entity.internal_data.parent_job_uuid == Some(job.uuid))
        .count();

    let mut draft = NewJob::new(job.schedule_uuid, job.chain_uuid, job.job_type, retry_transaction(&job, gas_increment, data)?);
    draft.labels = job.labels.clone();
    draft
        .labels
        .insert(RETRY_ORDER_LABEL.to_string(), (retries + 1).to_string());
    draft.internal_data = job.internal_data.clone();
    draft.internal_data.parent_job_uuid = Some(job.uuid);
    draft.internal_data.last_retry_at = None;

    let child = create_job(state, draft, tenants).await?;
    let started = start_job(state, child.uuid, tenants).await?;

    tracing::info!(job = %job_uuid, child = %started.uuid, "retry job started");
    Ok(started)
}

fn retry_transaction(job: &Job, gas_increment: f64, data: Option<String>) -> Result<EthTransaction> {
    let source = &job.transaction;

    if job.job_type == JobType::EthereumRawTransaction {
        return Ok(EthTransaction {
            raw: source.raw.clone(),
            ..Default::default()
        });
    }

    let mut transaction = EthTransaction {
        from: source.from.clone(),
        to: source.to.clone(),
        nonce: source.nonce.clone(),
        value: source.value.clone(),
        gas: source.gas.clone(),
        gas_price: source.gas_price.clone(),
        gas_fee_cap: source.gas_fee_cap.clone(),
        gas_tip_cap: source.gas_tip_cap.clone(),
        data: source.data.clone(),
        transaction_type: source.transaction_type,
        private_from: source.private_from.clone(),
        private_for: source.private_for.clone(),
        privacy_group_id: source.privacy_group_id.clone(),
        ..Default::default()
    };

    if let Some(data) = data.filter(|d| !d.is_empty()) {
        transaction.data = Some(data);
    }

    transaction
        .bump_gas(gas_increment)
        .map_err(OrchestrateError::invalid_parameter)?;

    Ok(transaction)
}
