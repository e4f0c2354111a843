use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::error::{ErrorKind, OrchestrateError, Result};
use crate::models::{Job, JobStatus, JobType, NewJob};
use crate::store::{self, parsers};
use crate::AppState;

const COMPONENT: &str = "use-cases.create-job";

/// Register a new job under an existing schedule with a single CREATED log.
///
/// Unknown chains and unregistered senders are caller input errors and come back
/// as InvalidParameter. A job with a parent can only be created while the parent
/// is PENDING.
pub async fn create_job(state: &AppState, draft: NewJob, tenants: &[String]) -> Result<Job> {
    execute(state, draft, tenants)
        .await
        .map_err(|e| e.extend_component(COMPONENT))
}

async fn execute(state: &AppState, draft: NewJob, tenants: &[String]) -> Result<Job> {
    tracing::debug!(schedule = %draft.schedule_uuid, chain = %draft.chain_uuid, job_type = %draft.job_type, "creating job");

    let chain_id = state
        .chains
        .get_chain_id(draft.chain_uuid, tenants)
        .await
        .map_err(as_invalid_parameter)?;

    if draft.job_type != JobType::EthereumRawTransaction {
        check_sender(state, &draft, tenants).await?;
    }

    let txn = state.db.begin().await?;

    let schedule = store::schedules::find_one_by_uuid(&txn, draft.schedule_uuid, tenants).await?;

    if let Some(parent_uuid) = draft.internal_data.parent_job_uuid {
        store::jobs::lock_one_by_uuid(&txn, parent_uuid).await?;
        let parent = store::jobs::find_one_by_uuid(&txn, parent_uuid, tenants).await?;
        if parent.entity.status != JobStatus::Pending {
            tracing::warn!(parent = %parent_uuid, status = %parent.entity.status, "parent job is not pending");
            return Err(OrchestrateError::invalid_state(format!(
                "cannot create a child of job {} at status {}",
                parent_uuid, parent.entity.status
            )));
        }
    }

    let transaction = store::transactions::insert(&txn, &draft.transaction).await?;

    let now = chrono::Utc::now();
    let mut internal_data = draft.internal_data;
    internal_data.chain_id = chain_id;
    let job = Job {
        uuid: draft.uuid.unwrap_or_else(Uuid::new_v4),
        schedule_uuid: schedule.uuid,
        chain_uuid: draft.chain_uuid,
        job_type: draft.job_type,
        next_job_uuid: draft.next_job_uuid,
        internal_data,
        labels: draft.labels,
        transaction: draft.transaction,
        logs: vec![],
        status: JobStatus::Created,
        tenant_id: schedule.tenant_id.clone(),
        created_at: now,
        updated_at: now,
    };

    let record = parsers::record_from_job(&job, 0, schedule.id, transaction.id)?;
    let inserted = store::jobs::insert(&txn, &record.job).await?;
    store::logs::insert(&txn, inserted.id, JobStatus::Created, "").await?;

    txn.commit().await?;

    tracing::info!(job = %job.uuid, schedule = %job.schedule_uuid, "job created");

    let created = store::jobs::find_one_by_uuid(&state.db, job.uuid, tenants).await?;
    Ok(created.entity)
}

async fn check_sender(state: &AppState, draft: &NewJob, tenants: &[String]) -> Result<()> {
    let sender = draft
        .transaction
        .sender()
        .map_err(OrchestrateError::invalid_parameter)?;

    if let Some(address) = sender {
        let exists = state
            .accounts
            .account_exists(&address.to_string(), tenants)
            .await
            .map_err(as_invalid_parameter)?;
        if !exists {
            return Err(OrchestrateError::invalid_parameter(format!(
                "account {} is not registered",
                address
            )));
        }
    }

    Ok(())
}

/// References supplied by the caller that do not resolve are invalid input, not missing resources
fn as_invalid_parameter(err: OrchestrateError) -> OrchestrateError {
    if err.kind == ErrorKind::NotFound {
        OrchestrateError {
            kind: ErrorKind::InvalidParameter,
            ..err
        }
    } else {
        err
    }
}
