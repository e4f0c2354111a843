use sea_orm::TransactionTrait;

use crate::error::{OrchestrateError, Result};
use crate::models::status::can_transition;
use crate::models::{Job, JobStatus, JobUpdate};
use crate::store;
use crate::AppState;

use super::{start_next_job, update_children};

const COMPONENT: &str = "use-cases.update-job";

/// Apply a status report or patch to a job that has not reached a final status.
///
/// A MINED report finalizes competing siblings as NEVER_MINED in the same
/// transaction. Once committed, MINED or STORED starts the job's successor.
pub async fn update_job(state: &AppState, update: JobUpdate, tenants: &[String]) -> Result<Job> {
    execute(state, update, tenants)
        .await
        .map_err(|e| e.extend_component(COMPONENT))
}

async fn execute(state: &AppState, update: JobUpdate, tenants: &[String]) -> Result<Job> {
    let job_uuid = update.uuid;
    tracing::debug!(job = %job_uuid, status = ?update.status, "updating job");

    let txn = state.db.begin().await?;

    store::jobs::lock_one_by_uuid(&txn, job_uuid).await?;
    let stored = store::jobs::find_one_by_uuid(&txn, job_uuid, tenants).await?;
    let mut job = stored.entity;

    if job.status.is_final() {
        tracing::warn!(job = %job_uuid, status = %job.status, "job already has a final status");
        return Err(OrchestrateError::invalid_parameter(format!(
            "job {} has already been updated to final status {}",
            job_uuid, job.status
        )));
    }

    if let Some(next) = update.status {
        if !can_transition(next, job.status) {
            tracing::warn!(job = %job_uuid, from = %job.status, to = %next, "illegal status transition");
            return Err(OrchestrateError::invalid_state(format!(
                "cannot transition job {} from {} to {}",
                job_uuid, job.status, next
            )));
        }
    }

    if let Some(patch) = &update.transaction {
        job.transaction.merge(patch);
        store::transactions::update(&txn, stored.transaction_id, &job.transaction).await?;
    }

    let mut transition = None;
    if let Some(next) = update.status {
        let previous = job.last_log().cloned();
        let log = store::logs::insert(&txn, stored.id, next, &update.message).await?;

        if next == JobStatus::Mined {
            update_children(&txn, job.uuid, job.lineage_root(), JobStatus::NeverMined, tenants).await?;
        }

        transition = previous.map(|previous| (previous, log));
    }

    if let Some(labels) = update.labels {
        job.labels = labels;
    }
    if let Some(mut internal_data) = update.internal_data {
        // Lineage and chain are fixed at creation
        internal_data.parent_job_uuid = job.internal_data.parent_job_uuid;
        if internal_data.chain_id.is_empty() {
            internal_data.chain_id = job.internal_data.chain_id.clone();
        }
        job.internal_data = internal_data;
    }
    store::jobs::update(&txn, &job).await?;

    txn.commit().await?;

    if let Some((previous, current)) = &transition {
        state
            .metrics
            .observe_transition(&job.chain_uuid.to_string(), previous, current);
    }

    let updated = store::jobs::find_one_by_uuid(&state.db, job_uuid, tenants)
        .await?
        .entity;
    tracing::info!(job = %job_uuid, status = %updated.status, "job updated");

    if matches!(update.status, Some(JobStatus::Mined | JobStatus::Stored)) && updated.next_job_uuid.is_some() {
        start_next_job(state, job_uuid, tenants).await?;
    }

    Ok(updated)
}
