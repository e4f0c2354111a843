use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::error::{OrchestrateError, Result};
use crate::models::envelope::TxEnvelope;
use crate::models::status::can_transition;
use crate::models::{Job, JobStatus};
use crate::services::dispatcher::publish_with_timeout;
use crate::store;
use crate::AppState;

const COMPONENT: &str = "use-cases.start-job";

/// Move a job to STARTED and hand its envelope to the sender topic.
///
/// The STARTED log only survives if the dispatcher acknowledged the message.
pub async fn start_job(state: &AppState, job_uuid: Uuid, tenants: &[String]) -> Result<Job> {
    execute(state, job_uuid, tenants)
        .await
        .map_err(|e| e.extend_component(COMPONENT))
}

async fn execute(state: &AppState, job_uuid: Uuid, tenants: &[String]) -> Result<Job> {
    tracing::debug!(job = %job_uuid, "starting job");

    let txn = state.db.begin().await?;

    store::jobs::lock_one_by_uuid(&txn, job_uuid).await?;
    let stored = store::jobs::find_one_by_uuid(&txn, job_uuid, tenants).await?;
    let mut job = stored.entity;

    if !can_transition(JobStatus::Started, job.status) {
        tracing::warn!(job = %job_uuid, status = %job.status, "cannot start job");
        return Err(OrchestrateError::invalid_state(format!(
            "cannot start job {} at status {}",
            job_uuid, job.status
        )));
    }

    let previous = job.last_log().cloned();
    let log = store::logs::insert(&txn, stored.id, JobStatus::Started, "").await?;
    store::jobs::update(&txn, &job).await?;
    job.logs.push(log.clone());
    job.status = JobStatus::Started;

    let payload = TxEnvelope::from_job(&job)
        .encode()
        .map_err(|e| OrchestrateError::data_error(format!("failed to encode envelope: {}", e)))?;

    let published = publish_with_timeout(
        state.dispatcher.as_ref(),
        state.dispatch_timeout,
        &state.topics.sender,
        payload,
    )
    .await;

    let (partition, offset) = match published {
        Ok(position) => position,
        Err(err) => {
            tracing::error!(job = %job_uuid, error = %err, "failed to dispatch job, rolling back");
            if let Err(rollback) = txn.rollback().await {
                tracing::error!(job = %job_uuid, error = %rollback, "rollback failed");
            }
            return Err(err);
        }
    };

    txn.commit().await?;

    if let Some(previous) = previous {
        state
            .metrics
            .observe_transition(&job.chain_uuid.to_string(), &previous, &log);
    }

    tracing::info!(job = %job_uuid, topic = %state.topics.sender, partition, offset, "job started");

    let started = store::jobs::find_one_by_uuid(&state.db, job_uuid, tenants).await?;
    Ok(started.entity)
}
