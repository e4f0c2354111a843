use uuid::Uuid;

use crate::error::{OrchestrateError, Result};
use crate::models::envelope::TxEnvelope;
use crate::models::JobStatus;
use crate::services::dispatcher::publish_with_timeout;
use crate::store;
use crate::AppState;

const COMPONENT: &str = "use-cases.resend-job-tx";

/// Publish the current transaction of a PENDING job again, to the signer topic.
///
/// No job or log is written; the envelope's parent job label points at the job itself.
pub async fn resend_job_tx(state: &AppState, job_uuid: Uuid, tenants: &[String]) -> Result<()> {
    execute(state, job_uuid, tenants)
        .await
        .map_err(|e| e.extend_component(COMPONENT))
}

async fn execute(state: &AppState, job_uuid: Uuid, tenants: &[String]) -> Result<()> {
    tracing::debug!(job = %job_uuid, "resending job transaction");

    let job = store::jobs::find_one_by_uuid(&state.db, job_uuid, tenants)
        .await?
        .entity;

    if job.status != JobStatus::Pending {
        tracing::warn!(job = %job_uuid, status = %job.status, "cannot resend job");
        return Err(OrchestrateError::invalid_state(format!(
            "cannot resend job {} at current status {}",
            job_uuid, job.status
        )));
    }

    let payload = TxEnvelope::from_job(&job)
        .with_parent_job_uuid(job.uuid)
        .encode()
        .map_err(|e| OrchestrateError::data_error(format!("failed to encode envelope: {}", e)))?;

    let (partition, offset) = publish_with_timeout(
        state.dispatcher.as_ref(),
        state.dispatch_timeout,
        &state.topics.signer,
        payload,
    )
    .await?;

    tracing::info!(job = %job_uuid, topic = %state.topics.signer, partition, offset, "job transaction resent");
    Ok(())
}
