use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::error::{OrchestrateError, Result};
use crate::models::{JobFilters, JobStatus};
use crate::store;

const COMPONENT: &str = "use-cases.update-children";

/// Finalize every PENDING job of the lineage `parent_job_uuid` other than `job_uuid`.
///
/// Runs on the caller's connection so it can join an open transaction.
pub async fn update_children<C: ConnectionTrait>(
    conn: &C,
    job_uuid: Uuid,
    parent_job_uuid: Uuid,
    next_status: JobStatus,
    tenants: &[String],
) -> Result<()> {
    execute(conn, job_uuid, parent_job_uuid, next_status, tenants)
        .await
        .map_err(|e| e.extend_component(COMPONENT))
}

async fn execute<C: ConnectionTrait>(
    conn: &C,
    job_uuid: Uuid,
    parent_job_uuid: Uuid,
    next_status: JobStatus,
    tenants: &[String],
) -> Result<()> {
    if !next_status.is_final() {
        return Err(OrchestrateError::invalid_parameter(format!(
            "expected a final status to update children, got {}",
            next_status
        )));
    }

    tracing::debug!(job = %job_uuid, parent = %parent_job_uuid, status = %next_status, "updating sibling jobs");

    store::jobs::lock_one_by_uuid(conn, parent_job_uuid).await?;

    let siblings = store::jobs::search(
        conn,
        &JobFilters {
            parent_job_uuid: Some(parent_job_uuid),
            status: Some(JobStatus::Pending),
            ..Default::default()
        },
        tenants,
    )
    .await?;

    let message = format!("sibling (or parent) job {} was mined instead", job_uuid);
    for sibling in siblings.iter().filter(|s| s.entity.uuid != job_uuid) {
        store::logs::insert(conn, sibling.id, next_status, &message).await?;
        store::jobs::update(conn, &sibling.entity).await?;
        tracing::info!(job = %sibling.entity.uuid, winner = %job_uuid, status = %next_status, "sibling job finalized");
    }

    Ok(())
}
