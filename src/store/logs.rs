use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait};

use super::parsers::{log_from_model, now};
use crate::entities::logs;
use crate::error::{OrchestrateError, Result};
use crate::models::{JobStatus, Log};

const COMPONENT: &str = "data-agents.log";

/// Append a status event to the job with storage id `job_id`
pub async fn insert<C: ConnectionTrait>(conn: &C, job_id: i32, status: JobStatus, message: &str) -> Result<Log> {
    let model = logs::ActiveModel {
        job_id: Set(job_id),
        status: Set(status.to_string()),
        message: Set(message.to_string()),
        created_at: Set(now()),
        ..Default::default()
    };

    let inserted = model.insert(conn).await.map_err(|e| {
        tracing::error!(error = %e, job_id = job_id, status = %status, "failed to insert log");
        OrchestrateError::from(e).extend_component(COMPONENT)
    })?;

    log_from_model(inserted).map_err(|e| e.extend_component(COMPONENT))
}
