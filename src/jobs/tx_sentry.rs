//! Transaction sentry: periodic recovery of PENDING jobs that carry a retry policy
//!
//! For every lineage root still PENDING whose lineage has been quiet for longer
//! than its retry interval, a session either races a new gas-bumped child job
//! (RetryJobTx) or resends the latest attempt (ResendJobTx). Every action stamps
//! `last_retry_at` on the root, and a resend appends a RESENDING log that counts
//! towards the retry cap.

use chrono::{DateTime, Utc};
use tokio::time::{interval, Duration};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Job, JobFilters, JobStatus, JobUpdate};
use crate::services::jobs::{resend_job_tx, retry_job_tx, update_job};
use crate::store::{self, WILDCARD_TENANT};
use crate::AppState;

const COMPONENT: &str = "tx-sentry";
const RESENT_MESSAGE: &str = "transaction resent by the sentry";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The lineage changed within the retry interval
    NotDue,
    MaxRetriesReached,
    /// A new child job was created and started
    Retried(Uuid),
    /// The latest attempt was published again
    Resent(Uuid),
}

pub async fn start_tx_sentry_job(state: AppState, every: Duration, max_retries: usize) {
    if every.is_zero() {
        tracing::info!("Transaction sentry disabled");
        return;
    }

    tokio::spawn(async move {
        let mut interval = interval(every);

        loop {
            interval.tick().await;

            match run_sessions(&state, max_retries, Utc::now()).await {
                Ok(outcomes) => {
                    let acted = outcomes
                        .iter()
                        .filter(|o| matches!(o, SessionOutcome::Retried(_) | SessionOutcome::Resent(_)))
                        .count();
                    if acted > 0 {
                        tracing::info!(sessions = outcomes.len(), acted, "Transaction sentry pass finished");
                    }
                }
                Err(e) => tracing::error!("Failed to run transaction sentry: {}", e),
            }
        }
    });
}

/// Run one session for every PENDING lineage root with a retry interval
pub async fn run_sessions(state: &AppState, max_retries: usize, now: DateTime<Utc>) -> Result<Vec<SessionOutcome>> {
    let filters = JobFilters {
        status: Some(JobStatus::Pending),
        only_parents: true,
        ..Default::default()
    };
    let roots = store::jobs::search(&state.db, &filters, &[WILDCARD_TENANT.to_string()])
        .await
        .map_err(|e| e.extend_component(COMPONENT))?;

    let mut outcomes = Vec::new();
    for root in roots {
        if root.entity.internal_data.retry_interval_secs.is_none() {
            continue;
        }

        match retry_session(state, &root.entity, max_retries, now).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                tracing::error!(job = %root.entity.uuid, error = %e, "retry session failed");
            }
        }
    }

    Ok(outcomes)
}

pub async fn retry_session(
    state: &AppState,
    root: &Job,
    max_retries: usize,
    now: DateTime<Utc>,
) -> Result<SessionOutcome> {
    let tenants = vec![root.tenant_id.clone()];
    let filters = JobFilters {
        chain_uuid: Some(root.chain_uuid),
        parent_job_uuid: Some(root.uuid),
        ..Default::default()
    };
    let lineage: Vec<Job> = store::jobs::search(&state.db, &filters, &tenants)
        .await
        .map_err(|e| e.extend_component(COMPONENT))?
        .into_iter()
        .map(|stored| stored.entity)
        .collect();

    let Some(last_attempt) = lineage.last() else {
        return Ok(SessionOutcome::NotDue);
    };
    let root = lineage.iter().find(|job| job.uuid == root.uuid).unwrap_or(root);

    // Session stamps follow the caller's clock, log times follow the database's
    let retry_interval = root.internal_data.retry_interval_secs.unwrap_or_default() as i64;
    let last_activity = lineage
        .iter()
        .filter_map(|job| job.last_log().map(|log| log.created_at))
        .chain(root.internal_data.last_retry_at)
        .max()
        .unwrap_or(root.created_at);
    if (now - last_activity).num_seconds() < retry_interval {
        return Ok(SessionOutcome::NotDue);
    }

    // Resends of the latest attempt count as retries
    let children = lineage.len() - 1;
    let retries = children
        + last_attempt
            .logs
            .iter()
            .filter(|log| log.status == JobStatus::Resending)
            .count();

    if retries >= max_retries {
        tracing::info!(job = %root.uuid, retries, "job session exceeded max amount of retries");
        return Ok(SessionOutcome::MaxRetriesReached);
    }

    let increment = root.internal_data.gas_price_increment;
    let limit = root.internal_data.gas_price_limit;
    if increment > 0.0 && children as f64 <= (limit / increment).ceil() {
        let multiplier = ((children + 1) as f64 * increment).min(limit);
        let child = retry_job_tx(state, root.uuid, multiplier, None, &tenants)
            .await
            .map_err(|e| e.extend_component(COMPONENT))?;

        tracing::info!(job = %root.uuid, child = %child.uuid, multiplier, "new child job created");
        record_session(state, root, None, now, &tenants).await?;
        return Ok(SessionOutcome::Retried(child.uuid));
    }

    resend_job_tx(state, last_attempt.uuid, &tenants)
        .await
        .map_err(|e| e.extend_component(COMPONENT))?;

    record_session(state, root, Some(last_attempt.uuid), now, &tenants).await?;
    Ok(SessionOutcome::Resent(last_attempt.uuid))
}

/// Stamp the lineage root with the session time and, for a resend, append
/// a RESENDING log to the resent job so it counts towards the retry cap.
async fn record_session(
    state: &AppState,
    root: &Job,
    resent: Option<Uuid>,
    now: DateTime<Utc>,
    tenants: &[String],
) -> Result<()> {
    if let Some(job_uuid) = resent.filter(|uuid| *uuid != root.uuid) {
        update_job(state, JobUpdate::status(job_uuid, JobStatus::Resending, RESENT_MESSAGE), tenants)
            .await
            .map_err(|e| e.extend_component(COMPONENT))?;
    }

    let mut internal_data = root.internal_data.clone();
    internal_data.last_retry_at = Some(now);
    let mut update = JobUpdate {
        uuid: root.uuid,
        internal_data: Some(internal_data),
        ..Default::default()
    };
    if resent == Some(root.uuid) {
        update.status = Some(JobStatus::Resending);
        update.message = RESENT_MESSAGE.to_string();
    }

    update_job(state, update, tenants)
        .await
        .map_err(|e| e.extend_component(COMPONENT))?;
    Ok(())
}
