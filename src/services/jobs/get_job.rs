use uuid::Uuid;

use crate::error::Result;
use crate::models::{Job, JobFilters};
use crate::store;
use crate::AppState;

pub async fn get_job(state: &AppState, job_uuid: Uuid, tenants: &[String]) -> Result<Job> {
    store::jobs::find_one_by_uuid(&state.db, job_uuid, tenants)
        .await
        .map(|stored| stored.entity)
        .map_err(|e| e.extend_component("use-cases.get-job"))
}

/// Jobs matching `filters` within the tenants, ordered by creation
pub async fn search_jobs(state: &AppState, filters: &JobFilters, tenants: &[String]) -> Result<Vec<Job>> {
    let found = store::jobs::search(&state.db, filters, tenants)
        .await
        .map_err(|e| e.extend_component("use-cases.search-jobs"))?;

    Ok(found.into_iter().map(|stored| stored.entity).collect())
}
