//! Schedule use-cases: the tenant-owned container jobs attach to

use uuid::Uuid;

use crate::error::Result;
use crate::models::{JobFilters, Schedule};
use crate::store::{self, parsers::schedule_from_model};
use crate::AppState;

pub async fn create_schedule(state: &AppState, tenant_id: &str) -> Result<Schedule> {
    let model = store::schedules::insert(&state.db, Uuid::new_v4(), tenant_id)
        .await
        .map_err(|e| e.extend_component("use-cases.create-schedule"))?;

    tracing::info!(schedule = %model.uuid, tenant = %tenant_id, "schedule created");
    Ok(schedule_from_model(model, vec![]))
}

pub async fn get_schedule(state: &AppState, schedule_uuid: Uuid, tenants: &[String]) -> Result<Schedule> {
    load(state, schedule_uuid, tenants)
        .await
        .map_err(|e| e.extend_component("use-cases.get-schedule"))
}

pub async fn search_schedules(state: &AppState, tenants: &[String]) -> Result<Vec<Schedule>> {
    let models = store::schedules::search(&state.db, tenants)
        .await
        .map_err(|e| e.extend_component("use-cases.search-schedules"))?;

    let mut schedules = Vec::with_capacity(models.len());
    for model in models {
        let jobs = jobs_of(state, model.uuid, tenants)
            .await
            .map_err(|e| e.extend_component("use-cases.search-schedules"))?;
        schedules.push(schedule_from_model(model, jobs));
    }

    Ok(schedules)
}

async fn load(state: &AppState, schedule_uuid: Uuid, tenants: &[String]) -> Result<Schedule> {
    let model = store::schedules::find_one_by_uuid(&state.db, schedule_uuid, tenants).await?;
    let jobs = jobs_of(state, schedule_uuid, tenants).await?;
    Ok(schedule_from_model(model, jobs))
}

async fn jobs_of(state: &AppState, schedule_uuid: Uuid, tenants: &[String]) -> Result<Vec<crate::models::Job>> {
    let filters = JobFilters {
        schedule_uuid: Some(schedule_uuid),
        ..Default::default()
    };
    let found = store::jobs::search(&state.db, &filters, tenants).await?;
    Ok(found.into_iter().map(|stored| stored.entity).collect())
}
