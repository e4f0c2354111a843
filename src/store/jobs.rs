//! Job data agent

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::parsers::{job_from_record, now, JobRecord};
use super::tenant_condition;
use crate::entities::{jobs, logs, prelude::*, schedules, transactions};
use crate::error::{OrchestrateError, Result};
use crate::models::{Job, JobFilters};

const COMPONENT: &str = "data-agents.job";

/// A job together with the storage ids the agents need to mutate it
#[derive(Debug, Clone, PartialEq)]
pub struct StoredJob {
    pub id: i32,
    pub transaction_id: i32,
    pub entity: Job,
}

fn db_error(err: sea_orm::DbErr) -> OrchestrateError {
    OrchestrateError::from(err).extend_component(COMPONENT)
}

pub async fn insert<C: ConnectionTrait>(conn: &C, model: &jobs::Model) -> Result<jobs::Model> {
    let active = jobs::ActiveModel {
        id: NotSet,
        uuid: Set(model.uuid),
        schedule_id: Set(model.schedule_id),
        transaction_id: Set(model.transaction_id),
        chain_uuid: Set(model.chain_uuid),
        job_type: Set(model.job_type.clone()),
        next_job_uuid: Set(model.next_job_uuid),
        parent_job_uuid: Set(model.parent_job_uuid),
        is_parent: Set(model.is_parent),
        labels: Set(model.labels.clone()),
        internal_data: Set(model.internal_data.clone()),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
    };

    active.insert(conn).await.map_err(|e| {
        tracing::error!(error = %e, job = %model.uuid, "failed to insert job");
        db_error(e)
    })
}

/// Persist the mutable job columns (labels, internal data, lineage) and bump `updated_at`
pub async fn update<C: ConnectionTrait>(conn: &C, job: &Job) -> Result<()> {
    let labels = serde_json::to_value(&job.labels)
        .map_err(|e| OrchestrateError::data_error(format!("invalid job labels: {}", e)))?;
    let internal_data = serde_json::to_value(&job.internal_data)
        .map_err(|e| OrchestrateError::data_error(format!("invalid job internal data: {}", e)))?;

    let result = jobs::Entity::update_many()
        .col_expr(jobs::Column::Labels, Expr::value(labels))
        .col_expr(jobs::Column::InternalData, Expr::value(internal_data))
        .col_expr(jobs::Column::ParentJobUuid, Expr::value(job.internal_data.parent_job_uuid))
        .col_expr(jobs::Column::IsParent, Expr::value(job.internal_data.parent_job_uuid.is_none()))
        .col_expr(jobs::Column::NextJobUuid, Expr::value(job.next_job_uuid))
        .col_expr(jobs::Column::UpdatedAt, Expr::value(now()))
        .filter(jobs::Column::Uuid.eq(job.uuid))
        .exec(conn)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, job = %job.uuid, "failed to update job");
            db_error(e)
        })?;

    if result.rows_affected == 0 {
        return Err(OrchestrateError::not_found(format!("job {} not found", job.uuid)).extend_component(COMPONENT));
    }

    Ok(())
}

/// `SELECT ... FOR UPDATE` on the job row; only meaningful inside a transaction
pub async fn lock_one_by_uuid<C: ConnectionTrait>(conn: &C, uuid: Uuid) -> Result<()> {
    jobs::Entity::find()
        .filter(jobs::Column::Uuid.eq(uuid))
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, job = %uuid, "failed to lock job by uuid");
            db_error(e)
        })?
        .ok_or_else(|| OrchestrateError::not_found(format!("job {} not found", uuid)).extend_component(COMPONENT))?;

    Ok(())
}

fn scoped(tenants: &[String]) -> Select<jobs::Entity> {
    let query = Jobs::find().join(JoinType::InnerJoin, jobs::Relation::Schedules.def());
    match tenant_condition(tenants) {
        Some(condition) => query.filter(condition),
        None => query,
    }
}

pub async fn find_one_by_uuid<C: ConnectionTrait>(conn: &C, uuid: Uuid, tenants: &[String]) -> Result<StoredJob> {
    let model = scoped(tenants)
        .filter(jobs::Column::Uuid.eq(uuid))
        .one(conn)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, job = %uuid, "failed to find job by uuid");
            db_error(e)
        })?
        .ok_or_else(|| OrchestrateError::not_found(format!("job {} not found", uuid)).extend_component(COMPONENT))?;

    let mut found = load(conn, vec![model]).await?;
    found
        .pop()
        .ok_or_else(|| OrchestrateError::not_found(format!("job {} not found", uuid)).extend_component(COMPONENT))
}

pub async fn search<C: ConnectionTrait>(conn: &C, filters: &JobFilters, tenants: &[String]) -> Result<Vec<StoredJob>> {
    let mut query = scoped(tenants);

    if let Some(chain_uuid) = filters.chain_uuid {
        query = query.filter(jobs::Column::ChainUuid.eq(chain_uuid));
    }

    if let Some(schedule_uuid) = filters.schedule_uuid {
        query = query.filter(schedules::Column::Uuid.eq(schedule_uuid));
    }

    // A lineage is the root job plus every job pointing back at it
    if let Some(parent) = filters.parent_job_uuid {
        query = query.filter(
            Condition::any()
                .add(jobs::Column::ParentJobUuid.eq(parent))
                .add(
                    Condition::all()
                        .add(jobs::Column::Uuid.eq(parent))
                        .add(jobs::Column::IsParent.eq(true)),
                ),
        );
    }

    if filters.only_parents {
        query = query.filter(jobs::Column::IsParent.eq(true));
    }

    if let Some(updated_after) = filters.updated_after {
        query = query.filter(jobs::Column::UpdatedAt.gte(updated_after.fixed_offset()));
    }

    if !filters.tx_hashes.is_empty() {
        query = query
            .join(JoinType::InnerJoin, jobs::Relation::Transactions.def())
            .filter(transactions::Column::Hash.is_in(filters.tx_hashes.iter().cloned()));
    }

    let models = query
        .order_by_asc(jobs::Column::Id)
        .all(conn)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to search jobs");
            db_error(e)
        })?;

    let mut found = load(conn, models).await?;
    if let Some(status) = filters.status {
        found.retain(|stored| stored.entity.status == status);
    }

    Ok(found)
}

/// Fetch schedules, transactions and ordered logs for a batch of job rows
async fn load<C: ConnectionTrait>(conn: &C, models: Vec<jobs::Model>) -> Result<Vec<StoredJob>> {
    if models.is_empty() {
        return Ok(vec![]);
    }

    let schedule_ids: Vec<i32> = models.iter().map(|m| m.schedule_id).collect();
    let transaction_ids: Vec<i32> = models.iter().map(|m| m.transaction_id).collect();
    let job_ids: Vec<i32> = models.iter().map(|m| m.id).collect();

    let schedules_by_id: HashMap<i32, schedules::Model> = Schedules::find()
        .filter(schedules::Column::Id.is_in(schedule_ids))
        .all(conn)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let mut transactions_by_id: HashMap<i32, transactions::Model> = Transactions::find()
        .filter(transactions::Column::Id.is_in(transaction_ids))
        .all(conn)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let mut logs_by_job: HashMap<i32, Vec<logs::Model>> = HashMap::new();
    for log in Logs::find()
        .filter(logs::Column::JobId.is_in(job_ids))
        .order_by_asc(logs::Column::Id)
        .all(conn)
        .await
        .map_err(db_error)?
    {
        logs_by_job.entry(log.job_id).or_default().push(log);
    }

    let mut stored = Vec::with_capacity(models.len());
    for job in models {
        let schedule = schedules_by_id
            .get(&job.schedule_id)
            .cloned()
            .ok_or_else(|| OrchestrateError::data_error(format!("job {} has no schedule", job.uuid)))?;
        let transaction = transactions_by_id
            .remove(&job.transaction_id)
            .ok_or_else(|| OrchestrateError::data_error(format!("job {} has no transaction", job.uuid)))?;
        let logs = logs_by_job.remove(&job.id).unwrap_or_default();

        let id = job.id;
        let transaction_id = job.transaction_id;
        let entity = job_from_record(JobRecord {
            job,
            schedule,
            transaction,
            logs,
        })
        .map_err(|e| e.extend_component(COMPONENT))?;

        stored.push(StoredJob {
            id,
            transaction_id,
            entity,
        });
    }

    Ok(stored)
}
