use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, ColumnTrait};
use uuid::Uuid;

use super::parsers::now;
use super::tenant_condition;
use crate::entities::schedules;
use crate::error::{OrchestrateError, Result};

const COMPONENT: &str = "data-agents.schedule";

pub async fn insert<C: ConnectionTrait>(conn: &C, uuid: Uuid, tenant_id: &str) -> Result<schedules::Model> {
    let model = schedules::ActiveModel {
        uuid: Set(uuid),
        tenant_id: Set(tenant_id.to_string()),
        created_at: Set(now()),
        ..Default::default()
    };

    model.insert(conn).await.map_err(|e| {
        tracing::error!(error = %e, "failed to insert schedule");
        OrchestrateError::from(e).extend_component(COMPONENT)
    })
}

pub async fn find_one_by_uuid<C: ConnectionTrait>(
    conn: &C,
    uuid: Uuid,
    tenants: &[String],
) -> Result<schedules::Model> {
    let mut query = schedules::Entity::find().filter(schedules::Column::Uuid.eq(uuid));
    if let Some(condition) = tenant_condition(tenants) {
        query = query.filter(condition);
    }

    query
        .one(conn)
        .await
        .map_err(|e| OrchestrateError::from(e).extend_component(COMPONENT))?
        .ok_or_else(|| {
            OrchestrateError::not_found(format!("schedule {} not found", uuid)).extend_component(COMPONENT)
        })
}

pub async fn search<C: ConnectionTrait>(conn: &C, tenants: &[String]) -> Result<Vec<schedules::Model>> {
    let mut query = schedules::Entity::find().order_by_asc(schedules::Column::Id);
    if let Some(condition) = tenant_condition(tenants) {
        query = query.filter(condition);
    }

    query
        .all(conn)
        .await
        .map_err(|e| OrchestrateError::from(e).extend_component(COMPONENT))
}
