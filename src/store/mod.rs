//! Persistence gateway over SeaORM
//!
//! Agents are generic over `ConnectionTrait` so they run either on the pool or
//! inside a caller-owned `DatabaseTransaction`.

pub mod jobs;
pub mod logs;
pub mod parsers;
pub mod schedules;
pub mod transactions;

use sea_orm::{ColumnTrait, Condition};

use crate::entities::schedules as schedule_entity;

/// Tenant that grants access to every schedule
pub const WILDCARD_TENANT: &str = "_";

/// `schedules.tenant_id IN (...)`, or `None` when the wildcard tenant is allowed
pub(crate) fn tenant_condition(tenants: &[String]) -> Option<Condition> {
    if tenants.iter().any(|t| t == WILDCARD_TENANT) {
        return None;
    }

    Some(Condition::all().add(schedule_entity::Column::TenantId.is_in(tenants.iter().cloned())))
}
