use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait};

use super::parsers::{now, transaction_active_model};
use crate::entities::transactions;
use crate::error::{OrchestrateError, Result};
use crate::models::EthTransaction;

const COMPONENT: &str = "data-agents.transaction";

pub async fn insert<C: ConnectionTrait>(conn: &C, tx: &EthTransaction) -> Result<transactions::Model> {
    let mut model = transaction_active_model(tx);
    model.created_at = Set(now());

    model.insert(conn).await.map_err(|e| {
        tracing::error!(error = %e, "failed to insert transaction");
        OrchestrateError::from(e).extend_component(COMPONENT)
    })
}

/// Overwrite the stored row with `tx`; the row is never replaced
pub async fn update<C: ConnectionTrait>(conn: &C, id: i32, tx: &EthTransaction) -> Result<()> {
    let mut model = transaction_active_model(tx);
    model.id = Unchanged(id);

    model.update(conn).await.map_err(|e| {
        tracing::error!(error = %e, transaction_id = id, "failed to update transaction");
        OrchestrateError::from(e).extend_component(COMPONENT)
    })?;

    Ok(())
}
