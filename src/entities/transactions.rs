//! `SeaORM` Entity for transactions table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub hash: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub nonce: Option<String>,
    pub value: Option<String>,
    pub gas_price: Option<String>,
    pub gas_fee_cap: Option<String>,
    pub gas_tip_cap: Option<String>,
    pub gas: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub data: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub raw: Option<String>,
    pub tx_type: Option<String>,
    pub private_from: Option<String>,
    pub private_for: Option<Json>,
    pub privacy_group_id: Option<String>,
    pub enclave_key: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::jobs::Entity")]
    Jobs,
}

impl Related<super::jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Jobs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
