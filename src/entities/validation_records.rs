use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Newer-generation entry/exit event, independent of the ticket table.
/// `record_type` is matched case-insensitively against ENTRY / EXIT.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "validation_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub source: i64,
    pub dest: Option<i64>,
    pub record_type: String,
    pub media: String,
    pub serialno: String,
    pub deviceid: Option<String>,
    pub amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
