use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// One row per operator shift, keyed by the natural `shift_id`.
/// Totals are authoritative snapshots, replaced wholesale on every upsert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shift_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub shift_id: String,
    pub station_id: i64,
    pub user_id: i64,
    pub device_id: Option<String>,
    pub qr_amount: Decimal,
    pub qr_cash_amount: Decimal,
    pub qr_upi_amount: Decimal,
    pub qr_ticket_count: i32,
    pub qr_ticket_count_cash: i32,
    pub qr_ticket_count_upi: i32,
    pub penalty_amount: Decimal,
    pub penalty_cash_amount: Decimal,
    pub penalty_upi_amount: Decimal,
    pub penalty_ticket_count: i32,
    pub failed_amount: Decimal,
    pub failed_cash_amount: Decimal,
    pub failed_upi_amount: Decimal,
    pub failed_count: i32,
    pub total_amount: Decimal,
    pub total_cash_amount: Decimal,
    pub total_upi_amount: Decimal,
    pub card_entries: i32,
    pub card_exits: i32,
    pub qr_entries: i32,
    pub qr_exits: i32,
    pub login_time: Option<DateTime<Utc>>,
    pub logout_time: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
