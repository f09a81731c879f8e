use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketType {
    #[sea_orm(string_value = "REGULAR")]
    Regular,
    #[sea_orm(string_value = "PENALTY")]
    Penalty,
    #[sea_orm(string_value = "DUPLICATE")]
    Duplicate,
    #[sea_orm(string_value = "FREE")]
    Free,
}

/// One fare-transaction unit written by a station device.
///
/// `extended_time`, when present, supersedes `created_at` as the effective
/// business timestamp for all windowing and aggregation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub ticket_no: String,
    pub ref_ticket_no: Option<String>,
    pub station_source: i64,
    pub station_destination: Option<i64>,
    pub entry_station: Option<i64>,
    pub exit_station: Option<i64>,
    pub amount: Decimal,
    pub admin_fee: Decimal,
    pub payment_mode: Option<String>,
    pub status: TicketStatus,
    pub ticket_type: TicketType,
    pub is_cancelled: bool,
    pub entry_count: i32,
    pub exit_count: i32,
    pub device_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub extended_time: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Effective business timestamp: `extended_time` if set, else `created_at`.
    pub fn effective_time(&self) -> DateTime<Utc> {
        self.extended_time.unwrap_or(self.created_at)
    }
}
