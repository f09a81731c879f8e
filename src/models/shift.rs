use crate::entities::shift_session_entity;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Authoritative shift snapshot reported by a station device. Replaying the
/// same payload must leave exactly one stored row for the shift.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShiftReportRequest {
    pub shift_id: String,
    pub station: i64,
    pub user: i64,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub qr_total_amount: Option<Decimal>,
    #[serde(default)]
    pub qr_cash_amount: Option<Decimal>,
    #[serde(default)]
    pub qr_upi_amount: Option<Decimal>,
    #[serde(default)]
    pub qr_no_of_tickets: Option<i32>,
    #[serde(default)]
    pub qr_no_of_tickets_cash: Option<i32>,
    #[serde(default)]
    pub qr_no_of_tickets_upi: Option<i32>,
    #[serde(default)]
    pub penalty_total_amount: Option<Decimal>,
    #[serde(default)]
    pub penalty_cash_amount: Option<Decimal>,
    #[serde(default)]
    pub penalty_upi_amount: Option<Decimal>,
    #[serde(default)]
    pub penalty_no_of_tickets: Option<i32>,
    #[serde(default)]
    pub failed_transaction_amount: Option<Decimal>,
    #[serde(default)]
    pub failed_transaction_amount_cash: Option<Decimal>,
    #[serde(default)]
    pub failed_transaction_amount_upi: Option<Decimal>,
    #[serde(default)]
    pub no_of_failed_transactions: Option<i32>,
    #[serde(default)]
    pub total_shift_amount: Option<Decimal>,
    #[serde(default)]
    pub total_shift_cash_amount: Option<Decimal>,
    #[serde(default)]
    pub total_shift_upi_amount: Option<Decimal>,
    #[serde(default)]
    pub total_card_entries: Option<i32>,
    #[serde(default)]
    pub total_card_exits: Option<i32>,
    #[serde(default)]
    pub total_qr_entries: Option<i32>,
    #[serde(default)]
    pub total_qr_exits: Option<i32>,
    #[serde(default)]
    pub login_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub logout_time: Option<DateTime<Utc>>,
}

/// Query parameters for the per-device collection report.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CollectionQuery {
    /// Business date, `YYYY-MM-DD`.
    pub date: String,
    /// Restrict to one station by name.
    #[serde(default)]
    pub station: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShiftFindRequest {
    pub from_date: String,
    pub to_date: String,
    #[serde(default)]
    pub station: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShiftUpsertResponse {
    pub action: UpsertAction,
    pub session: ShiftSessionResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShiftSessionResponse {
    pub id: i64,
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
}

impl From<shift_session_entity::Model> for ShiftSessionResponse {
    fn from(m: shift_session_entity::Model) -> Self {
        Self {
            id: m.id,
            shift_id: m.shift_id,
            station_id: m.station_id,
            user_id: m.user_id,
            device_id: m.device_id,
            qr_amount: m.qr_amount,
            qr_cash_amount: m.qr_cash_amount,
            qr_upi_amount: m.qr_upi_amount,
            qr_ticket_count: m.qr_ticket_count,
            qr_ticket_count_cash: m.qr_ticket_count_cash,
            qr_ticket_count_upi: m.qr_ticket_count_upi,
            penalty_amount: m.penalty_amount,
            penalty_cash_amount: m.penalty_cash_amount,
            penalty_upi_amount: m.penalty_upi_amount,
            penalty_ticket_count: m.penalty_ticket_count,
            failed_amount: m.failed_amount,
            failed_cash_amount: m.failed_cash_amount,
            failed_upi_amount: m.failed_upi_amount,
            failed_count: m.failed_count,
            total_amount: m.total_amount,
            total_cash_amount: m.total_cash_amount,
            total_upi_amount: m.total_upi_amount,
            card_entries: m.card_entries,
            card_exits: m.card_exits,
            qr_entries: m.qr_entries,
            qr_exits: m.qr_exits,
            login_time: m.login_time,
            logout_time: m.logout_time,
        }
    }
}

/// Per-device rollup used by the collection report (one row per shift seen on
/// the device during the requested day).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeviceShiftRow {
    pub shift_id: String,
    pub device_name: String,
    pub total_amount: Decimal,
    pub cash_amount: Decimal,
    pub upi_amount: Decimal,
    pub no_of_tickets: i32,
    pub login_time: Option<DateTime<Utc>>,
    pub logout_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationCollectionReport {
    pub station_name: String,
    pub date: String,
    pub shifts: Vec<DeviceShiftRow>,
}
