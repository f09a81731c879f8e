use crate::entities::{ticket_entity, TicketStatus, TicketType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which table feeds the ridership counts. Picked by the caller, not
/// auto-detected: deployments migrate from ticket-embedded counters to
/// dedicated validation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RidershipSource {
    TicketCounters,
    ValidationRecords,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DateRangeRequest {
    pub from_date: String,
    pub to_date: String,
    #[serde(default)]
    pub stations: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct HourlyReportRequest {
    pub date: String,
    #[serde(default)]
    pub stations: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RidershipRequest {
    pub from_date: String,
    pub to_date: String,
    #[serde(default)]
    pub stations: Option<Vec<i64>>,
    #[serde(default)]
    pub source: Option<RidershipSource>,
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    /// Validation-record mode only (card vs qr).
    #[serde(default)]
    pub media: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TicketListRequest {
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default)]
    pub ticket_no: Option<String>,
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub ticket_type: Option<TicketType>,
    #[serde(default)]
    pub stations: Option<Vec<i64>>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Per-station revenue + ridership row, ascending station id.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationRevenueRow {
    pub station_id: i64,
    pub station_name: String,
    pub total_amount: Decimal,
    pub total_cash: Decimal,
    pub total_online: Decimal,
    pub total_no_of_tickets: u64,
    pub total_entry_count: i64,
    pub total_exit_count: i64,
}

/// Per-time-bucket revenue row (day, hour or month label).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimeBucketRow {
    pub label: String,
    pub total_amount: Decimal,
    pub total_cash: Decimal,
    pub total_online: Decimal,
    pub total_no_of_tickets: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationSeriesReport {
    pub station_id: i64,
    pub station_name: String,
    pub data: Vec<TimeBucketRow>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RidershipRow {
    pub station_id: i64,
    pub station_name: String,
    pub entry_count: i64,
    pub exit_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PenaltyReportRow {
    pub station_id: i64,
    pub station_name: String,
    pub total_amount: Decimal,
    pub cash_amount: Decimal,
    pub upi_amount: Decimal,
    pub card_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketResponse {
    pub id: i64,
    pub ticket_no: String,
    pub ref_ticket_no: Option<String>,
    pub station_source: i64,
    pub station_destination: Option<i64>,
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

impl From<ticket_entity::Model> for TicketResponse {
    fn from(m: ticket_entity::Model) -> Self {
        Self {
            id: m.id,
            ticket_no: m.ticket_no,
            ref_ticket_no: m.ref_ticket_no,
            station_source: m.station_source,
            station_destination: m.station_destination,
            amount: m.amount,
            admin_fee: m.admin_fee,
            payment_mode: m.payment_mode,
            status: m.status,
            ticket_type: m.ticket_type,
            is_cancelled: m.is_cancelled,
            entry_count: m.entry_count,
            exit_count: m.exit_count,
            device_id: m.device_id,
            created_at: m.created_at,
            extended_time: m.extended_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StationResponse {
    pub id: i64,
    pub station_name: String,
    pub is_active: bool,
}

impl From<crate::entities::station_entity::Model> for StationResponse {
    fn from(m: crate::entities::station_entity::Model) -> Self {
        Self {
            id: m.id,
            station_name: m.station_name,
            is_active: m.is_active,
        }
    }
}
