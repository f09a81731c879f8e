//! Shift reconciliation: device-reported shift snapshots, their idempotent
//! storage, and the per-station collection rollup.

use crate::config::ReportConfig;
use crate::entities::shift_sessions;
use crate::error::AppResult;
use crate::external::inventory::{InventoryClient, StationEquipment};
use crate::models::{
    DeviceShiftRow, ShiftFindRequest, ShiftReportRequest, ShiftSessionResponse,
    ShiftUpsertResponse, StationCollectionReport, UpsertAction,
};
use crate::utils::time::{day_bounds, parse_date, range_bounds};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct ShiftService {
    pool: DatabaseConnection,
    inventory: InventoryClient,
    config: ReportConfig,
}

impl ShiftService {
    pub fn new(pool: DatabaseConnection, inventory: InventoryClient, config: ReportConfig) -> Self {
        Self {
            pool,
            inventory,
            config,
        }
    }

    /// Stores a shift snapshot, replacing any earlier report for the same
    /// `shift_id` wholesale. Last writer wins; replaying a payload is a no-op.
    pub async fn upsert_shift(&self, req: ShiftReportRequest) -> AppResult<ShiftUpsertResponse> {
        let txn = self.pool.begin().await?;
        let now = Utc::now();

        let existing = shift_sessions::Entity::find()
            .filter(shift_sessions::Column::ShiftId.eq(req.shift_id.clone()))
            .one(&txn)
            .await?;

        let (action, session) = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                apply_payload(&mut active, &req);
                active.updated_at = Set(Some(now));
                let updated = active.update(&txn).await?;
                (UpsertAction::Updated, updated)
            }
            None => {
                let mut active = shift_sessions::ActiveModel {
                    shift_id: Set(req.shift_id.clone()),
                    created_at: Set(Some(now)),
                    updated_at: Set(Some(now)),
                    ..Default::default()
                };
                apply_payload(&mut active, &req);
                let inserted = active.insert(&txn).await?;
                (UpsertAction::Created, inserted)
            }
        };

        txn.commit().await?;
        log::info!(
            "shift {} {:?} for station {}",
            session.shift_id,
            action,
            session.station_id
        );

        Ok(ShiftUpsertResponse {
            action,
            session: session.into(),
        })
    }

    /// Request-level entry point: validates the date strings, widens them to
    /// business-day bounds and delegates to [`ShiftService::find_shifts`].
    pub async fn find_shifts_by_dates(
        &self,
        req: &ShiftFindRequest,
    ) -> AppResult<Vec<ShiftSessionResponse>> {
        let from = parse_date(&req.from_date)?;
        let to = parse_date(&req.to_date)?;
        let (from, to) = range_bounds(from, to, self.config.timezone_offset_minutes)?;
        self.find_shifts(from, to, req.station).await
    }

    /// Shifts overlapping `[from, to]`. A shift matches when its login or
    /// logout falls in the window, or when it is still open (no logout) and
    /// started within the lookback horizon before `to`.
    pub async fn find_shifts(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        station: Option<i64>,
    ) -> AppResult<Vec<ShiftSessionResponse>> {
        let lookback_start = to - Duration::days(self.config.shift_lookback_days);

        let window = Condition::any()
            .add(shift_sessions::Column::LoginTime.between(from, to))
            .add(shift_sessions::Column::LogoutTime.between(from, to))
            .add(
                Condition::all()
                    .add(shift_sessions::Column::LogoutTime.is_null())
                    .add(shift_sessions::Column::LoginTime.between(lookback_start, to)),
            );

        let mut query = shift_sessions::Entity::find()
            .filter(window)
            .order_by_asc(shift_sessions::Column::LoginTime);

        if let Some(station_id) = station {
            query = query.filter(shift_sessions::Column::StationId.eq(station_id));
        }

        let sessions = query.all(&self.pool).await?;
        Ok(sessions.into_iter().map(Into::into).collect())
    }

    /// End-of-day collection per station: every fare-collecting device's
    /// shifts for the requested date, grouped by station. Stations are
    /// queried concurrently, bounded by the configured fan-out.
    pub async fn collection_report(
        &self,
        date: NaiveDate,
        station: Option<String>,
    ) -> AppResult<Vec<StationCollectionReport>> {
        let (day_start, day_end) = day_bounds(date, self.config.timezone_offset_minutes);

        let mut stations = self.inventory.station_devices().await?;
        if let Some(name) = &station {
            stations.retain(|s| s.station_name.eq_ignore_ascii_case(name));
        }

        stream::iter(stations)
            .map(|equipment| self.station_collection(equipment, date, day_start, day_end))
            .buffered(self.config.station_fanout)
            .try_collect()
            .await
    }

    async fn station_collection(
        &self,
        equipment: StationEquipment,
        date: NaiveDate,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> AppResult<StationCollectionReport> {
        let device_names: HashMap<String, String> = equipment
            .equipments
            .iter()
            .map(|e| (e.device_id.clone(), e.device_name.clone()))
            .collect();

        let shifts = if device_names.is_empty() {
            Vec::new()
        } else {
            let device_ids: Vec<String> = device_names.keys().cloned().collect();
            let day = Condition::any()
                .add(shift_sessions::Column::LoginTime.between(day_start, day_end))
                .add(
                    Condition::all()
                        .add(shift_sessions::Column::LoginTime.is_null())
                        .add(shift_sessions::Column::CreatedAt.between(day_start, day_end)),
                );

            shift_sessions::Entity::find()
                .filter(shift_sessions::Column::DeviceId.is_in(device_ids))
                .filter(day)
                .order_by_asc(shift_sessions::Column::LoginTime)
                .all(&self.pool)
                .await?
        };

        let rows = shifts
            .into_iter()
            .map(|s| {
                let device_name = s
                    .device_id
                    .as_deref()
                    .and_then(|id| device_names.get(id).cloned())
                    .unwrap_or_default();
                DeviceShiftRow {
                    shift_id: s.shift_id,
                    device_name,
                    total_amount: s.total_amount,
                    cash_amount: s.total_cash_amount,
                    upi_amount: s.total_upi_amount,
                    no_of_tickets: s.qr_ticket_count + s.penalty_ticket_count,
                    login_time: s.login_time,
                    logout_time: s.logout_time,
                }
            })
            .collect();

        Ok(StationCollectionReport {
            station_name: equipment.station_name,
            date: date.format("%Y-%m-%d").to_string(),
            shifts: rows,
        })
    }
}

/// Full replacement of every reported field. Absent payload fields reset the
/// stored value to zero so a stored row always mirrors the latest snapshot.
fn apply_payload(active: &mut shift_sessions::ActiveModel, req: &ShiftReportRequest) {
    active.station_id = Set(req.station);
    active.user_id = Set(req.user);
    active.device_id = Set(req.device_id.clone());
    active.qr_amount = Set(req.qr_total_amount.unwrap_or_default());
    active.qr_cash_amount = Set(req.qr_cash_amount.unwrap_or_default());
    active.qr_upi_amount = Set(req.qr_upi_amount.unwrap_or_default());
    active.qr_ticket_count = Set(req.qr_no_of_tickets.unwrap_or_default());
    active.qr_ticket_count_cash = Set(req.qr_no_of_tickets_cash.unwrap_or_default());
    active.qr_ticket_count_upi = Set(req.qr_no_of_tickets_upi.unwrap_or_default());
    active.penalty_amount = Set(req.penalty_total_amount.unwrap_or_default());
    active.penalty_cash_amount = Set(req.penalty_cash_amount.unwrap_or_default());
    active.penalty_upi_amount = Set(req.penalty_upi_amount.unwrap_or_default());
    active.penalty_ticket_count = Set(req.penalty_no_of_tickets.unwrap_or_default());
    active.failed_amount = Set(req.failed_transaction_amount.unwrap_or_default());
    active.failed_cash_amount = Set(req.failed_transaction_amount_cash.unwrap_or_default());
    active.failed_upi_amount = Set(req.failed_transaction_amount_upi.unwrap_or_default());
    active.failed_count = Set(req.no_of_failed_transactions.unwrap_or_default());
    active.total_amount = Set(req.total_shift_amount.unwrap_or_default());
    active.total_cash_amount = Set(req.total_shift_cash_amount.unwrap_or_default());
    active.total_upi_amount = Set(req.total_shift_upi_amount.unwrap_or_default());
    active.card_entries = Set(req.total_card_entries.unwrap_or_default());
    active.card_exits = Set(req.total_card_exits.unwrap_or_default());
    active.qr_entries = Set(req.total_qr_entries.unwrap_or_default());
    active.qr_exits = Set(req.total_qr_exits.unwrap_or_default());
    active.login_time = Set(req.login_time);
    active.logout_time = Set(req.logout_time);
}

/// Pure form of the `find_shifts` window predicate.
#[cfg(test)]
fn session_in_window(
    login: Option<DateTime<Utc>>,
    logout: Option<DateTime<Utc>>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    lookback_days: i64,
) -> bool {
    let in_range = |ts: Option<DateTime<Utc>>| ts.is_some_and(|t| t >= from && t <= to);
    if in_range(login) || in_range(logout) {
        return true;
    }
    logout.is_none()
        && login.is_some_and(|t| t >= to - Duration::days(lookback_days) && t <= to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn replay_of_the_same_payload_produces_identical_fields() {
        let req = ShiftReportRequest {
            shift_id: "S-1".into(),
            station: 4,
            user: 12,
            device_id: Some("TOM-04-01".into()),
            qr_total_amount: Some(dec!(150)),
            qr_cash_amount: Some(dec!(100)),
            qr_upi_amount: Some(dec!(50)),
            qr_no_of_tickets: Some(6),
            qr_no_of_tickets_cash: Some(4),
            qr_no_of_tickets_upi: Some(2),
            penalty_total_amount: None,
            penalty_cash_amount: None,
            penalty_upi_amount: None,
            penalty_no_of_tickets: None,
            failed_transaction_amount: None,
            failed_transaction_amount_cash: None,
            failed_transaction_amount_upi: None,
            no_of_failed_transactions: None,
            total_shift_amount: Some(dec!(150)),
            total_shift_cash_amount: Some(dec!(100)),
            total_shift_upi_amount: Some(dec!(50)),
            total_card_entries: None,
            total_card_exits: None,
            total_qr_entries: Some(6),
            total_qr_exits: Some(5),
            login_time: Some(ts("2026-08-28T06:00:00Z")),
            logout_time: None,
        };

        // ActiveModelTrait also has a default(); pick the std trait.
        let mut first = <shift_sessions::ActiveModel as Default>::default();
        let mut second = <shift_sessions::ActiveModel as Default>::default();
        apply_payload(&mut first, &req);
        apply_payload(&mut second, &req);

        assert_eq!(first.qr_amount, second.qr_amount);
        assert_eq!(first.total_amount, second.total_amount);
        assert_eq!(first.login_time, second.login_time);
    }

    #[test]
    fn absent_payload_fields_reset_to_zero() {
        let req = ShiftReportRequest {
            shift_id: "S-2".into(),
            station: 1,
            user: 1,
            device_id: None,
            qr_total_amount: None,
            qr_cash_amount: None,
            qr_upi_amount: None,
            qr_no_of_tickets: None,
            qr_no_of_tickets_cash: None,
            qr_no_of_tickets_upi: None,
            penalty_total_amount: None,
            penalty_cash_amount: None,
            penalty_upi_amount: None,
            penalty_no_of_tickets: None,
            failed_transaction_amount: None,
            failed_transaction_amount_cash: None,
            failed_transaction_amount_upi: None,
            no_of_failed_transactions: None,
            total_shift_amount: None,
            total_shift_cash_amount: None,
            total_shift_upi_amount: None,
            total_card_entries: None,
            total_card_exits: None,
            total_qr_entries: None,
            total_qr_exits: None,
            login_time: None,
            logout_time: None,
        };

        let mut active = shift_sessions::ActiveModel {
            qr_amount: Set(dec!(999)),
            penalty_ticket_count: Set(7),
            ..Default::default()
        };
        apply_payload(&mut active, &req);

        assert_eq!(active.qr_amount, Set(dec!(0)));
        assert_eq!(active.penalty_ticket_count, Set(0));
    }

    #[test]
    fn open_shift_within_lookback_is_included() {
        let to = ts("2026-08-28T23:59:59Z");
        let from = ts("2026-08-28T00:00:00Z");
        let login = Some(to - Duration::days(10));
        assert!(session_in_window(login, None, from, to, 30));
    }

    #[test]
    fn open_shift_older_than_lookback_is_excluded() {
        let to = ts("2026-08-28T23:59:59Z");
        let from = ts("2026-08-28T00:00:00Z");
        let login = Some(to - Duration::days(40));
        assert!(!session_in_window(login, None, from, to, 30));
    }

    #[test]
    fn closed_shift_matches_on_logout_alone() {
        let to = ts("2026-08-28T23:59:59Z");
        let from = ts("2026-08-28T00:00:00Z");
        let login = Some(ts("2026-08-27T22:00:00Z"));
        let logout = Some(ts("2026-08-28T06:00:00Z"));
        assert!(session_in_window(login, logout, from, to, 30));
    }

    #[test]
    fn closed_shift_fully_outside_the_window_is_excluded() {
        let to = ts("2026-08-28T23:59:59Z");
        let from = ts("2026-08-28T00:00:00Z");
        let login = Some(ts("2026-08-20T06:00:00Z"));
        let logout = Some(ts("2026-08-20T14:00:00Z"));
        assert!(!session_in_window(login, logout, from, to, 30));
    }
}
