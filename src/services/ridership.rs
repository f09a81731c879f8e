//! Entry/exit counting, independent of the revenue path.
//!
//! Two mutually exclusive sources exist depending on deployment generation:
//! counters embedded on ticket rows, or dedicated validation records. The
//! caller picks the source; nothing here auto-detects.

use crate::entities::{tickets, validation_records};
use crate::error::AppResult;
use crate::models::{RidershipRequest, RidershipSource};
use crate::services::filters::{effective_window, entry_station_expr, exit_station_expr, text_eq_ci};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QuerySelect,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct RidershipFilter {
    /// Ticket-counter mode only; validation records carry no payment mode.
    pub payment_mode: Option<String>,
    pub device_id: Option<String>,
    /// Validation-record mode only (card vs qr).
    pub media: Option<String>,
}

impl From<&RidershipRequest> for RidershipFilter {
    fn from(req: &RidershipRequest) -> Self {
        Self {
            payment_mode: req.payment_mode.clone(),
            device_id: req.device_id.clone(),
            media: req.media.clone(),
        }
    }
}

/// Per-station `(entry_count, exit_count)` pair.
pub type StationCounts = BTreeMap<i64, (i64, i64)>;

#[derive(Debug, FromQueryResult)]
struct StationSumRow {
    station_id: Option<i64>,
    total: Option<i64>,
}

#[derive(Clone)]
pub struct RidershipService {
    pool: DatabaseConnection,
}

impl RidershipService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Counts entries and exits per station over `[from, to]`. Every station
    /// in `stations` is present in the result, zeroed when nothing matched.
    pub async fn count_entries_exits(
        &self,
        source: RidershipSource,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        stations: &[i64],
        filter: &RidershipFilter,
    ) -> AppResult<StationCounts> {
        let (entries, exits) = match source {
            RidershipSource::TicketCounters => {
                let entries = self
                    .ticket_counter_sums(
                        tickets::Column::EntryCount,
                        entry_station_expr(),
                        from,
                        to,
                        stations,
                        filter,
                    )
                    .await?;
                let exits = self
                    .ticket_counter_sums(
                        tickets::Column::ExitCount,
                        exit_station_expr(),
                        from,
                        to,
                        stations,
                        filter,
                    )
                    .await?;
                (entries, exits)
            }
            RidershipSource::ValidationRecords => {
                let entries = self
                    .validation_counts(
                        "entry",
                        validation_records::Column::Source,
                        from,
                        to,
                        stations,
                        filter,
                    )
                    .await?;
                let exits = self
                    .validation_counts(
                        "exit",
                        validation_records::Column::Dest,
                        from,
                        to,
                        stations,
                        filter,
                    )
                    .await?;
                (entries, exits)
            }
        };

        Ok(merge_counts(stations, entries, exits))
    }

    async fn ticket_counter_sums(
        &self,
        counter: tickets::Column,
        station_expr: sea_orm::sea_query::SimpleExpr,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        stations: &[i64],
        filter: &RidershipFilter,
    ) -> AppResult<Vec<(i64, i64)>> {
        let mut query = tickets::Entity::find()
            .select_only()
            .column_as(station_expr.clone(), "station_id")
            .column_as(counter.sum(), "total")
            .filter(effective_window(from, to))
            .filter(Expr::expr(station_expr.clone()).is_in(stations.to_vec()))
            .group_by(station_expr);

        if let Some(mode) = &filter.payment_mode {
            query = query.filter(text_eq_ci(tickets::Column::PaymentMode, mode));
        }
        if let Some(device) = &filter.device_id {
            query = query.filter(tickets::Column::DeviceId.eq(device.clone()));
        }

        let rows = query.into_model::<StationSumRow>().all(&self.pool).await?;
        Ok(collect_rows(rows))
    }

    async fn validation_counts(
        &self,
        record_type: &str,
        station_column: validation_records::Column,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        stations: &[i64],
        filter: &RidershipFilter,
    ) -> AppResult<Vec<(i64, i64)>> {
        let mut query = validation_records::Entity::find()
            .select_only()
            .column_as(Expr::col(station_column), "station_id")
            .column_as(validation_records::Column::Id.count(), "total")
            .filter(validation_records::Column::CreatedAt.between(from, to))
            .filter(text_eq_ci(validation_records::Column::RecordType, record_type))
            .filter(station_column.is_in(stations.to_vec()))
            .group_by(station_column);

        if let Some(media) = &filter.media {
            query = query.filter(text_eq_ci(validation_records::Column::Media, media));
        }
        if let Some(device) = &filter.device_id {
            query = query.filter(validation_records::Column::Deviceid.eq(device.clone()));
        }

        let rows = query.into_model::<StationSumRow>().all(&self.pool).await?;
        Ok(collect_rows(rows))
    }
}

fn collect_rows(rows: Vec<StationSumRow>) -> Vec<(i64, i64)> {
    rows.into_iter()
        .filter_map(|r| Some((r.station_id?, r.total.unwrap_or(0))))
        .collect()
}

/// Seeds every requested station with zeros, then folds in the grouped sums.
fn merge_counts(stations: &[i64], entries: Vec<(i64, i64)>, exits: Vec<(i64, i64)>) -> StationCounts {
    let mut counts: StationCounts = stations.iter().map(|id| (*id, (0, 0))).collect();
    for (station_id, total) in entries {
        if let Some(slot) = counts.get_mut(&station_id) {
            slot.0 += total;
        }
    }
    for (station_id, total) in exits {
        if let Some(slot) = counts.get_mut(&station_id) {
            slot.1 += total;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stations_without_movements_report_zero_not_missing() {
        let counts = merge_counts(&[1, 2, 3], vec![(1, 40)], vec![(1, 35)]);
        assert_eq!(counts.get(&1), Some(&(40, 35)));
        assert_eq!(counts.get(&2), Some(&(0, 0)));
        assert_eq!(counts.get(&3), Some(&(0, 0)));
    }

    #[test]
    fn sums_for_unrequested_stations_are_dropped() {
        let counts = merge_counts(&[1], vec![(9, 100)], vec![]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(&1), Some(&(0, 0)));
    }

    #[test]
    fn entries_and_exits_fold_independently() {
        let counts = merge_counts(&[5], vec![(5, 10), (5, 2)], vec![(5, 7)]);
        assert_eq!(counts.get(&5), Some(&(12, 7)));
    }

    #[test]
    fn request_filters_carry_through_including_media() {
        let req = RidershipRequest {
            from_date: "2026-08-01".to_string(),
            to_date: "2026-08-28".to_string(),
            stations: None,
            source: Some(RidershipSource::ValidationRecords),
            payment_mode: None,
            device_id: Some("TOM-04-01".to_string()),
            media: Some("card".to_string()),
        };

        let filter = RidershipFilter::from(&req);
        assert_eq!(filter.media.as_deref(), Some("card"));
        assert_eq!(filter.device_id.as_deref(), Some("TOM-04-01"));
        assert_eq!(filter.payment_mode, None);
    }
}
