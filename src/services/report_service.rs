//! Report orchestration: composes the classifier, resolver, aggregator and
//! ridership counter into the dashboard and historical report surface.
//!
//! Every report is all-or-nothing: a failed sub-query fails the whole
//! request rather than emitting a partial result set.

use crate::config::ReportConfig;
use crate::entities::{penalty_records, stations, tickets};
use crate::error::{AppError, AppResult};
use crate::models::{
    PaginatedResponse, PaginationParams, PenaltyReportRow, RidershipRequest, RidershipRow,
    RidershipSource, StationRevenueRow, StationSeriesReport, StationResponse, TicketListRequest,
    TicketResponse, TimeBucketRow,
};
use crate::services::aggregator::{RevenueAggregator, RevenueTotals, TimeBucket};
use crate::services::classifier::{classify, ClassifierConfig, Contribution, DerivativePolicy};
use crate::services::filters::{effective_window, entry_station_expr, text_eq_ci};
use crate::services::resolver::{settle, ReferenceResolver};
use crate::services::ridership::{RidershipFilter, RidershipService};
use crate::utils::time::{
    day_bounds, days_between, first_of_month, last_of_month, parse_date, range_bounds,
};
use chrono::{DateTime, Datelike, Duration, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct ReportService {
    pool: DatabaseConnection,
    ridership: RidershipService,
    resolver: ReferenceResolver,
    config: ReportConfig,
}

impl ReportService {
    pub fn new(pool: DatabaseConnection, config: ReportConfig) -> Self {
        Self {
            ridership: RidershipService::new(pool.clone()),
            resolver: ReferenceResolver::new(pool.clone()),
            pool,
            config,
        }
    }

    fn classifier(&self, policy: DerivativePolicy) -> ClassifierConfig {
        ClassifierConfig {
            derivative_policy: policy,
            require_cancelled_flag: self.config.require_cancelled_flag,
        }
    }

    fn local_today(&self) -> chrono::NaiveDate {
        (Utc::now() + Duration::minutes(self.config.timezone_offset_minutes as i64)).date_naive()
    }

    /// Today's per-station revenue and ridership. The live dashboard takes
    /// derivative tickets at face value.
    pub async fn dashboard_today(&self) -> AppResult<Vec<StationRevenueRow>> {
        let (from, to) = day_bounds(self.local_today(), self.config.timezone_offset_minutes);
        let station_list = self.active_stations(None).await?;
        self.station_matrix(&station_list, from, to, DerivativePolicy::OwnAmount)
            .await
    }

    /// Past seven days of daily buckets for one station, today included.
    pub async fn station_series(&self, station_id: i64) -> AppResult<StationSeriesReport> {
        let station = stations::Entity::find_by_id(station_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Station {station_id} not found")))?;

        let today = self.local_today();
        let days = days_between(today - Duration::days(6), today);
        let (from, _) = day_bounds(days[0], self.config.timezone_offset_minutes);
        let (_, to) = day_bounds(today, self.config.timezone_offset_minutes);

        let batch = self.station_tickets(station_id, from, to).await?;
        let rows = self
            .bucketed_rows(
                &batch,
                days.iter().map(|d| TimeBucket::Day(*d)),
                |ts| TimeBucket::day_of(ts, self.config.timezone_offset_minutes),
                DerivativePolicy::OwnAmount,
            )
            .await?;

        Ok(StationSeriesReport {
            station_id: station.id,
            station_name: station.station_name,
            data: rows,
        })
    }

    /// Current calendar year as twelve month buckets, every month present
    /// even when empty. Derivatives defer to their originals here.
    pub async fn monthly_overview(&self) -> AppResult<Vec<TimeBucketRow>> {
        let year = self.local_today().year();
        let (from, _) = day_bounds(first_of_month(year, 1)?, self.config.timezone_offset_minutes);
        let (_, to) = day_bounds(last_of_month(year, 12)?, self.config.timezone_offset_minutes);

        let batch = self.window_tickets(from, to, None).await?;
        self.bucketed_rows(
            &batch,
            (1..=12).map(|month| TimeBucket::Month { year, month }),
            |ts| TimeBucket::month_of(ts, self.config.timezone_offset_minutes),
            DerivativePolicy::DeferToOriginal,
        )
        .await
    }

    /// Current month, one bucket per calendar day, no gaps.
    pub async fn daily_revenue(&self) -> AppResult<Vec<TimeBucketRow>> {
        let today = self.local_today();
        let first = first_of_month(today.year(), today.month())?;
        let last = last_of_month(today.year(), today.month())?;
        let (from, _) = day_bounds(first, self.config.timezone_offset_minutes);
        let (_, to) = day_bounds(last, self.config.timezone_offset_minutes);

        let batch = self.window_tickets(from, to, None).await?;
        self.bucketed_rows(
            &batch,
            days_between(first, last).into_iter().map(TimeBucket::Day),
            |ts| TimeBucket::day_of(ts, self.config.timezone_offset_minutes),
            DerivativePolicy::DeferToOriginal,
        )
        .await
    }

    /// One business day as twenty-four hour buckets, empty hours included.
    pub async fn hourly_report(
        &self,
        date: &str,
        station_filter: Option<&[i64]>,
    ) -> AppResult<Vec<TimeBucketRow>> {
        let date = parse_date(date)?;
        let (from, to) = day_bounds(date, self.config.timezone_offset_minutes);

        let batch = self.window_tickets(from, to, station_filter).await?;
        self.bucketed_rows(
            &batch,
            (0..24).map(|hour| TimeBucket::Hour { date, hour }),
            |ts| TimeBucket::hour_of(ts, self.config.timezone_offset_minutes),
            DerivativePolicy::DeferToOriginal,
        )
        .await
    }

    /// Per-station matrix over an explicit date range.
    pub async fn daily_report(
        &self,
        from_date: &str,
        to_date: &str,
        station_filter: Option<&[i64]>,
    ) -> AppResult<Vec<StationRevenueRow>> {
        let from = parse_date(from_date)?;
        let to = parse_date(to_date)?;
        let (from, to) = range_bounds(from, to, self.config.timezone_offset_minutes)?;

        let station_list = self.active_stations(station_filter).await?;
        self.station_matrix(&station_list, from, to, DerivativePolicy::DeferToOriginal)
            .await
    }

    pub async fn ridership_report(&self, req: &RidershipRequest) -> AppResult<Vec<RidershipRow>> {
        let from = parse_date(&req.from_date)?;
        let to = parse_date(&req.to_date)?;
        let (from, to) = range_bounds(from, to, self.config.timezone_offset_minutes)?;

        let station_list = self.active_stations(req.stations.as_deref()).await?;
        let ids: Vec<i64> = station_list.iter().map(|s| s.id).collect();
        let source = req.source.unwrap_or(RidershipSource::TicketCounters);
        let filter = RidershipFilter::from(req);

        let counts = self
            .ridership
            .count_entries_exits(source, from, to, &ids, &filter)
            .await?;

        Ok(station_list
            .into_iter()
            .map(|s| {
                let (entry_count, exit_count) = counts.get(&s.id).copied().unwrap_or((0, 0));
                RidershipRow {
                    station_id: s.id,
                    station_name: s.station_name,
                    entry_count,
                    exit_count,
                }
            })
            .collect())
    }

    /// Per-station penalty totals from the penalty ledger, bucketed by
    /// payment mode (cash, upi, card).
    pub async fn penalty_report(
        &self,
        from_date: &str,
        to_date: &str,
        station_filter: Option<&[i64]>,
    ) -> AppResult<Vec<PenaltyReportRow>> {
        let from = parse_date(from_date)?;
        let to = parse_date(to_date)?;
        let (from, to) = range_bounds(from, to, self.config.timezone_offset_minutes)?;

        let station_list = self.active_stations(station_filter).await?;
        let ids: Vec<i64> = station_list.iter().map(|s| s.id).collect();

        let records = penalty_records::Entity::find()
            .filter(penalty_records::Column::CreatedAt.between(from, to))
            .filter(penalty_records::Column::StationId.is_in(ids))
            .all(&self.pool)
            .await?;

        let mut rows: BTreeMap<i64, PenaltyReportRow> = station_list
            .into_iter()
            .map(|s| {
                (
                    s.id,
                    PenaltyReportRow {
                        station_id: s.id,
                        station_name: s.station_name,
                        total_amount: Default::default(),
                        cash_amount: Default::default(),
                        upi_amount: Default::default(),
                        card_amount: Default::default(),
                    },
                )
            })
            .collect();

        for record in records {
            if let Some(row) = rows.get_mut(&record.station_id) {
                row.total_amount += record.amount;
                match record.payment_mode.to_ascii_lowercase().as_str() {
                    "cash" => row.cash_amount += record.amount,
                    "upi" => row.upi_amount += record.amount,
                    "card" | "credit_card" => row.card_amount += record.amount,
                    other => log::warn!(
                        "penalty record {} has unbucketed payment mode '{other}'",
                        record.id
                    ),
                }
            }
        }

        Ok(rows.into_values().collect())
    }

    pub async fn list_tickets(&self, req: &TicketListRequest) -> AppResult<Vec<TicketResponse>> {
        let query = self.ticket_query(req)?;
        let models = query.all(&self.pool).await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    pub async fn list_tickets_paginated(
        &self,
        req: &TicketListRequest,
    ) -> AppResult<PaginatedResponse<TicketResponse>> {
        let params = PaginationParams::new(req.page, req.limit);
        let paginator = self
            .ticket_query(req)?
            .paginate(&self.pool, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page() - 1).await?;
        let data = models.into_iter().map(Into::into).collect();
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn list_stations(&self) -> AppResult<Vec<StationResponse>> {
        let station_list = self.active_stations(None).await?;
        Ok(station_list.into_iter().map(Into::into).collect())
    }

    fn ticket_query(&self, req: &TicketListRequest) -> AppResult<sea_orm::Select<tickets::Entity>> {
        let mut query = tickets::Entity::find().order_by_desc(tickets::Column::CreatedAt);

        if let (Some(from_date), Some(to_date)) = (&req.from_date, &req.to_date) {
            let from = parse_date(from_date)?;
            let to = parse_date(to_date)?;
            let (from, to) = range_bounds(from, to, self.config.timezone_offset_minutes)?;
            query = query.filter(effective_window(from, to));
        }
        if let Some(ticket_no) = &req.ticket_no {
            query = query.filter(tickets::Column::TicketNo.eq(ticket_no.clone()));
        }
        if let Some(mode) = &req.payment_mode {
            query = query.filter(text_eq_ci(tickets::Column::PaymentMode, mode));
        }
        if let Some(ticket_type) = req.ticket_type {
            query = query.filter(tickets::Column::TicketType.eq(ticket_type));
        }
        if let Some(station_ids) = &req.stations {
            query = query.filter(Expr::expr(entry_station_expr()).is_in(station_ids.clone()));
        }

        Ok(query)
    }

    /// Active stations in ascending id order, optionally narrowed to an
    /// explicit id set.
    async fn active_stations(
        &self,
        filter: Option<&[i64]>,
    ) -> AppResult<Vec<stations::Model>> {
        let mut query = stations::Entity::find()
            .filter(stations::Column::IsActive.eq(true))
            .order_by_asc(stations::Column::Id);
        if let Some(ids) = filter {
            query = query.filter(stations::Column::Id.is_in(ids.to_vec()));
        }
        Ok(query.all(&self.pool).await?)
    }

    /// Revenue + ridership per station. Station revenue sub-queries fan out
    /// concurrently with a bounded buffer; results are reassembled in
    /// ascending station id order regardless of completion order.
    async fn station_matrix(
        &self,
        station_list: &[stations::Model],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        policy: DerivativePolicy,
    ) -> AppResult<Vec<StationRevenueRow>> {
        let ids: Vec<i64> = station_list.iter().map(|s| s.id).collect();

        let totals: BTreeMap<i64, RevenueTotals> = stream::iter(ids.iter().copied())
            .map(|station_id| async move {
                let totals = self.station_totals(station_id, from, to, policy).await?;
                Ok::<_, AppError>((station_id, totals))
            })
            .buffered(self.config.station_fanout)
            .try_collect()
            .await?;

        let counts = self
            .ridership
            .count_entries_exits(
                RidershipSource::TicketCounters,
                from,
                to,
                &ids,
                &RidershipFilter::default(),
            )
            .await?;

        Ok(station_list
            .iter()
            .map(|s| {
                let t = totals.get(&s.id).cloned().unwrap_or_default();
                let (entry_count, exit_count) = counts.get(&s.id).copied().unwrap_or((0, 0));
                StationRevenueRow {
                    station_id: s.id,
                    station_name: s.station_name.clone(),
                    total_amount: t.total_amount,
                    total_cash: t.total_cash,
                    total_online: t.total_online,
                    total_no_of_tickets: t.total_no_of_tickets,
                    total_entry_count: entry_count,
                    total_exit_count: exit_count,
                }
            })
            .collect())
    }

    async fn station_totals(
        &self,
        station_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        policy: DerivativePolicy,
    ) -> AppResult<RevenueTotals> {
        let batch = self.station_tickets(station_id, from, to).await?;
        let contributions = self.settle_batch(&batch, policy).await?;

        let mut totals = RevenueTotals::default();
        for c in &contributions {
            totals.fold(c);
        }
        Ok(totals)
    }

    async fn station_tickets(
        &self,
        station_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<tickets::Model>> {
        Ok(tickets::Entity::find()
            .filter(effective_window(from, to))
            .filter(Expr::expr(entry_station_expr()).eq(station_id))
            .all(&self.pool)
            .await?)
    }

    async fn window_tickets(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        station_filter: Option<&[i64]>,
    ) -> AppResult<Vec<tickets::Model>> {
        let mut query = tickets::Entity::find().filter(effective_window(from, to));
        if let Some(ids) = station_filter {
            query = query.filter(Expr::expr(entry_station_expr()).is_in(ids.to_vec()));
        }
        Ok(query.all(&self.pool).await?)
    }

    /// Classifies a batch and settles derivative references against one
    /// batched original lookup. Index-aligned with the input.
    async fn settle_batch(
        &self,
        batch: &[tickets::Model],
        policy: DerivativePolicy,
    ) -> AppResult<Vec<Contribution>> {
        let cfg = self.classifier(policy);
        let originals = match policy {
            // OwnAmount never follows references.
            DerivativePolicy::OwnAmount => Default::default(),
            DerivativePolicy::DeferToOriginal => self.resolver.load_originals(batch).await?,
        };
        Ok(batch
            .iter()
            .map(|t| settle(classify(t, &cfg), &originals))
            .collect())
    }

    /// Folds a ticket batch into seeded time buckets and renders the rows in
    /// ascending bucket order.
    async fn bucketed_rows<I, F>(
        &self,
        batch: &[tickets::Model],
        seed: I,
        bucket_of: F,
        policy: DerivativePolicy,
    ) -> AppResult<Vec<TimeBucketRow>>
    where
        I: IntoIterator<Item = TimeBucket>,
        F: Fn(DateTime<Utc>) -> TimeBucket,
    {
        let contributions = self.settle_batch(batch, policy).await?;
        let mut agg = RevenueAggregator::seeded(seed);
        for (ticket, c) in batch.iter().zip(&contributions) {
            agg.fold(bucket_of(ticket.effective_time()), c);
        }

        Ok(agg
            .into_groups()
            .into_iter()
            .map(|(bucket, t)| TimeBucketRow {
                label: bucket.label(),
                total_amount: t.total_amount,
                total_cash: t.total_cash,
                total_online: t.total_online,
                total_no_of_tickets: t.total_no_of_tickets,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{TicketStatus, TicketType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn service() -> ReportService {
        ReportService::new(DatabaseConnection::default(), ReportConfig::default())
    }

    fn ticket_at(created_at: &str, amount: rust_decimal::Decimal) -> tickets::Model {
        tickets::Model {
            id: 1,
            ticket_no: "T-0001".to_string(),
            ref_ticket_no: None,
            station_source: 10,
            station_destination: Some(12),
            entry_station: None,
            exit_station: None,
            amount,
            admin_fee: dec!(0),
            payment_mode: Some("cash".to_string()),
            status: TicketStatus::Active,
            ticket_type: TicketType::Regular,
            is_cancelled: false,
            entry_count: 1,
            exit_count: 1,
            device_id: None,
            created_at: DateTime::parse_from_rfc3339(created_at)
                .unwrap()
                .with_timezone(&Utc),
            extended_time: None,
        }
    }

    #[tokio::test]
    async fn hourly_rows_cover_all_twenty_four_hours() {
        let svc = service();
        let date = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        // 02:00 UTC is 07:30 in the +05:30 business timezone.
        let batch = vec![ticket_at("2026-08-05T02:00:00Z", dec!(40))];

        let rows = svc
            .bucketed_rows(
                &batch,
                (0..24).map(|hour| TimeBucket::Hour { date, hour }),
                |ts| TimeBucket::hour_of(ts, svc.config.timezone_offset_minutes),
                DerivativePolicy::DeferToOriginal,
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 24);
        assert_eq!(rows[7].label, "07:00");
        assert_eq!(rows[7].total_amount, dec!(40));
        assert_eq!(rows[7].total_cash, dec!(40));
        assert_eq!(rows[7].total_no_of_tickets, 1);
        assert!(rows
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 7)
            .all(|(_, r)| r.total_no_of_tickets == 0));
    }

    #[tokio::test]
    async fn empty_batch_still_emits_every_hour() {
        let svc = service();
        let date = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();

        let rows = svc
            .bucketed_rows(
                &[],
                (0..24).map(|hour| TimeBucket::Hour { date, hour }),
                |ts| TimeBucket::hour_of(ts, svc.config.timezone_offset_minutes),
                DerivativePolicy::DeferToOriginal,
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0].label, "00:00");
        assert_eq!(rows[23].label, "23:00");
        assert!(rows.iter().all(|r| r.total_amount == dec!(0)));
    }
}
