use crate::models::*;
use crate::services::ReportService;
use actix_web::{web, HttpResponse, ResponseError, Result};

#[utoipa::path(
    get,
    path = "/reports/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "Today's revenue and ridership per station", body = Vec<StationRevenueRow>),
        (status = 500, description = "Database error")
    )
)]
pub async fn dashboard(report_service: web::Data<ReportService>) -> Result<HttpResponse> {
    match report_service.dashboard_today().await {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reports/dashboard/station/{id}",
    tag = "dashboard",
    params(("id" = i64, Path, description = "Station id")),
    responses(
        (status = 200, description = "Past seven days of daily revenue for one station", body = StationSeriesReport),
        (status = 404, description = "Station not found")
    )
)]
pub async fn dashboard_station(
    report_service: web::Data<ReportService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match report_service.station_series(path.into_inner()).await {
        Ok(series) => Ok(HttpResponse::Ok().json(ApiResponse::success(series))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reports/dashboard/monthly",
    tag = "dashboard",
    responses(
        (status = 200, description = "Current year as twelve month buckets", body = Vec<TimeBucketRow>)
    )
)]
pub async fn dashboard_monthly(report_service: web::Data<ReportService>) -> Result<HttpResponse> {
    match report_service.monthly_overview().await {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reports/dashboard/daily-revenue",
    tag = "dashboard",
    responses(
        (status = 200, description = "Current month, one bucket per day", body = Vec<TimeBucketRow>)
    )
)]
pub async fn dashboard_daily_revenue(
    report_service: web::Data<ReportService>,
) -> Result<HttpResponse> {
    match report_service.daily_revenue().await {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reports/daily",
    tag = "reports",
    request_body = DateRangeRequest,
    responses(
        (status = 200, description = "Per-station matrix over the requested range", body = Vec<StationRevenueRow>),
        (status = 400, description = "Invalid date range")
    )
)]
pub async fn daily_report(
    report_service: web::Data<ReportService>,
    request: web::Json<DateRangeRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();
    match report_service
        .daily_report(&req.from_date, &req.to_date, req.stations.as_deref())
        .await
    {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reports/hourly",
    tag = "reports",
    request_body = HourlyReportRequest,
    responses(
        (status = 200, description = "One day as twenty-four hour buckets", body = Vec<TimeBucketRow>),
        (status = 400, description = "Invalid date")
    )
)]
pub async fn hourly_report(
    report_service: web::Data<ReportService>,
    request: web::Json<HourlyReportRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();
    match report_service
        .hourly_report(&req.date, req.stations.as_deref())
        .await
    {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reports/tickets",
    tag = "reports",
    request_body = TicketListRequest,
    responses(
        (status = 200, description = "Filtered ticket listing", body = Vec<TicketResponse>),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn tickets(
    report_service: web::Data<ReportService>,
    request: web::Json<TicketListRequest>,
) -> Result<HttpResponse> {
    match report_service.list_tickets(&request.into_inner()).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reports/tickets/paginated",
    tag = "reports",
    request_body = TicketListRequest,
    responses(
        (status = 200, description = "Paginated ticket listing", body = PaginatedTicketResponse),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn tickets_paginated(
    report_service: web::Data<ReportService>,
    request: web::Json<TicketListRequest>,
) -> Result<HttpResponse> {
    match report_service
        .list_tickets_paginated(&request.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reports/ridership",
    tag = "reports",
    request_body = RidershipRequest,
    responses(
        (status = 200, description = "Entry/exit counts per station", body = Vec<RidershipRow>),
        (status = 400, description = "Invalid date range")
    )
)]
pub async fn ridership(
    report_service: web::Data<ReportService>,
    request: web::Json<RidershipRequest>,
) -> Result<HttpResponse> {
    match report_service.ridership_report(&request.into_inner()).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reports/penalty",
    tag = "reports",
    request_body = DateRangeRequest,
    responses(
        (status = 200, description = "Per-station penalty totals with payment buckets", body = Vec<PenaltyReportRow>),
        (status = 400, description = "Invalid date range")
    )
)]
pub async fn penalty(
    report_service: web::Data<ReportService>,
    request: web::Json<DateRangeRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();
    match report_service
        .penalty_report(&req.from_date, &req.to_date, req.stations.as_deref())
        .await
    {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn reports_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/dashboard", web::get().to(dashboard))
            .route("/dashboard/station/{id}", web::get().to(dashboard_station))
            .route("/dashboard/monthly", web::get().to(dashboard_monthly))
            .route(
                "/dashboard/daily-revenue",
                web::get().to(dashboard_daily_revenue),
            )
            .route("/daily", web::post().to(daily_report))
            .route("/hourly", web::post().to(hourly_report))
            .route("/tickets", web::post().to(tickets))
            .route("/tickets/paginated", web::post().to(tickets_paginated))
            .route("/ridership", web::post().to(ridership))
            .route("/penalty", web::post().to(penalty)),
    );
}
