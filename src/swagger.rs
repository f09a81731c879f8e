use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{TicketStatus, TicketType};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::reports::dashboard,
        handlers::reports::dashboard_station,
        handlers::reports::dashboard_monthly,
        handlers::reports::dashboard_daily_revenue,
        handlers::reports::daily_report,
        handlers::reports::hourly_report,
        handlers::reports::tickets,
        handlers::reports::tickets_paginated,
        handlers::reports::ridership,
        handlers::reports::penalty,
        handlers::shifts::report_shift,
        handlers::shifts::find_shifts,
        handlers::shifts::collection,
        handlers::stations::list_stations,
    ),
    components(
        schemas(
            ApiError,
            TicketStatus,
            TicketType,
            RidershipSource,
            DateRangeRequest,
            HourlyReportRequest,
            RidershipRequest,
            TicketListRequest,
            StationRevenueRow,
            TimeBucketRow,
            StationSeriesReport,
            RidershipRow,
            PenaltyReportRow,
            TicketResponse,
            StationResponse,
            PaginationParams,
            PaginatedTicketResponse,
            ShiftReportRequest,
            ShiftFindRequest,
            UpsertAction,
            ShiftUpsertResponse,
            ShiftSessionResponse,
            DeviceShiftRow,
            StationCollectionReport,
        )
    ),
    tags(
        (name = "dashboard", description = "Live dashboard aggregates"),
        (name = "reports", description = "Historical revenue and ridership reports"),
        (name = "shifts", description = "Shift reporting and reconciliation"),
        (name = "stations", description = "Station reference data"),
    ),
    info(
        title = "Farebox Backend API",
        version = "1.0.0",
        description = "Revenue attribution, ridership and shift reconciliation REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
