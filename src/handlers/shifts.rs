use crate::models::*;
use crate::services::ShiftService;
use crate::utils::time::parse_date;
use actix_web::{web, HttpResponse, ResponseError, Result};

#[utoipa::path(
    post,
    path = "/shifts/report",
    tag = "shifts",
    request_body = ShiftReportRequest,
    responses(
        (status = 200, description = "Shift snapshot stored (created or updated)", body = ShiftUpsertResponse),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn report_shift(
    shift_service: web::Data<ShiftService>,
    request: web::Json<ShiftReportRequest>,
) -> Result<HttpResponse> {
    match shift_service.upsert_shift(request.into_inner()).await {
        Ok(resp) => {
            let message = match resp.action {
                UpsertAction::Created => "Shift report stored",
                UpsertAction::Updated => "Shift report replaced",
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(resp, message)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/shifts/find",
    tag = "shifts",
    request_body = ShiftFindRequest,
    responses(
        (status = 200, description = "Shifts overlapping the window, still-open shifts included", body = Vec<ShiftSessionResponse>),
        (status = 400, description = "Invalid date range")
    )
)]
pub async fn find_shifts(
    shift_service: web::Data<ShiftService>,
    request: web::Json<ShiftFindRequest>,
) -> Result<HttpResponse> {
    match shift_service.find_shifts_by_dates(&request.into_inner()).await {
        Ok(sessions) => Ok(HttpResponse::Ok().json(ApiResponse::success(sessions))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/shifts/collection",
    tag = "shifts",
    params(CollectionQuery),
    responses(
        (status = 200, description = "Per-device shift collection grouped by station", body = Vec<StationCollectionReport>),
        (status = 400, description = "Invalid date"),
        (status = 502, description = "Inventory collaborator unavailable")
    )
)]
pub async fn collection(
    shift_service: web::Data<ShiftService>,
    query: web::Query<CollectionQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let date = match parse_date(&query.date) {
        Ok(date) => date,
        Err(e) => return Ok(e.error_response()),
    };
    match shift_service.collection_report(date, query.station).await {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(report))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn shifts_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/shifts")
            .route("/report", web::post().to(report_shift))
            .route("/find", web::post().to(find_shifts))
            .route("/collection", web::get().to(collection)),
    );
}
