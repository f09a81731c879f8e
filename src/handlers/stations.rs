use crate::models::*;
use crate::services::ReportService;
use actix_web::{web, HttpResponse, ResponseError, Result};

#[utoipa::path(
    get,
    path = "/stations",
    tag = "stations",
    responses(
        (status = 200, description = "Active stations in ascending id order", body = Vec<StationResponse>)
    )
)]
pub async fn list_stations(report_service: web::Data<ReportService>) -> Result<HttpResponse> {
    match report_service.list_stations().await {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn stations_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/stations", web::get().to(list_stations));
}
