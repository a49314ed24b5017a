use actix_web::{HttpResponse, Responder, Result, error, web};
use chrono::Utc;

use crate::state::app_state::AppState;
use crate::structs::stats::{StatisticsResponse, StatsParams};
use crate::utils::time::Period;

/// Aggregated dashboard numbers for the requested reporting window
pub async fn get_statistics(
    app_state: web::Data<AppState>,
    query: web::Query<StatsParams>,
) -> Result<impl Responder> {
    let period = Period::parse(query.period.as_deref());
    let window_start = period.window_start(Utc::now());

    let statistics = app_state
        .store
        .statistics(window_start)
        .await
        .map_err(|e| error::ErrorInternalServerError(format!("Database error: {}", e)))?;

    Ok(HttpResponse::Ok().json(StatisticsResponse {
        success: true,
        period: period.as_str().to_string(),
        statistics,
    }))
}
