use actix_web::{HttpResponse, Responder, Result, error, web};
use validator::Validate;

use crate::state::app_state::AppState;
use crate::structs::track_request::TrackRequest;
use crate::structs::visitor::VisitorResponse;

/// Record one page-view event against the per-IP visitor document
pub async fn track_visit(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<TrackRequest>,
) -> Result<impl Responder> {
    // Validate before any side effect
    if let Err(errors) = req.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    // Enrich with location data first; a failed lookup drops the event
    // without touching the store
    let geo = match app_state.geo.lookup(&req.ip).await {
        Ok(geo) => geo,
        Err(e) => {
            log::warn!("Geolocation lookup failed for {}: {}", req.ip, e);
            return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Geolocation lookup failed"
            })));
        }
    };

    let visitor = app_state
        .store
        .record_visit(&req, &geo)
        .await
        .map_err(|e| error::ErrorInternalServerError(format!("Database error: {}", e)))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "visitor": VisitorResponse::from(visitor)
    })))
}
