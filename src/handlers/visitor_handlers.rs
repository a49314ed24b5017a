use actix_web::{HttpResponse, Responder, Result, error, web};

use crate::state::app_state::AppState;
use crate::structs::visitor::VisitorResponse;
use crate::structs::visitor_query::{Pagination, VisitorListParams, VisitorListResponse};

/// Paginated, filterable listing of visitor documents for the dashboard
pub async fn get_all_visitors(
    app_state: web::Data<AppState>,
    query: web::Query<VisitorListParams>,
) -> Result<impl Responder> {
    let params = query.into_inner();

    let (visitors, total_items) = app_state
        .store
        .list(&params)
        .await
        .map_err(|e| error::ErrorInternalServerError(format!("Database error: {}", e)))?;

    let (page, limit) = params.page_and_limit();
    let data: Vec<VisitorResponse> = visitors.into_iter().map(VisitorResponse::from).collect();

    Ok(HttpResponse::Ok().json(VisitorListResponse {
        success: true,
        data,
        pagination: Pagination::new(page, limit, total_items),
    }))
}
