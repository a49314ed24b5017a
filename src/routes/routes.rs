use actix_web::web;

use crate::handlers::health_handlers::health_check;
use crate::handlers::stats_handlers::get_statistics;
use crate::handlers::track_handlers::track_visit;
use crate::handlers::visitor_handlers::get_all_visitors;
use crate::middlewares::basic_auth::BasicAuth;

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Ingest and health are open; everything dashboard-facing sits behind
    // Basic auth
    cfg.route("/api/track", web::post().to(track_visit));
    cfg.route("/api/health/check", web::get().to(health_check));
    cfg.service(
        web::scope("/api")
            .wrap(BasicAuth)
            .route("/visitors", web::get().to(get_all_visitors))
            .route("/statistics", web::get().to(get_statistics)),
    );
}
