pub mod health_handlers;
pub mod stats_handlers;
pub mod track_handlers;
pub mod visitor_handlers;
