pub mod db;
pub mod geolocation;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod structs;
pub mod tracker;
pub mod utils;

// Re-export commonly used types
pub use geolocation::{GeoClient, GeoInfo};
pub use models::visitor::Visitor;
pub use store::visitor_store::VisitorStore;
pub use tracker::{PageTracker, TrackerConfig};
