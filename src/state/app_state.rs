use crate::geolocation::GeoClient;
use crate::store::visitor_store::VisitorStore;

/// Shared application state, constructed once at startup and handed to every
/// handler through `web::Data`.
pub struct AppState {
    pub store: VisitorStore,
    pub geo: GeoClient,
}
