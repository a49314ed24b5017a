pub mod stats;
pub mod track_request;
pub mod visitor;
pub mod visitor_query;
