use serde::{Deserialize, Serialize};
use validator::Validate;

/// One reported page-view event. Only the IP is mandatory.
#[derive(Deserialize, Serialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    #[validate(length(min = 1, message = "ip is required"))]
    pub ip: String,
    pub page: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}
