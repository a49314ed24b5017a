use serde::Serialize;

use crate::models::visitor::Visitor;

// For API responses - ObjectId rendered as a hex string
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VisitorResponse {
    pub id: Option<String>,
    pub ip: String,
    pub company: String,
    pub city: String,
    pub country: String,
    pub region: String,
    pub timezone: String,
    pub isp: String,
    pub pages: Vec<String>,
    pub first_visited: i64,
    pub last_visited: i64,
    pub visit_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

impl From<Visitor> for VisitorResponse {
    fn from(visitor: Visitor) -> Self {
        Self {
            id: visitor.id.map(|oid| oid.to_hex()),
            ip: visitor.ip,
            company: visitor.company,
            city: visitor.city,
            country: visitor.country,
            region: visitor.region,
            timezone: visitor.timezone,
            isp: visitor.isp,
            pages: visitor.pages,
            first_visited: visitor.first_visited,
            last_visited: visitor.last_visited,
            visit_count: visitor.visit_count,
            user_agent: visitor.user_agent,
            referrer: visitor.referrer,
        }
    }
}
