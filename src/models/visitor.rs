use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

fn unknown() -> String {
    String::from("Unknown")
}

/// One document per distinct IP address. Field names are camelCase on the
/// wire and in the collection (`firstVisited`, `visitCount`, ...).
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub ip: String,
    #[serde(default = "unknown")]
    pub company: String,
    #[serde(default = "unknown")]
    pub city: String,
    #[serde(default = "unknown")]
    pub country: String,
    #[serde(default = "unknown")]
    pub region: String,
    #[serde(default = "unknown")]
    pub timezone: String,
    #[serde(default = "unknown")]
    pub isp: String,
    #[serde(default)]
    pub pages: Vec<String>, // distinct paths, append-only
    pub first_visited: i64, // epoch millis, set once on insert
    pub last_visited: i64,  // epoch millis, bumped on every event
    #[serde(default)]
    pub visit_count: i64, // one per ingest event, not per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn deserializes_camel_case_document() {
        let doc = doc! {
            "ip": "203.0.113.9",
            "company": "ExampleCorp",
            "city": "Oslo",
            "country": "Norway",
            "region": "03",
            "timezone": "Europe/Oslo",
            "isp": "Example ISP",
            "pages": ["/", "/pricing"],
            "firstVisited": 1704067200000i64,
            "lastVisited": 1704153600000i64,
            "visitCount": 3i64,
            "userAgent": "Mozilla/5.0",
        };

        let visitor: Visitor = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(visitor.ip, "203.0.113.9");
        assert_eq!(visitor.pages, vec!["/", "/pricing"]);
        assert_eq!(visitor.visit_count, 3);
        assert_eq!(visitor.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(visitor.referrer, None);
    }

    #[test]
    fn missing_location_fields_default_to_unknown() {
        let doc = doc! {
            "ip": "198.51.100.4",
            "firstVisited": 1704067200000i64,
            "lastVisited": 1704067200000i64,
        };

        let visitor: Visitor = mongodb::bson::from_document(doc).unwrap();
        assert_eq!(visitor.company, "Unknown");
        assert_eq!(visitor.country, "Unknown");
        assert!(visitor.pages.is_empty());
        assert_eq!(visitor.visit_count, 0);
    }
}
