use serde::{Deserialize, Serialize};

use crate::structs::visitor::VisitorResponse;

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 100;

#[derive(Deserialize, Debug, Default)]
pub struct VisitorListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub ip: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl VisitorListParams {
    pub fn page_and_limit(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        (page, limit)
    }

    /// Sort field is whitelisted so arbitrary document paths can't be probed.
    pub fn sort_field(&self) -> &str {
        match self.sort.as_deref() {
            Some("firstVisited") => "firstVisited",
            Some("visitCount") => "visitCount",
            Some("company") => "company",
            Some("country") => "country",
            _ => "lastVisited",
        }
    }

    pub fn sort_order(&self) -> i32 {
        match self.order.as_deref() {
            Some("asc") => 1,
            _ => -1,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total_items: u64) -> Self {
        Self {
            page,
            limit,
            total_items,
            total_pages: total_items.div_ceil(limit),
        }
    }
}

#[derive(Serialize)]
pub struct VisitorListResponse {
    pub success: bool,
    pub data: Vec<VisitorResponse>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamps() {
        let params = VisitorListParams::default();
        assert_eq!(params.page_and_limit(), (1, 50));

        let params = VisitorListParams {
            page: Some(0),
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(params.page_and_limit(), (1, 100));
    }

    #[test]
    fn sort_is_whitelisted() {
        let params = VisitorListParams {
            sort: Some(String::from("$where")),
            order: Some(String::from("asc")),
            ..Default::default()
        };
        assert_eq!(params.sort_field(), "lastVisited");
        assert_eq!(params.sort_order(), 1);

        let params = VisitorListParams {
            sort: Some(String::from("visitCount")),
            ..Default::default()
        };
        assert_eq!(params.sort_field(), "visitCount");
        assert_eq!(params.sort_order(), -1);
    }

    #[test]
    fn pagination_rounds_pages_up() {
        let p = Pagination::new(2, 20, 41);
        assert_eq!(p.total_pages, 3);

        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.total_pages, 0);
    }
}
