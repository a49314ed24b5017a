use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub unique_visitors: i64,
    pub total_visits: i64,
    pub avg_visits_per_visitor: f64,
}

impl Summary {
    /// An empty window yields 0, not a division error.
    pub fn new(unique_visitors: i64, total_visits: i64) -> Self {
        let avg_visits_per_visitor = if unique_visitors > 0 {
            total_visits as f64 / unique_visitors as f64
        } else {
            0.0
        };

        Self {
            unique_visitors,
            total_visits,
            avg_visits_per_visitor,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CountryCount {
    pub country: String,
    pub count: i64,
}

#[derive(Serialize, Debug)]
pub struct CompanyCount {
    pub company: String,
    pub count: i64,
}

#[derive(Serialize, Debug)]
pub struct PageCount {
    pub page: String,
    pub count: i64,
}

#[derive(Serialize, Debug)]
pub struct DailyCount {
    pub date: String, // %Y-%m-%d
    pub count: i64,
}

#[derive(Serialize, Debug, Default)]
pub struct VisitorTypes {
    pub new: i64,
    pub returning: i64,
}

/// Everything the dashboard renders for one reporting window.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub summary: Summary,
    pub top_countries: Vec<CountryCount>,
    pub top_companies: Vec<CompanyCount>,
    pub top_pages: Vec<PageCount>,
    pub daily_visitors: Vec<DailyCount>,
    pub visitor_types: VisitorTypes,
}

#[derive(Deserialize, Debug)]
pub struct StatsParams {
    pub period: Option<String>,
}

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub success: bool,
    pub period: String,
    #[serde(flatten)]
    pub statistics: Statistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_is_zero_for_empty_window() {
        let summary = Summary::new(0, 0);
        assert_eq!(summary.avg_visits_per_visitor, 0.0);
        assert!(summary.avg_visits_per_visitor.is_finite());
    }

    #[test]
    fn average_divides_visits_by_visitors() {
        let summary = Summary::new(4, 10);
        assert_eq!(summary.avg_visits_per_visitor, 2.5);
    }
}
