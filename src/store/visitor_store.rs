use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::geolocation::GeoInfo;
use crate::models::visitor::Visitor;
use crate::structs::stats::{
    CompanyCount, CountryCount, DailyCount, PageCount, Statistics, Summary, VisitorTypes,
};
use crate::structs::track_request::TrackRequest;
use crate::structs::visitor_query::VisitorListParams;
use crate::utils::time::parse_timestamp;

const VISITORS_COLLECTION: &str = "visitors";
const TOP_N: i64 = 10;

/// Store client for the visitor collection, constructed once at startup and
/// shared through the application state.
pub struct VisitorStore {
    db: Database,
}

/// Upsert document for one ingest event. The counter increment, page append
/// and location refresh ride a single update, applied atomically store-side.
pub fn build_visit_update(event: &TrackRequest, geo: &GeoInfo, now: i64) -> Document {
    let mut set = doc! {
        "lastVisited": now,
        "company": &geo.company,
        "city": &geo.city,
        "country": &geo.country,
        "region": &geo.region,
        "timezone": &geo.timezone,
        "isp": &geo.isp,
    };
    if let Some(user_agent) = &event.user_agent {
        set.insert("userAgent", user_agent);
    }
    if let Some(referrer) = &event.referrer {
        set.insert("referrer", referrer);
    }

    let mut update = doc! {
        "$set": set,
        "$inc": { "visitCount": 1i64 },
        "$setOnInsert": { "firstVisited": now },
    };

    match &event.page {
        Some(page) => {
            update.insert("$addToSet", doc! { "pages": page });
        }
        None => {
            update
                .get_document_mut("$setOnInsert")
                .unwrap()
                .insert("pages", Vec::<Bson>::new());
        }
    }

    update
}

/// Listing filter from the dashboard query parameters. Unparseable date
/// bounds are dropped rather than failing the request.
pub fn build_list_filter(params: &VisitorListParams) -> Document {
    let mut filter = doc! {};

    if let Some(company) = params.company.as_deref().filter(|c| !c.is_empty()) {
        filter.insert("company", doc! { "$regex": company, "$options": "i" });
    }
    if let Some(country) = params.country.as_deref().filter(|c| !c.is_empty()) {
        filter.insert("country", doc! { "$regex": country, "$options": "i" });
    }
    if let Some(ip) = params.ip.as_deref().filter(|ip| !ip.is_empty()) {
        filter.insert("ip", ip);
    }

    let mut range = doc! {};
    if let Some(from) = params.from.as_deref().and_then(parse_timestamp) {
        range.insert("$gte", from);
    }
    if let Some(to) = params.to.as_deref().and_then(parse_timestamp) {
        range.insert("$lte", to);
    }
    if !range.is_empty() {
        filter.insert("lastVisited", range);
    }

    filter
}

fn window_match(window_start: i64) -> Document {
    doc! { "$match": { "lastVisited": { "$gte": window_start } } }
}

fn day_of(field: &str) -> Document {
    doc! { "$dateToString": { "format": "%Y-%m-%d", "date": { "$toDate": field } } }
}

pub fn summary_pipeline(window_start: i64) -> Vec<Document> {
    vec![
        window_match(window_start),
        doc! { "$group": {
            "_id": null,
            "uniqueVisitors": { "$sum": 1 },
            "totalVisits": { "$sum": "$visitCount" },
        }},
    ]
}

pub fn top_countries_pipeline(window_start: i64) -> Vec<Document> {
    vec![
        window_match(window_start),
        doc! { "$group": { "_id": "$country", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": TOP_N },
    ]
}

/// Visitors without an attributed company are excluded from this ranking.
pub fn top_companies_pipeline(window_start: i64) -> Vec<Document> {
    vec![
        doc! { "$match": {
            "lastVisited": { "$gte": window_start },
            "company": { "$ne": "Unknown" },
        }},
        doc! { "$group": { "_id": "$company", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": TOP_N },
    ]
}

pub fn top_pages_pipeline(window_start: i64) -> Vec<Document> {
    vec![
        window_match(window_start),
        doc! { "$unwind": "$pages" },
        doc! { "$group": { "_id": "$pages", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": TOP_N },
    ]
}

pub fn daily_visitors_pipeline(window_start: i64) -> Vec<Document> {
    vec![
        window_match(window_start),
        doc! { "$group": { "_id": day_of("$lastVisited"), "count": { "$sum": 1 } } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

/// "New" means first and last visit fall on the same calendar day (UTC).
pub fn visitor_types_pipeline(window_start: i64) -> Vec<Document> {
    vec![
        window_match(window_start),
        doc! { "$project": {
            "sameDay": { "$eq": [day_of("$firstVisited"), day_of("$lastVisited")] },
        }},
        doc! { "$group": { "_id": "$sameDay", "count": { "$sum": 1 } } },
    ]
}

/// `$sum` yields Int32 or Int64 depending on the accumulated values.
fn count_field(doc: &Document, key: &str) -> i64 {
    match doc.get(key) {
        Some(Bson::Int64(n)) => *n,
        Some(Bson::Int32(n)) => i64::from(*n),
        Some(Bson::Double(n)) => *n as i64,
        _ => 0,
    }
}

impl VisitorStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn visitors(&self) -> Collection<Visitor> {
        self.db.collection(VISITORS_COLLECTION)
    }

    fn documents(&self) -> Collection<Document> {
        self.db.collection(VISITORS_COLLECTION)
    }

    /// Health probe against the underlying connection.
    pub async fn ping(&self) -> Result<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    /// Record one ingest event, creating the per-IP document on first sight.
    pub async fn record_visit(&self, event: &TrackRequest, geo: &GeoInfo) -> Result<Visitor> {
        let now = Utc::now().timestamp_millis();
        let update = build_visit_update(event, geo, now);

        self.visitors()
            .find_one_and_update(doc! { "ip": &event.ip }, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .context("Failed to upsert visitor")?
            .ok_or_else(|| anyhow!("Upsert returned no document"))
    }

    pub async fn list(&self, params: &VisitorListParams) -> Result<(Vec<Visitor>, u64)> {
        let filter = build_list_filter(params);
        let collection = self.visitors();

        let total = collection
            .count_documents(filter.clone())
            .await
            .context("Failed to count visitors")?;

        let (page, limit) = params.page_and_limit();
        let mut sort = Document::new();
        sort.insert(params.sort_field(), params.sort_order());

        let visitors = collection
            .find(filter)
            .sort(sort)
            .skip((page - 1) * limit)
            .limit(limit as i64)
            .await
            .context("Failed to query visitors")?
            .try_collect()
            .await
            .context("Failed to read visitor cursor")?;

        Ok((visitors, total))
    }

    /// Grouped `{_id, count}` results as (label, count) pairs.
    async fn grouped_counts(&self, pipeline: Vec<Document>) -> Result<Vec<(String, i64)>> {
        let mut cursor = self
            .documents()
            .aggregate(pipeline)
            .await
            .context("Aggregation failed")?;

        let mut rows = Vec::new();
        while let Some(doc) = cursor.try_next().await.context("Aggregation cursor failed")? {
            let label = doc.get_str("_id").unwrap_or("Unknown").to_string();
            rows.push((label, count_field(&doc, "count")));
        }
        Ok(rows)
    }

    pub async fn statistics(&self, window_start: i64) -> Result<Statistics> {
        let mut cursor = self
            .documents()
            .aggregate(summary_pipeline(window_start))
            .await
            .context("Aggregation failed")?;
        let summary = match cursor.try_next().await.context("Aggregation cursor failed")? {
            Some(doc) => Summary::new(
                count_field(&doc, "uniqueVisitors"),
                count_field(&doc, "totalVisits"),
            ),
            None => Summary::new(0, 0),
        };

        let top_countries = self
            .grouped_counts(top_countries_pipeline(window_start))
            .await?
            .into_iter()
            .map(|(country, count)| CountryCount { country, count })
            .collect();

        let top_companies = self
            .grouped_counts(top_companies_pipeline(window_start))
            .await?
            .into_iter()
            .map(|(company, count)| CompanyCount { company, count })
            .collect();

        let top_pages = self
            .grouped_counts(top_pages_pipeline(window_start))
            .await?
            .into_iter()
            .map(|(page, count)| PageCount { page, count })
            .collect();

        let daily_visitors = self
            .grouped_counts(daily_visitors_pipeline(window_start))
            .await?
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect();

        let mut visitor_types = VisitorTypes::default();
        let mut cursor = self
            .documents()
            .aggregate(visitor_types_pipeline(window_start))
            .await
            .context("Aggregation failed")?;
        while let Some(doc) = cursor.try_next().await.context("Aggregation cursor failed")? {
            match doc.get_bool("_id") {
                Ok(true) => visitor_types.new = count_field(&doc, "count"),
                Ok(false) => visitor_types.returning = count_field(&doc, "count"),
                Err(_) => {}
            }
        }

        Ok(Statistics {
            summary,
            top_countries,
            top_companies,
            top_pages,
            daily_visitors,
            visitor_types,
        })
    }
}
