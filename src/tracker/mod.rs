//! Best-effort page-view reporter for embedding in a site shell.
//!
//! Reporting is consent-gated and deduplicated per session; a send that
//! fails for any reason is logged and dropped. `page_changed` never blocks
//! the caller and never returns an error.

mod storage;

pub use storage::{KeyValueStorage, MemoryStorage};

use serde::Deserialize;
use std::sync::{Arc, Mutex};

pub const DEFAULT_CONSENT_KEY: &str = "cookiePreferences";
pub const DEFAULT_PAGES_KEY: &str = "trackedPages";

#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Master switch; off means no storage reads and no network calls.
    pub enabled: bool,
    pub tracking_endpoint: String,
    pub ip_lookup_url: String,
    /// Deduplicate paths through the session store.
    pub use_cookies: bool,
    pub consent_key: String,
    pub pages_key: String,
    pub user_agent: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tracking_endpoint: String::from("http://localhost:8080/api/track"),
            ip_lookup_url: String::from("https://api.ipify.org?format=json"),
            use_cookies: true,
            consent_key: String::from(DEFAULT_CONSENT_KEY),
            pages_key: String::from(DEFAULT_PAGES_KEY),
            user_agent: Some(String::from("sitepulse-tracker/0.1")),
        }
    }
}

/// Stored consent object; only the analytics flag matters here.
#[derive(Deserialize)]
struct ConsentPreferences {
    #[serde(default)]
    analytics: bool,
}

#[derive(Deserialize)]
struct IpLookupResponse {
    ip: String,
}

pub struct PageTracker {
    config: TrackerConfig,
    consent: Arc<dyn KeyValueStorage>,
    session: Arc<dyn KeyValueStorage>,
    // Previous reported path, sent as the referrer of the next event
    last_path: Mutex<Option<String>>,
    http: reqwest::Client,
}

impl PageTracker {
    pub fn new(
        config: TrackerConfig,
        consent: Arc<dyn KeyValueStorage>,
        session: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            config,
            consent,
            session,
            last_path: Mutex::new(None),
            http: reqwest::Client::new(),
        }
    }

    /// Report a navigation. Must be called from within a tokio runtime; the
    /// actual send runs on a detached task whose result is discarded.
    pub fn page_changed(&self, path: &str) {
        if !self.should_track(path) {
            return;
        }
        self.mark_tracked(path);

        let referrer = self.last_path.lock().unwrap().replace(path.to_string());

        let config = self.config.clone();
        let http = self.http.clone();
        let page = path.to_string();
        tokio::spawn(async move {
            if let Err(e) = send_event(&http, &config, &page, referrer).await {
                log::warn!("Failed to report page view for {}: {}", page, e);
            }
        });
    }

    /// Full gate: enabled, consented, and not already reported this session.
    pub fn should_track(&self, path: &str) -> bool {
        if !self.config.enabled {
            return false;
        }
        if !self.analytics_allowed() {
            return false;
        }
        if self.config.use_cookies && self.tracked_pages().iter().any(|p| p == path) {
            return false;
        }
        true
    }

    // No stored preference means no consent
    fn analytics_allowed(&self) -> bool {
        let raw = match self.consent.get(&self.config.consent_key) {
            Some(raw) => raw,
            None => return false,
        };

        match serde_json::from_str::<ConsentPreferences>(&raw) {
            Ok(prefs) => prefs.analytics,
            Err(e) => {
                log::debug!("Unreadable consent preferences: {}", e);
                false
            }
        }
    }

    fn tracked_pages(&self) -> Vec<String> {
        self.session
            .get(&self.config.pages_key)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn mark_tracked(&self, path: &str) {
        if !self.config.use_cookies {
            return;
        }

        let mut pages = self.tracked_pages();
        pages.push(path.to_string());
        if let Ok(raw) = serde_json::to_string(&pages) {
            self.session.set(&self.config.pages_key, raw);
        }
    }
}

async fn send_event(
    http: &reqwest::Client,
    config: &TrackerConfig,
    page: &str,
    referrer: Option<String>,
) -> Result<(), reqwest::Error> {
    // Two hops: resolve own public IP, then post the event
    let lookup = http
        .get(&config.ip_lookup_url)
        .send()
        .await?
        .error_for_status()?
        .json::<IpLookupResponse>()
        .await?;

    http.post(&config.tracking_endpoint)
        .json(&serde_json::json!({
            "ip": lookup.ip,
            "page": page,
            "userAgent": config.user_agent,
            "referrer": referrer,
        }))
        .send()
        .await?
        .error_for_status()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with_consent(consent_json: Option<&str>) -> PageTracker {
        let consent = Arc::new(MemoryStorage::new());
        if let Some(json) = consent_json {
            consent.set(DEFAULT_CONSENT_KEY, json.to_string());
        }
        PageTracker::new(
            TrackerConfig::default(),
            consent,
            Arc::new(MemoryStorage::new()),
        )
    }

    #[test]
    fn absent_consent_fails_closed() {
        let tracker = tracker_with_consent(None);
        assert!(!tracker.should_track("/"));
    }

    #[test]
    fn declined_or_unreadable_consent_blocks_tracking() {
        let tracker = tracker_with_consent(Some(r#"{"analytics": false, "marketing": true}"#));
        assert!(!tracker.should_track("/"));

        let tracker = tracker_with_consent(Some("not json"));
        assert!(!tracker.should_track("/"));
    }

    #[test]
    fn consented_paths_track_once_per_session() {
        let tracker = tracker_with_consent(Some(r#"{"analytics": true}"#));
        assert!(tracker.should_track("/pricing"));

        tracker.mark_tracked("/pricing");
        assert!(!tracker.should_track("/pricing"));
        // A different path is still fresh
        assert!(tracker.should_track("/about"));
    }

    #[test]
    fn dedup_disabled_when_cookies_are_off() {
        let consent = Arc::new(MemoryStorage::new());
        consent.set(DEFAULT_CONSENT_KEY, String::from(r#"{"analytics": true}"#));
        let config = TrackerConfig {
            use_cookies: false,
            ..Default::default()
        };
        let tracker = PageTracker::new(config, consent, Arc::new(MemoryStorage::new()));

        tracker.mark_tracked("/pricing");
        assert!(tracker.should_track("/pricing"));
    }

    #[test]
    fn disabled_tracker_ignores_navigation() {
        let consent = Arc::new(MemoryStorage::new());
        consent.set(DEFAULT_CONSENT_KEY, String::from(r#"{"analytics": true}"#));
        let config = TrackerConfig {
            enabled: false,
            ..Default::default()
        };
        let tracker = PageTracker::new(config, consent, Arc::new(MemoryStorage::new()));

        assert!(!tracker.should_track("/"));
        // No runtime needed: the disabled gate returns before any spawn
        tracker.page_changed("/");
    }

    #[actix_web::test]
    async fn page_changed_never_fails_even_when_sends_do() {
        let consent = Arc::new(MemoryStorage::new());
        consent.set(DEFAULT_CONSENT_KEY, String::from(r#"{"analytics": true}"#));
        let config = TrackerConfig {
            // Unroutable on purpose; the failure is logged and swallowed
            tracking_endpoint: String::from("http://127.0.0.1:1/api/track"),
            ip_lookup_url: String::from("http://127.0.0.1:1/ip"),
            ..Default::default()
        };
        let tracker = PageTracker::new(config, consent, Arc::new(MemoryStorage::new()));

        tracker.page_changed("/pricing");
        // Dedup recorded synchronously regardless of the send outcome
        assert!(!tracker.should_track("/pricing"));
    }
}
