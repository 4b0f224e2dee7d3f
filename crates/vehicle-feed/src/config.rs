use std::env;
use std::time::Duration;

use realtime::Category;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://api.data.gov.my/gtfs-realtime/vehicle-position/prasarana";

/// Feed polling settings.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub base_url: String,
    pub categories: Vec<Category>,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl FeedConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("FEED_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let categories = env::var("FEED_CATEGORIES")
            .map(|value| parse_categories(&value))
            .unwrap_or_else(|_| vec![Category::mrt_feeder(), Category::kl()]);
        let poll_interval = Duration::from_secs(env_u64("POLL_INTERVAL_SECS", 30).max(1));
        let timeout = Duration::from_secs(env_u64("FEED_TIMEOUT_SECS", 30));

        Self { base_url, categories, poll_interval, timeout }
    }

    /// Feed URL for a category.
    #[must_use]
    pub fn feed_url(&self, category: &Category) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}category={}", self.base_url, urlencoding::encode(category.as_str()))
    }
}

fn parse_categories(value: &str) -> Vec<Category> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse() {
            Ok(category) => Some(category),
            Err(e) => {
                warn!("ignoring category {entry}: {e}");
                None
            }
        })
        .collect()
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|value| value.parse::<u64>().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_url() {
        let config = FeedConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            categories: vec![],
            poll_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(
            config.feed_url(&Category::kl()),
            "https://api.data.gov.my/gtfs-realtime/vehicle-position/prasarana?category=rapid-bus-kl"
        );
    }

    #[test]
    fn categories() {
        assert_eq!(parse_categories(" kl, ,rapid-bus-mrtfeeder,../x"), vec![
            Category::kl(),
            Category::mrt_feeder()
        ]);
    }
}
