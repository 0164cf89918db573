//! End-to-end `add_link` pipeline: URL → fetch → text → oracle → actions → store.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use url::Url;

use linksorter_fetcher::PageFetcher;
use linksorter_oracle::CategoryOracle;
use linksorter_shared::{AppConfig, CategoryMap, LinkSorterError, Result};

use crate::action::parse_reply;
use crate::store::CategoryStore;

/// Message returned for any URL the service will not accept.
pub const INVALID_URL_MESSAGE: &str = "Please provide a valid URL starting with http.";

/// Check that `raw` starts with `http` and parses as a URL.
pub fn validate_url(raw: &str) -> Result<Url> {
    if !raw.starts_with("http") {
        return Err(LinkSorterError::validation(INVALID_URL_MESSAGE));
    }
    Url::parse(raw).map_err(|_| LinkSorterError::validation(INVALID_URL_MESSAGE))
}

/// Owns the collaborators and the store; one instance per process.
#[derive(Debug, Clone)]
pub struct Categorizer {
    fetcher: PageFetcher,
    oracle: CategoryOracle,
    store: Arc<CategoryStore>,
    max_words: usize,
}

impl Categorizer {
    pub fn new(
        fetcher: PageFetcher,
        oracle: CategoryOracle,
        store: Arc<CategoryStore>,
        max_words: usize,
    ) -> Self {
        Self {
            fetcher,
            oracle,
            store,
            max_words,
        }
    }

    /// Build every collaborator from config. The store is seeded from
    /// `config.categories`.
    pub fn from_config(config: &AppConfig, api_key: Option<String>) -> Result<Self> {
        let fetcher = PageFetcher::new(&config.fetch)?;
        let oracle = linksorter_oracle::build(&config.oracle, api_key)?;
        let store = Arc::new(CategoryStore::new(config.categories.clone()));
        Ok(Self::new(fetcher, oracle, store, config.oracle.max_words))
    }

    pub fn store(&self) -> &CategoryStore {
        &self.store
    }

    /// Categorize the page at `raw_url` and return the updated map.
    ///
    /// The oracle's whole reply is parsed before anything is applied, so a
    /// malformed line leaves the store untouched.
    #[instrument(skip(self), fields(oracle = self.oracle.name()))]
    pub async fn add_link(&self, raw_url: &str) -> Result<CategoryMap> {
        let url = validate_url(raw_url)?;

        let page = match self.fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(%url, error = %e, "failed to fetch content");
                return Err(e);
            }
        };

        let text = match linksorter_text::prepare(&page.html, self.max_words) {
            Ok(text) => text,
            Err(e) => {
                warn!(%url, error = %e, "failed to extract content");
                return Err(e);
            }
        };

        let categories = self.store.category_names().await;
        let reply = self
            .oracle
            .classify(&categories, raw_url, &text.text)
            .await?;

        let actions = parse_reply(&reply)?;
        let (appended, map) = self.store.apply(&actions).await;

        info!(
            actions = actions.len(),
            appended,
            words = text.word_count,
            truncated = text.truncated,
            "link categorized"
        );

        Ok(map)
    }
}
