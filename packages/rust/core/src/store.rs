//! In-memory category store.
//!
//! One mutex guards the whole map. A batch of actions is applied under a
//! single lock acquisition, so concurrent requests never interleave inside
//! a batch. Nothing is persisted; the map resets to its seed on restart.

use tokio::sync::Mutex;
use tracing::debug;

use linksorter_shared::{CategoryMap, seed_categories};

use crate::action::Action;

/// Shared, mutex-guarded category map.
#[derive(Debug)]
pub struct CategoryStore {
    inner: Mutex<CategoryMap>,
}

impl CategoryStore {
    /// Create a store holding `seed`.
    pub fn new(seed: CategoryMap) -> Self {
        Self {
            inner: Mutex::new(seed),
        }
    }

    /// Create a store holding the built-in seed categories.
    pub fn seeded() -> Self {
        Self::new(seed_categories())
    }

    /// Names of all categories, in key order.
    pub async fn category_names(&self) -> Vec<String> {
        self.inner.lock().await.keys().cloned().collect()
    }

    /// A copy of the whole map.
    pub async fn snapshot(&self) -> CategoryMap {
        self.inner.lock().await.clone()
    }

    /// Apply `actions` in order and return the resulting map.
    ///
    /// Returns the number of URLs actually appended alongside the snapshot.
    pub async fn apply(&self, actions: &[Action]) -> (usize, CategoryMap) {
        let mut map = self.inner.lock().await;
        let appended = apply_actions(&mut map, actions);
        (appended, map.clone())
    }
}

impl Default for CategoryStore {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Apply `actions` to `map` in order. Returns how many URLs were appended.
///
/// `AddToExisting` appends only when the URL is not already listed, and
/// creates the category if it is missing. `AddToNew` always appends, even
/// a URL the category already holds.
pub fn apply_actions(map: &mut CategoryMap, actions: &[Action]) -> usize {
    let mut appended = 0;

    for action in actions {
        match action {
            Action::AddToExisting { category, url } => {
                let urls = map.entry(category.clone()).or_default();
                if urls.contains(url) {
                    debug!(%category, %url, "url already in category, skipping");
                    continue;
                }
                urls.push(url.clone());
            }
            Action::AddToNew { category, url } => {
                map.entry(category.clone()).or_default().push(url.clone());
            }
        }
        appended += 1;
    }

    appended
}
