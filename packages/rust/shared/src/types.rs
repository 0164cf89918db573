//! Core domain types shared across linksorter crates.

use std::collections::BTreeMap;

/// Category name → ordered list of URLs.
///
/// Keys iterate in sorted order, so serialized maps have a stable shape.
pub type CategoryMap = BTreeMap<String, Vec<String>>;

/// The categories a fresh process starts with.
pub fn seed_categories() -> CategoryMap {
    let mut map = CategoryMap::new();
    map.insert(
        "Applications".into(),
        vec!["https://www.bain.com/careers/".into()],
    );
    map.insert(
        "Shopping".into(),
        vec![
            "https://www.zara.com/us/".into(),
            "https://www2.hm.com/en_us/index.html".into(),
        ],
    );
    map
}
