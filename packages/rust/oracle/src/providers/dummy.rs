//! Dummy provider: files every link under `Uncategorized`.
//! Used for local runs and tests without an API key.

/// Category the dummy provider always proposes.
pub const DUMMY_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub fn complete(&self, url: &str) -> String {
        format!("AddLinkToNewCategory ['{DUMMY_CATEGORY}'] ['{url}']")
    }
}
