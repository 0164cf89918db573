//! Category oracle: asks a language model where a page belongs.
//!
//! [`CategoryOracle`] is an enum over concrete providers. Enum dispatch keeps
//! `classify` a plain `async fn` without trait objects. Adding a backend means
//! a new module in [`providers`], a new variant, and a new match arm here and
//! in [`build`].
//!
//! The reply is returned verbatim; turning it into actions is the parser's job.

pub mod prompt;
pub mod providers;

use tracing::{info, instrument};

use linksorter_shared::{LinkSorterError, OracleConfig, Result};

use crate::providers::{dummy::DummyProvider, openai::OpenAiProvider};

/// All available oracle backends. Cheap to clone.
#[derive(Debug, Clone)]
pub enum CategoryOracle {
    OpenAi(OpenAiProvider),
    Dummy(DummyProvider),
}

impl CategoryOracle {
    /// Ask the model to place the page at `url` into one of `categories`
    /// (or a new one). Returns the model's free-text reply.
    #[instrument(skip_all, fields(url = %url, categories = categories.len(), text_len = text.len()))]
    pub async fn classify(&self, categories: &[String], url: &str, text: &str) -> Result<String> {
        let system = prompt::system_prompt(categories);
        let user = prompt::user_message(url, text);

        let reply = match self {
            CategoryOracle::OpenAi(p) => p.complete(&system, &user).await?,
            CategoryOracle::Dummy(p) => p.complete(url),
        };

        info!(reply_lines = reply.lines().count(), "oracle replied");
        Ok(reply)
    }

    /// Provider name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            CategoryOracle::OpenAi(_) => "openai",
            CategoryOracle::Dummy(_) => "dummy",
        }
    }
}

/// Construct a [`CategoryOracle`] from config and an optional API key.
///
/// `api_key` comes from the environment (never TOML) and may be `None` for
/// keyless OpenAI-compatible servers.
pub fn build(config: &OracleConfig, api_key: Option<String>) -> Result<CategoryOracle> {
    match config.provider.as_str() {
        "dummy" => Ok(CategoryOracle::Dummy(DummyProvider)),
        "openai" | "openai-compatible" => {
            let provider = OpenAiProvider::new(
                config.api_base_url.clone(),
                config.model.clone(),
                config.temperature,
                config.timeout_seconds,
                api_key,
            )?;
            Ok(CategoryOracle::OpenAi(provider))
        }
        other => Err(LinkSorterError::config(format!(
            "unknown oracle provider '{other}': expected 'openai', 'openai-compatible' or 'dummy'"
        ))),
    }
}
