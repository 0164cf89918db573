//! Page fetching for linksorter.
//!
//! This crate provides:
//! - [`PageFetcher`]: single-page HTTP GET with timeouts, a redirect cap,
//!   content-type filtering, and SSRF protection
//! - [`FetchedPage`]: the raw HTML plus response metadata

pub mod engine;

pub use engine::{FetchedPage, PageFetcher, is_ssrf_target};
