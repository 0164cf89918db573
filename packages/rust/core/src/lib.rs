//! Core domain logic for linksorter.
//!
//! This crate ties fetching, text preparation, and the oracle together
//! into the categorization pipeline, and owns the two pieces with real
//! invariants: the action grammar and the category store.

pub mod action;
pub mod pipeline;
pub mod store;

pub use action::{Action, parse_line, parse_reply};
pub use pipeline::{Categorizer, INVALID_URL_MESSAGE, validate_url};
pub use store::{CategoryStore, apply_actions};
