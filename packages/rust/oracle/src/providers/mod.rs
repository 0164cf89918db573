//! Oracle provider implementations.

pub mod dummy;
pub mod openai;
