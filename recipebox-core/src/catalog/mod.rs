//! Client for the third-party recipe API.
//!
//! Three read-only endpoints are used:
//! 1. `recipes/complexSearch` - keyword search
//! 2. `recipes/{id}/information` - one recipe with ingredients
//! 3. `recipes/random` - random picks
//!
//! Every request carries the API key as the `apiKey` query parameter.
//! Failures are reported to the caller and never retried.

mod client;
mod error;

pub use client::{CatalogClient, DEFAULT_BASE_URL, DEFAULT_QUERY, DEFAULT_RESULTS};
pub use error::CatalogError;
