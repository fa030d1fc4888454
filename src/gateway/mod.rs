//! Remote metadata gateway
//!
//! A thin read-only client over the catalog's HTTP/JSON API and its image hosts.

mod client;
pub mod responses;

pub use client::{build_http_client, Gateway};
