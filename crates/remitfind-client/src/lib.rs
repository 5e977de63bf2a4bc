//! Async HTTP clients for the services the "find best rate" flow talks to.
//!
//! Each client is bound to one base URL and maps transport failures,
//! non-2xx statuses and undecodable bodies onto [`ClientError`].

mod advisor;
mod brand_config;
mod error;
mod http;
mod pricing;

pub use advisor::AdvisorClient;
pub use brand_config::BrandConfigClient;
pub use error::ClientError;
pub use pricing::PricingClient;
