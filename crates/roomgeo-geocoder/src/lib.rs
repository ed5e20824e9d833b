//! Address → coordinate resolution for the room-booking admin console.
//!
//! [`GeocodeClient`] talks to a Nominatim-compatible provider behind a shared
//! [`RateLimiter`], with bounded retry and an in-memory cache.
//! [`LocationResolver`] validates and classifies the answer, falling back to
//! a fixed reference point on failure. [`BatchResolver`] runs many records
//! in order and persists each update through a caller-supplied
//! [`LocationStore`].

pub mod accuracy;
pub mod batch;
pub mod bounds;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod resolver;
pub mod retry;

mod types;

pub use accuracy::{classify, is_known_region_match};
pub use batch::{
    BatchOptions, BatchOutcome, BatchProgress, BatchReport, BatchResolver, CancelSignal,
    LocationStore,
};
pub use bounds::is_within_region;
pub use cache::{CacheStats, GeocodeCache};
pub use client::GeocodeClient;
pub use config::GeocoderConfig;
pub use error::{FailureKind, GeocodeError, ProviderError};
pub use rate_limit::RateLimiter;
pub use resolver::{LocationResolver, Resolution};
pub use retry::RetryPolicy;
