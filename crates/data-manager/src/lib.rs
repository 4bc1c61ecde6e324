//! Data Manager crate for candle charts
//! Handles candle acquisition: the fetch contract, payload parsing, response
//! caching and aggregation into derived intervals.

pub mod aggregation;
pub mod cache;
pub mod fetcher;
pub mod parser;

pub use aggregation::{aggregate, aggregate_to_interval, bucket_start};
pub use cache::{CacheKey, CacheStats, CachedFetcher};
pub use fetcher::{fetch_window, CandleFetcher, FetchRequest, FetchResult, MemoryFetcher};
pub use parser::{normalize, parse_chart_payload, ChartResponse, QuoteColumns};
