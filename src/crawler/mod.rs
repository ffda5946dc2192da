//! Crawler module for page fetching and record assembly
//!
//! This module contains the core harvesting logic, including:
//! - Request pacing and HTTP fetching with retries
//! - Marker-text link discovery
//! - Listing enumeration and filtering
//! - Per-symbol record assembly
//! - Overall run coordination

mod assembler;
mod coordinator;
mod enumerator;
mod fetcher;
mod limiter;
pub mod links;

pub use assembler::{AssemblyOutcome, RecordAssembler, SkipReason};
pub use coordinator::{
    resolver_for, run_harvest, ConflictDecision, ConflictResolver, Coordinator, CrawlPhase,
    CrawlSummary, FixedDecision, TerminalPrompt,
};
pub use enumerator::{parse_listing, Listing, ListingEntry, SymbolEnumerator, SymbolFilter};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher};
pub use limiter::RateLimiter;
pub use links::{DetailLinkSet, LinkRole};
