//! Symbol enumeration from the listing page

use crate::config::SourceConfig;
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::links::resolve_href;
use crate::record::Symbol;
use crate::{HarvestError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::{BTreeSet, HashSet};
use url::Url;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("Failed to compile word regex"));
static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("table selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("link selector"));

/// A candidate symbol and its detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub symbol: Symbol,
    pub link: Url,
}

/// Which listing entries a run harvests
///
/// Exactly one rule applies, chosen in priority order by [`SymbolFilter::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolFilter {
    /// Only the explicitly selected symbols
    Selected(HashSet<Symbol>),
    /// Every symbol not already checkpointed
    Pending(BTreeSet<Symbol>),
    /// Every symbol
    All,
}

impl SymbolFilter {
    /// Picks the filter: an explicit selection wins, then resuming with
    /// checkpointed symbols, then everything
    pub fn new(selection: &[Symbol], resume: bool, checkpointed: BTreeSet<Symbol>) -> Self {
        if !selection.is_empty() {
            Self::Selected(selection.iter().cloned().collect())
        } else if resume && !checkpointed.is_empty() {
            Self::Pending(checkpointed)
        } else {
            Self::All
        }
    }

    pub fn accepts(&self, symbol: &Symbol) -> bool {
        match self {
            Self::Selected(selected) => selected.contains(symbol),
            Self::Pending(done) => !done.contains(symbol),
            Self::All => true,
        }
    }
}

/// Filtered listing entries, consumed once in listing order
#[derive(Debug)]
pub struct Listing {
    entries: std::vec::IntoIter<ListingEntry>,
}

impl Iterator for Listing {
    type Item = ListingEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for Listing {}

/// Parses the listing page into detail-page entries
///
/// Only links inside the first table whose resolved path starts with
/// `detail_prefix` are kept. The symbol is the first run of word characters
/// in the link text. Repeated symbols keep their first link.
pub fn parse_listing(html: &str, base: &Url, detail_prefix: &str) -> Result<Vec<ListingEntry>> {
    let document = Html::parse_document(html);

    let table = document
        .select(&TABLE)
        .next()
        .ok_or_else(|| HarvestError::ListingParse {
            message: "listing page has no results table".to_string(),
        })?;

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for anchor in table.select(&LINK) {
        let Some(link) = resolve_href(&anchor, base) else {
            continue;
        };
        if !link.path().starts_with(detail_prefix) {
            continue;
        }

        let text = anchor.text().collect::<String>();
        let Some(token) = WORD_RE.find(&text) else {
            tracing::debug!("Skipping listing link without a symbol: {}", link);
            continue;
        };

        let symbol = Symbol::new(token.as_str());
        if seen.insert(symbol.clone()) {
            entries.push(ListingEntry { symbol, link });
        }
    }

    Ok(entries)
}

/// Fetches the listing page once and yields the symbols to harvest
pub struct SymbolEnumerator<'a> {
    fetcher: &'a Fetcher,
    source: &'a SourceConfig,
}

impl<'a> SymbolEnumerator<'a> {
    pub fn new(fetcher: &'a Fetcher, source: &'a SourceConfig) -> Self {
        Self { fetcher, source }
    }

    /// URL of the listing page
    pub fn listing_url(&self) -> Result<Url> {
        let base = Url::parse(&self.source.base_url)?;
        Ok(base.join(&self.source.listing_path)?)
    }

    /// Fetches and filters the listing
    ///
    /// Any failure to obtain the listing is fatal for the run.
    pub async fn enumerate(&self, filter: &SymbolFilter) -> Result<Listing> {
        let url = self.listing_url()?;
        tracing::info!("Fetching symbol listing from {}", url);

        let body = match self.fetcher.fetch(&url).await {
            FetchOutcome::Page { body, .. } => body,
            FetchOutcome::Status { status_code } => {
                return Err(HarvestError::ListingStatus {
                    url: url.to_string(),
                    status: status_code,
                });
            }
            FetchOutcome::Network { error } => {
                return Err(HarvestError::ListingParse {
                    message: format!("{}: {}", url, error),
                });
            }
        };

        let all = parse_listing(&body, &url, &self.source.detail_prefix)?;
        let total = all.len();

        let entries: Vec<_> = all
            .into_iter()
            .filter(|entry| filter.accepts(&entry.symbol))
            .collect();

        tracing::info!(
            "Listing has {} symbols, {} selected for this run",
            total,
            entries.len()
        );

        Ok(Listing {
            entries: entries.into_iter(),
        })
    }
}
