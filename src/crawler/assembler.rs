//! Per-symbol record assembly
//!
//! Fetches the detail page and its three secondary pages, extracts every
//! field and writes one checkpoint per completed symbol.
//!
//! # Skip policy
//!
//! A symbol is skipped, never failing the run, when its detail page lacks
//! the share-count marker (instrument without stock data), when any of the
//! four pages cannot be fetched, when a secondary link is missing, or when a
//! required field is absent. Optional fields (revenue series, P/E ratio)
//! degrade to `None`. Only checkpoint write failures propagate.

use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::links::{find_link, DetailLinkSet, LinkRole};
use crate::extract;
use crate::record::{BalanceSheet, NumericSeries, StockRecord, Symbol};
use crate::storage::CheckpointStore;
use crate::Result;
use chrono::NaiveDate;
use scraper::Html;
use std::fmt;
use url::Url;

/// Why a symbol produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The detail page has no share-count marker
    NotApplicable,
    /// A page could not be fetched
    Fetch { role: LinkRole, detail: String },
    /// A secondary page link was not found
    MissingLink(LinkRole),
    /// A required field was absent from a page
    MissingField {
        role: LinkRole,
        field: &'static str,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotApplicable => write!(f, "no share count on the detail page"),
            Self::Fetch { role, detail } => write!(f, "{} page fetch failed: {}", role, detail),
            Self::MissingLink(role) => write!(f, "no link to the {} page", role),
            Self::MissingField { role, field } => {
                write!(f, "{} missing on the {} page", field, role)
            }
        }
    }
}

/// Result of assembling one symbol
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyOutcome {
    /// Record written to the checkpoint store
    Stored(StockRecord),
    /// No record produced; nothing written
    Skipped(SkipReason),
}

/// Values read from the detail page
#[derive(Debug)]
struct DetailPage {
    symbol: Symbol,
    name: String,
    price: f64,
    share_count: i64,
    market_cap: i64,
    price_earnings: Option<f64>,
    analysis: Url,
    dividends: Url,
}

impl DetailPage {
    fn parse(body: &str, url: &Url) -> std::result::Result<Self, SkipReason> {
        let document = Html::parse_document(body);

        if !extract::markup::has_marker(&document, extract::SHARE_COUNT_MARKER) {
            return Err(SkipReason::NotApplicable);
        }

        let heading = extract::heading(&document).ok_or(missing(LinkRole::Profile, "heading"))?;
        let price =
            extract::current_price(&document).ok_or(missing(LinkRole::Profile, "price"))?;
        let share_count =
            extract::share_count(&document).ok_or(missing(LinkRole::Profile, "share count"))?;
        let market_cap = extract::market_cap(&document)
            .ok_or(missing(LinkRole::Profile, "market capitalization"))?;

        let analysis = find_link(&document, LinkRole::Analysis, url)
            .ok_or(SkipReason::MissingLink(LinkRole::Analysis))?;
        let dividends = find_link(&document, LinkRole::Dividends, url)
            .ok_or(SkipReason::MissingLink(LinkRole::Dividends))?;

        Ok(Self {
            symbol: heading.symbol,
            name: heading.name,
            price,
            share_count,
            market_cap,
            price_earnings: extract::price_earnings_ratio(&document),
            analysis,
            dividends,
        })
    }
}

/// Values read from the financial-analysis page
#[derive(Debug)]
struct AnalysisPage {
    net_profit: NumericSeries,
    revenue: Option<NumericSeries>,
    balance: Url,
}

impl AnalysisPage {
    fn parse(body: &str, url: &Url) -> std::result::Result<Self, SkipReason> {
        let document = Html::parse_document(body);

        let net_profit = extract::yearly_series(&document, extract::NET_PROFIT_FIELD)
            .ok_or(missing(LinkRole::Analysis, "net profit"))?;
        let balance = find_link(&document, LinkRole::Balance, url)
            .ok_or(SkipReason::MissingLink(LinkRole::Balance))?;

        Ok(Self {
            net_profit,
            revenue: extract::yearly_series(&document, extract::REVENUE_FIELD),
            balance,
        })
    }
}

fn missing(role: LinkRole, field: &'static str) -> SkipReason {
    SkipReason::MissingField { role, field }
}

/// Builds and checkpoints the record of one symbol at a time
pub struct RecordAssembler<'a, S: CheckpointStore> {
    fetcher: &'a Fetcher,
    store: &'a mut S,
    date: NaiveDate,
}

impl<'a, S: CheckpointStore> RecordAssembler<'a, S> {
    /// `date` is stamped on every record assembled by this instance
    pub fn new(fetcher: &'a Fetcher, store: &'a mut S, date: NaiveDate) -> Self {
        Self {
            fetcher,
            store,
            date,
        }
    }

    /// Assembles the symbol whose detail page is `link`
    ///
    /// Writes exactly one checkpoint when a record is produced and none when
    /// the symbol is skipped.
    pub async fn assemble(&mut self, link: &Url) -> Result<AssemblyOutcome> {
        let record = match self.collect(link).await {
            Ok(record) => record,
            Err(reason) => return Ok(AssemblyOutcome::Skipped(reason)),
        };

        self.store.put(&record.symbol, &record)?;
        tracing::debug!("Checkpointed {}", record.symbol);

        Ok(AssemblyOutcome::Stored(record))
    }

    async fn collect(&self, link: &Url) -> std::result::Result<StockRecord, SkipReason> {
        let (profile_url, body) = self.fetch_page(LinkRole::Profile, link).await?;
        let detail = DetailPage::parse(&body, &profile_url)?;

        let (analysis_url, body) = self.fetch_page(LinkRole::Analysis, &detail.analysis).await?;
        let analysis = AnalysisPage::parse(&body, &analysis_url)?;

        let links = DetailLinkSet {
            profile: profile_url,
            analysis: analysis_url,
            balance: analysis.balance,
            dividends: detail.dividends,
        };
        tracing::trace!("Pages for {}: {:?}", detail.symbol, links);

        let (_, body) = self.fetch_page(LinkRole::Balance, &links.balance).await?;
        let balance_sheet = parse_balance_page(&body);

        let (_, body) = self.fetch_page(LinkRole::Dividends, &links.dividends).await?;
        let dividend_years = parse_dividends_page(&body)?;

        Ok(StockRecord {
            name: detail.name,
            symbol: detail.symbol,
            date: self.date,
            price: detail.price,
            share_count: detail.share_count,
            market_cap: detail.market_cap,
            net_profit: analysis.net_profit,
            revenue: analysis.revenue,
            price_earnings: detail.price_earnings,
            dividend_years,
            balance_sheet,
        })
    }

    async fn fetch_page(
        &self,
        role: LinkRole,
        url: &Url,
    ) -> std::result::Result<(Url, String), SkipReason> {
        match self.fetcher.fetch(url).await {
            FetchOutcome::Page { url, body } => Ok((url, body)),
            failed => Err(SkipReason::Fetch {
                role,
                detail: failed.describe(),
            }),
        }
    }
}

fn parse_balance_page(body: &str) -> BalanceSheet {
    extract::balance_sheet_latest(&Html::parse_document(body))
}

fn parse_dividends_page(body: &str) -> std::result::Result<u8, SkipReason> {
    extract::dividend_years_count(&Html::parse_document(body))
        .ok_or(missing(LinkRole::Dividends, "dividends table"))
}
