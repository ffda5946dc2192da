//! Link discovery by marker text
//!
//! Secondary pages are reached by following the link whose visible text is
//! a fixed marker. The table below is the only place that knows which
//! marker leads to which page and where that link lives.

use crate::extract::markup::{closest, find_by_marker};
use scraper::{ElementRef, Html};
use std::fmt;
use url::Url;

/// Semantic role of a per-symbol page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkRole {
    /// Detail page linked from the listing
    Profile,
    /// Financial analysis (income statement history)
    Analysis,
    /// Balance sheet
    Balance,
    /// Dividend history
    Dividends,
}

impl fmt::Display for LinkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Profile => "profile",
            Self::Analysis => "financial analysis",
            Self::Balance => "balance sheet",
            Self::Dividends => "dividends",
        };
        f.write_str(name)
    }
}

/// Where to find the link to a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkMarker {
    /// Page the link leads to
    pub role: LinkRole,
    /// Exact visible text of the link
    pub marker: &'static str,
    /// Page that carries the link
    pub found_on: LinkRole,
}

/// Marker text → link role table
pub const LINK_MARKERS: &[LinkMarker] = &[
    LinkMarker {
        role: LinkRole::Analysis,
        marker: "ANALIZA FINANSOWA",
        found_on: LinkRole::Profile,
    },
    LinkMarker {
        role: LinkRole::Balance,
        marker: "BILANS",
        found_on: LinkRole::Analysis,
    },
    LinkMarker {
        role: LinkRole::Dividends,
        marker: "DYWIDENDY",
        found_on: LinkRole::Profile,
    },
];

/// Looks up the marker for a role; the profile page has none
pub fn marker_for(role: LinkRole) -> Option<&'static LinkMarker> {
    LINK_MARKERS.iter().find(|entry| entry.role == role)
}

/// The four pages visited for one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLinkSet {
    pub profile: Url,
    pub analysis: Url,
    pub balance: Url,
    pub dividends: Url,
}

/// Finds the link whose text is `marker` and resolves it against `base`
///
/// The marker text may sit directly in the anchor or in an element nested
/// inside it.
pub fn find_link_by_marker(document: &Html, marker: &str, base: &Url) -> Option<Url> {
    let element = find_by_marker(document, marker)?;
    let anchor = if element.value().name() == "a" {
        element
    } else {
        closest(element, "a")?
    };
    resolve_href(&anchor, base)
}

/// Resolves the link for `role` on a page that carries it
pub fn find_link(document: &Html, role: LinkRole, base: &Url) -> Option<Url> {
    let entry = marker_for(role)?;
    find_link_by_marker(document, entry.marker, base)
}

/// Resolves an anchor's href to an absolute http(s) URL
pub fn resolve_href(anchor: &ElementRef, base: &Url) -> Option<Url> {
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}
