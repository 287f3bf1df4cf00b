//! Keyword routing of free-text queries to a data category.
//!
//! Matching is literal substring search over the lower-cased query. Categories
//! are tried in declaration order and, within a category, keywords in list
//! order; the first hit wins, so a query mentioning both "room" and "rate"
//! routes to `room-information`.

use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary name handed back by the `route` endpoint and used when no known
/// location appears in a query.
pub const DEFAULT_PRIMARY_NAME: &str = "Sterling_Holidays";

pub const KNOWN_LOCATIONS: &[&str] = &["sterling kodai lake", "sterling holidays"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Activities,
    RoomInformation,
    Pricing,
    Rules,
    Queries,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Activities,
        Self::RoomInformation,
        Self::Pricing,
        Self::Rules,
        Self::Queries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activities => "activities",
            Self::RoomInformation => "room-information",
            Self::Pricing => "pricing",
            Self::Rules => "rules",
            Self::Queries => "queries",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Activities => &["activity", "indoor", "outdoor"],
            Self::RoomInformation => &["room", "suite", "deluxe", "guest"],
            Self::Pricing => &["price", "cost", "charges", "rate"],
            Self::Rules => &["rule", "policy", "checkin", "checkout"],
            Self::Queries => &["staff", "hire", "help", "housekeeping"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDecision {
    pub category: Category,
    /// First known location mentioned in the query, if any.
    pub location: Option<&'static str>,
}

/// Pure keyword router shared by every endpoint that needs it.
#[derive(Debug, Clone)]
pub struct QueryRouter {
    categories: Vec<Category>,
    locations: Vec<&'static str>,
}

impl Default for QueryRouter {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            locations: KNOWN_LOCATIONS.to_vec(),
        }
    }
}

impl QueryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes a raw query. `None` means no category keyword matched.
    pub fn route(&self, query: &str) -> Option<RouteDecision> {
        let lowered = query.to_lowercase();
        let category = self.detect_category(&lowered)?;
        let location = self.detect_location(&lowered);
        trace!("Routed query to {category} (location: {location:?})");
        Some(RouteDecision { category, location })
    }

    /// Expects an already lower-cased query.
    pub fn detect_category(&self, lowered: &str) -> Option<Category> {
        self.categories.iter().copied().find(|category| {
            category
                .keywords()
                .iter()
                .any(|keyword| lowered.contains(keyword))
        })
    }

    /// Expects an already lower-cased query.
    pub fn detect_location(&self, lowered: &str) -> Option<&'static str> {
        self.locations
            .iter()
            .copied()
            .find(|location| lowered.contains(location))
    }
}
