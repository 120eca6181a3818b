//! User-owned filter and sort state for the catalog view.

use std::{convert::Infallible, fmt, str::FromStr};

use thiserror::Error;

pub const DEFAULT_MIN_PRICE: f64 = 0.0;
pub const DEFAULT_MAX_PRICE: f64 = 9999.0;
pub const DEFAULT_SORT_KEY: &str = "subject-asc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortField {
    Subject,
    Location,
    Price,
    Spaces,
    Id,
    /// Unknown field names sort as equal, leaving catalog order untouched.
    Other(String),
}

impl SortField {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Price | Self::Spaces)
    }

    fn as_str(&self) -> &str {
        match self {
            Self::Subject => "subject",
            Self::Location => "location",
            Self::Price => "price",
            Self::Spaces => "spaces",
            Self::Id => "id",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for SortField {
    fn from(value: &str) -> Self {
        match value {
            "subject" => Self::Subject,
            "location" => Self::Location,
            "price" => Self::Price,
            "spaces" => Self::Spaces,
            "id" => Self::Id,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::new(SortField::Subject, SortDirection::Ascending)
    }
}

/// Parses `"<field>-<direction>"`. Only `asc` means ascending; a missing or
/// unrecognised direction sorts descending.
impl FromStr for SortKey {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (field, direction) = raw.split_once('-').unwrap_or((raw, ""));
        let direction = if direction == "asc" {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        Ok(Self::new(SortField::from(field), direction))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}-{direction}", self.field.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockFilter {
    #[default]
    All,
    Available,
    SoldOut,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown stock filter '{0}', expected one of all, available, soldout")]
pub struct UnknownStockFilter(pub String);

impl FromStr for StockFilter {
    type Err = UnknownStockFilter;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "all" => Ok(Self::All),
            "available" => Ok(Self::Available),
            "soldout" => Ok(Self::SoldOut),
            other => Err(UnknownStockFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub search_term: String,
    pub sort_key: SortKey,
    pub filter_key: StockFilter,
    pub min_price: f64,
    pub max_price: f64,
    pub location_filter: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_key: SortKey::default(),
            filter_key: StockFilter::All,
            min_price: DEFAULT_MIN_PRICE,
            max_price: DEFAULT_MAX_PRICE,
            location_filter: String::new(),
        }
    }
}
