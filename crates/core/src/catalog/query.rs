//! Resolution of raw listing parameters into a typed filter.
//!
//! Query strings arrive as loosely-typed text. Everything is parsed here,
//! once, with defaults applied, so the store only ever sees typed values.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Category, Genre, Language};

/// Page size when none (or garbage) is requested.
pub const DEFAULT_LIMIT: u32 = 50;
/// Hard cap on page size.
pub const MAX_LIMIT: u32 = 100;
/// Maximum number of related entries returned.
pub const RELATED_LIMIT: u32 = 8;
/// Maximum number of type-ahead suggestions returned.
pub const SUGGESTION_LIMIT: u32 = 8;
/// Suggestions are only computed for at least this many characters.
pub const SUGGESTION_MIN_CHARS: usize = 2;

/// Listing parameters exactly as they appear in the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCatalogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_trending: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

impl RawCatalogQuery {
    /// Parse every parameter into a typed, defaulted filter.
    ///
    /// Never fails: unparseable numbers fall back to their defaults and
    /// unrecognized enum values produce a filter that matches nothing.
    pub fn resolve(&self) -> CatalogFilter {
        let mut filter = CatalogFilter::new();

        filter.language = enum_param(self.language.as_deref(), &mut filter.no_match);
        filter.category = enum_param(self.category.as_deref(), &mut filter.no_match);
        filter.genre = enum_param(self.genre.as_deref(), &mut filter.no_match);
        filter.year = present(self.year.as_deref()).and_then(|y| y.parse().ok());
        filter.trending_only = flag_param(self.is_trending.as_deref());
        filter.featured_only = flag_param(self.is_featured.as_deref());
        filter.search = present(self.search.as_deref()).map(str::to_string);
        filter.page = positive(self.page.as_deref()).unwrap_or(1);
        filter.limit = positive(self.limit.as_deref())
            .map(|l| l.min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);

        filter
    }
}

/// Typed listing filter consumed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilter {
    pub language: Option<Language>,
    pub category: Option<Category>,
    /// Matches when the entry's genre set contains this tag.
    pub genre: Option<Genre>,
    pub year: Option<i32>,
    pub trending_only: bool,
    pub featured_only: bool,
    /// Case-insensitive substring over title or description.
    pub search: Option<String>,
    /// Admin listings see hidden entries too.
    pub include_inactive: bool,
    /// Set when a filter named a value no entry can hold.
    pub no_match: bool,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogFilter {
    /// Public listing defaults: active entries, first page of 50.
    pub fn new() -> Self {
        Self {
            language: None,
            category: None,
            genre: None,
            year: None,
            trending_only: false,
            featured_only: false,
            search: None,
            include_inactive: false,
            no_match: false,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_genre(mut self, genre: Genre) -> Self {
        self.genre = Some(genre);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn trending(mut self) -> Self {
        self.trending_only = true;
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured_only = true;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn including_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }

    /// Set page and limit, applying the same clamping as query resolution.
    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = page.max(1);
        self.limit = if limit == 0 {
            DEFAULT_LIMIT
        } else {
            limit.min(MAX_LIMIT)
        };
        self
    }

    /// Rows to skip for the current page.
    pub fn offset(&self) -> u64 {
        (u64::from(self.page) - 1) * u64::from(self.limit)
    }

    /// `ceil(total / limit)`.
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn positive(value: Option<&str>) -> Option<u32> {
    present(value)
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}

fn flag_param(value: Option<&str>) -> bool {
    value == Some("true")
}

fn enum_param<T: std::str::FromStr>(value: Option<&str>, no_match: &mut bool) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let value = present(value)?;
    match value.parse() {
        Ok(v) => Some(v),
        Err(e) => {
            debug!("Unrecognized filter value, listing will be empty: {}", e);
            *no_match = true;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawCatalogQuery {
        RawCatalogQuery::default()
    }

    #[test]
    fn test_defaults() {
        let filter = raw().resolve();
        assert_eq!(filter, CatalogFilter::new());
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 50);
        assert!(!filter.include_inactive);
    }

    #[test]
    fn test_limit_clamped_to_max() {
        let filter = RawCatalogQuery {
            limit: Some("500".to_string()),
            ..raw()
        }
        .resolve();
        assert_eq!(filter.limit, 100);
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        for bad in ["0", "-3", "abc", "", "  ", "10.5", "20abc"] {
            let filter = RawCatalogQuery {
                limit: Some(bad.to_string()),
                page: Some(bad.to_string()),
                year: Some(bad.to_string()),
                ..raw()
            }
            .resolve();
            assert_eq!(filter.limit, DEFAULT_LIMIT, "limit for {:?}", bad);
            assert_eq!(filter.page, 1, "page for {:?}", bad);
            assert_eq!(filter.year, None, "year for {:?}", bad);
        }
    }

    #[test]
    fn test_flags_only_on_literal_true() {
        let on = RawCatalogQuery {
            is_trending: Some("true".to_string()),
            is_featured: Some("true".to_string()),
            ..raw()
        }
        .resolve();
        assert!(on.trending_only && on.featured_only);

        for other in ["TRUE", "1", "yes", "false"] {
            let off = RawCatalogQuery {
                is_trending: Some(other.to_string()),
                ..raw()
            }
            .resolve();
            assert!(!off.trending_only, "flag set by {:?}", other);
        }
    }

    #[test]
    fn test_enum_filters_parse() {
        let filter = RawCatalogQuery {
            language: Some("hindi".to_string()),
            category: Some("Web Series".to_string()),
            genre: Some("Sci-Fi".to_string()),
            year: Some("2023".to_string()),
            ..raw()
        }
        .resolve();
        assert_eq!(filter.language, Some(Language::Hindi));
        assert_eq!(filter.category, Some(Category::WebSeries));
        assert_eq!(filter.genre, Some(Genre::SciFi));
        assert_eq!(filter.year, Some(2023));
        assert!(!filter.no_match);
    }

    #[test]
    fn test_unknown_enum_value_matches_nothing() {
        let filter = RawCatalogQuery {
            genre: Some("Musical".to_string()),
            ..raw()
        }
        .resolve();
        assert!(filter.no_match);
        assert_eq!(filter.genre, None);
    }

    #[test]
    fn test_empty_search_ignored() {
        let filter = RawCatalogQuery {
            search: Some("   ".to_string()),
            ..raw()
        }
        .resolve();
        assert_eq!(filter.search, None);
    }

    #[test]
    fn test_page_count_and_offset() {
        let filter = CatalogFilter::new().with_page(3, 20);
        assert_eq!(filter.offset(), 40);
        assert_eq!(filter.page_count(0), 0);
        assert_eq!(filter.page_count(20), 1);
        assert_eq!(filter.page_count(41), 3);
    }

    #[test]
    fn test_with_page_clamps() {
        let filter = CatalogFilter::new().with_page(0, 1000);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, MAX_LIMIT);
        assert_eq!(CatalogFilter::new().with_page(1, 0).limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_raw_query_serializes_camel_case() {
        let raw = RawCatalogQuery {
            is_trending: Some("true".to_string()),
            ..raw()
        };
        let json = serde_json::to_value(&raw).unwrap();
        assert_eq!(json["isTrending"], "true");
        assert!(json.get("language").is_none());
    }
}
