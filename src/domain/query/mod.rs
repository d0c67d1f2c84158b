//! Query composition: turns loosely specified request parameters into exactly one store call.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

pub mod composer;
pub mod normalize;

pub use composer::{compose_listing, compose_search, ListingQuery, SearchQuery};
pub use normalize::normalize;

/// The only token that selects descending order. Matching is exact and case-sensitive.
pub const DESCENDING_TOKEN: &str = "desc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than exactly `"desc"` falls back to ascending.
    pub fn from_token(token: &str) -> Self {
        if token == DESCENDING_TOKEN {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Zero-based page index plus page length, forwarded to the store untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn of(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// Multi-field filter; each present field narrows the result (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedCriteria {
    pub name: Option<String>,
    pub category: Option<String>,
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
}

impl AdvancedCriteria {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Name filter the store applies; blank text imposes no constraint.
    pub fn name_constraint(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    /// Category filter the store applies; blank text imposes no constraint.
    pub fn category_constraint(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_sort_dir() -> String {
    "asc".to_string()
}

fn default_page_size() -> usize {
    10
}

/// Empty or whitespace-only price parameters deserialize to `None`.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Raw listing parameters as they arrive on the query string.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListingParams {
    /// Field to sort by (`id`, `name`, `category`, `price`, `quantity`, `createdAt`).
    #[serde(default)]
    pub sort_by: Option<String>,
    /// `desc` for descending; any other value sorts ascending.
    #[serde(default = "default_sort_dir")]
    pub sort_dir: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            sort_by: None,
            sort_dir: default_sort_dir(),
            category: None,
        }
    }
}

/// Raw search parameters as they arrive on the query string.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text match against the product name. Takes precedence over every other filter.
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub size: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            keyword: None,
            name: None,
            category: None,
            min_price: None,
            max_price: None,
            page: 0,
            size: default_page_size(),
        }
    }
}

/// Flat echo of the normalized query, handed back to the presentation layer so it can
/// re-render the selected filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub name_filter: Option<String>,
    pub category_filter: Option<String>,
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn search_params(query: &str) -> Result<SearchParams, String> {
        let uri: Uri = format!("http://localhost/api/products/search?{}", query)
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| e.to_string())?;
        Query::<SearchParams>::try_from_uri(&uri)
            .map(|Query(params)| params)
            .map_err(|e| e.to_string())
    }

    #[test]
    fn empty_price_parameters_are_absent() {
        let params = search_params("name=lamp&minPrice=&maxPrice=%20").unwrap();
        assert_eq!(params.name.as_deref(), Some("lamp"));
        assert_eq!(params.min_price, None);
        assert_eq!(params.max_price, None);
        assert_eq!(params.size, 10);

        let params = search_params("minPrice=2.50&maxPrice=%2010%20").unwrap();
        assert_eq!(params.min_price, Some(Decimal::new(250, 2)));
        assert_eq!(params.max_price, Some(Decimal::from(10)));
    }

    #[test]
    fn unparsable_price_is_rejected() {
        assert!(search_params("minPrice=cheap").is_err());
        assert!(search_params("maxPrice=1.2.3").is_err());
    }

    #[test]
    fn blank_text_criteria_impose_no_constraint() {
        let criteria = AdvancedCriteria {
            name: Some("  ".to_string()),
            category: Some(String::new()),
            ..Default::default()
        };
        assert!(!criteria.is_empty());
        assert_eq!(criteria.name_constraint(), None);
        assert_eq!(criteria.category_constraint(), None);

        let criteria = AdvancedCriteria {
            name: Some(" lamp".to_string()),
            category: Some("Home".to_string()),
            ..Default::default()
        };
        assert_eq!(criteria.name_constraint(), Some(" lamp"));
        assert_eq!(criteria.category_constraint(), Some("Home"));
    }

    #[test]
    fn only_exact_desc_token_is_descending() {
        assert_eq!(SortDirection::from_token("desc"), SortDirection::Desc);
        for token in ["asc", "DESC", "Desc", "descending", "dsc", "", " desc"] {
            assert_eq!(SortDirection::from_token(token), SortDirection::Asc, "{token:?}");
        }
    }

    #[test]
    fn page_offset() {
        assert_eq!(PageRequest::of(0, 10).offset(), 0);
        assert_eq!(PageRequest::of(3, 10).offset(), 30);
        assert_eq!(PageRequest::of(usize::MAX, 10).offset(), usize::MAX);
    }

    #[test]
    fn defaults_match_request_defaults() {
        let listing = ListingParams::default();
        assert_eq!(listing.sort_dir, "asc");
        let search = SearchParams::default();
        assert_eq!((search.page, search.size), (0, 10));
    }
}
