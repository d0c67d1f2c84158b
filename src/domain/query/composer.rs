//! Dispatch rules for listing and search requests.
//!
//! The composer never builds a query string. It picks one of a fixed set of store calls and
//! hands over fully normalized arguments.

use super::normalize::normalize;
use super::{
    AdvancedCriteria, ListingParams, PageRequest, QueryDescriptor, SearchParams, SortDirection,
    SortSpec,
};

/// The four listing shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingQuery {
    All,
    Sorted(SortSpec),
    ByCategory(String),
    ByCategorySorted { category: String, sort: SortSpec },
}

/// Outcome of search composition.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    Keyword { keyword: String, page: PageRequest },
    Advanced { criteria: AdvancedCriteria, page: PageRequest },
    /// Nothing to search for; the caller shows the plain listing instead.
    RedirectToListing,
}

/// Sorting applies iff `sort_by` is non-blank; the category filter applies iff `category` is
/// non-blank. Direction is only consulted when sorting.
pub fn compose_listing(params: &ListingParams) -> ListingQuery {
    let sort = normalize(params.sort_by.as_deref())
        .map(|field| SortSpec::new(field, SortDirection::from_token(&params.sort_dir)));
    let category = normalize(params.category.as_deref());

    match (sort, category) {
        (None, None) => ListingQuery::All,
        (Some(sort), None) => ListingQuery::Sorted(sort),
        (None, Some(category)) => ListingQuery::ByCategory(category),
        (Some(sort), Some(category)) => ListingQuery::ByCategorySorted { category, sort },
    }
}

/// Keyword mode wins over advanced mode. Advanced mode starts as soon as any advanced field is
/// supplied at all, and blank `name`/`category` values are forwarded verbatim.
pub fn compose_search(params: &SearchParams) -> SearchQuery {
    let page = PageRequest::of(params.page, params.size);

    if let Some(keyword) = normalize(params.keyword.as_deref()) {
        return SearchQuery::Keyword { keyword, page };
    }

    let criteria = AdvancedCriteria {
        name: params.name.clone(),
        category: params.category.clone(),
        min_price: params.min_price,
        max_price: params.max_price,
    };
    if criteria.is_empty() {
        return SearchQuery::RedirectToListing;
    }
    SearchQuery::Advanced { criteria, page }
}

impl ListingQuery {
    pub fn sort(&self) -> Option<&SortSpec> {
        match self {
            ListingQuery::Sorted(sort) | ListingQuery::ByCategorySorted { sort, .. } => Some(sort),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            ListingQuery::ByCategory(category) | ListingQuery::ByCategorySorted { category, .. } => {
                Some(category.as_str())
            }
            _ => None,
        }
    }

    pub fn describe(&self) -> QueryDescriptor {
        QueryDescriptor {
            sort_field: self.sort().map(|s| s.field.clone()),
            sort_direction: self.sort().map(|s| s.direction),
            category: self.category().map(str::to_string),
            ..Default::default()
        }
    }
}

impl SearchQuery {
    pub fn describe(&self) -> QueryDescriptor {
        match self {
            SearchQuery::Keyword { keyword, page } => QueryDescriptor {
                keyword: Some(keyword.clone()),
                page: Some(page.page),
                page_size: Some(page.size),
                ..Default::default()
            },
            SearchQuery::Advanced { criteria, page } => QueryDescriptor {
                name_filter: criteria.name.clone(),
                category_filter: criteria.category.clone(),
                min_price: criteria.min_price,
                max_price: criteria.max_price,
                page: Some(page.page),
                page_size: Some(page.size),
                ..Default::default()
            },
            SearchQuery::RedirectToListing => QueryDescriptor::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn listing(sort_by: Option<&str>, sort_dir: &str, category: Option<&str>) -> ListingQuery {
        compose_listing(&ListingParams {
            sort_by: sort_by.map(str::to_string),
            sort_dir: sort_dir.to_string(),
            category: category.map(str::to_string),
        })
    }

    #[test]
    fn blank_or_absent_sort_is_unsorted_for_any_direction() {
        for sort_by in [None, Some(""), Some("   ")] {
            for dir in ["asc", "desc", "DESC", "bogus"] {
                assert_eq!(listing(sort_by, dir, None), ListingQuery::All);
                assert_eq!(
                    listing(sort_by, dir, Some("Tools")),
                    ListingQuery::ByCategory("Tools".to_string())
                );
            }
        }
    }

    #[test]
    fn four_listing_shapes() {
        assert_eq!(listing(None, "asc", None), ListingQuery::All);
        assert_eq!(
            listing(Some("price"), "asc", None),
            ListingQuery::Sorted(SortSpec::new("price", SortDirection::Asc))
        );
        assert_eq!(
            listing(None, "asc", Some("Books")),
            ListingQuery::ByCategory("Books".to_string())
        );
        assert_eq!(
            listing(Some("name"), "desc", Some("Books")),
            ListingQuery::ByCategorySorted {
                category: "Books".to_string(),
                sort: SortSpec::new("name", SortDirection::Desc),
            }
        );
    }

    #[test]
    fn wrong_case_direction_behaves_like_ascending() {
        assert_eq!(
            listing(Some("price"), "DESC", None),
            listing(Some("price"), "asc", None)
        );
        assert_eq!(
            listing(Some("price"), "descending", None),
            ListingQuery::Sorted(SortSpec::new("price", SortDirection::Asc))
        );
    }

    #[test]
    fn listing_inputs_are_trimmed_and_blank_category_ignored() {
        assert_eq!(
            listing(Some(" quantity "), "desc", Some("  ")),
            ListingQuery::Sorted(SortSpec::new("quantity", SortDirection::Desc))
        );
        assert_eq!(
            listing(None, "asc", Some(" Garden ")),
            ListingQuery::ByCategory("Garden".to_string())
        );
    }

    #[test]
    fn unknown_sort_field_is_forwarded_not_rejected() {
        assert_eq!(
            listing(Some("colour"), "asc", None),
            ListingQuery::Sorted(SortSpec::new("colour", SortDirection::Asc))
        );
    }

    #[test]
    fn whitespace_keyword_counts_as_absent() {
        let query = compose_search(&SearchParams {
            keyword: Some(" ".to_string()),
            ..Default::default()
        });
        assert_eq!(query, SearchQuery::RedirectToListing);
    }

    #[test]
    fn no_criteria_signals_redirect() {
        assert_eq!(
            compose_search(&SearchParams::default()),
            SearchQuery::RedirectToListing
        );
    }

    #[test]
    fn keyword_takes_precedence_over_advanced_fields() {
        let query = compose_search(&SearchParams {
            keyword: Some(" x ".to_string()),
            name: Some("y".to_string()),
            min_price: Some(Decimal::ONE),
            ..Default::default()
        });
        assert_eq!(
            query,
            SearchQuery::Keyword {
                keyword: "x".to_string(),
                page: PageRequest::of(0, 10),
            }
        );
    }

    #[test]
    fn any_advanced_field_selects_advanced_mode() {
        let query = compose_search(&SearchParams {
            max_price: Some(Decimal::from(50)),
            page: 2,
            size: 5,
            ..Default::default()
        });
        assert_eq!(
            query,
            SearchQuery::Advanced {
                criteria: AdvancedCriteria {
                    max_price: Some(Decimal::from(50)),
                    ..Default::default()
                },
                page: PageRequest::of(2, 5),
            }
        );
    }

    #[test]
    fn advanced_mode_keeps_blank_name_and_category_verbatim() {
        let query = compose_search(&SearchParams {
            name: Some("".to_string()),
            category: Some("  ".to_string()),
            ..Default::default()
        });
        match query {
            SearchQuery::Advanced { criteria, .. } => {
                assert_eq!(criteria.name.as_deref(), Some(""));
                assert_eq!(criteria.category.as_deref(), Some("  "));
            }
            other => panic!("expected advanced search, got {other:?}"),
        }
    }

    #[test]
    fn page_numbers_are_not_clamped() {
        let query = compose_search(&SearchParams {
            keyword: Some("lamp".to_string()),
            page: 9_999,
            size: 0,
            ..Default::default()
        });
        assert_eq!(
            query,
            SearchQuery::Keyword {
                keyword: "lamp".to_string(),
                page: PageRequest::of(9_999, 0),
            }
        );
    }

    #[test]
    fn descriptors_echo_normalized_values() {
        let d = listing(Some(" price "), "desc", Some(" Toys ")).describe();
        assert_eq!(d.sort_field.as_deref(), Some("price"));
        assert_eq!(d.sort_direction, Some(SortDirection::Desc));
        assert_eq!(d.category.as_deref(), Some("Toys"));
        assert_eq!(d.page, None);

        let d = compose_search(&SearchParams {
            category: Some("Toys".to_string()),
            page: 1,
            ..Default::default()
        })
        .describe();
        assert_eq!(d.category_filter.as_deref(), Some("Toys"));
        assert_eq!((d.page, d.page_size), (Some(1), Some(10)));
        assert_eq!(d.keyword, None);
    }
}
